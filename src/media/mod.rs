//! Off-screen media elements.
//!
//! A [`MediaElement`] is event-driven: [`MediaElement::load`] and [`MediaElement::seek`] never
//! fail directly, they queue a [`MediaEvent`] that the caller drains with
//! [`MediaElement::next_event`].

use std::path::Path;

use crate::foundation::{
    core::Frame,
    error::{PosterError, PosterResult},
};

/// `ffprobe`/`ffmpeg`-backed media element.
pub mod ffmpeg;
/// Scripted media element for tests and dry runs.
pub mod scripted;

/// Opaque locator of a video resource (URL or file path). Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaRef(String);

impl MediaRef {
    /// Build from a non-blank locator.
    pub fn new(locator: impl Into<String>) -> PosterResult<Self> {
        let locator = locator.into();
        if locator.trim().is_empty() {
            return Err(PosterError::validation("media locator must be non-empty"));
        }
        Ok(Self(locator))
    }

    /// The locator as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for `scheme://...` locators.
    pub fn is_remote(&self) -> bool {
        match self.0.split_once("://") {
            Some((scheme, _)) => {
                !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+')
            }
            None => false,
        }
    }

    /// Resolve a relative file locator against `root`. Remote and absolute locators are returned
    /// unchanged.
    pub fn resolve_against(&self, root: &Path) -> MediaRef {
        if self.is_remote() || Path::new(&self.0).is_absolute() {
            return self.clone();
        }
        MediaRef(root.join(&self.0).to_string_lossy().into_owned())
    }
}

impl TryFrom<String> for MediaRef {
    type Error = PosterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MediaRef::new(value)
    }
}

impl From<MediaRef> for String {
    fn from(value: MediaRef) -> Self {
        value.0
    }
}

impl std::fmt::Display for MediaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the media reports once its metadata is loaded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MediaMetadata {
    /// Native width, when the container reports one.
    pub width: Option<u32>,
    /// Native height, when the container reports one.
    pub height: Option<u32>,
    /// Total duration in seconds. May be infinite (live) or NaN (unknown).
    pub duration_sec: f64,
}

/// Media lifecycle events.
#[derive(Clone, Debug, PartialEq)]
pub enum MediaEvent {
    /// Metadata is available.
    MetadataReady(MediaMetadata),
    /// The last requested seek finished and a frame is ready.
    SeekComplete,
    /// Loading, seeking, or decoding failed.
    Error(String),
}

/// How an off-screen element is opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpenOptions {
    /// Audio is never decoded.
    pub muted: bool,
    /// Inline (non-fullscreen) playback; hosts that gate programmatic seeking on it need it set.
    pub inline: bool,
}

impl OpenOptions {
    /// Options used for poster capture: muted and inline.
    pub const CAPTURE: OpenOptions = OpenOptions {
        muted: true,
        inline: true,
    };
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::CAPTURE
    }
}

/// A single-use, off-screen media element.
pub trait MediaElement: Send {
    /// Begin loading. Queues [`MediaEvent::MetadataReady`] or [`MediaEvent::Error`].
    fn load(&mut self);
    /// Seek to `target_sec`. Queues [`MediaEvent::SeekComplete`] or [`MediaEvent::Error`].
    fn seek(&mut self, target_sec: f64);
    /// Pop the next queued event. `None` means the element has nothing more to report.
    fn next_event(&mut self) -> Option<MediaEvent>;
    /// The frame at the current position.
    fn current_frame(&mut self) -> PosterResult<Frame>;
}

/// Opens one private media element per video.
pub type MediaFactory = dyn Fn(&MediaRef, OpenOptions) -> Box<dyn MediaElement> + Send + Sync;

/// Factory for the system-`ffmpeg` backend.
pub fn ffmpeg_factory() -> Box<MediaFactory> {
    Box::new(|media: &MediaRef, opts: OpenOptions| -> Box<dyn MediaElement> {
        Box::new(ffmpeg::FfmpegMedia::open(media.clone(), opts))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_ref_rejects_blank() {
        assert!(MediaRef::new("").is_err());
        assert!(MediaRef::new("   ").is_err());
        assert_eq!(MediaRef::new("a.mp4").unwrap().as_str(), "a.mp4");
    }

    #[test]
    fn remote_detection() {
        assert!(MediaRef::new("https://cdn.example.com/a.mp4").unwrap().is_remote());
        assert!(MediaRef::new("rtmp://live/x").unwrap().is_remote());
        assert!(!MediaRef::new("videos/a.mp4").unwrap().is_remote());
        assert!(!MediaRef::new("://odd").unwrap().is_remote());
    }

    #[test]
    fn resolve_only_touches_relative_paths() {
        let root = Path::new("site");
        let rel = MediaRef::new("videos/a.mp4").unwrap();
        assert_eq!(
            rel.resolve_against(root).as_str(),
            Path::new("site").join("videos/a.mp4").to_string_lossy()
        );

        let remote = MediaRef::new("https://x/a.mp4").unwrap();
        assert_eq!(remote.resolve_against(root), remote);
    }

    #[test]
    fn serde_validates_locator() {
        let ok: MediaRef = serde_json::from_str("\"clip.mp4\"").unwrap();
        assert_eq!(ok.as_str(), "clip.mp4");
        assert!(serde_json::from_str::<MediaRef>("\"\"").is_err());
    }
}
