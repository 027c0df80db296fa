use std::collections::VecDeque;

use crate::{
    foundation::{
        core::{Frame, Rgb8, Size},
        error::{PosterError, PosterResult},
    },
    media::{MediaElement, MediaEvent, MediaMetadata},
};

/// How a scripted element answers `load`.
#[derive(Clone, Debug)]
enum LoadScript {
    Ready(MediaMetadata),
    Fail(String),
    Silent,
}

/// A media element that replays a fixed script.
///
/// Used to drive the generator without a media backend: tests inject metadata, frames, and
/// failures at each step, and the CLI's dry-run mode uses [`ScriptedMedia::failing`] so every
/// element takes the placeholder path.
#[derive(Clone, Debug)]
pub struct ScriptedMedia {
    load: LoadScript,
    seek_error: Option<String>,
    frame: Option<Frame>,
    frame_error: Option<String>,
    queue: VecDeque<MediaEvent>,
    loads: u32,
    seeks: Vec<f64>,
}

impl ScriptedMedia {
    fn with_load(load: LoadScript) -> Self {
        Self {
            load,
            seek_error: None,
            frame: None,
            frame_error: None,
            queue: VecDeque::new(),
            loads: 0,
            seeks: Vec::new(),
        }
    }

    /// Loads successfully with `meta`; seeks succeed.
    pub fn ready(meta: MediaMetadata) -> Self {
        Self::with_load(LoadScript::Ready(meta))
    }

    /// Loading fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::with_load(LoadScript::Fail(reason.into()))
    }

    /// Never reports anything after `load`.
    pub fn silent() -> Self {
        Self::with_load(LoadScript::Silent)
    }

    /// Make seeks fail with `reason`.
    pub fn with_seek_error(mut self, reason: impl Into<String>) -> Self {
        self.seek_error = Some(reason.into());
        self
    }

    /// Frame returned after a successful seek.
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = Some(frame);
        self
    }

    /// Make frame reads fail (e.g. a source whose pixels cannot be read back).
    pub fn with_frame_error(mut self, reason: impl Into<String>) -> Self {
        self.frame_error = Some(reason.into());
        self
    }

    /// Number of `load` calls observed.
    pub fn loads(&self) -> u32 {
        self.loads
    }

    /// Seek targets observed, in call order.
    pub fn seeks(&self) -> &[f64] {
        &self.seeks
    }

    fn default_frame(&self) -> Frame {
        let size = match &self.load {
            LoadScript::Ready(meta) => {
                crate::capture::capture_size(meta.width, meta.height, Size::FALLBACK)
            }
            _ => Size::FALLBACK,
        };
        Frame::solid(size, Rgb8::new(40, 44, 52))
    }
}

impl MediaElement for ScriptedMedia {
    fn load(&mut self) {
        self.loads += 1;
        match &self.load {
            LoadScript::Ready(meta) => self.queue.push_back(MediaEvent::MetadataReady(*meta)),
            LoadScript::Fail(reason) => self.queue.push_back(MediaEvent::Error(reason.clone())),
            LoadScript::Silent => {}
        }
    }

    fn seek(&mut self, target_sec: f64) {
        self.seeks.push(target_sec);
        match &self.seek_error {
            Some(reason) => self.queue.push_back(MediaEvent::Error(reason.clone())),
            None => self.queue.push_back(MediaEvent::SeekComplete),
        }
    }

    fn next_event(&mut self) -> Option<MediaEvent> {
        self.queue.pop_front()
    }

    fn current_frame(&mut self) -> PosterResult<Frame> {
        if let Some(reason) = &self.frame_error {
            return Err(PosterError::capture(reason.clone()));
        }
        Ok(self.frame.clone().unwrap_or_else(|| self.default_frame()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> MediaMetadata {
        MediaMetadata {
            width: Some(8),
            height: Some(6),
            duration_sec: 4.0,
        }
    }

    #[test]
    fn ready_script_queues_metadata_then_seek() {
        let mut m = ScriptedMedia::ready(meta());
        m.load();
        assert_eq!(m.next_event(), Some(MediaEvent::MetadataReady(meta())));
        assert_eq!(m.next_event(), None);
        m.seek(0.4);
        assert_eq!(m.next_event(), Some(MediaEvent::SeekComplete));
        assert_eq!(m.seeks(), &[0.4]);
        assert_eq!(m.current_frame().unwrap().size, Size { width: 8, height: 6 });
    }

    #[test]
    fn failing_and_silent_scripts() {
        let mut m = ScriptedMedia::failing("404");
        m.load();
        assert_eq!(m.next_event(), Some(MediaEvent::Error("404".into())));

        let mut m = ScriptedMedia::silent();
        m.load();
        assert_eq!(m.loads(), 1);
        assert_eq!(m.next_event(), None);
    }

    #[test]
    fn frame_error_is_a_capture_error() {
        let mut m = ScriptedMedia::ready(meta()).with_frame_error("tainted");
        let err = m.current_frame().unwrap_err();
        assert!(matches!(err, PosterError::Capture(_)));
    }
}
