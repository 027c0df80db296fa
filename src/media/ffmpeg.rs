use std::collections::VecDeque;

use crate::{
    foundation::{
        core::{Frame, Size},
        error::{PosterError, PosterResult},
    },
    media::{MediaElement, MediaEvent, MediaMetadata, MediaRef, OpenOptions},
};

/// Media element backed by the system `ffprobe` and `ffmpeg` binaries.
///
/// `load` probes the source; `seek` decodes a single RGBA frame at the target timestamp. Both
/// block the calling thread for the duration of the child process; the batch driver runs one
/// element per worker. Without the `media-ffmpeg` feature every load reports an error, so all
/// elements take the placeholder path.
#[derive(Debug)]
pub struct FfmpegMedia {
    source: MediaRef,
    opts: OpenOptions,
    decode_size: Option<Size>,
    frame: Option<Frame>,
    queue: VecDeque<MediaEvent>,
}

impl FfmpegMedia {
    /// Bind an element to `source`. Nothing runs until [`MediaElement::load`].
    pub fn open(source: MediaRef, opts: OpenOptions) -> Self {
        Self {
            source,
            opts,
            decode_size: None,
            frame: None,
            queue: VecDeque::new(),
        }
    }
}

impl MediaElement for FfmpegMedia {
    fn load(&mut self) {
        match probe(&self.source) {
            Ok(meta) => {
                self.decode_size = Some(crate::capture::capture_size(
                    meta.width,
                    meta.height,
                    Size::FALLBACK,
                ));
                self.queue.push_back(MediaEvent::MetadataReady(meta));
            }
            Err(e) => self.queue.push_back(MediaEvent::Error(e.to_string())),
        }
    }

    fn seek(&mut self, target_sec: f64) {
        let size = self.decode_size.unwrap_or(Size::FALLBACK);
        match decode_frame_rgba8(&self.source, self.opts, target_sec, size) {
            Ok(frame) => {
                self.frame = Some(frame);
                self.queue.push_back(MediaEvent::SeekComplete);
            }
            Err(e) => self.queue.push_back(MediaEvent::Error(e.to_string())),
        }
    }

    fn next_event(&mut self) -> Option<MediaEvent> {
        self.queue.pop_front()
    }

    fn current_frame(&mut self) -> PosterResult<Frame> {
        self.frame
            .take()
            .ok_or_else(|| PosterError::capture("no decoded frame at current position"))
    }
}

/// Return `true` when both `ffmpeg` and `ffprobe` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    ["ffmpeg", "ffprobe"].iter().all(|tool| {
        std::process::Command::new(tool)
            .arg("-version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    })
}

/// Probe container metadata with `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
pub fn probe(source: &MediaRef) -> PosterResult<MediaMetadata> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source.as_str())
        .output()
        .map_err(|e| PosterError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(PosterError::media(format!(
            "ffprobe failed for '{source}': {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| PosterError::media(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| PosterError::media(format!("no video stream found in '{source}'")))?;

    // ffprobe reports "N/A" for live or unseekable inputs.
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .map(|s| s.parse::<f64>().unwrap_or(f64::INFINITY))
        .unwrap_or(f64::NAN);

    Ok(MediaMetadata {
        width: video_stream.width,
        height: video_stream.height,
        duration_sec,
    })
}

/// Probe container metadata with `ffprobe` (unavailable without `media-ffmpeg`).
#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe(_source: &MediaRef) -> PosterResult<MediaMetadata> {
    Err(PosterError::media(
        "frame capture requires the 'media-ffmpeg' feature",
    ))
}

/// Decode one frame at `time_sec`, scaled to `size`.
#[cfg(feature = "media-ffmpeg")]
pub fn decode_frame_rgba8(
    source: &MediaRef,
    opts: OpenOptions,
    time_sec: f64,
    size: Size,
) -> PosterResult<Frame> {
    let mut cmd = std::process::Command::new("ffmpeg");
    cmd.args(["-v", "error", "-ss", &format!("{time_sec:.6}")])
        .arg("-i")
        .arg(source.as_str());
    if opts.muted {
        cmd.arg("-an");
    }
    let out = cmd
        .args([
            "-frames:v",
            "1",
            "-vf",
            &format!("scale={}:{}", size.width, size.height),
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| PosterError::media(format!("failed to run ffmpeg for frame decode: {e}")))?;

    if !out.status.success() {
        return Err(PosterError::media(format!(
            "ffmpeg frame decode failed for '{source}': {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected_len = size.area() * 4;
    if out.stdout.len() < expected_len {
        return Err(PosterError::media(format!(
            "decoded frame is truncated: got {} bytes, expected {expected_len}",
            out.stdout.len()
        )));
    }
    let mut rgba8 = out.stdout;
    rgba8.truncate(expected_len);
    Frame::new(size, rgba8)
}

/// Decode one frame at `time_sec` (unavailable without `media-ffmpeg`).
#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_frame_rgba8(
    _source: &MediaRef,
    _opts: OpenOptions,
    _time_sec: f64,
    _size: Size,
) -> PosterResult<Frame> {
    Err(PosterError::media(
        "frame capture requires the 'media-ffmpeg' feature",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "media-ffmpeg"))]
    #[test]
    fn without_feature_load_reports_error() {
        let mut m = FfmpegMedia::open(MediaRef::new("clip.mp4").unwrap(), OpenOptions::CAPTURE);
        m.load();
        match m.next_event() {
            Some(MediaEvent::Error(msg)) => assert!(msg.contains("media-ffmpeg")),
            other => panic!("expected error event, got {other:?}"),
        }
        assert_eq!(m.next_event(), None);
    }

    #[test]
    fn current_frame_before_seek_is_capture_error() {
        let mut m = FfmpegMedia::open(MediaRef::new("clip.mp4").unwrap(), OpenOptions::CAPTURE);
        assert!(matches!(m.current_frame(), Err(PosterError::Capture(_))));
    }
}
