//! Load → seek → capture sequencing as an explicit state machine.
//!
//! The machine performs no I/O. A driver (see [`crate::PosterGenerator`]) feeds it media lifecycle
//! events and executes the [`Command`]s it returns.

use crate::{
    config::PosterConfig,
    foundation::core::Size,
    media::{MediaEvent, MediaMetadata},
};

/// Capture timestamp for a clip: `min(cap, fraction * duration)`.
///
/// Infinite durations (live streams) seek to the cap. NaN or non-positive durations seek to 0.
pub fn seek_target(duration_sec: f64, cap_sec: f64, fraction: f64) -> f64 {
    let cap = if cap_sec.is_finite() {
        cap_sec.max(0.0)
    } else {
        0.0
    };
    if duration_sec.is_nan() || duration_sec <= 0.0 {
        return 0.0;
    }
    if duration_sec.is_infinite() {
        return cap;
    }
    (duration_sec * fraction.clamp(0.0, 1.0)).min(cap)
}

/// Surface size for a capture: native dimensions when both are known and non-zero, else
/// `fallback`.
pub fn capture_size(width: Option<u32>, height: Option<u32>, fallback: Size) -> Size {
    match (width, height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Size {
            width: w,
            height: h,
        },
        _ => fallback,
    }
}

/// Parameters of the capture sequence, usually derived from [`PosterConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapturePolicy {
    /// Upper bound on the seek target.
    pub seek_cap_sec: f64,
    /// Fraction of the duration to seek to.
    pub seek_fraction: f64,
    /// Surface size when native dimensions are unknown.
    pub fallback_size: Size,
}

impl Default for CapturePolicy {
    fn default() -> Self {
        Self::from_config(&PosterConfig::default())
    }
}

impl CapturePolicy {
    /// Derive from a poster configuration.
    pub fn from_config(cfg: &PosterConfig) -> Self {
        Self {
            seek_cap_sec: cfg.seek_cap_sec,
            seek_fraction: cfg.seek_fraction,
            fallback_size: cfg.capture_fallback_size(),
        }
    }
}

/// Machine state.
#[derive(Clone, Debug, PartialEq)]
pub enum CaptureState {
    /// Not started.
    Idle,
    /// Load requested; waiting for metadata.
    AwaitingMetadata,
    /// Seek requested; waiting for the seek to complete.
    AwaitingSeek {
        /// Surface size chosen from the metadata.
        size: Size,
        /// Seek target in seconds.
        target_sec: f64,
    },
    /// Frame ready to be drawn at `size`.
    Captured {
        /// Surface size.
        size: Size,
    },
    /// Capture abandoned; the placeholder must be drawn.
    Failed {
        /// Diagnostic reason.
        reason: String,
    },
}

impl CaptureState {
    /// `Captured` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaptureState::Captured { .. } | CaptureState::Failed { .. })
    }

    fn name(&self) -> &'static str {
        match self {
            CaptureState::Idle => "idle",
            CaptureState::AwaitingMetadata => "awaiting-metadata",
            CaptureState::AwaitingSeek { .. } => "awaiting-seek",
            CaptureState::Captured { .. } => "captured",
            CaptureState::Failed { .. } => "failed",
        }
    }
}

/// What the driver must do next.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Start loading the media.
    Load,
    /// Seek the media to this timestamp.
    Seek(f64),
    /// Draw the current frame onto a surface of this size.
    Capture {
        /// Surface size.
        size: Size,
    },
    /// Draw the placeholder instead.
    Fallback {
        /// Diagnostic reason.
        reason: String,
    },
    /// Nothing to do; wait for the next event.
    Wait,
}

/// The capture state machine for one media element.
#[derive(Debug)]
pub struct CaptureMachine {
    policy: CapturePolicy,
    state: CaptureState,
}

impl CaptureMachine {
    /// A machine in [`CaptureState::Idle`].
    pub fn new(policy: CapturePolicy) -> Self {
        Self {
            policy,
            state: CaptureState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    /// Begin the sequence. Only valid from `Idle`; otherwise returns [`Command::Wait`].
    pub fn start(&mut self) -> Command {
        if self.state != CaptureState::Idle {
            tracing::debug!(state = self.state.name(), "start ignored");
            return Command::Wait;
        }
        self.state = CaptureState::AwaitingMetadata;
        Command::Load
    }

    /// Feed one lifecycle event.
    pub fn on_event(&mut self, event: MediaEvent) -> Command {
        if self.state.is_terminal() {
            tracing::debug!(state = self.state.name(), ?event, "event after terminal state");
            return Command::Wait;
        }

        match event {
            MediaEvent::Error(reason) => self.fail(reason),
            MediaEvent::MetadataReady(meta) if self.state == CaptureState::AwaitingMetadata => {
                self.on_metadata(meta)
            }
            MediaEvent::SeekComplete => match self.state {
                CaptureState::AwaitingSeek { size, .. } => {
                    self.state = CaptureState::Captured { size };
                    Command::Capture { size }
                }
                _ => self.out_of_order(&MediaEvent::SeekComplete),
            },
            other => self.out_of_order(&other),
        }
    }

    /// Report that drawing or exporting the captured frame failed.
    pub fn capture_failed(&mut self, reason: impl Into<String>) -> Command {
        match self.state {
            CaptureState::Captured { .. } => self.fail(reason.into()),
            _ => Command::Wait,
        }
    }

    fn on_metadata(&mut self, meta: MediaMetadata) -> Command {
        let size = capture_size(meta.width, meta.height, self.policy.fallback_size);
        let target_sec = seek_target(
            meta.duration_sec,
            self.policy.seek_cap_sec,
            self.policy.seek_fraction,
        );
        tracing::debug!(%size, target_sec, "metadata ready");
        self.state = CaptureState::AwaitingSeek { size, target_sec };
        Command::Seek(target_sec)
    }

    fn out_of_order(&self, event: &MediaEvent) -> Command {
        tracing::debug!(state = self.state.name(), ?event, "out-of-order media event");
        Command::Wait
    }

    fn fail(&mut self, reason: String) -> Command {
        tracing::debug!(from = self.state.name(), %reason, "capture failed");
        self.state = CaptureState::Failed {
            reason: reason.clone(),
        };
        Command::Fallback { reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(width: Option<u32>, height: Option<u32>, duration_sec: f64) -> MediaMetadata {
        MediaMetadata {
            width,
            height,
            duration_sec,
        }
    }

    #[test]
    fn seek_target_is_bounded_by_cap_and_fraction() {
        assert!((seek_target(5.0, 2.0, 0.1) - 0.5).abs() < 1e-12);
        assert!((seek_target(60.0, 2.0, 0.1) - 2.0).abs() < 1e-12);
        assert!((seek_target(20.0, 2.0, 0.1) - 2.0).abs() < 1e-12);
        for d in [0.01, 0.3, 1.0, 7.5, 19.99, 3600.0] {
            let t = seek_target(d, 2.0, 0.1);
            assert!(t <= 2.0 && t <= d * 0.1 + 1e-12, "duration {d} -> {t}");
        }
    }

    #[test]
    fn seek_target_handles_degenerate_durations() {
        assert_eq!(seek_target(f64::NAN, 2.0, 0.1), 0.0);
        assert_eq!(seek_target(-3.0, 2.0, 0.1), 0.0);
        assert_eq!(seek_target(0.0, 2.0, 0.1), 0.0);
        assert_eq!(seek_target(f64::INFINITY, 2.0, 0.1), 2.0);
    }

    #[test]
    fn capture_size_falls_back_unless_both_dims_known() {
        let fb = Size::FALLBACK;
        assert_eq!(
            capture_size(Some(1920), Some(1080), fb),
            Size {
                width: 1920,
                height: 1080
            }
        );
        assert_eq!(capture_size(Some(1920), None, fb), fb);
        assert_eq!(capture_size(Some(0), Some(1080), fb), fb);
        assert_eq!(capture_size(None, None, fb), fb);
    }

    #[test]
    fn happy_path_transitions() {
        let mut m = CaptureMachine::new(CapturePolicy::default());
        assert_eq!(m.state(), &CaptureState::Idle);
        assert_eq!(m.start(), Command::Load);
        assert_eq!(m.state(), &CaptureState::AwaitingMetadata);

        let cmd = m.on_event(MediaEvent::MetadataReady(meta(Some(320), Some(240), 5.0)));
        let Command::Seek(t) = cmd else {
            panic!("expected seek, got {cmd:?}");
        };
        assert!((t - 0.5).abs() < 1e-12);

        let size = Size {
            width: 320,
            height: 240,
        };
        assert_eq!(m.on_event(MediaEvent::SeekComplete), Command::Capture { size });
        assert_eq!(m.state(), &CaptureState::Captured { size });
        assert!(m.state().is_terminal());
    }

    #[test]
    fn error_in_any_pending_state_fails() {
        let mut m = CaptureMachine::new(CapturePolicy::default());
        m.start();
        let cmd = m.on_event(MediaEvent::Error("404".into()));
        assert_eq!(
            cmd,
            Command::Fallback {
                reason: "404".into()
            }
        );

        let mut m = CaptureMachine::new(CapturePolicy::default());
        m.start();
        m.on_event(MediaEvent::MetadataReady(meta(None, None, 10.0)));
        assert!(matches!(
            m.on_event(MediaEvent::Error("decode".into())),
            Command::Fallback { .. }
        ));
        assert!(matches!(m.state(), CaptureState::Failed { .. }));
    }

    #[test]
    fn out_of_order_events_are_ignored() {
        let mut m = CaptureMachine::new(CapturePolicy::default());
        assert_eq!(m.on_event(MediaEvent::SeekComplete), Command::Wait);
        assert_eq!(m.state(), &CaptureState::Idle);

        m.start();
        assert_eq!(m.on_event(MediaEvent::SeekComplete), Command::Wait);
        assert_eq!(m.state(), &CaptureState::AwaitingMetadata);
        assert_eq!(m.start(), Command::Wait);
    }

    #[test]
    fn terminal_states_absorb_events() {
        let mut m = CaptureMachine::new(CapturePolicy::default());
        m.start();
        m.on_event(MediaEvent::Error("gone".into()));
        assert_eq!(
            m.on_event(MediaEvent::MetadataReady(meta(None, None, 1.0))),
            Command::Wait
        );
        assert_eq!(m.on_event(MediaEvent::Error("again".into())), Command::Wait);
    }

    #[test]
    fn capture_failure_after_capture_falls_back() {
        let mut m = CaptureMachine::new(CapturePolicy::default());
        assert_eq!(m.capture_failed("early"), Command::Wait);
        m.start();
        m.on_event(MediaEvent::MetadataReady(meta(Some(64), Some(64), 1.0)));
        m.on_event(MediaEvent::SeekComplete);
        assert!(matches!(
            m.capture_failed("tainted"),
            Command::Fallback { .. }
        ));
    }

    #[test]
    fn unknown_dims_use_policy_fallback() {
        let mut m = CaptureMachine::new(CapturePolicy::default());
        m.start();
        m.on_event(MediaEvent::MetadataReady(meta(None, None, 60.0)));
        assert_eq!(
            m.on_event(MediaEvent::SeekComplete),
            Command::Capture {
                size: Size::FALLBACK
            }
        );
    }
}
