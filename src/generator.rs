//! Poster generation: capture a representative frame, or fall back to the category placeholder.

use crate::{
    capture::{CaptureMachine, CapturePolicy, Command},
    category::Category,
    config::PosterConfig,
    foundation::{
        core::{Rgb8, Size},
        error::{PosterError, PosterResult},
    },
    media::{MediaElement, MediaFactory, MediaRef, OpenOptions},
    page::VideoElement,
    placeholder::{PlaceholderText, render_placeholder},
    poster::{Poster, PosterOrigin},
    raster::{surface::Surface, text::FontBook},
};

/// What to generate a poster for.
#[derive(Clone, Copy, Debug)]
pub struct PosterRequest<'a> {
    /// Media source, if the element has one.
    pub source: Option<&'a MediaRef>,
    /// Category used by the placeholder.
    pub category: Category,
    /// Section heading used as the placeholder title.
    pub heading: Option<&'a str>,
}

/// Result of one generation.
#[derive(Clone, Debug, PartialEq)]
pub enum Generation {
    /// A frame was captured and composited.
    Captured(Poster),
    /// Capture failed and the placeholder was drawn.
    Placeholder {
        /// The placeholder poster.
        poster: Poster,
        /// Why capture was abandoned.
        reason: String,
    },
    /// The media element stopped reporting before a terminal state; no poster was produced.
    Stalled,
}

impl Generation {
    /// The produced poster, if any.
    pub fn poster(&self) -> Option<&Poster> {
        match self {
            Generation::Captured(p) | Generation::Placeholder { poster: p, .. } => Some(p),
            Generation::Stalled => None,
        }
    }

    /// Consume into the produced poster, if any.
    pub fn into_poster(self) -> Option<Poster> {
        match self {
            Generation::Captured(p) | Generation::Placeholder { poster: p, .. } => Some(p),
            Generation::Stalled => None,
        }
    }
}

/// Summary of what happened to one element.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationOutcome {
    /// Captured-frame poster assigned.
    Captured,
    /// Placeholder poster assigned.
    Placeholder {
        /// Why capture was abandoned.
        reason: String,
    },
    /// Nothing assigned; the media never finished reporting.
    Stalled,
}

/// Produces posters. Holds only read-only state, so one generator serves a whole batch.
#[derive(Clone, Debug)]
pub struct PosterGenerator {
    cfg: PosterConfig,
    policy: CapturePolicy,
    fonts: FontBook,
}

impl PosterGenerator {
    /// Validate `cfg` and load system fonts.
    pub fn new(cfg: PosterConfig) -> PosterResult<Self> {
        Self::with_fonts(cfg, FontBook::load(None))
    }

    /// Validate `cfg` and use `fonts` for placeholder text.
    pub fn with_fonts(cfg: PosterConfig, fonts: FontBook) -> PosterResult<Self> {
        cfg.validate()?;
        Ok(Self {
            policy: CapturePolicy::from_config(&cfg),
            cfg,
            fonts,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &PosterConfig {
        &self.cfg
    }

    /// Run the capture sequence against `media`, falling back to the placeholder on any failure.
    ///
    /// `media` is consumed by the sequence; it must be freshly opened. Passing `None` (no source)
    /// draws the placeholder directly. The only error returned is a failure to produce the
    /// placeholder itself.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(source = request.source.map(MediaRef::as_str), category = ?request.category)
    )]
    pub fn generate(
        &self,
        request: PosterRequest<'_>,
        media: Option<&mut dyn MediaElement>,
    ) -> PosterResult<Generation> {
        let Some(media) = media else {
            return self.fallback(request, "missing media source".to_owned());
        };

        let mut machine = CaptureMachine::new(self.policy);
        let mut cmd = machine.start();
        loop {
            match cmd {
                Command::Load => media.load(),
                Command::Seek(target_sec) => media.seek(target_sec),
                Command::Capture { size } => match self.composite_capture(media, size) {
                    Ok(poster) => {
                        tracing::debug!(%size, "frame captured");
                        return Ok(Generation::Captured(poster));
                    }
                    Err(e) => {
                        cmd = machine.capture_failed(e.to_string());
                        continue;
                    }
                },
                Command::Fallback { reason } => return self.fallback(request, reason),
                Command::Wait => {}
            }

            cmd = match media.next_event() {
                Some(event) => machine.on_event(event),
                None => {
                    tracing::warn!(state = ?machine.state(), "media stopped reporting; no poster");
                    return Ok(Generation::Stalled);
                }
            };
        }
    }

    /// Generate a poster for `element` and assign it, opening media through `factory`.
    ///
    /// The element's previous poster (if any) is replaced.
    pub fn generate_into(
        &self,
        element: &mut VideoElement,
        factory: &MediaFactory,
    ) -> PosterResult<GenerationOutcome> {
        let request = PosterRequest {
            source: element.source.as_ref(),
            category: element.category,
            heading: element.heading.as_deref(),
        };
        if request.source.is_none() {
            tracing::warn!(video = %element.id, "video has no source");
        }

        // Media elements are single use and dropped with the match arm.
        let generation = match request.source {
            Some(src) => {
                let mut media = factory(src, OpenOptions::CAPTURE);
                let media: &mut dyn MediaElement = media.as_mut();
                self.generate(request, Some(media))?
            }
            None => self.generate(request, None)?,
        };

        let outcome = match &generation {
            Generation::Captured(_) => GenerationOutcome::Captured,
            Generation::Placeholder { reason, .. } => GenerationOutcome::Placeholder {
                reason: reason.clone(),
            },
            Generation::Stalled => GenerationOutcome::Stalled,
        };
        if let Some(poster) = generation.into_poster() {
            let hint = match poster.origin {
                PosterOrigin::Captured => Rgb8::BLACK,
                PosterOrigin::Placeholder { category } => category.ramp()[0],
            };
            element.assign_poster(poster, hint);
        }
        Ok(outcome)
    }

    /// Draw the placeholder for `category` without touching any media.
    pub fn placeholder(&self, category: Category, heading: Option<&str>) -> PosterResult<Poster> {
        let text = PlaceholderText::for_category(category, heading);
        let surface = render_placeholder(category, &text, &self.fonts)?;
        Poster::encode(
            &surface,
            self.cfg.format,
            self.cfg.jpeg_quality,
            PosterOrigin::Placeholder { category },
        )
    }

    fn composite_capture(&self, media: &mut dyn MediaElement, size: Size) -> PosterResult<Poster> {
        let frame = media.current_frame()?;
        let mut surface = Surface::new(size)?;
        surface.clear(Rgb8::BLACK);
        surface.draw_frame(&frame)?;
        surface.draw_vignette()?;
        surface.draw_play_button()?;
        Poster::encode(
            &surface,
            self.cfg.format,
            self.cfg.jpeg_quality,
            PosterOrigin::Captured,
        )
        .map_err(|e| PosterError::capture(format!("export captured frame: {e}")))
    }

    fn fallback(&self, request: PosterRequest<'_>, reason: String) -> PosterResult<Generation> {
        tracing::warn!(%reason, category = ?request.category, "using placeholder poster");
        let poster = self.placeholder(request.category, request.heading)?;
        Ok(Generation::Placeholder { poster, reason })
    }
}
