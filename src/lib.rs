//! Posterframe generates poster thumbnails for video elements.
//!
//! For each video without a poster it loads the media off-screen, seeks to a representative
//! timestamp, and composites the frame with a vignette and play glyph. When capture fails for any
//! reason it draws a category-themed gradient placeholder instead, so every element that
//! finishes its sequence ends up with exactly one poster.
//!
//! - Describe a page with a [`PageManifest`] and build a [`Page`]
//! - Create a [`PosterGenerator`] from a [`PosterConfig`]
//! - Run [`Page::generate_missing`] with a [`MediaFactory`], then write the results
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub mod capture;
pub mod category;
/// Generation settings.
pub mod config;
pub mod embed;
pub mod generator;
pub mod media;
pub mod page;
/// Category gradient placeholder.
pub mod placeholder;
/// Encoded poster images.
pub mod poster;
pub mod raster;

pub use crate::foundation::core::{Frame, Rgb8, Size};
pub use crate::foundation::error::{PosterError, PosterResult};

pub use crate::capture::{CaptureMachine, CapturePolicy, CaptureState, Command, seek_target};
pub use crate::category::Category;
pub use crate::config::{PosterConfig, PosterFormat};
pub use crate::embed::{YoutubeEmbed, youtube_embed};
pub use crate::generator::{Generation, GenerationOutcome, PosterGenerator, PosterRequest};
pub use crate::media::{
    MediaElement, MediaEvent, MediaFactory, MediaMetadata, MediaRef, OpenOptions, ffmpeg_factory,
    scripted::ScriptedMedia,
};
pub use crate::page::{BatchReport, Page, PageManifest, PosterIndexEntry, VideoElement};
pub use crate::poster::{Poster, PosterOrigin};
pub use crate::raster::text::FontBook;
