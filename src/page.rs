//! Page manifest, video elements, and batch poster generation.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use rayon::prelude::*;

use crate::{
    category::Category,
    foundation::{
        core::{Rgb8, Size},
        error::{PosterError, PosterResult},
    },
    generator::{GenerationOutcome, PosterGenerator},
    media::{MediaFactory, MediaRef},
    poster::{Poster, PosterOrigin},
};

/// File name of the index written next to the posters.
pub const INDEX_FILE: &str = "posters.json";

/// JSON description of a page's video sections.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageManifest {
    /// Page title, informational only.
    #[serde(default)]
    pub title: Option<String>,
    /// Sections in document order.
    #[serde(default)]
    pub sections: Vec<SectionSpec>,
}

/// A grouping of videos; its id selects the category.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionSpec {
    /// Section id (e.g. `gaming`).
    pub id: String,
    /// Visible heading text.
    #[serde(default)]
    pub heading: Option<String>,
    /// Videos in this section.
    #[serde(default)]
    pub videos: Vec<VideoSpec>,
}

/// One `<video>` element.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VideoSpec {
    /// Unique element id, `[A-Za-z0-9_-]+`.
    pub id: String,
    /// Media source.
    #[serde(default)]
    pub src: Option<String>,
    /// Poster already present in the markup; such elements are left alone.
    #[serde(default)]
    pub poster: Option<String>,
}

impl PageManifest {
    /// Read a manifest from a JSON file.
    pub fn from_path(path: &Path) -> PosterResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read page manifest '{}'", path.display()))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            PosterError::serde(format!("parse page manifest '{}': {e}", path.display()))
        })
    }
}

/// A video element and its poster slot.
#[derive(Clone, Debug)]
pub struct VideoElement {
    /// Element id.
    pub id: String,
    /// Id of the containing section.
    pub section_id: String,
    /// Media source, resolved against the manifest directory.
    pub source: Option<MediaRef>,
    /// Category derived from the section id.
    pub category: Category,
    /// Heading of the containing section.
    pub heading: Option<String>,
    /// Poster attribute present in the markup before generation.
    pub existing_poster: Option<String>,
    poster: Option<Poster>,
    background_hint: Option<Rgb8>,
    assignments: u32,
}

impl VideoElement {
    /// Build an element with an empty poster slot.
    pub fn new(id: impl Into<String>, section_id: impl Into<String>) -> Self {
        let section_id = section_id.into();
        Self {
            id: id.into(),
            category: Category::from_label(Some(&section_id)),
            section_id,
            source: None,
            heading: None,
            existing_poster: None,
            poster: None,
            background_hint: None,
            assignments: 0,
        }
    }

    /// Set the media source.
    pub fn with_source(mut self, source: MediaRef) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the section heading.
    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    /// `true` when the markup already had a poster or one was generated.
    pub fn has_poster(&self) -> bool {
        self.existing_poster.is_some() || self.poster.is_some()
    }

    /// The generated poster.
    pub fn poster(&self) -> Option<&Poster> {
        self.poster.as_ref()
    }

    /// Background color shown while the poster loads.
    pub fn background_hint(&self) -> Option<Rgb8> {
        self.background_hint
    }

    /// How many times a poster was assigned to this element.
    pub fn assignments(&self) -> u32 {
        self.assignments
    }

    /// Assign a generated poster, replacing any previous one.
    pub fn assign_poster(&mut self, poster: Poster, background_hint: Rgb8) {
        self.poster = Some(poster);
        self.background_hint = Some(background_hint);
        self.assignments += 1;
    }
}

/// All video elements of a page, in document order.
#[derive(Clone, Debug, Default)]
pub struct Page {
    /// Page title.
    pub title: Option<String>,
    /// Elements in document order.
    pub elements: Vec<VideoElement>,
}

/// Per-batch summary. Ids are listed in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct BatchReport {
    /// Elements that got a captured-frame poster.
    pub captured: Vec<String>,
    /// Elements that got a placeholder.
    pub placeholders: Vec<String>,
    /// Elements whose media never finished reporting.
    pub stalled: Vec<String>,
    /// Elements that already had a poster.
    pub skipped: Vec<String>,
    /// Elements where even the placeholder could not be produced, with the error.
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    /// Number of elements that received a poster in this batch.
    pub fn assigned(&self) -> usize {
        self.captured.len() + self.placeholders.len()
    }
}

/// One entry of the written poster index.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PosterIndexEntry {
    /// Element id.
    pub id: String,
    /// Section id.
    pub section: String,
    /// Poster file name, relative to the index.
    pub file: String,
    /// Captured or placeholder.
    pub origin: PosterOrigin,
    /// Pixel size.
    pub size: Size,
    /// Background color hint.
    pub background: Rgb8,
    /// Inline `data:` URL, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
}

impl Page {
    /// Build elements from a manifest, resolving relative sources against `root`.
    pub fn from_manifest(manifest: &PageManifest, root: &Path) -> PosterResult<Self> {
        let mut seen = BTreeSet::new();
        let mut elements = Vec::new();
        for section in &manifest.sections {
            if section.videos.is_empty() {
                tracing::debug!(section = %section.id, "section has no videos");
                continue;
            }
            for video in &section.videos {
                validate_element_id(&video.id)?;
                if !seen.insert(video.id.as_str()) {
                    return Err(PosterError::validation(format!(
                        "duplicate video id '{}'",
                        video.id
                    )));
                }

                let mut el = VideoElement::new(&video.id, &section.id);
                el.heading = section.heading.clone();
                el.existing_poster = video.poster.clone().filter(|p| !p.trim().is_empty());
                el.source = match video.src.as_deref().map(str::trim) {
                    Some(src) if !src.is_empty() => Some(MediaRef::new(src)?.resolve_against(root)),
                    _ => None,
                };
                elements.push(el);
            }
        }
        Ok(Self {
            title: manifest.title.clone(),
            elements,
        })
    }

    /// Read a manifest file; relative sources resolve against its directory.
    pub fn from_path(path: &Path) -> PosterResult<Self> {
        let manifest = PageManifest::from_path(path)?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_manifest(&manifest, root)
    }

    /// Look up an element by id.
    pub fn element(&self, id: &str) -> Option<&VideoElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Generate posters for every element that has none, in parallel.
    ///
    /// Generations share nothing but `generator` and `factory`; a failure affects only its own
    /// element and is reported in [`BatchReport::failed`].
    #[tracing::instrument(level = "info", skip_all, fields(elements = self.elements.len()))]
    pub fn generate_missing(
        &mut self,
        generator: &PosterGenerator,
        factory: &MediaFactory,
    ) -> PosterResult<BatchReport> {
        let pool = build_thread_pool(generator.config().threads)?;

        let mut report = BatchReport::default();
        let results: Vec<(usize, PosterResult<GenerationOutcome>)> = pool.install(|| {
            self.elements
                .par_iter_mut()
                .enumerate()
                .filter(|(_, el)| !el.has_poster())
                .map(|(idx, el)| (idx, generator.generate_into(el, factory)))
                .collect()
        });

        let mut results = results.into_iter().peekable();
        for (idx, el) in self.elements.iter().enumerate() {
            let Some((_, result)) = results.next_if(|(i, _)| *i == idx) else {
                report.skipped.push(el.id.clone());
                continue;
            };
            match result {
                Ok(GenerationOutcome::Captured) => report.captured.push(el.id.clone()),
                Ok(GenerationOutcome::Placeholder { .. }) => {
                    report.placeholders.push(el.id.clone())
                }
                Ok(GenerationOutcome::Stalled) => report.stalled.push(el.id.clone()),
                Err(e) => {
                    tracing::error!(video = %el.id, error = %e, "poster generation failed");
                    report.failed.push((el.id.clone(), e.to_string()));
                }
            }
        }

        tracing::info!(
            captured = report.captured.len(),
            placeholders = report.placeholders.len(),
            stalled = report.stalled.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "poster batch finished"
        );
        Ok(report)
    }

    /// Write every generated poster to `out_dir` as `<id>.<ext>`, plus [`INDEX_FILE`].
    pub fn write_posters(
        &self,
        out_dir: &Path,
        embed_data_urls: bool,
    ) -> PosterResult<Vec<PosterIndexEntry>> {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("create output dir '{}'", out_dir.display()))?;

        let mut index = Vec::new();
        for el in &self.elements {
            let Some(poster) = el.poster() else {
                continue;
            };
            let file = format!("{}.{}", el.id, poster.format.extension());
            let path: PathBuf = out_dir.join(&file);
            std::fs::write(&path, &poster.bytes)
                .with_context(|| format!("write poster '{}'", path.display()))?;

            index.push(PosterIndexEntry {
                id: el.id.clone(),
                section: el.section_id.clone(),
                file,
                origin: poster.origin,
                size: poster.size,
                background: el.background_hint().unwrap_or(Rgb8::BLACK),
                data_url: embed_data_urls.then(|| poster.data_url()),
            });
        }

        let index_path = out_dir.join(INDEX_FILE);
        let json = serde_json::to_vec_pretty(&index)
            .map_err(|e| PosterError::serde(format!("serialize poster index: {e}")))?;
        std::fs::write(&index_path, json)
            .with_context(|| format!("write poster index '{}'", index_path.display()))?;
        Ok(index)
    }
}

fn validate_element_id(id: &str) -> PosterResult<()> {
    if id.is_empty() {
        return Err(PosterError::validation("video id must be non-empty"));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(PosterError::validation(format!(
            "video id '{id}' must match [A-Za-z0-9_-]+"
        )));
    }
    Ok(())
}

fn build_thread_pool(threads: Option<usize>) -> PosterResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(PosterError::validation("'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| PosterError::validation(format!("failed to build rayon thread pool: {e}")))
}
