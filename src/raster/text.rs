use std::{path::Path, sync::Arc};

use anyhow::Context as _;

use crate::{
    foundation::{
        core::Size,
        error::{PosterError, PosterResult},
    },
    raster::surface::Surface,
};

const PREFERRED_SANS: [&str; 5] = [
    "Helvetica",
    "Arial",
    "Liberation Sans",
    "DejaVu Sans",
    "Noto Sans",
];

/// Shared, read-only font database for caption text.
///
/// Cloning is cheap; every generation in a batch shares one database.
#[derive(Clone, Debug)]
pub struct FontBook {
    db: Arc<usvg::fontdb::Database>,
}

impl FontBook {
    /// System fonts, plus `.ttf`/`.otf`/`.ttc` files from `extra_dir` when given.
    pub fn load(extra_dir: Option<&Path>) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        if let Some(dir) = extra_dir {
            load_fonts_from_dir(&mut db, dir);
        }

        if let Some(name) = PREFERRED_SANS.iter().find(|name| {
            db.faces()
                .any(|face| face.families.iter().any(|(family, _)| family == *name))
        }) {
            db.set_sans_serif_family(*name);
        }

        report_faces(&db);
        Self { db: Arc::new(db) }
    }

    /// A database with no fonts. Text draws nothing; shapes are unaffected.
    pub fn empty() -> Self {
        Self {
            db: Arc::new(usvg::fontdb::Database::new()),
        }
    }

    /// Number of loaded font faces.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    fn options(&self) -> usvg::Options<'static> {
        usvg::Options {
            fontdb: self.db.clone(),
            ..Default::default()
        }
    }
}

/// Log the face count; returns `false` (with a warning) when text cannot be drawn.
fn report_faces(db: &usvg::fontdb::Database) -> bool {
    if db.is_empty() {
        tracing::warn!("no fonts found; placeholder titles and captions will not be drawn");
        return false;
    }
    tracing::debug!(faces = db.len(), "font database loaded");
    true
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping font file");
        }
    }
}

/// One horizontally centered line of text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    /// The text, unescaped.
    pub text: String,
    /// Baseline y in pixels.
    pub baseline_y: f32,
    /// Font size in pixels.
    pub font_size: f32,
    /// Bold weight.
    pub bold: bool,
}

/// Build the SVG document for centered white text lines with a soft drop shadow.
pub fn caption_svg(size: Size, lines: &[TextLine]) -> String {
    let cx = size.width as f32 / 2.0;
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = size.width,
        h = size.height
    );
    for line in lines {
        let weight = if line.bold { "bold" } else { "normal" };
        let text = escape_xml(&line.text);
        for (dy, fill, opacity) in [(2.0, "#000000", 0.35), (0.0, "#ffffff", 1.0)] {
            svg.push_str(&format!(
                r#"<text x="{cx}" y="{y}" text-anchor="middle" font-family="Helvetica, Arial, sans-serif" font-size="{fs}" font-weight="{weight}" fill="{fill}" fill-opacity="{opacity}">{text}</text>"#,
                y = line.baseline_y + dy,
                fs = line.font_size,
            ));
        }
    }
    svg.push_str("</svg>");
    svg
}

/// Draw centered text lines onto `surface`.
pub fn draw_text_lines(
    surface: &mut Surface,
    fonts: &FontBook,
    lines: &[TextLine],
) -> PosterResult<()> {
    let svg = caption_svg(surface.size(), lines);
    let tree = usvg::Tree::from_data(svg.as_bytes(), &fonts.options())
        .context("parse caption svg")
        .map_err(|e| PosterError::capture(format!("{e:#}")))?;
    surface.draw_svg(&tree);
    Ok(())
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Rgb8;

    fn line(text: &str) -> TextLine {
        TextLine {
            text: text.to_owned(),
            baseline_y: 40.0,
            font_size: 24.0,
            bold: true,
        }
    }

    #[test]
    fn escapes_markup_in_titles() {
        assert_eq!(
            escape_xml(r#"Weddings & "Events" <2024>"#),
            "Weddings &amp; &quot;Events&quot; &lt;2024&gt;"
        );
        assert_eq!(escape_xml("tab\there"), "tabhere");
    }

    #[test]
    fn caption_svg_centers_text() {
        let svg = caption_svg(Size::FALLBACK, &[line("Click to Watch")]);
        assert!(svg.contains(r#"width="640" height="360""#));
        assert!(svg.contains(r#"x="320""#));
        assert!(svg.contains(r#"text-anchor="middle""#));
        assert!(svg.contains(">Click to Watch</text>"));
    }

    #[test]
    fn caption_svg_parses_even_with_hostile_text() {
        let svg = caption_svg(Size::FALLBACK, &[line("</text><script>&")]);
        let opts = usvg::Options::default();
        assert!(usvg::Tree::from_data(svg.as_bytes(), &opts).is_ok());
    }

    #[derive(Clone, Default)]
    struct LogBuf(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn empty_font_database_warns() {
        let logs = LogBuf::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        let drawable = tracing::subscriber::with_default(subscriber, || {
            report_faces(&usvg::fontdb::Database::new())
        });
        assert!(!drawable);

        let out = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(out.contains("WARN"), "{out}");
        assert!(out.contains("no fonts found"), "{out}");
    }

    #[test]
    fn drawing_without_fonts_leaves_pixels_untouched() {
        let mut s = Surface::new(Size::new(64, 64).unwrap()).unwrap();
        s.clear(Rgb8::new(10, 20, 30));
        let before = s.fingerprint();
        draw_text_lines(&mut s, &FontBook::empty(), &[line("Hello")]).unwrap();
        assert_eq!(s.fingerprint(), before);
    }
}
