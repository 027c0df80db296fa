use crate::{
    category::Category,
    foundation::{core::Size, error::PosterResult},
    raster::{
        surface::Surface,
        text::{FontBook, TextLine, draw_text_lines},
    },
};

/// Call to action drawn under the play button.
pub const CAPTION: &str = "Click to Watch";

/// Text drawn on a placeholder poster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceholderText {
    /// Category display title, near the top.
    pub title: String,
    /// Call to action under the play button.
    pub caption: String,
}

impl PlaceholderText {
    /// Title from the section heading (or the category default) plus [`CAPTION`].
    pub fn for_category(category: Category, heading: Option<&str>) -> Self {
        Self {
            title: category.display_title(heading),
            caption: CAPTION.to_owned(),
        }
    }
}

/// Lay out the title and caption for a surface of `size`.
///
/// The title sits at 18% of the height; the caption sits just below the play button.
pub fn text_lines(size: Size, button_radius: f32, text: &PlaceholderText) -> [TextLine; 2] {
    let h = size.height as f32;
    let scale = size.min_side() as f32 / 360.0;
    let caption_font = (20.0 * scale).max(8.0);
    [
        TextLine {
            text: text.title.clone(),
            baseline_y: h * 0.18 + 12.0 * scale,
            font_size: (32.0 * scale).max(10.0),
            bold: true,
        },
        TextLine {
            text: text.caption.clone(),
            baseline_y: h / 2.0 + button_radius + 16.0 * scale + caption_font,
            font_size: caption_font,
            bold: false,
        },
    ]
}

/// Draw the fallback poster at [`Size::FALLBACK`]: category gradient, play button, title and
/// caption.
#[tracing::instrument(level = "debug", skip(fonts, text), fields(title = %text.title))]
pub fn render_placeholder(
    category: Category,
    text: &PlaceholderText,
    fonts: &FontBook,
) -> PosterResult<Surface> {
    let size = Size::FALLBACK;
    let mut surface = Surface::new(size)?;
    surface.fill_linear_gradient(category.ramp())?;
    surface.draw_play_button()?;
    let lines = text_lines(size, surface.button_radius(), text);
    draw_text_lines(&mut surface, fonts, &lines)?;
    Ok(surface)
}
