use resvg::tiny_skia::{
    Color, ColorU8, FillRule, FilterQuality, GradientStop, LinearGradient, Paint, PathBuilder,
    Pixmap, PixmapPaint, Point, RadialGradient, Rect, SpreadMode, Transform,
};

use crate::foundation::{
    core::{Frame, Rgb8, Size},
    error::{PosterError, PosterResult},
};

/// Opacity of the vignette at the surface corners.
const VIGNETTE_EDGE_ALPHA: f32 = 0.3;
/// Play button radius as a fraction of the smaller surface dimension.
const BUTTON_RADIUS_FRACTION: f32 = 0.1;
const BUTTON_FILL: ColorU8 = ColorU8::from_rgba(255, 255, 255, 217);
const GLYPH_FILL: ColorU8 = ColorU8::from_rgba(51, 51, 51, 255);

/// Off-screen raster surface a poster is drawn on.
///
/// Pixels are premultiplied RGBA8 (the `tiny_skia` convention); readback helpers demultiply.
#[derive(Clone, Debug)]
pub struct Surface {
    pixmap: Pixmap,
}

impl Surface {
    /// Allocate a transparent surface.
    pub fn new(size: Size) -> PosterResult<Self> {
        let pixmap = Pixmap::new(size.width, size.height).ok_or_else(|| {
            PosterError::capture(format!("failed to allocate {size} capture surface"))
        })?;
        Ok(Self { pixmap })
    }

    /// Surface size.
    pub fn size(&self) -> Size {
        Size {
            width: self.pixmap.width(),
            height: self.pixmap.height(),
        }
    }

    /// Fill with an opaque color.
    pub fn clear(&mut self, color: Rgb8) {
        self.pixmap
            .fill(Color::from_rgba8(color.r, color.g, color.b, 255));
    }

    /// Draw a decoded frame stretched over the whole surface.
    pub fn draw_frame(&mut self, frame: &Frame) -> PosterResult<()> {
        let mut src = Pixmap::new(frame.size.width, frame.size.height).ok_or_else(|| {
            PosterError::capture(format!("failed to allocate {} frame pixmap", frame.size))
        })?;
        if frame.rgba8.len() != src.pixels().len() * 4 {
            return Err(PosterError::capture(format!(
                "frame buffer has {} bytes, expected {} for {}",
                frame.rgba8.len(),
                src.pixels().len() * 4,
                frame.size
            )));
        }
        for (dst, px) in src.pixels_mut().iter_mut().zip(frame.rgba8.chunks_exact(4)) {
            *dst = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
        }

        let sx = self.pixmap.width() as f32 / frame.size.width as f32;
        let sy = self.pixmap.height() as f32 / frame.size.height as f32;
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            src.as_ref(),
            &paint,
            Transform::from_scale(sx, sy),
            None,
        );
        Ok(())
    }

    /// Fill with a diagonal (top-left to bottom-right) gradient, stops at 0, 0.5 and 1.
    pub fn fill_linear_gradient(&mut self, ramp: [Rgb8; 3]) -> PosterResult<()> {
        let (w, h) = self.dims();
        let stops = ramp
            .iter()
            .zip([0.0, 0.5, 1.0])
            .map(|(c, pos)| GradientStop::new(pos, Color::from_rgba8(c.r, c.g, c.b, 255)))
            .collect();
        let shader = LinearGradient::new(
            Point::from_xy(0.0, 0.0),
            Point::from_xy(w, h),
            stops,
            SpreadMode::Pad,
            Transform::identity(),
        )
        .ok_or_else(|| PosterError::capture("invalid linear gradient"))?;

        let paint = Paint {
            shader,
            ..Default::default()
        };
        self.fill_all(&paint)
    }

    /// Darken the edges: transparent in the middle, [`VIGNETTE_EDGE_ALPHA`] black at the corners.
    pub fn draw_vignette(&mut self) -> PosterResult<()> {
        let (w, h) = self.dims();
        let center = Point::from_xy(w / 2.0, h / 2.0);
        let radius = (w * w + h * h).sqrt() / 2.0;
        let edge = (VIGNETTE_EDGE_ALPHA * 255.0).round() as u8;
        let shader = RadialGradient::new(
            center,
            center,
            radius,
            vec![
                GradientStop::new(0.0, Color::from_rgba8(0, 0, 0, 0)),
                GradientStop::new(0.5, Color::from_rgba8(0, 0, 0, 0)),
                GradientStop::new(1.0, Color::from_rgba8(0, 0, 0, edge)),
            ],
            SpreadMode::Pad,
            Transform::identity(),
        )
        .ok_or_else(|| PosterError::capture("invalid vignette gradient"))?;

        let paint = Paint {
            shader,
            ..Default::default()
        };
        self.fill_all(&paint)
    }

    /// Radius of the play button for this surface.
    pub fn button_radius(&self) -> f32 {
        (self.size().min_side() as f32 * BUTTON_RADIUS_FRACTION).max(1.0)
    }

    /// Centered translucent white disc with a right-pointing triangle inside.
    pub fn draw_play_button(&mut self) -> PosterResult<()> {
        let (w, h) = self.dims();
        let (cx, cy) = (w / 2.0, h / 2.0);
        let r = self.button_radius();

        let disc = PathBuilder::from_circle(cx, cy, r)
            .ok_or_else(|| PosterError::capture("invalid play button circle"))?;
        let mut paint = Paint {
            anti_alias: true,
            ..Default::default()
        };
        paint.set_color_rgba8(
            BUTTON_FILL.red(),
            BUTTON_FILL.green(),
            BUTTON_FILL.blue(),
            BUTTON_FILL.alpha(),
        );
        self.pixmap
            .fill_path(&disc, &paint, FillRule::Winding, Transform::identity(), None);

        // Slightly right of center so the glyph looks optically centered.
        let mut pb = PathBuilder::new();
        pb.move_to(cx - 0.35 * r, cy - 0.45 * r);
        pb.line_to(cx + 0.5 * r, cy);
        pb.line_to(cx - 0.35 * r, cy + 0.45 * r);
        pb.close();
        let triangle = pb
            .finish()
            .ok_or_else(|| PosterError::capture("invalid play glyph"))?;
        paint.set_color_rgba8(
            GLYPH_FILL.red(),
            GLYPH_FILL.green(),
            GLYPH_FILL.blue(),
            GLYPH_FILL.alpha(),
        );
        self.pixmap.fill_path(
            &triangle,
            &paint,
            FillRule::Winding,
            Transform::identity(),
            None,
        );
        Ok(())
    }

    /// Render a parsed SVG overlay at 1:1 scale.
    pub fn draw_svg(&mut self, tree: &usvg::Tree) {
        resvg::render(tree, Transform::identity(), &mut self.pixmap.as_mut());
    }

    /// Straight-alpha RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Straight-alpha RGBA8, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    /// RGB8 flattened over black, row-major.
    pub fn to_rgb8(&self) -> Vec<u8> {
        // Premultiplied color over opaque black is the color channels themselves.
        let mut out = Vec::with_capacity(self.pixmap.pixels().len() * 3);
        for px in self.pixmap.pixels() {
            out.extend_from_slice(&[px.red(), px.green(), px.blue()]);
        }
        out
    }

    /// Content hash of the pixels.
    pub fn fingerprint(&self) -> u64 {
        xxhash_rust::xxh3::xxh3_64(self.pixmap.data())
    }

    fn dims(&self) -> (f32, f32) {
        (self.pixmap.width() as f32, self.pixmap.height() as f32)
    }

    fn fill_all(&mut self, paint: &Paint<'_>) -> PosterResult<()> {
        let (w, h) = self.dims();
        let rect = Rect::from_xywh(0.0, 0.0, w, h)
            .ok_or_else(|| PosterError::capture("invalid surface rect"))?;
        self.pixmap
            .fill_rect(rect, paint, Transform::identity(), None);
        Ok(())
    }
}
