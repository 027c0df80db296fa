use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::{
    category::Category,
    config::PosterFormat,
    foundation::{
        core::Size,
        error::{PosterError, PosterResult},
    },
    raster::surface::Surface,
};

/// Where a poster's pixels came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PosterOrigin {
    /// A frame captured from the media.
    Captured,
    /// The gradient placeholder for a category.
    Placeholder {
        /// Category whose ramp and title were drawn.
        category: Category,
    },
}

/// An encoded poster image.
#[derive(Clone, Debug, PartialEq)]
pub struct Poster {
    /// Pixel size.
    pub size: Size,
    /// Encoding of `bytes`.
    pub format: PosterFormat,
    /// Encoded image.
    pub bytes: Vec<u8>,
    /// Captured frame or placeholder.
    pub origin: PosterOrigin,
    /// xxh3 of the surface pixels before encoding.
    pub fingerprint: u64,
}

impl Poster {
    /// Encode a finished surface.
    pub fn encode(
        surface: &Surface,
        format: PosterFormat,
        jpeg_quality: u8,
        origin: PosterOrigin,
    ) -> PosterResult<Self> {
        let size = surface.size();
        let bytes = match format {
            PosterFormat::Jpeg => encode_jpeg(surface, jpeg_quality)?,
            PosterFormat::Png => encode_png(surface)?,
        };
        Ok(Self {
            size,
            format,
            bytes,
            origin,
            fingerprint: surface.fingerprint(),
        })
    }

    /// `data:<mime>;base64,...` form, suitable for a `poster` attribute.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime(),
            STANDARD.encode(&self.bytes)
        )
    }

    /// Placeholder category, if this is a placeholder.
    pub fn category(&self) -> Option<Category> {
        match self.origin {
            PosterOrigin::Captured => None,
            PosterOrigin::Placeholder { category } => Some(category),
        }
    }

    /// Decode the encoded bytes back to pixels.
    pub fn decode(&self) -> PosterResult<image::RgbaImage> {
        let img = image::load_from_memory(&self.bytes)
            .map_err(|e| PosterError::encode(format!("decode poster: {e}")))?;
        Ok(img.to_rgba8())
    }
}

fn encode_jpeg(surface: &Surface, quality: u8) -> PosterResult<Vec<u8>> {
    let size = surface.size();
    let rgb = surface.to_rgb8();
    let mut out = Vec::new();
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
    encoder
        .encode(&rgb, size.width, size.height, image::ExtendedColorType::Rgb8)
        .map_err(|e| PosterError::encode(format!("jpeg encode {size}: {e}")))?;
    Ok(out)
}

fn encode_png(surface: &Surface) -> PosterResult<Vec<u8>> {
    use image::ImageEncoder as _;

    let size = surface.size();
    let rgba = surface.to_rgba8();
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(&rgba, size.width, size.height, image::ExtendedColorType::Rgba8)
        .map_err(|e| PosterError::encode(format!("png encode {size}: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Rgb8;

    fn surface() -> Surface {
        let mut s = Surface::new(Size::new(16, 9).unwrap()).unwrap();
        s.clear(Rgb8::new(120, 60, 200));
        s
    }

    #[test]
    fn jpeg_has_soi_marker_and_decodes_to_size() {
        let p =
            Poster::encode(&surface(), PosterFormat::Jpeg, 88, PosterOrigin::Captured).unwrap();
        assert_eq!(&p.bytes[..2], &[0xff, 0xd8]);
        let img = p.decode().unwrap();
        assert_eq!(img.dimensions(), (16, 9));
        let px = img.get_pixel(8, 4);
        assert!((i32::from(px[0]) - 120).abs() < 12, "{px:?}");
    }

    #[test]
    fn png_is_lossless() {
        let p =
            Poster::encode(&surface(), PosterFormat::Png, 88, PosterOrigin::Captured).unwrap();
        let img = p.decode().unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [120, 60, 200, 255]);
    }

    #[test]
    fn data_url_carries_mime() {
        let p = Poster::encode(
            &surface(),
            PosterFormat::Png,
            88,
            PosterOrigin::Placeholder {
                category: Category::Gaming,
            },
        )
        .unwrap();
        assert!(p.data_url().starts_with("data:image/png;base64,iVBOR"));
        assert_eq!(p.category(), Some(Category::Gaming));
    }

    #[test]
    fn fingerprint_ignores_encoding() {
        let s = surface();
        let a = Poster::encode(&s, PosterFormat::Png, 88, PosterOrigin::Captured).unwrap();
        let b = Poster::encode(&s, PosterFormat::Jpeg, 50, PosterOrigin::Captured).unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn origin_serializes_with_kind_tag() {
        let v = serde_json::to_value(PosterOrigin::Placeholder {
            category: Category::MusicVideo,
        })
        .unwrap();
        assert_eq!(
            v,
            serde_json::json!({"kind": "placeholder", "category": "music-video"})
        );
    }
}
