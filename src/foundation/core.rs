use crate::foundation::error::{PosterError, PosterResult};

/// Pixel dimensions of a surface or poster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Poster size used whenever native media dimensions are unknown, and for placeholders.
    pub const FALLBACK: Size = Size {
        width: 640,
        height: 360,
    };

    /// Create a validated, non-degenerate size.
    pub fn new(width: u32, height: u32) -> PosterResult<Self> {
        if width == 0 || height == 0 {
            return Err(PosterError::validation("size width/height must be non-zero"));
        }
        Ok(Self { width, height })
    }

    /// The smaller of the two dimensions.
    pub fn min_side(self) -> u32 {
        self.width.min(self.height)
    }

    /// Number of pixels.
    pub fn area(self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Opaque sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Rgb8 {
    /// Black, used as the background hint for captured frames.
    pub const BLACK: Rgb8 = Rgb8::new(0, 0, 0);

    /// Build from components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub const fn from_hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
        }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional, case-insensitive).
    pub fn parse(s: &str) -> PosterResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return Err(PosterError::validation(format!(
                "color must be #RRGGBB, got \"{s}\""
            )));
        }

        fn hex_byte(pair: &str) -> PosterResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| PosterError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        Ok(Self {
            r: hex_byte(&s[0..2])?,
            g: hex_byte(&s[2..4])?,
            b: hex_byte(&s[4..6])?,
        })
    }

    /// Lowercase `#rrggbb` form.
    pub fn to_hex_string(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl serde::Serialize for Rgb8 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> serde::Deserialize<'de> for Rgb8 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb8::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A decoded video frame as straight-alpha RGBA8, tightly packed, row-major.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Frame size.
    pub size: Size,
    /// `size.width * size.height * 4` bytes.
    pub rgba8: Vec<u8>,
}

impl Frame {
    /// Wrap raw RGBA8 bytes, checking the buffer length against `size`.
    pub fn new(size: Size, rgba8: Vec<u8>) -> PosterResult<Self> {
        let expected = size.area() * 4;
        if rgba8.len() != expected {
            return Err(PosterError::capture(format!(
                "frame buffer has {} bytes, expected {expected} for {size}",
                rgba8.len()
            )));
        }
        Ok(Self { size, rgba8 })
    }

    /// A frame filled with a single opaque color.
    pub fn solid(size: Size, color: Rgb8) -> Self {
        let mut rgba8 = Vec::with_capacity(size.area() * 4);
        for _ in 0..size.area() {
            rgba8.extend_from_slice(&[color.r, color.g, color.b, 255]);
        }
        Self { size, rgba8 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_rejects_zero_dimensions() {
        assert!(Size::new(0, 10).is_err());
        assert!(Size::new(10, 0).is_err());
        assert_eq!(Size::new(4, 3).unwrap().min_side(), 3);
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(Rgb8::parse("#667eea").unwrap(), Rgb8::new(0x66, 0x7e, 0xea));
        assert_eq!(Rgb8::parse("764BA2").unwrap(), Rgb8::from_hex(0x764ba2));
        assert!(Rgb8::parse("#12345").is_err());
        assert!(Rgb8::parse("#zz0000").is_err());
    }

    #[test]
    fn hex_string_is_lowercase() {
        assert_eq!(Rgb8::from_hex(0x0F2027).to_hex_string(), "#0f2027");
    }

    #[test]
    fn frame_checks_buffer_length() {
        let size = Size::new(2, 2).unwrap();
        assert!(Frame::new(size, vec![0; 15]).is_err());
        assert!(Frame::new(size, vec![0; 16]).is_ok());
        assert_eq!(Frame::solid(size, Rgb8::BLACK).rgba8.len(), 16);
    }
}
