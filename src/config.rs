use std::path::Path;

use anyhow::Context as _;

use crate::foundation::{
    core::Size,
    error::{PosterError, PosterResult},
};

/// Encoded image format for posters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PosterFormat {
    /// Lossy JPEG (the default).
    #[default]
    Jpeg,
    /// Lossless PNG.
    Png,
}

impl PosterFormat {
    /// MIME type used in data URLs.
    pub fn mime(self) -> &'static str {
        match self {
            PosterFormat::Jpeg => "image/jpeg",
            PosterFormat::Png => "image/png",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            PosterFormat::Jpeg => "jpg",
            PosterFormat::Png => "png",
        }
    }
}

/// Poster generation settings.
///
/// Every field has a default, so an empty JSON object is a valid configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PosterConfig {
    /// JPEG quality, 1..=100.
    pub jpeg_quality: u8,
    /// Output encoding.
    pub format: PosterFormat,
    /// Capture width for media that reports no native dimensions. Placeholders are always
    /// [`Size::FALLBACK`].
    pub capture_fallback_width: u32,
    /// Capture height for media that reports no native dimensions.
    pub capture_fallback_height: u32,
    /// Upper bound on the capture timestamp, in seconds.
    pub seek_cap_sec: f64,
    /// Fraction of the media duration to seek to, before applying the cap.
    pub seek_fraction: f64,
    /// Include `data:` URLs in the written poster report.
    pub embed_data_urls: bool,
    /// Worker threads for batch generation; `None` uses rayon's default.
    pub threads: Option<usize>,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 88,
            format: PosterFormat::Jpeg,
            capture_fallback_width: Size::FALLBACK.width,
            capture_fallback_height: Size::FALLBACK.height,
            seek_cap_sec: 2.0,
            seek_fraction: 0.1,
            embed_data_urls: false,
            threads: None,
        }
    }
}

impl PosterConfig {
    /// Read and validate a JSON config file.
    pub fn from_path(path: &Path) -> PosterResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read poster config '{}'", path.display()))?;
        let cfg: PosterConfig = serde_json::from_slice(&bytes).map_err(|e| {
            PosterError::serde(format!("parse poster config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges.
    pub fn validate(&self) -> PosterResult<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(PosterError::validation("jpeg_quality must be in 1..=100"));
        }
        if self.capture_fallback_width == 0 || self.capture_fallback_height == 0 {
            return Err(PosterError::validation(
                "capture_fallback_width/capture_fallback_height must be non-zero",
            ));
        }
        if !self.seek_cap_sec.is_finite() || self.seek_cap_sec < 0.0 {
            return Err(PosterError::validation(
                "seek_cap_sec must be finite and >= 0",
            ));
        }
        if !self.seek_fraction.is_finite() || !(0.0..=1.0).contains(&self.seek_fraction) {
            return Err(PosterError::validation("seek_fraction must be in 0..=1"));
        }
        if let Some(0) = self.threads {
            return Err(PosterError::validation("threads must be >= 1 when set"));
        }
        Ok(())
    }

    /// Capture surface size for media without native dimensions.
    pub fn capture_fallback_size(&self) -> Size {
        Size {
            width: self.capture_fallback_width.max(1),
            height: self.capture_fallback_height.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_valid() {
        let cfg = PosterConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.capture_fallback_size(), Size::FALLBACK);
    }

    #[test]
    fn empty_object_uses_defaults() {
        let cfg: PosterConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(cfg, PosterConfig::default());
    }

    #[test]
    fn partial_override() {
        let cfg: PosterConfig =
            serde_json::from_value(json!({"format": "png", "jpeg_quality": 90})).unwrap();
        assert_eq!(cfg.format, PosterFormat::Png);
        assert_eq!(cfg.jpeg_quality, 90);
        assert_eq!(cfg.seek_cap_sec, 2.0);
    }

    #[test]
    fn rejects_unknown_fields() {
        let res: Result<PosterConfig, _> = serde_json::from_value(json!({"qualty": 3}));
        assert!(res.is_err());
        let res: Result<PosterConfig, _> =
            serde_json::from_value(json!({"caption": "Buy now"}));
        assert!(res.is_err());
    }

    #[test]
    fn validate_catches_bad_ranges() {
        let bad = [
            PosterConfig {
                jpeg_quality: 0,
                ..Default::default()
            },
            PosterConfig {
                capture_fallback_width: 0,
                ..Default::default()
            },
            PosterConfig {
                seek_cap_sec: f64::NAN,
                ..Default::default()
            },
            PosterConfig {
                seek_fraction: 1.5,
                ..Default::default()
            },
            PosterConfig {
                threads: Some(0),
                ..Default::default()
            },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
        }
    }
}
