//! CPU raster surface and text overlay.

/// Capture surface and drawing primitives.
pub mod surface;
/// Font database and centered caption text.
pub mod text;
