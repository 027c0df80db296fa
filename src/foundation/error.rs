/// Crate-wide result alias.
pub type PosterResult<T> = Result<T, PosterError>;

/// Error taxonomy for poster generation.
///
/// `Media` and `Capture` are recoverable inside the generator (they route to the placeholder
/// poster); the remaining variants surface to callers.
#[derive(thiserror::Error, Debug)]
pub enum PosterError {
    /// Invalid configuration, manifest, or identifier.
    #[error("validation error: {0}")]
    Validation(String),

    /// Media could not be opened, probed, or decoded.
    #[error("media error: {0}")]
    Media(String),

    /// Drawing onto the capture surface failed.
    #[error("capture error: {0}")]
    Capture(String),

    /// Exporting the capture surface as an encoded image failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error, usually I/O with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PosterError {
    /// Build a [`PosterError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PosterError::Media`].
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`PosterError::Capture`].
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`PosterError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`PosterError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
