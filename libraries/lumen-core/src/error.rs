/// Decoder-side error types
use thiserror::Error;

/// Result type alias using `LoaderError`
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Errors reported by a `SampleLoader`
///
/// The `Display` output is the human-readable description the bridge logs
/// when a read fails.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// I/O errors while reading the source
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Container could not be probed or parsed
    #[error("Format error: {0}")]
    Format(String),

    /// Packet could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Seek target rejected by the source
    #[error("Seek error: {0}")]
    Seek(String),

    /// Operation not supported by this loader
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl LoaderError {
    /// Create a format error
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a seek error
    pub fn seek(msg: impl Into<String>) -> Self {
        Self::Seek(msg.into())
    }
}
