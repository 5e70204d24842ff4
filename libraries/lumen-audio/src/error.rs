/// Bridge-level errors
use crate::resampling::ResamplingError;
use lumen_core::LoaderError;
use thiserror::Error;

/// Result type alias using `AudioError`
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio error types
#[derive(Error, Debug)]
pub enum AudioError {
    /// The loader failed to produce samples
    ///
    /// Carries no cause; the loader's error is logged where it happens.
    #[error("Error while loading samples")]
    SampleLoading,

    /// The loader rejected a seek
    #[error("Seek to sample {index} failed: {source}")]
    Seek {
        /// Sample index the bridge asked for
        index: usize,
        /// Error reported by the loader
        #[source]
        source: LoaderError,
    },

    /// A sample rate of zero (or an absurd one) was supplied
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    /// Resampler construction or processing failed
    #[error(transparent)]
    Resampling(#[from] ResamplingError),

    /// Loader could not be opened
    #[error(transparent)]
    Loader(#[from] LoaderError),

    /// Platform backend failure
    #[error("Backend error: {0}")]
    Backend(String),
}

impl AudioError {
    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
