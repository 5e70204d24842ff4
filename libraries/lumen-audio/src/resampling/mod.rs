//! Streaming sample rate conversion
//!
//! The bridge converts every buffer it pulls from a loader to the device rate.
//! Transforms here are stateful: phase and filter history carry over from one
//! `resample` call to the next so consecutive buffers join without clicks.
//!
//! ## Backends
//!
//! - `SampleAndHold`: integer phase accumulator that repeats or drops frames.
//!   Cheap, exact frame accounting, no filtering.
//! - `Rubato`: band-limited sinc / polynomial interpolation via the rubato crate.
//!
//! ## Example
//!
//! ```rust
//! use lumen_audio::resampling::{ResampleTransform, Resampler, ResamplerBackend, ResamplingQuality};
//! use lumen_core::Sample;
//!
//! let mut resampler = Resampler::new(
//!     ResamplerBackend::SampleAndHold,
//!     22_050,
//!     44_100,
//!     ResamplingQuality::Balanced,
//! )
//! .unwrap();
//!
//! let output = resampler.resample(&[Sample::mono(0.5); 256]).unwrap();
//! assert_eq!(output.len(), 512);
//! ```

mod rubato_backend;
mod sample_and_hold;

use lumen_core::Sample;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use rubato_backend::RubatoResampler;
pub use sample_and_hold::SampleAndHoldResampler;

/// Highest sample rate any backend accepts
const MAX_SAMPLE_RATE: u32 = 1_000_000;

/// Resampling errors
#[derive(Error, Debug)]
pub enum ResamplingError {
    #[error("Invalid sample rate: {0} Hz (must be > 0 and <= 1MHz)")]
    InvalidSampleRate(u32),

    #[error("Resampler initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

pub type Result<T> = std::result::Result<T, ResamplingError>;

/// Resampling quality presets (only used by the rubato backend)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResamplingQuality {
    /// Polynomial interpolation, lowest CPU
    Fast,

    /// 128-tap sinc, 0.95 cutoff
    #[default]
    Balanced,

    /// 256-tap sinc, 0.99 cutoff
    High,

    /// 512-tap sinc, 0.995 cutoff
    Maximum,
}

impl ResamplingQuality {
    /// Frames per processing chunk
    pub fn chunk_size(&self) -> usize {
        match self {
            Self::Fast | Self::Balanced => 1024,
            Self::High => 2048,
            Self::Maximum => 4096,
        }
    }
}

/// Resampler backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResamplerBackend {
    /// Repeat/drop frames on an integer phase accumulator
    SampleAndHold,

    /// rubato: band-limited interpolation
    #[default]
    Rubato,
}

/// A streaming rate-conversion transform
///
/// Implementations keep their phase between calls. Callers must feed every
/// buffer exactly once and in stream order.
pub trait ResampleTransform: Send {
    /// Convert a buffer of frames at `source_rate` into frames at `target_rate`
    ///
    /// The output length depends on the accumulated phase and any internal
    /// buffering, not only on `input.len()`.
    fn resample(&mut self, input: &[Sample]) -> Result<Vec<Sample>>;

    /// Input sample rate
    fn source_rate(&self) -> u32;

    /// Output sample rate
    fn target_rate(&self) -> u32;

    /// Drop phase and buffered history
    fn reset(&mut self);

    /// Emit every frame still held back, then start over as if freshly built
    ///
    /// Call once the input stream has ended. Output of `resample` plus
    /// `flush` covers the whole input.
    fn flush(&mut self) -> Result<Vec<Sample>>;
}

/// High-level resampler interface
pub struct Resampler {
    backend: Box<dyn ResampleTransform>,
}

impl Resampler {
    /// Create a new resampler
    ///
    /// # Arguments
    /// - `backend`: Resampler backend to use
    /// - `source_rate`: Input sample rate (Hz)
    /// - `target_rate`: Output sample rate (Hz)
    /// - `quality`: Quality preset (rubato only)
    pub fn new(
        backend: ResamplerBackend,
        source_rate: u32,
        target_rate: u32,
        quality: ResamplingQuality,
    ) -> Result<Self> {
        validate_rate(source_rate)?;
        validate_rate(target_rate)?;

        let backend: Box<dyn ResampleTransform> = match backend {
            ResamplerBackend::SampleAndHold => {
                Box::new(SampleAndHoldResampler::new(source_rate, target_rate)?)
            }
            ResamplerBackend::Rubato => {
                Box::new(RubatoResampler::new(source_rate, target_rate, quality)?)
            }
        };

        Ok(Self { backend })
    }

    /// Whether this resampler was built for the given rate pair
    pub fn converts(&self, source_rate: u32, target_rate: u32) -> bool {
        self.source_rate() == source_rate && self.target_rate() == target_rate
    }
}

impl ResampleTransform for Resampler {
    fn resample(&mut self, input: &[Sample]) -> Result<Vec<Sample>> {
        self.backend.resample(input)
    }

    fn source_rate(&self) -> u32 {
        self.backend.source_rate()
    }

    fn target_rate(&self) -> u32 {
        self.backend.target_rate()
    }

    fn reset(&mut self) {
        self.backend.reset();
    }

    fn flush(&mut self) -> Result<Vec<Sample>> {
        self.backend.flush()
    }
}

fn validate_rate(rate: u32) -> Result<()> {
    if rate == 0 || rate > MAX_SAMPLE_RATE {
        return Err(ResamplingError::InvalidSampleRate(rate));
    }
    Ok(())
}
