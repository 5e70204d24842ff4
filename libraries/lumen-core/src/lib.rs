//! Lumen Core
//!
//! Platform-agnostic types and traits shared by the Lumen audio crates.
//!
//! This crate defines:
//! - **Sample**: the stereo `f32` frame every stage passes around
//! - **`SampleLoader`**: the capability a decoder exposes to the codec bridge
//! - **Error Handling**: `LoaderError` and its `Result` alias
//!
//! # Example
//!
//! ```rust
//! use lumen_core::{LoaderError, Sample, SampleLoader};
//!
//! struct Silence {
//!     loaded: usize,
//! }
//!
//! impl SampleLoader for Silence {
//!     fn get_more_samples(&mut self, count: usize) -> lumen_core::Result<Vec<Sample>> {
//!         self.loaded += count;
//!         Ok(vec![Sample::SILENCE; count])
//!     }
//!
//!     fn sample_rate(&self) -> u32 {
//!         44_100
//!     }
//!
//!     fn total_samples(&self) -> usize {
//!         0
//!     }
//!
//!     fn loaded_samples(&self) -> usize {
//!         self.loaded
//!     }
//!
//!     fn seek(&mut self, _index: usize) -> lumen_core::Result<()> {
//!         Err(LoaderError::Unsupported("silence is not seekable".into()))
//!     }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{LoaderError, Result};
pub use traits::{share, SampleLoader, SharedLoader};
pub use types::Sample;
