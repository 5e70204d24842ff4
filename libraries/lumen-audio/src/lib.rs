//! Lumen Audio
//!
//! The codec bridge between decoders and platform audio outputs.
//!
//! This crate provides:
//! - `CodecBridge`: pulls frames from a `SampleLoader`, converts them to the
//!   device rate, and maps between seconds and frame indices
//! - A backend registry that holds the one platform plugin factory per process
//! - Streaming resamplers (sample-and-hold, rubato)
//! - Loaders for in-memory buffers and files decoded with Symphonia
//!
//! # Example: Reading through a bridge
//!
//! ```rust
//! use lumen_audio::loader::MemoryLoader;
//! use lumen_audio::{BridgeConfig, CodecBridge};
//! use lumen_core::share;
//! use std::time::Duration;
//!
//! # fn example() -> lumen_audio::Result<()> {
//! let loader = share(MemoryLoader::silence(22_050, 22_050));
//! let mut bridge = CodecBridge::with_config(loader, BridgeConfig::sample_and_hold());
//!
//! // 1024 source frames become 2048 device frames at 44.1kHz
//! let samples = bridge.read_samples(1024, 44_100)?;
//! assert_eq!(samples.len(), 2048);
//!
//! let landed = bridge.seek_to_position(0.5, Duration::from_secs(1), 44_100)?;
//! println!("Now at {:?}", landed);
//! # Ok(())
//! # }
//! ```
//!
//! # Example: Installing a backend
//!
//! ```rust
//! use lumen_audio::plugin::{self, AudioCodecPlugin, OfflinePlugin};
//! use lumen_audio::loader::MemoryLoader;
//! use lumen_core::{share, SharedLoader};
//!
//! # fn example() -> lumen_audio::Result<()> {
//! // Once, at startup
//! plugin::install_creation_hook(|loader: SharedLoader| -> lumen_audio::Result<Box<dyn AudioCodecPlugin>> {
//!     Ok(Box::new(OfflinePlugin::new(loader, 48_000)))
//! });
//!
//! // Per playback session
//! let mut session = plugin::create(share(MemoryLoader::silence(44_100, 44_100)))?;
//! session.resume_playback()?;
//! # Ok(())
//! # }
//! ```

pub mod bridge;
mod config;
mod error;
pub mod loader;
pub mod plugin;
pub mod resampling;

pub use bridge::CodecBridge;
pub use config::BridgeConfig;
pub use error::{AudioError, Result};
