//! Desktop audio output for the Lumen codec bridge using CPAL
//!
//! This crate provides `CpalCodecPlugin`, an `AudioCodecPlugin` that plays a
//! `CodecBridge` through the default output device, and `install`, which
//! registers it as the process-wide backend.
//!
//! # Example
//!
//! ```no_run
//! use lumen_audio::loader::SymphoniaLoader;
//! use lumen_audio::{plugin, BridgeConfig};
//! use lumen_core::share;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Once, at startup
//! lumen_audio_desktop::install(BridgeConfig::default());
//!
//! // Per track
//! let loader = share(SymphoniaLoader::open(Path::new("track.flac"))?);
//! let mut session = plugin::create(loader)?;
//! session.resume_playback()?;
//! session.set_position(30.0)?;
//! println!("At {:?} of {:?}", session.position(), session.duration());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod plugin;

pub use error::{DesktopError, Result};
pub use plugin::{install, CpalCodecPlugin};
