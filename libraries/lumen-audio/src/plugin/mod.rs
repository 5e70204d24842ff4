//! Platform backend seam
//!
//! A platform integration layer implements `AudioCodecPlugin` on top of a
//! `CodecBridge`, then installs a `PluginFactory` once at startup. Playback
//! sessions never name the backend; they call `registry::create` with their
//! loader and get whatever the installed factory builds.

mod offline;
pub mod registry;

use crate::error::Result;
use lumen_core::SharedLoader;
use std::time::Duration;

pub use offline::OfflinePlugin;
pub use registry::{create, install_creation_hook, BackendRegistry};

/// A playback session bound to an output device
pub trait AudioCodecPlugin: Send {
    /// Start or continue pulling samples into the device
    fn resume_playback(&mut self) -> Result<()>;

    /// Stop pulling samples; the position is kept
    fn pause_playback(&mut self) -> Result<()>;

    /// Seek to `position` seconds and return where playback actually landed
    fn set_position(&mut self, position: f64) -> Result<Duration>;

    /// Current playback position
    fn position(&self) -> Duration;

    /// Length of the stream
    fn duration(&self) -> Duration;

    /// Rate the device consumes samples at
    fn device_sample_rate(&self) -> u32;

    /// Whether the device is currently pulling samples
    fn is_playing(&self) -> bool;
}

/// Builds a plugin for a loader
///
/// Exactly one implementation is installed per process.
pub trait PluginFactory: Send + Sync {
    /// Create a plugin reading from `loader`
    fn create_plugin(&self, loader: SharedLoader) -> Result<Box<dyn AudioCodecPlugin>>;
}

impl<F> PluginFactory for F
where
    F: Fn(SharedLoader) -> Result<Box<dyn AudioCodecPlugin>> + Send + Sync,
{
    fn create_plugin(&self, loader: SharedLoader) -> Result<Box<dyn AudioCodecPlugin>> {
        self(loader)
    }
}
