//! Headless backend
//!
//! Drives a bridge without an audio device: the caller pulls device-rate
//! samples with `render`. Useful for offline bouncing and for hosts that feed
//! samples into their own output path.

use super::AudioCodecPlugin;
use crate::bridge::CodecBridge;
use crate::config::BridgeConfig;
use crate::error::Result;
use lumen_core::{Sample, SharedLoader};
use std::time::Duration;

/// Pull-driven plugin with a fixed device rate
pub struct OfflinePlugin {
    bridge: CodecBridge,
    device_sample_rate: u32,
    playing: bool,
}

impl OfflinePlugin {
    /// Create a paused plugin rendering at `device_sample_rate`
    pub fn new(loader: SharedLoader, device_sample_rate: u32) -> Self {
        Self::with_config(loader, device_sample_rate, BridgeConfig::default())
    }

    /// Create a paused plugin with explicit resampler settings
    pub fn with_config(
        loader: SharedLoader,
        device_sample_rate: u32,
        config: BridgeConfig,
    ) -> Self {
        Self {
            bridge: CodecBridge::with_config(loader, config),
            device_sample_rate,
            playing: false,
        }
    }

    /// Render the next block while playing
    ///
    /// Pulls `samples_to_load` frames from the loader and returns them at the
    /// device rate. Returns nothing while paused.
    pub fn render(&mut self, samples_to_load: usize) -> Result<Vec<Sample>> {
        if !self.playing {
            return Ok(Vec::new());
        }
        self.bridge
            .read_samples(samples_to_load, self.device_sample_rate)
    }

    /// The bridge this plugin drives
    pub fn bridge(&self) -> &CodecBridge {
        &self.bridge
    }
}

impl AudioCodecPlugin for OfflinePlugin {
    fn resume_playback(&mut self) -> Result<()> {
        self.playing = true;
        Ok(())
    }

    fn pause_playback(&mut self) -> Result<()> {
        self.playing = false;
        Ok(())
    }

    fn set_position(&mut self, position: f64) -> Result<Duration> {
        let duration = self.bridge.duration();
        self.bridge
            .seek_to_position(position, duration, self.device_sample_rate)
    }

    fn position(&self) -> Duration {
        self.bridge.current_position(self.device_sample_rate)
    }

    fn duration(&self) -> Duration {
        self.bridge.duration()
    }

    fn device_sample_rate(&self) -> u32 {
        self.device_sample_rate
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;
    use lumen_core::share;

    #[test]
    fn paused_plugin_renders_nothing() {
        let mut plugin = OfflinePlugin::new(share(MemoryLoader::silence(44100, 1000)), 44100);

        assert!(plugin.render(256).unwrap().is_empty());
        assert_eq!(plugin.position(), Duration::ZERO);
    }

    #[test]
    fn render_advances_position() {
        let mut plugin = OfflinePlugin::new(share(MemoryLoader::silence(44100, 88200)), 44100);
        plugin.resume_playback().unwrap();

        let rendered = plugin.render(44100).unwrap();

        assert_eq!(rendered.len(), 44100);
        assert_eq!(plugin.position(), Duration::from_millis(1000));
        assert_eq!(plugin.duration(), Duration::from_secs(2));
    }

    #[test]
    fn set_position_seeks_within_duration() {
        let mut plugin = OfflinePlugin::new(share(MemoryLoader::silence(1000, 2000)), 1000);

        let landed = plugin.set_position(0.5).unwrap();

        // 0.5 / 2.0 * 1999 -> sample 499
        assert_eq!(landed, Duration::from_millis(499));
        assert!(!plugin.is_playing());
    }
}
