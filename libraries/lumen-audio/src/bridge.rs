//! Decoder-to-device bridge
//!
//! `CodecBridge` pulls frames from a shared loader, converts them to the device
//! sample rate, and maps between wall-clock positions and loader frame indices.
//! It never stores a position of its own: every answer is recomputed from the
//! loader's counters.

use crate::config::BridgeConfig;
use crate::error::{AudioError, Result};
use crate::resampling::{ResampleTransform, Resampler};
use lumen_core::{Sample, SampleLoader, SharedLoader};
use std::sync::{MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error};

/// Per-session bridge between a loader and an output device
pub struct CodecBridge {
    loader: SharedLoader,
    config: BridgeConfig,
    /// Continuity state for the read path, rebuilt when the rate pair changes
    resampler: Option<Resampler>,
}

impl CodecBridge {
    /// Create a bridge with the default configuration
    pub fn new(loader: SharedLoader) -> Self {
        Self::with_config(loader, BridgeConfig::default())
    }

    /// Create a bridge with explicit resampler settings
    pub fn with_config(loader: SharedLoader, config: BridgeConfig) -> Self {
        Self {
            loader,
            config,
            resampler: None,
        }
    }

    /// The shared loader this bridge reads from
    pub fn loader(&self) -> &SharedLoader {
        &self.loader
    }

    /// Resampler settings in use
    pub fn config(&self) -> BridgeConfig {
        self.config
    }

    /// Native sample rate of the loader
    pub fn sample_rate(&self) -> u32 {
        lock(&self.loader).sample_rate()
    }

    /// Length of the loaded stream, derived from the loader's frame count
    pub fn duration(&self) -> Duration {
        let loader = lock(&self.loader);
        let sample_rate = loader.sample_rate();
        if sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(loader.total_samples() as f64 / f64::from(sample_rate))
    }

    /// Pull `samples_to_load` frames from the loader and convert them to
    /// `device_sample_rate`
    ///
    /// The returned length is whatever the resampler produced; size device
    /// buffers from it, not from the request. When the loader returns fewer
    /// frames than asked for, the resampler is flushed so the end of the
    /// stream is not held back.
    pub fn read_samples(
        &mut self,
        samples_to_load: usize,
        device_sample_rate: u32,
    ) -> Result<Vec<Sample>> {
        if device_sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate(device_sample_rate));
        }

        let mut loader = lock(&self.loader);
        let sample_rate = loader.sample_rate();
        if sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate(sample_rate));
        }

        // Build the resampler before pulling so a failure here loses no samples
        let resampler = match self.resampler.take() {
            Some(resampler) if resampler.converts(sample_rate, device_sample_rate) => resampler,
            _ => {
                debug!(
                    "Creating {:?} resampler: {}Hz -> {}Hz",
                    self.config.resampler, sample_rate, device_sample_rate
                );
                Resampler::new(
                    self.config.resampler,
                    sample_rate,
                    device_sample_rate,
                    self.config.quality,
                )?
            }
        };
        let resampler = self.resampler.insert(resampler);

        let buffer = match loader.get_more_samples(samples_to_load) {
            Ok(buffer) => buffer,
            Err(err) => {
                error!("Error while loading samples: {}", err);
                return Err(AudioError::SampleLoading);
            }
        };
        drop(loader);

        let mut samples = resampler.resample(&buffer)?;

        // A short read means the loader hit end of stream
        if buffer.len() < samples_to_load {
            let tail = resampler.flush()?;
            if !tail.is_empty() {
                debug!("Flushed {} resampled frames at end of stream", tail.len());
            }
            samples.extend(tail);
        }

        Ok(samples)
    }

    /// Seek the loader to `position` seconds into a stream of length `duration`
    ///
    /// Returns the position the loader actually landed on, which can differ
    /// slightly from the request because seeks are frame-quantized. A loader
    /// with no frames is left untouched.
    pub fn seek_to_position(
        &mut self,
        position: f64,
        duration: Duration,
        device_sample_rate: u32,
    ) -> Result<Duration> {
        {
            let mut loader = lock(&self.loader);
            let total_samples = loader.total_samples();

            if total_samples != 0 {
                let index = seek_index_for(position, duration, total_samples);
                debug!("Seeking to {:.3}s (sample {} of {})", position, index, total_samples);

                loader
                    .seek(index)
                    .map_err(|source| AudioError::Seek { index, source })?;

                // Held phase belongs to the old position
                if let Some(resampler) = &mut self.resampler {
                    resampler.reset();
                }
            }
        }

        Ok(self.current_position(device_sample_rate))
    }

    /// Playback position derived from the loader's frame counter
    pub fn current_position(&self, device_sample_rate: u32) -> Duration {
        let loader = lock(&self.loader);
        position_for(
            loader.loaded_samples(),
            loader.sample_rate(),
            device_sample_rate,
        )
    }
}

/// Map a wall-clock position onto a frame index
///
/// Interpolates linearly over `[0, total_samples - 1]`, so the end of the
/// stream maps to the last frame. The duration is taken at millisecond
/// precision. Out-of-range and non-finite targets are clamped.
pub fn seek_index_for(position: f64, duration: Duration, total_samples: usize) -> usize {
    let last_index = total_samples.saturating_sub(1);
    let duration_value = duration.as_millis() as f64 / 1000.0;
    let target = position / duration_value * last_index as f64;

    if !target.is_finite() || target <= 0.0 {
        return 0;
    }
    (target as usize).min(last_index)
}

/// Playback position for `loaded_samples` frames of a `sample_rate` stream
/// heard through a `device_sample_rate` device
///
/// The frame count is scaled by the source-to-device ratio before dividing by
/// the native rate. Keep that order: it decides how the float result rounds
/// before truncation to whole milliseconds.
pub fn position_for(loaded_samples: usize, sample_rate: u32, device_sample_rate: u32) -> Duration {
    if sample_rate == 0 || device_sample_rate == 0 {
        return Duration::ZERO;
    }

    let mut samples_played = loaded_samples as f64;
    let sample_rate = f64::from(sample_rate);

    let source_to_device_ratio = sample_rate / f64::from(device_sample_rate);
    samples_played *= source_to_device_ratio;

    let millis = (samples_played / sample_rate * 1000.0) as i64;
    Duration::from_millis(millis.max(0) as u64)
}

/// Lock the loader, recovering it if another holder panicked
fn lock(loader: &SharedLoader) -> MutexGuard<'_, dyn SampleLoader + 'static> {
    loader.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_one_second_at_native_device_rate() {
        assert_eq!(position_for(44100, 44100, 44100), Duration::from_millis(1000));
        assert_eq!(position_for(48000, 48000, 48000), Duration::from_millis(1000));
    }

    #[test]
    fn position_scales_by_source_to_device_ratio() {
        // 44100 frames at 44.1kHz through a 48kHz device
        assert_eq!(position_for(44100, 44100, 48000), Duration::from_millis(918));
        // 48000-rate source reported against a 44.1kHz device
        assert_eq!(position_for(44100, 48000, 44100), Duration::from_millis(1000));
    }

    #[test]
    fn position_with_zero_rate_is_zero() {
        assert_eq!(position_for(1000, 0, 44100), Duration::ZERO);
        assert_eq!(position_for(1000, 44100, 0), Duration::ZERO);
    }

    #[test]
    fn seek_index_anchors_both_ends() {
        let duration = Duration::from_secs(10);
        assert_eq!(seek_index_for(0.0, duration, 441_000), 0);
        assert_eq!(seek_index_for(10.0, duration, 441_000), 440_999);
    }

    #[test]
    fn seek_index_truncates() {
        // 5 / 10 * 9 = 4.5
        assert_eq!(seek_index_for(5.0, Duration::from_secs(10), 10), 4);
    }

    #[test]
    fn seek_index_uses_millisecond_duration() {
        // 1.0009s truncates to 1.000s
        let duration = Duration::from_micros(1_000_900);
        assert_eq!(seek_index_for(1.0, duration, 1001), 1000);
    }

    #[test]
    fn seek_index_clamps_out_of_range() {
        let duration = Duration::from_secs(1);
        assert_eq!(seek_index_for(-3.0, duration, 100), 0);
        assert_eq!(seek_index_for(7.5, duration, 100), 99);
        assert_eq!(seek_index_for(f64::NAN, duration, 100), 0);
        assert_eq!(seek_index_for(0.5, Duration::ZERO, 100), 0);
    }
}
