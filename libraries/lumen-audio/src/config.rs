/// Bridge configuration
use crate::resampling::{ResamplerBackend, ResamplingQuality};
use serde::{Deserialize, Serialize};

/// Settings a platform backend applies to every bridge it creates
///
/// Missing fields fall back to their defaults, so hosts can persist a partial
/// document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Which resampler converts decoder output to the device rate
    pub resampler: ResamplerBackend,

    /// Quality preset for the rubato backend
    pub quality: ResamplingQuality,
}

impl BridgeConfig {
    /// Cheapest conversion with exact frame accounting
    pub fn sample_and_hold() -> Self {
        Self {
            resampler: ResamplerBackend::SampleAndHold,
            quality: ResamplingQuality::Fast,
        }
    }
}
