/// Core traits for Lumen
use crate::error::Result;
use crate::types::Sample;
use std::sync::{Arc, Mutex};

/// Decoder capability consumed by the codec bridge
///
/// Implementers produce stereo frames at their own native sample rate and keep
/// the playback counters. The bridge never caches these counters; whatever the
/// loader reports is the playback position.
pub trait SampleLoader: Send {
    /// Pull up to `count` frames from the current position
    ///
    /// Returns fewer frames near the end of the stream and an empty vector
    /// once the stream is exhausted.
    ///
    /// # Errors
    /// Returns an error if the underlying source cannot produce samples
    fn get_more_samples(&mut self, count: usize) -> Result<Vec<Sample>>;

    /// Native sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Total number of frames in the stream, or 0 if unknown
    fn total_samples(&self) -> usize;

    /// Number of frames handed out so far (the current frame index)
    fn loaded_samples(&self) -> usize;

    /// Move the read position to frame `index`
    ///
    /// # Errors
    /// Returns an error if the index is out of range or the source can't seek
    fn seek(&mut self, index: usize) -> Result<()>;
}

/// Shared handle to a loader
///
/// The session that created the loader keeps ownership; bridges only hold a
/// clone of this handle.
pub type SharedLoader = Arc<Mutex<dyn SampleLoader>>;

/// Wrap a loader into a `SharedLoader`
pub fn share<L: SampleLoader + 'static>(loader: L) -> SharedLoader {
    Arc::new(Mutex::new(loader))
}
