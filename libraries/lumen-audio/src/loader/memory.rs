/// Loader over frames already in memory
use lumen_core::{LoaderError, Result, Sample, SampleLoader};

/// Serves a fixed buffer of frames at a given rate
#[derive(Debug, Clone)]
pub struct MemoryLoader {
    samples: Vec<Sample>,
    sample_rate: u32,
    position: usize,
}

impl MemoryLoader {
    /// Wrap decoded frames
    pub fn new(samples: Vec<Sample>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            position: 0,
        }
    }

    /// `len` frames of silence
    pub fn silence(sample_rate: u32, len: usize) -> Self {
        Self::new(vec![Sample::SILENCE; len], sample_rate)
    }

    /// Build from interleaved `[L, R, L, R, ...]` samples
    ///
    /// A trailing odd sample is dropped.
    pub fn from_interleaved(interleaved: &[f32], sample_rate: u32) -> Self {
        let samples = interleaved
            .chunks_exact(2)
            .map(|pair| Sample::new(pair[0], pair[1]))
            .collect();
        Self::new(samples, sample_rate)
    }
}

impl SampleLoader for MemoryLoader {
    fn get_more_samples(&mut self, count: usize) -> Result<Vec<Sample>> {
        let end = self.position.saturating_add(count).min(self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;
        Ok(chunk)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_samples(&self) -> usize {
        self.samples.len()
    }

    fn loaded_samples(&self) -> usize {
        self.position
    }

    fn seek(&mut self, index: usize) -> Result<()> {
        if index > self.samples.len() {
            return Err(LoaderError::seek(format!(
                "index {} is past the end ({} samples)",
                index,
                self.samples.len()
            )));
        }
        self.position = index;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_stop_at_end_of_buffer() {
        let mut loader = MemoryLoader::silence(44100, 10);

        assert_eq!(loader.get_more_samples(8).unwrap().len(), 8);
        assert_eq!(loader.get_more_samples(8).unwrap().len(), 2);
        assert!(loader.get_more_samples(8).unwrap().is_empty());
        assert_eq!(loader.loaded_samples(), 10);
    }

    #[test]
    fn seek_moves_read_position() {
        let mut loader = MemoryLoader::from_interleaved(&[0.0, 0.0, 1.0, -1.0, 2.0, -2.0], 8000);

        loader.seek(1).unwrap();

        assert_eq!(loader.loaded_samples(), 1);
        assert_eq!(loader.get_more_samples(1).unwrap(), vec![Sample::new(1.0, -1.0)]);
    }

    #[test]
    fn seek_past_end_fails() {
        let mut loader = MemoryLoader::silence(44100, 10);

        assert!(loader.seek(10).is_ok());
        assert!(matches!(loader.seek(11), Err(LoaderError::Seek(_))));
    }
}
