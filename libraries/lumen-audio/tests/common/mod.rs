/// Common test utilities and fixtures
use lumen_core::{LoaderError, Result, Sample, SampleLoader, SharedLoader};
use std::sync::{Arc, Mutex};

/// Loader with configurable counters and failure modes that records seeks
pub struct ScriptedLoader {
    pub sample_rate: u32,
    pub total_samples: usize,
    pub loaded_samples: usize,
    pub fail_reads: bool,
    pub fail_seeks: bool,
    pub seeks: Vec<usize>,
    pub reads: usize,
}

impl ScriptedLoader {
    pub fn new(sample_rate: u32, total_samples: usize) -> Self {
        Self {
            sample_rate,
            total_samples,
            loaded_samples: 0,
            fail_reads: false,
            fail_seeks: false,
            seeks: Vec::new(),
            reads: 0,
        }
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn failing_seeks(mut self) -> Self {
        self.fail_seeks = true;
        self
    }

    pub fn at(mut self, loaded_samples: usize) -> Self {
        self.loaded_samples = loaded_samples;
        self
    }
}

impl SampleLoader for ScriptedLoader {
    fn get_more_samples(&mut self, count: usize) -> Result<Vec<Sample>> {
        self.reads += 1;
        if self.fail_reads {
            return Err(LoaderError::decode("corrupt frame at byte 4096"));
        }

        let remaining = self.total_samples.saturating_sub(self.loaded_samples);
        let count = count.min(remaining);
        let start = self.loaded_samples;
        self.loaded_samples += count;

        // Each frame carries its own index so tests can check where reads start
        Ok((start..start + count)
            .map(|i| Sample::mono(i as f32))
            .collect())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_samples(&self) -> usize {
        self.total_samples
    }

    fn loaded_samples(&self) -> usize {
        self.loaded_samples
    }

    fn seek(&mut self, index: usize) -> Result<()> {
        self.seeks.push(index);
        if self.fail_seeks {
            return Err(LoaderError::seek("stream is not seekable"));
        }
        self.loaded_samples = index;
        Ok(())
    }
}

/// Share a loader, keeping a typed handle for inspection
pub fn shared(loader: ScriptedLoader) -> (Arc<Mutex<ScriptedLoader>>, SharedLoader) {
    let typed = Arc::new(Mutex::new(loader));
    let shared: SharedLoader = typed.clone();
    (typed, shared)
}

/// Write a stereo 16-bit WAV whose left channel counts frames
pub fn write_counting_wav(path: &std::path::Path, sample_rate: u32, frames: u32) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV file");
    for i in 0..frames {
        writer.write_sample((i % 32768) as i16).unwrap();
        writer.write_sample(-((i % 32768) as i16)).unwrap();
    }
    writer.finalize().unwrap();
}

/// Recover the frame counter written by `write_counting_wav`
pub fn frame_index(sample: Sample) -> u32 {
    (sample.left * 32768.0).round() as u32
}
