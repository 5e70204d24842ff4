//! Sample-and-hold resampler
//!
//! Integer phase accumulator: every input frame adds `target` to the phase and
//! every whole `source` in the phase emits one copy of the held frame. Over a
//! stream of `n` frames this emits exactly `floor(n * target / source)` frames
//! no matter how the stream is split into calls.

use super::{ResampleTransform, ResamplingError, Result};
use lumen_core::Sample;

/// Zero-order-hold rate converter
pub struct SampleAndHoldResampler {
    source_rate: u32,
    target_rate: u32,
    /// Reduced rate pair used for the accumulator
    step_in: u64,
    step_out: u64,
    phase: u64,
}

impl SampleAndHoldResampler {
    /// Create a new sample-and-hold resampler
    pub fn new(source_rate: u32, target_rate: u32) -> Result<Self> {
        if source_rate == 0 {
            return Err(ResamplingError::InvalidSampleRate(source_rate));
        }
        if target_rate == 0 {
            return Err(ResamplingError::InvalidSampleRate(target_rate));
        }

        let divisor = gcd(u64::from(source_rate), u64::from(target_rate));

        Ok(Self {
            source_rate,
            target_rate,
            step_in: u64::from(source_rate) / divisor,
            step_out: u64::from(target_rate) / divisor,
            phase: 0,
        })
    }

    /// Upper bound on the frames produced for `input_frames` more input
    fn output_capacity(&self, input_frames: usize) -> usize {
        let total = (self.phase + input_frames as u64 * self.step_out) / self.step_in;
        total as usize
    }
}

impl ResampleTransform for SampleAndHoldResampler {
    fn resample(&mut self, input: &[Sample]) -> Result<Vec<Sample>> {
        let mut output = Vec::with_capacity(self.output_capacity(input.len()));

        for &frame in input {
            self.phase += self.step_out;
            while self.phase >= self.step_in {
                output.push(frame);
                self.phase -= self.step_in;
            }
        }

        Ok(output)
    }

    fn source_rate(&self) -> u32 {
        self.source_rate
    }

    fn target_rate(&self) -> u32 {
        self.target_rate
    }

    fn reset(&mut self) {
        self.phase = 0;
    }

    fn flush(&mut self) -> Result<Vec<Sample>> {
        // Only a fraction of a frame can be pending
        self.reset();
        Ok(Vec::new())
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
