//! Rubato resampler backend
//!
//! Band-limited resampling using the rubato crate. Rubato works on fixed-size
//! chunks, so frames that don't fill a chunk are held back until the next call
//! or until `flush` pushes them out at end of stream. The filter's startup
//! delay is trimmed so output frame 0 lines up with input frame 0.

use super::{ResampleTransform, ResamplingError, ResamplingQuality, Result};
use lumen_core::Sample;
use rubato::{
    FastFixedIn, FastFixedOut, PolynomialDegree, Resampler as RubatoResamplerTrait, SincFixedIn,
    SincFixedOut, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::collections::VecDeque;

/// Stereo frames only
const CHANNELS: usize = 2;

/// Largest runtime ratio adjustment rubato is sized for
const MAX_RATIO_RELATIVE: f64 = 2.0;

/// Zero-input chunks fed at flush to drain the filter delay
const MAX_FLUSH_CHUNKS: usize = 4;

/// Enum to hold different rubato resampler types
enum RubatoResamplerType {
    FastIn(FastFixedIn<f32>),
    FastOut(FastFixedOut<f32>),
    SincIn(SincFixedIn<f32>),
    SincOut(SincFixedOut<f32>),
}

impl RubatoResamplerType {
    fn input_frames_next(&self) -> usize {
        match self {
            Self::FastIn(r) => r.input_frames_next(),
            Self::FastOut(r) => r.input_frames_next(),
            Self::SincIn(r) => r.input_frames_next(),
            Self::SincOut(r) => r.input_frames_next(),
        }
    }

    fn output_delay(&self) -> usize {
        match self {
            Self::FastIn(r) => r.output_delay(),
            Self::FastOut(r) => r.output_delay(),
            Self::SincIn(r) => r.output_delay(),
            Self::SincOut(r) => r.output_delay(),
        }
    }

    /// Process a short final chunk, or only the filter tail when `input` is `None`
    fn process_partial(&mut self, input: Option<&[Vec<f32>]>) -> Result<Vec<Vec<f32>>> {
        let result = match self {
            Self::FastIn(r) => r.process_partial(input, None),
            Self::FastOut(r) => r.process_partial(input, None),
            Self::SincIn(r) => r.process_partial(input, None),
            Self::SincOut(r) => r.process_partial(input, None),
        };
        result.map_err(|e| ResamplingError::ProcessingFailed(format!("rubato: {}", e)))
    }

    fn process(&mut self, input: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        let result = match self {
            Self::FastIn(r) => r.process(input, None),
            Self::FastOut(r) => r.process(input, None),
            Self::SincIn(r) => r.process(input, None),
            Self::SincOut(r) => r.process(input, None),
        };
        result.map_err(|e| ResamplingError::ProcessingFailed(format!("rubato: {}", e)))
    }

    fn reset(&mut self) {
        match self {
            Self::FastIn(r) => r.reset(),
            Self::FastOut(r) => r.reset(),
            Self::SincIn(r) => r.reset(),
            Self::SincOut(r) => r.reset(),
        }
    }
}

/// Rubato-based resampler implementation
pub struct RubatoResampler {
    resampler: RubatoResamplerType,
    source_rate: u32,
    target_rate: u32,
    /// Frames waiting for a complete chunk
    input_buffer: VecDeque<Sample>,
    /// Leading output frames still to drop (filter delay)
    trim: usize,
    /// Frames accepted since the last reset
    frames_in: u64,
    /// Frames emitted since the last reset
    frames_out: u64,
}

impl RubatoResampler {
    /// Create a new rubato resampler
    pub fn new(source_rate: u32, target_rate: u32, quality: ResamplingQuality) -> Result<Self> {
        if source_rate == 0 {
            return Err(ResamplingError::InvalidSampleRate(source_rate));
        }
        if target_rate == 0 {
            return Err(ResamplingError::InvalidSampleRate(target_rate));
        }

        let ratio = f64::from(target_rate) / f64::from(source_rate);
        let chunk_size = quality.chunk_size();

        let resampler = if quality == ResamplingQuality::Fast {
            if ratio >= 1.0 {
                RubatoResamplerType::FastIn(
                    FastFixedIn::new(
                        ratio,
                        MAX_RATIO_RELATIVE,
                        PolynomialDegree::Cubic,
                        chunk_size,
                        CHANNELS,
                    )
                    .map_err(|e| init_failed("FastFixedIn", e))?,
                )
            } else {
                RubatoResamplerType::FastOut(
                    FastFixedOut::new(
                        ratio,
                        MAX_RATIO_RELATIVE,
                        PolynomialDegree::Cubic,
                        chunk_size,
                        CHANNELS,
                    )
                    .map_err(|e| init_failed("FastFixedOut", e))?,
                )
            }
        } else {
            let params = Self::quality_to_params(quality);
            if ratio >= 1.0 {
                RubatoResamplerType::SincIn(
                    SincFixedIn::<f32>::new(ratio, MAX_RATIO_RELATIVE, params, chunk_size, CHANNELS)
                        .map_err(|e| init_failed("SincFixedIn", e))?,
                )
            } else {
                RubatoResamplerType::SincOut(
                    SincFixedOut::<f32>::new(
                        ratio,
                        MAX_RATIO_RELATIVE,
                        params,
                        chunk_size,
                        CHANNELS,
                    )
                    .map_err(|e| init_failed("SincFixedOut", e))?,
                )
            }
        };

        let trim = resampler.output_delay();

        Ok(Self {
            resampler,
            source_rate,
            target_rate,
            input_buffer: VecDeque::new(),
            trim,
            frames_in: 0,
            frames_out: 0,
        })
    }

    /// Convert quality preset to sinc parameters
    fn quality_to_params(quality: ResamplingQuality) -> SincInterpolationParameters {
        match quality {
            ResamplingQuality::Fast | ResamplingQuality::Balanced => SincInterpolationParameters {
                sinc_len: 128,
                f_cutoff: 0.95,
                interpolation: SincInterpolationType::Cubic,
                oversampling_factor: 256,
                window: WindowFunction::BlackmanHarris,
            },
            ResamplingQuality::High => SincInterpolationParameters {
                sinc_len: 256,
                f_cutoff: 0.99,
                interpolation: SincInterpolationType::Cubic,
                oversampling_factor: 512,
                window: WindowFunction::BlackmanHarris,
            },
            ResamplingQuality::Maximum => SincInterpolationParameters {
                sinc_len: 512,
                f_cutoff: 0.995,
                interpolation: SincInterpolationType::Cubic,
                oversampling_factor: 1024,
                window: WindowFunction::BlackmanHarris2,
            },
        }
    }

    /// Frames currently held back waiting for a full chunk
    pub fn buffered_frames(&self) -> usize {
        self.input_buffer.len()
    }

    /// Output frames the whole input so far maps to at the target rate
    fn expected_output(&self) -> u64 {
        let source = u64::from(self.source_rate);
        (self.frames_in * u64::from(self.target_rate) + source / 2) / source
    }

    /// Append processed frames to `output`, dropping the filter delay first
    fn emit(&mut self, processed: &[Vec<f32>], output: &mut Vec<Sample>) {
        let produced = processed[0].len();
        let skip = self.trim.min(produced);
        self.trim -= skip;

        output.extend(interleave(processed).skip(skip));
        self.frames_out += (produced - skip) as u64;
    }
}

/// Split frames into one vector per channel
fn deinterleave(frames: impl Iterator<Item = Sample>, len: usize) -> Vec<Vec<f32>> {
    let mut left = Vec::with_capacity(len);
    let mut right = Vec::with_capacity(len);
    for frame in frames {
        left.push(frame.left);
        right.push(frame.right);
    }
    vec![left, right]
}

/// Zip per-channel vectors back into frames
fn interleave(channels: &[Vec<f32>]) -> impl Iterator<Item = Sample> + '_ {
    channels[0]
        .iter()
        .zip(channels[1].iter())
        .map(|(&left, &right)| Sample::new(left, right))
}

fn init_failed(kind: &str, err: impl std::fmt::Display) -> ResamplingError {
    ResamplingError::InitializationFailed(format!("{} creation failed: {}", kind, err))
}

impl ResampleTransform for RubatoResampler {
    fn resample(&mut self, input: &[Sample]) -> Result<Vec<Sample>> {
        // 1:1 passthrough - nothing to interpolate
        if self.source_rate == self.target_rate {
            return Ok(input.to_vec());
        }

        self.input_buffer.extend(input.iter().copied());
        self.frames_in += input.len() as u64;

        let mut output = Vec::new();

        // Only hand rubato complete chunks; partial ones stay buffered
        loop {
            let needed = self.resampler.input_frames_next();
            if self.input_buffer.len() < needed {
                break;
            }

            let chunk = deinterleave(self.input_buffer.drain(..needed), needed);
            let processed = self.resampler.process(&chunk)?;
            self.emit(&processed, &mut output);
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
        self.input_buffer.clear();
        self.resampler.reset();
        self.trim = self.resampler.output_delay();
        self.frames_in = 0;
        self.frames_out = 0;
    }

    fn flush(&mut self) -> Result<Vec<Sample>> {
        let mut output = Vec::new();
        if self.source_rate == self.target_rate || self.frames_in == 0 {
            self.reset();
            return Ok(output);
        }

        // Short final chunk; rubato pads it with silence
        if !self.input_buffer.is_empty() {
            let len = self.input_buffer.len();
            let chunk = deinterleave(self.input_buffer.drain(..), len);
            let processed = self.resampler.process_partial(Some(chunk.as_slice()))?;
            self.emit(&processed, &mut output);
        }

        // Push the delayed tail out of the filter
        let expected = self.expected_output();
        for _ in 0..MAX_FLUSH_CHUNKS {
            if self.frames_out >= expected {
                break;
            }
            let processed = self.resampler.process_partial(None)?;
            self.emit(&processed, &mut output);
        }

        // Padding past the end of the input is not part of the stream
        let surplus = self.frames_out.saturating_sub(expected) as usize;
        output.truncate(output.len().saturating_sub(surplus));

        self.reset();
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rubato_creation() {
        let resampler = RubatoResampler::new(44100, 96000, ResamplingQuality::Balanced).unwrap();
        assert_eq!(resampler.source_rate(), 44100);
        assert_eq!(resampler.target_rate(), 96000);
    }

    #[test]
    fn test_deinterleave_interleave() {
        let frames = vec![
            Sample::new(1.0, 2.0),
            Sample::new(3.0, 4.0),
            Sample::new(5.0, 6.0),
        ];

        let channels = deinterleave(frames.iter().copied(), frames.len());
        assert_eq!(channels[0], vec![1.0, 3.0, 5.0]);
        assert_eq!(channels[1], vec![2.0, 4.0, 6.0]);

        let rebuilt: Vec<Sample> = interleave(&channels).collect();
        assert_eq!(rebuilt, frames);
    }

    #[test]
    fn test_process_empty() {
        let mut resampler = RubatoResampler::new(44100, 96000, ResamplingQuality::Fast).unwrap();
        let output = resampler.resample(&[]).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_partial_chunk_is_buffered() {
        let mut resampler = RubatoResampler::new(44100, 48000, ResamplingQuality::Balanced).unwrap();
        let output = resampler.resample(&[Sample::mono(0.1); 100]).unwrap();

        assert!(output.is_empty());
        assert_eq!(resampler.buffered_frames(), 100);

        resampler.reset();
        assert_eq!(resampler.buffered_frames(), 0);
    }

    #[test]
    fn test_upsampling_output_ratio() {
        let mut resampler = RubatoResampler::new(44100, 88200, ResamplingQuality::Balanced).unwrap();
        let input = vec![Sample::mono(0.0); 1024 * 8];

        let mut output = resampler.resample(&input).unwrap();
        output.extend(resampler.flush().unwrap());

        assert_eq!(output.len(), 1024 * 8 * 2);
    }

    #[test]
    fn test_flush_emits_partial_chunk() {
        let mut resampler = RubatoResampler::new(44100, 48000, ResamplingQuality::Balanced).unwrap();

        // Shorter than one chunk: nothing comes out until the flush
        assert!(resampler.resample(&[Sample::mono(0.25); 1000]).unwrap().is_empty());
        let output = resampler.flush().unwrap();

        // 1000 * 48000 / 44100 = 1088.4
        assert_eq!(output.len(), 1088);
        assert_eq!(resampler.buffered_frames(), 0);
    }

    #[test]
    fn test_fast_quality_flush_matches_ratio() {
        let mut resampler = RubatoResampler::new(48000, 32000, ResamplingQuality::Fast).unwrap();

        let mut output = resampler.resample(&[Sample::mono(0.5); 3000]).unwrap();
        output.extend(resampler.flush().unwrap());

        assert_eq!(output.len(), 2000);
    }

    #[test]
    fn test_flush_without_input_is_empty() {
        let mut resampler = RubatoResampler::new(44100, 48000, ResamplingQuality::High).unwrap();
        assert!(resampler.flush().unwrap().is_empty());
    }

    #[test]
    fn test_signal_survives_delay_trim() {
        let mut resampler = RubatoResampler::new(44100, 48000, ResamplingQuality::Balanced).unwrap();

        let mut output = resampler.resample(&[Sample::mono(0.5); 8192]).unwrap();
        output.extend(resampler.flush().unwrap());

        // Away from the edges a constant input stays constant
        let middle = output[output.len() / 2];
        assert!((middle.left - 0.5).abs() < 0.01, "got {}", middle.left);
    }
}
