/// Streaming loader using Symphonia
use lumen_core::{LoaderError, Result, Sample, SampleLoader};
use std::collections::VecDeque;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::TimeBase;
use tracing::{debug, warn};

/// Decodes the default track of a file on demand
///
/// Supports: MP3, FLAC, OGG/Vorbis, WAV, AAC/M4A
///
/// Output is always stereo: mono is duplicated to both channels and channels
/// past the first two are ignored. Frame counters are in the track's native
/// rate.
pub struct SymphoniaLoader {
    /// Format reader (container parser)
    format: Box<dyn FormatReader>,
    /// Audio decoder
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    time_base: TimeBase,
    /// Frame count from the container, 0 if unknown
    total_samples: usize,
    /// Frames handed out so far
    loaded_samples: usize,
    /// Decoded frames not yet handed out
    pending: VecDeque<Sample>,
    /// Frames to drop after a seek landed before its target
    skip_frames: usize,
}

impl SymphoniaLoader {
    /// Open a file and prepare its default track for decoding
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;

        // Create media source
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint to help the format registry guess the format
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| LoaderError::format(format!("Failed to probe file: {}", e)))?;

        let format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| LoaderError::format("No audio tracks found"))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| LoaderError::format("Track has no sample rate"))?;
        let track_id = track.id;
        let time_base = track
            .codec_params
            .time_base
            .unwrap_or_else(|| TimeBase::new(1, sample_rate));
        let total_samples = track.codec_params.n_frames.unwrap_or(0) as usize;

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| LoaderError::format(format!("Failed to create decoder: {}", e)))?;

        debug!(
            "Opened {}: {}Hz, {} frames",
            path.display(),
            sample_rate,
            total_samples
        );

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            time_base,
            total_samples,
            loaded_samples: 0,
            pending: VecDeque::new(),
            skip_frames: 0,
        })
    }

    /// Decode one packet of our track into `pending`
    ///
    /// Returns `false` at end of stream.
    fn decode_next_packet(&mut self) -> Result<bool> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(false);
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => {
                    return Err(LoaderError::format(format!("Error reading packet: {}", e)));
                }
            };

            // Skip packets that are not for our track
            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!("Skipping undecodable packet: {}", e);
                    continue;
                }
                Err(e) => return Err(LoaderError::decode(e.to_string())),
            };

            let spec = *decoded.spec();
            let channels = spec.channels.count();
            if channels == 0 {
                continue;
            }

            let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            buffer.copy_interleaved_ref(decoded);

            for frame in buffer.samples().chunks_exact(channels) {
                if self.skip_frames > 0 {
                    self.skip_frames -= 1;
                    continue;
                }
                let sample = match frame {
                    [mono] => Sample::mono(*mono),
                    [left, right, ..] => Sample::new(*left, *right),
                    [] => continue,
                };
                self.pending.push_back(sample);
            }

            return Ok(true);
        }
    }

    /// Convert a frame index to a timestamp in the track's time base
    fn frames_to_ts(&self, frames: usize) -> u64 {
        let numer = u128::from(self.time_base.numer) * u128::from(self.sample_rate);
        (frames as u128 * u128::from(self.time_base.denom) / numer) as u64
    }

    /// Convert a timestamp in the track's time base to a frame index
    fn ts_to_frames(&self, ts: u64) -> usize {
        let numer = u128::from(ts) * u128::from(self.time_base.numer) * u128::from(self.sample_rate);
        (numer / u128::from(self.time_base.denom)) as usize
    }
}

impl SampleLoader for SymphoniaLoader {
    fn get_more_samples(&mut self, count: usize) -> Result<Vec<Sample>> {
        while self.pending.len() < count {
            if !self.decode_next_packet()? {
                break;
            }
        }

        let available = count.min(self.pending.len());
        let samples: Vec<Sample> = self.pending.drain(..available).collect();
        self.loaded_samples += samples.len();
        Ok(samples)
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
        if self.total_samples != 0 && index > self.total_samples {
            return Err(LoaderError::seek(format!(
                "index {} is past the end ({} samples)",
                index, self.total_samples
            )));
        }

        let ts = self.frames_to_ts(index);
        let seeked_to = self
            .format
            .seek(
                SeekMode::Accurate,
                SeekTo::TimeStamp {
                    ts,
                    track_id: self.track_id,
                },
            )
            .map_err(|e| LoaderError::seek(e.to_string()))?;

        // Reset decoder state after seek
        self.decoder.reset();
        self.pending.clear();

        let landed = self.ts_to_frames(seeked_to.actual_ts);
        self.skip_frames = index.saturating_sub(landed);
        self.loaded_samples = index;

        debug!(
            "Seeked to sample {} (landed at {}, skipping {})",
            index, landed, self.skip_frames
        );
        Ok(())
    }
}
