/// CPAL-backed codec plugin (audio thread owns the stream)
use crate::error::{DesktopError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use lumen_audio::plugin::{self, AudioCodecPlugin};
use lumen_audio::{BridgeConfig, CodecBridge};
use lumen_core::{Sample, SharedLoader};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Upper bound on bridge reads per device callback
///
/// A resampler that is still filling its window can return nothing for a
/// read; past this many pulls the rest of the callback is padded with silence.
const MAX_PULLS_PER_CALLBACK: usize = 4;

/// Commands sent to the audio thread
enum AudioCommand {
    /// Start the stream
    Play(Sender<Result<()>>),
    /// Pause the stream
    Pause(Sender<Result<()>>),
    /// Drop the stream and exit the thread
    Shutdown,
}

/// Bridge plus the device-rate frames it produced beyond the last callback
struct StreamState {
    bridge: CodecBridge,
    pending: VecDeque<Sample>,
    device_sample_rate: u32,
}

impl StreamState {
    fn new(bridge: CodecBridge, device_sample_rate: u32) -> Self {
        Self {
            bridge,
            pending: VecDeque::new(),
            device_sample_rate,
        }
    }

    /// Fill an interleaved device buffer of `channels` channels
    ///
    /// Stereo frames go to the first two channels; a mono device gets the
    /// average. Anything the bridge cannot supply is silence.
    fn fill(&mut self, output: &mut [f32], channels: usize) {
        if channels == 0 {
            output.fill(0.0);
            return;
        }

        let frames_needed = output.len() / channels;
        self.pull(frames_needed);

        if self.pending.len() < frames_needed {
            debug!(
                "Output underrun: padding {} of {} frames with silence",
                frames_needed - self.pending.len(),
                frames_needed
            );
        }

        for frame in output.chunks_mut(channels) {
            let sample = self.pending.pop_front().unwrap_or(Sample::SILENCE);
            match frame {
                [mono] => *mono = (sample.left + sample.right) * 0.5,
                [left, right, rest @ ..] => {
                    *left = sample.left;
                    *right = sample.right;
                    rest.fill(0.0);
                }
                [] => {}
            }
        }
    }

    /// Read from the bridge until `frames_needed` device frames are pending
    fn pull(&mut self, frames_needed: usize) {
        for _ in 0..MAX_PULLS_PER_CALLBACK {
            if self.pending.len() >= frames_needed {
                return;
            }

            let missing = frames_needed - self.pending.len();
            let to_load = source_frames_for(missing, self.bridge.sample_rate(), self.device_sample_rate);

            match self.bridge.read_samples(to_load, self.device_sample_rate) {
                Ok(samples) => self.pending.extend(samples),
                Err(e) => {
                    // The bridge already logged the cause
                    debug!("Callback read failed: {}", e);
                    return;
                }
            }
        }
    }
}

/// Source frames that should yield at least `device_frames` device frames
fn source_frames_for(device_frames: usize, sample_rate: u32, device_sample_rate: u32) -> usize {
    if device_sample_rate == 0 {
        return device_frames.max(1);
    }
    let numer = device_frames as u64 * u64::from(sample_rate);
    let frames = numer.div_ceil(u64::from(device_sample_rate));
    (frames as usize).max(1)
}

fn lock(state: &Mutex<StreamState>) -> MutexGuard<'_, StreamState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Codec plugin playing through a CPAL output device
///
/// **Architecture**: a dedicated audio thread owns the CPAL `Stream` and is
/// driven over a channel, so the plugin itself stays `Send` on every
/// platform. The device callback and the plugin share the bridge behind a
/// mutex.
pub struct CpalCodecPlugin {
    /// Channel to send commands to the audio thread
    command_tx: Sender<AudioCommand>,
    /// Bridge shared with the device callback
    state: Arc<Mutex<StreamState>>,
    playing: Arc<AtomicBool>,
    device_sample_rate: u32,
    audio_thread: Option<JoinHandle<()>>,
}

impl CpalCodecPlugin {
    /// Open the default output device for `loader`
    ///
    /// # Errors
    /// Returns an error if no audio device is found or the stream cannot be
    /// built
    pub fn open_default(loader: SharedLoader, config: BridgeConfig) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(DesktopError::DeviceNotFound)?;

        Self::with_device(device, loader, config)
    }

    /// Open a specific output device for `loader`
    ///
    /// The stream is built paused at the device's default configuration.
    pub fn with_device(device: Device, loader: SharedLoader, config: BridgeConfig) -> Result<Self> {
        let supported = device.default_output_config()?;
        let device_sample_rate = supported.sample_rate();
        let stream_config = supported.config();

        let state = Arc::new(Mutex::new(StreamState::new(
            CodecBridge::with_config(loader, config),
            device_sample_rate,
        )));
        let playing = Arc::new(AtomicBool::new(false));

        let (command_tx, command_rx) = bounded::<AudioCommand>(32);
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);

        let thread_state = Arc::clone(&state);
        let audio_thread = thread::Builder::new()
            .name("lumen-audio-output".into())
            .spawn(move || {
                Self::audio_thread_run(device, stream_config, thread_state, command_rx, ready_tx);
            })
            .map_err(|e| DesktopError::StreamBuild(e.to_string()))?;

        // Stream construction happens on the audio thread
        ready_rx.recv().map_err(|_| DesktopError::ThreadGone)??;

        debug!("Opened output device at {}Hz", device_sample_rate);

        Ok(Self {
            command_tx,
            state,
            playing,
            device_sample_rate,
            audio_thread: Some(audio_thread),
        })
    }

    /// Audio thread main loop
    ///
    /// Owns the CPAL stream for its whole life and answers commands from the
    /// plugin until shutdown.
    fn audio_thread_run(
        device: Device,
        config: StreamConfig,
        state: Arc<Mutex<StreamState>>,
        command_rx: Receiver<AudioCommand>,
        ready_tx: Sender<Result<()>>,
    ) {
        let channels = usize::from(config.channels);
        let stream = match Self::build_stream(&device, &config, state, channels) {
            Ok(stream) => stream,
            Err(e) => {
                let _ = ready_tx.send(Err(e));
                return;
            }
        };
        let _ = ready_tx.send(Ok(()));

        while let Ok(cmd) = command_rx.recv() {
            match cmd {
                AudioCommand::Play(reply) => {
                    let _ = reply.send(stream.play().map_err(DesktopError::from));
                }
                AudioCommand::Pause(reply) => {
                    let _ = reply.send(stream.pause().map_err(DesktopError::from));
                }
                AudioCommand::Shutdown => break,
            }
        }

        debug!("Audio thread exiting");
    }

    fn build_stream(
        device: &Device,
        config: &StreamConfig,
        state: Arc<Mutex<StreamState>>,
        channels: usize,
    ) -> Result<Stream> {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                lock(&state).fill(data, channels);
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )?;

        // Some hosts start streams immediately
        if let Err(e) = stream.pause() {
            warn!("Could not pause new stream: {}", e);
        }
        Ok(stream)
    }

    /// Send a command and wait for the audio thread's answer
    fn request(&self, command: fn(Sender<Result<()>>) -> AudioCommand) -> Result<()> {
        let (reply_tx, reply_rx) = bounded(1);
        self.command_tx
            .send(command(reply_tx))
            .map_err(|_| DesktopError::ThreadGone)?;
        reply_rx.recv().map_err(|_| DesktopError::ThreadGone)?
    }
}

impl AudioCodecPlugin for CpalCodecPlugin {
    fn resume_playback(&mut self) -> lumen_audio::Result<()> {
        self.request(AudioCommand::Play)?;
        self.playing.store(true, Ordering::Release);
        Ok(())
    }

    fn pause_playback(&mut self) -> lumen_audio::Result<()> {
        self.request(AudioCommand::Pause)?;
        self.playing.store(false, Ordering::Release);
        Ok(())
    }

    fn set_position(&mut self, position: f64) -> lumen_audio::Result<Duration> {
        let mut state = lock(&self.state);
        let duration = state.bridge.duration();
        let landed = state
            .bridge
            .seek_to_position(position, duration, self.device_sample_rate)?;

        // Frames already converted belong to the old position
        state.pending.clear();
        Ok(landed)
    }

    fn position(&self) -> Duration {
        lock(&self.state)
            .bridge
            .current_position(self.device_sample_rate)
    }

    fn duration(&self) -> Duration {
        lock(&self.state).bridge.duration()
    }

    fn device_sample_rate(&self) -> u32 {
        self.device_sample_rate
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }
}

impl Drop for CpalCodecPlugin {
    fn drop(&mut self) {
        let _ = self.command_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.audio_thread.take() {
            if handle.join().is_err() {
                error!("Audio thread panicked");
            }
        }
    }
}

/// Install the CPAL plugin factory as the process-wide backend
///
/// Every later `lumen_audio::plugin::create` opens the default output device
/// with `config`.
///
/// # Panics
/// Panics if a backend is already installed.
pub fn install(config: BridgeConfig) {
    plugin::install_creation_hook(
        move |loader: SharedLoader| -> lumen_audio::Result<Box<dyn AudioCodecPlugin>> {
            let plugin = CpalCodecPlugin::open_default(loader, config)?;
            Ok(Box::new(plugin))
        },
    );
    info!("CPAL output backend installed ({:?})", config.resampler);
}
