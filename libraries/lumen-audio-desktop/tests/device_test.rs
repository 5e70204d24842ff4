//! Tests against a real output device
//!
//! These need a sound card (or a dummy ALSA/PulseAudio sink) and are ignored
//! by default. Run with `--ignored` on a machine with audio.

use lumen_audio::loader::{MemoryLoader, SymphoniaLoader};
use lumen_audio::plugin::AudioCodecPlugin;
use lumen_audio::BridgeConfig;
use lumen_audio_desktop::CpalCodecPlugin;
use lumen_core::{share, Sample};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn sine(sample_rate: u32, seconds: u32) -> Vec<Sample> {
    (0..sample_rate * seconds)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            Sample::mono((t * 440.0 * 2.0 * std::f32::consts::PI).sin() * 0.1)
        })
        .collect()
}

#[test]
#[ignore = "requires an audio output device"]
fn test_open_default_device() {
    let loader = share(MemoryLoader::new(sine(44100, 2), 44100));
    let plugin = CpalCodecPlugin::open_default(loader, BridgeConfig::default()).unwrap();

    assert!(plugin.device_sample_rate() > 0);
    assert!(!plugin.is_playing());
    assert_eq!(plugin.position(), Duration::ZERO);
    assert_eq!(plugin.duration(), Duration::from_secs(2));
}

#[test]
#[ignore = "requires an audio output device"]
fn test_playback_advances_position() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let loader = share(MemoryLoader::new(sine(48000, 5), 48000));
    let mut plugin = CpalCodecPlugin::open_default(loader, BridgeConfig::default()).unwrap();

    plugin.resume_playback().unwrap();
    assert!(plugin.is_playing());
    thread::sleep(Duration::from_millis(300));
    plugin.pause_playback().unwrap();

    let paused_at = plugin.position();
    assert!(paused_at > Duration::ZERO);

    // Nothing is pulled while paused
    thread::sleep(Duration::from_millis(200));
    assert_eq!(plugin.position(), paused_at);
}

#[test]
#[ignore = "requires an audio output device"]
fn test_seek_while_playing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tone.wav");
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for sample in sine(44100, 4) {
        let value = (sample.left * f32::from(i16::MAX)) as i16;
        writer.write_sample(value).unwrap();
        writer.write_sample(value).unwrap();
    }
    writer.finalize().unwrap();

    let loader = share(SymphoniaLoader::open(&path).unwrap());
    let mut plugin = CpalCodecPlugin::open_default(loader, BridgeConfig::sample_and_hold()).unwrap();

    plugin.resume_playback().unwrap();
    let landed = plugin.set_position(3.0).unwrap();
    plugin.pause_playback().unwrap();

    // Reported against the device rate, so only the direction is portable
    assert!(landed > Duration::ZERO, "landed at {:?}", landed);
}
