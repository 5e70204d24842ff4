//! Process-wide backend registry
//!
//! The global registry can only be installed once per process, so everything
//! touching it lives in this single test.

use lumen_audio::loader::MemoryLoader;
use lumen_audio::plugin::{self, AudioCodecPlugin, BackendRegistry, OfflinePlugin};
use lumen_core::{share, SharedLoader};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn global_hook_builds_every_session() {
    assert!(!BackendRegistry::global().is_installed());

    let created = Arc::new(AtomicUsize::new(0));
    let counter = created.clone();
    plugin::install_creation_hook(
        move |loader: SharedLoader| -> lumen_audio::Result<Box<dyn AudioCodecPlugin>> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(OfflinePlugin::new(loader, 44100)))
        },
    );
    assert!(BackendRegistry::global().is_installed());

    let mut first = plugin::create(share(MemoryLoader::silence(44100, 88200))).unwrap();
    let second = plugin::create(share(MemoryLoader::silence(48000, 48000))).unwrap();

    assert_eq!(created.load(Ordering::SeqCst), 2);
    assert_eq!(first.duration(), Duration::from_secs(2));
    assert_eq!(second.duration(), Duration::from_secs(1));

    first.resume_playback().unwrap();
    assert!(first.is_playing());
    assert!(!second.is_playing());

    // A second install is a programming error
    let reinstall = std::panic::catch_unwind(|| {
        plugin::install_creation_hook(
            |loader: SharedLoader| -> lumen_audio::Result<Box<dyn AudioCodecPlugin>> {
                Ok(Box::new(OfflinePlugin::new(loader, 48000)))
            },
        );
    });
    assert!(reinstall.is_err());

    let third = plugin::create(share(MemoryLoader::silence(44100, 100))).unwrap();
    assert_eq!(third.device_sample_rate(), 44100);
}
