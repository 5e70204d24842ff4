//! Install-once backend registry
//!
//! The process-wide registry lives in a static `OnceLock`, so concurrent
//! installs at startup resolve to exactly one winner. Installing twice or
//! creating before installing are programming errors and panic.

use super::{AudioCodecPlugin, PluginFactory};
use crate::error::Result;
use lumen_core::SharedLoader;
use std::sync::OnceLock;
use tracing::{debug, info};

static GLOBAL: BackendRegistry = BackendRegistry::new();

/// Holds the single plugin factory for a process (or a test)
pub struct BackendRegistry {
    factory: OnceLock<Box<dyn PluginFactory>>,
}

impl BackendRegistry {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self {
            factory: OnceLock::new(),
        }
    }

    /// The process-wide registry
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Install the plugin factory
    ///
    /// # Panics
    /// Panics if a factory is already installed.
    pub fn install(&self, factory: impl PluginFactory + 'static) {
        let installed = self.factory.set(Box::new(factory)).is_ok();
        assert!(installed, "audio codec plugin factory installed twice");
        info!("Audio codec plugin factory installed");
    }

    /// Create a plugin for `loader` with the installed factory
    ///
    /// The factory's result is returned unchanged.
    ///
    /// # Panics
    /// Panics if no factory has been installed.
    pub fn create(&self, loader: SharedLoader) -> Result<Box<dyn AudioCodecPlugin>> {
        let factory = self
            .factory
            .get()
            .unwrap_or_else(|| panic!("audio codec plugin created before a factory was installed"));

        debug!("Creating audio codec plugin");
        factory.create_plugin(loader)
    }

    /// Whether a factory has been installed
    pub fn is_installed(&self) -> bool {
        self.factory.get().is_some()
    }

    /// Remove the installed factory
    ///
    /// Only possible on an owned registry; the global one stays installed for
    /// the life of the process.
    pub fn reset(&mut self) {
        self.factory.take();
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Install the process-wide plugin factory
///
/// # Panics
/// Panics if a factory is already installed.
pub fn install_creation_hook(factory: impl PluginFactory + 'static) {
    BackendRegistry::global().install(factory);
}

/// Create a plugin with the process-wide factory
///
/// # Panics
/// Panics if no factory has been installed.
pub fn create(loader: SharedLoader) -> Result<Box<dyn AudioCodecPlugin>> {
    BackendRegistry::global().create(loader)
}
