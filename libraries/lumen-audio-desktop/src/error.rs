/// Desktop output errors
use thiserror::Error;

/// Result type for desktop output operations
pub type Result<T> = std::result::Result<T, DesktopError>;

/// Desktop output errors
#[derive(Debug, Error)]
pub enum DesktopError {
    /// No default output device
    #[error("Audio device not found")]
    DeviceNotFound,

    /// Device could not report its configuration
    #[error("Device error: {0}")]
    Device(String),

    /// Failed to build output stream
    #[error("Failed to build output stream: {0}")]
    StreamBuild(String),

    /// Failed to play stream
    #[error("Failed to play stream: {0}")]
    Play(String),

    /// Failed to pause stream
    #[error("Failed to pause stream: {0}")]
    Pause(String),

    /// The audio thread exited before answering
    #[error("Audio thread is not running")]
    ThreadGone,
}

impl From<cpal::BuildStreamError> for DesktopError {
    fn from(err: cpal::BuildStreamError) -> Self {
        DesktopError::StreamBuild(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for DesktopError {
    fn from(err: cpal::PlayStreamError) -> Self {
        DesktopError::Play(err.to_string())
    }
}

impl From<cpal::PauseStreamError> for DesktopError {
    fn from(err: cpal::PauseStreamError) -> Self {
        DesktopError::Pause(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for DesktopError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        DesktopError::Device(err.to_string())
    }
}

impl From<DesktopError> for lumen_audio::AudioError {
    fn from(err: DesktopError) -> Self {
        lumen_audio::AudioError::backend(err.to_string())
    }
}
