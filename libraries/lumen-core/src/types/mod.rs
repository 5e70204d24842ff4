//! Core types
mod audio;

pub use audio::Sample;
