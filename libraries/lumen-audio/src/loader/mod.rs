//! `SampleLoader` implementations
mod memory;
mod symphonia_loader;

pub use memory::MemoryLoader;
pub use symphonia_loader::SymphoniaLoader;
