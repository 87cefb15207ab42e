//! Schema module - Configuration types for headless playback.

mod config;

pub use config::*;
