//! GIF animation playback.
//!
//! This crate decodes GIF animations into packed RGBA frame buffers and
//! plays them back into display buffers, one tick at a time.
//!
//! # Architecture
//!
//! - `animation`: Decoding, frame extraction and the playback scheduler
//! - `display`: Display buffer interface and an in-memory backend
//! - `schema`: Configuration types for headless playback
//!
//! # Example
//!
//! ```rust,no_run
//! use gifplay::{
//!     animation::{OwnerId, PlaybackManager, decode_file},
//!     display::MemoryDisplay,
//! };
//!
//! let animation = decode_file("spinner.gif")?;
//! println!("{} frames at {}x{}", animation.frame_count(), animation.width(), animation.height());
//!
//! let mut display = MemoryDisplay::new();
//! let mut playback = PlaybackManager::new();
//! playback.attach(OwnerId(1), animation, "albedo_map", &mut display)?;
//!
//! // Once per host frame
//! for _ in 0..600 {
//!     playback.tick(1.0 / 60.0, &mut display);
//! }
//!
//! playback.shutdown(&mut display);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod animation;
pub mod display;
pub mod schema;

// Re-export commonly used types
pub use animation::{AnimationError, DecodedAnimation, PlaybackManager, decode, decode_file};
pub use display::{DisplayBuffers, MemoryDisplay};
pub use schema::PlayerConfig;
