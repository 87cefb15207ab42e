//! GIF decoding, frame extraction and playback.
//!
//! Decoding turns a GIF (or a still PNG) into one contiguous packed frame
//! buffer that the playback scheduler cycles through.
//!
//! # Packed Frame Layout
//!
//! ```text
//! Frame unit (repeated frame_count times, no padding):
//!   Pixels: width * height * 4 bytes (RGBA, row-major, top to bottom)
//!   Delay: u16 little-endian, hundredths of a second
//! ```
//!
//! Single frames (including still images) carry a trailer too, so the
//! buffer length is always `frame_count * (4 * width * height + 2)`.
//!
//! # Compiled Resource
//!
//! ```text
//!   Length: u32 little-endian
//!   Source: raw GIF (or PNG) bytes
//! ```

use std::io;
use std::path::PathBuf;

mod decoder;
mod extract;
pub mod format;
mod player;

#[cfg(test)]
pub(crate) mod fixtures;

pub use decoder::{DecodedAnimation, FrameSource, FrameView, decode, decode_bytes, decode_file};
pub use extract::{extract, extract_frames, frame_artifact_path};
pub use format::FrameLayout;
pub use player::{OwnerId, PlaybackError, PlaybackManager, PlaybackState, SlotId};

/// Error type for decoding and extraction.
#[derive(Debug, thiserror::Error)]
pub enum AnimationError {
    #[error("Failed to read animation source: {0}")]
    Io(#[from] io::Error),

    #[error("Unrecognized image signature")]
    Format,

    #[error("Failed to decode animation: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Animation contains no frames")]
    NoFrames,

    #[error("Frame {index} has {actual} bytes, expected {expected}")]
    FrameSize {
        index: usize,
        actual: usize,
        expected: usize,
    },

    #[error("Packed buffer of {len} bytes is not a multiple of the {unit_size}-byte frame unit")]
    Misaligned { len: usize, unit_size: usize },

    #[error("Failed to write frame to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl AnimationError {
    /// Whether the source was readable and recognized but produced no usable
    /// animation.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            AnimationError::Decode(_)
                | AnimationError::NoFrames
                | AnimationError::FrameSize { .. }
                | AnimationError::Misaligned { .. }
        )
    }
}
