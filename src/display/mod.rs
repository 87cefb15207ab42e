//! Display buffer interface.
//!
//! Rendering backends own the texture buffers an animation is published to.
//! Playback only keeps the opaque handle and pushes a frame's pixels whenever
//! the current frame changes.

mod memory;

pub use memory::{MemoryBuffer, MemoryDisplay};

/// Pixel format of a display buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 8 bits per channel, RGBA order.
    #[default]
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// Description of a 2D display buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Binding name in the host (e.g. a material slot).
    pub label: String,
}

impl TextureDesc {
    /// Size of one full buffer upload in bytes.
    pub fn byte_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}

/// Opaque handle to a buffer owned by a [`DisplayBuffers`] backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayHandle(pub u32);

/// Create, update and destroy renderable pixel buffers.
pub trait DisplayBuffers {
    /// Create a buffer initialised with `pixels`.
    fn create(&mut self, desc: &TextureDesc, pixels: &[u8]) -> Result<DisplayHandle, DisplayError>;

    /// Replace the contents of an existing buffer.
    fn update(&mut self, handle: DisplayHandle, pixels: &[u8]);

    /// Release a buffer. The handle must not be used afterwards.
    fn destroy(&mut self, handle: DisplayHandle);
}

/// Error type for display buffer creation.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("Display buffer dimensions must be non-zero")]
    InvalidDimensions,

    #[error("Pixel buffer has {actual} bytes, expected {expected}")]
    SizeMismatch { actual: usize, expected: usize },
}
