//! In-memory display backend.

use std::collections::HashMap;

use super::{DisplayBuffers, DisplayError, DisplayHandle, TextureDesc};

/// A buffer held by [`MemoryDisplay`].
#[derive(Debug, Clone)]
pub struct MemoryBuffer {
    pub desc: TextureDesc,
    pub pixels: Vec<u8>,
    /// Number of updates since creation.
    pub updates: u64,
}

/// Display backend that keeps every buffer in memory.
///
/// Used for headless playback and for inspecting what playback published.
#[derive(Debug, Default)]
pub struct MemoryDisplay {
    buffers: HashMap<DisplayHandle, MemoryBuffer>,
    next_handle: u32,
}

impl MemoryDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: DisplayHandle) -> Option<&MemoryBuffer> {
        self.buffers.get(&handle)
    }

    /// Number of live buffers.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

impl DisplayBuffers for MemoryDisplay {
    fn create(&mut self, desc: &TextureDesc, pixels: &[u8]) -> Result<DisplayHandle, DisplayError> {
        if desc.width == 0 || desc.height == 0 {
            return Err(DisplayError::InvalidDimensions);
        }
        if pixels.len() != desc.byte_size() {
            return Err(DisplayError::SizeMismatch {
                actual: pixels.len(),
                expected: desc.byte_size(),
            });
        }

        let handle = DisplayHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.buffers.insert(
            handle,
            MemoryBuffer {
                desc: desc.clone(),
                pixels: pixels.to_vec(),
                updates: 0,
            },
        );
        Ok(handle)
    }

    fn update(&mut self, handle: DisplayHandle, pixels: &[u8]) {
        match self.buffers.get_mut(&handle) {
            Some(buffer) => {
                buffer.pixels.clear();
                buffer.pixels.extend_from_slice(pixels);
                buffer.updates += 1;
            }
            None => log::warn!("Update for unknown display buffer {:?}", handle),
        }
    }

    fn destroy(&mut self, handle: DisplayHandle) {
        if self.buffers.remove(&handle).is_none() {
            log::warn!("Destroy for unknown display buffer {:?}", handle);
        }
    }
}
