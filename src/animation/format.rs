//! Binary layout of packed frame buffers and compiled GIF resources.

use std::io::{self, Read, Write};
use std::time::Duration;

/// GIF87a signature.
pub const GIF87A_MAGIC: &[u8; 6] = b"GIF87a";

/// GIF89a signature.
pub const GIF89A_MAGIC: &[u8; 6] = b"GIF89a";

/// Bytes per decoded pixel (8-bit RGBA).
pub const CHANNELS: usize = 4;

/// Size of the little-endian delay field following each frame's pixels.
pub const DELAY_TRAILER_SIZE: usize = 2;

/// Size of the length prefix of a compiled resource.
pub const RESOURCE_LENGTH_SIZE: usize = 4;

/// Check whether `bytes` starts with a GIF signature.
pub fn is_gif(bytes: &[u8]) -> bool {
    bytes.starts_with(GIF87A_MAGIC) || bytes.starts_with(GIF89A_MAGIC)
}

/// Convert a delay in hundredths of a second to seconds.
#[inline]
pub fn centis_to_secs(centis: u16) -> f32 {
    centis as f32 / 100.0
}

/// Convert a frame delay to hundredths of a second, saturating at `u16::MAX`.
pub fn duration_to_centis(delay: Duration) -> u16 {
    u16::try_from(delay.as_millis() / 10).unwrap_or(u16::MAX)
}

/// Geometry of a packed frame buffer.
///
/// Every frame unit is `width * height * 4` bytes of row-major RGBA pixels
/// followed by a 2-byte little-endian delay in centiseconds. Units are laid
/// out back to back with no padding, so a frame's position is a pure
/// function of its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Number of frame units in the buffer.
    pub frame_count: usize,
}

impl FrameLayout {
    pub fn new(width: u32, height: u32, frame_count: usize) -> Self {
        Self {
            width,
            height,
            frame_count,
        }
    }

    /// Size of one frame's pixel data in bytes.
    #[inline]
    pub fn pixel_size(&self) -> usize {
        self.width as usize * self.height as usize * CHANNELS
    }

    /// Size of one frame unit (pixels plus delay trailer).
    #[inline]
    pub fn unit_size(&self) -> usize {
        self.pixel_size() + DELAY_TRAILER_SIZE
    }

    /// Total size of the packed buffer.
    #[inline]
    pub fn total_size(&self) -> usize {
        self.unit_size() * self.frame_count
    }

    /// Byte offset of the frame unit at `index`.
    #[inline]
    pub fn offset(&self, index: usize) -> usize {
        debug_assert!(
            index < self.frame_count,
            "frame index {} out of range ({} frames)",
            index,
            self.frame_count
        );
        index * self.unit_size()
    }

    /// Pixel data of frame `index` within `packed`.
    pub fn pixels<'a>(&self, packed: &'a [u8], index: usize) -> &'a [u8] {
        debug_assert_eq!(packed.len(), self.total_size());
        let start = self.offset(index);
        &packed[start..start + self.pixel_size()]
    }

    /// Delay trailer of frame `index` within `packed`, in centiseconds.
    pub fn delay_centis(&self, packed: &[u8], index: usize) -> u16 {
        debug_assert_eq!(packed.len(), self.total_size());
        let start = self.offset(index) + self.pixel_size();
        u16::from_le_bytes([packed[start], packed[start + 1]])
    }
}

/// Append one frame unit (pixels plus delay trailer) to `packed`.
pub fn push_frame(packed: &mut Vec<u8>, pixels: &[u8], delay_centis: u16) {
    packed.extend_from_slice(pixels);
    packed.extend_from_slice(&delay_centis.to_le_bytes());
}

/// Write a compiled resource: a little-endian `u32` length followed by the
/// raw source bytes.
pub fn write_resource<W: Write>(source: &[u8], w: &mut W) -> io::Result<()> {
    let len = u32::try_from(source.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Resource of {} bytes exceeds u32 length prefix", source.len()),
        )
    })?;
    w.write_all(&len.to_le_bytes())?;
    w.write_all(source)?;
    Ok(())
}

/// Read a compiled resource, returning the embedded source bytes.
pub fn read_resource<R: Read>(r: &mut R) -> io::Result<Vec<u8>> {
    let mut buf4 = [0u8; RESOURCE_LENGTH_SIZE];
    r.read_exact(&mut buf4)?;
    let len = u32::from_le_bytes(buf4) as usize;

    let mut source = Vec::new();
    r.take(len as u64).read_to_end(&mut source)?;
    if source.len() != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "Resource declares {} bytes but only {} are present",
                len,
                source.len()
            ),
        ));
    }
    Ok(source)
}
