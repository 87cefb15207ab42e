//! Frame decoder producing packed RGBA frame buffers.

use std::borrow::Cow;
use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageDecoder, ImageError};

use super::AnimationError;
use super::format::{self, FrameLayout};

/// A source of encoded image bytes: a file on disk or an in-memory blob.
pub trait FrameSource {
    /// Load the complete encoded stream.
    fn load(&self) -> io::Result<Cow<'_, [u8]>>;
}

impl FrameSource for [u8] {
    fn load(&self) -> io::Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self))
    }
}

impl FrameSource for Vec<u8> {
    fn load(&self) -> io::Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self.as_slice()))
    }
}

impl FrameSource for Path {
    fn load(&self) -> io::Result<Cow<'_, [u8]>> {
        fs::read(self).map(Cow::Owned)
    }
}

impl FrameSource for PathBuf {
    fn load(&self) -> io::Result<Cow<'_, [u8]>> {
        self.as_path().load()
    }
}

/// Decode an animation from any byte source.
pub fn decode<S: FrameSource + ?Sized>(source: &S) -> Result<DecodedAnimation, AnimationError> {
    let bytes = source.load()?;
    decode_bytes(&bytes)
}

/// Decode an animation from a file.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<DecodedAnimation, AnimationError> {
    decode(path.as_ref())
}

/// Decode an animation from memory.
///
/// GIF streams yield one canvas-composited frame per image in the stream.
/// Anything else is decoded as a single still frame with a zero delay.
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedAnimation, AnimationError> {
    let animation = if format::is_gif(bytes) {
        decode_gif(bytes)?
    } else {
        decode_still(bytes)?
    };

    log::debug!(
        "Decoded {} frame(s) at {}x{}",
        animation.frame_count(),
        animation.width(),
        animation.height()
    );
    Ok(animation)
}

/// A decoded frame held until the stream is exhausted and the final size is
/// known.
struct ScratchFrame {
    pixels: Vec<u8>,
    delay_centis: u16,
}

fn decode_gif(bytes: &[u8]) -> Result<DecodedAnimation, AnimationError> {
    let decoder = GifDecoder::new(Cursor::new(bytes))?;
    let (width, height) = decoder.dimensions();

    let mut scratch = Vec::new();
    for frame in decoder.into_frames() {
        let frame = frame?;
        let delay_centis = format::duration_to_centis(Duration::from(frame.delay()));
        scratch.push(ScratchFrame {
            pixels: frame.into_buffer().into_raw(),
            delay_centis,
        });
    }

    DecodedAnimation::pack(width, height, scratch)
}

fn decode_still(bytes: &[u8]) -> Result<DecodedAnimation, AnimationError> {
    let image_format = image::guess_format(bytes).map_err(|_| AnimationError::Format)?;
    let image = match image::load_from_memory_with_format(bytes, image_format) {
        Ok(image) => image.to_rgba8(),
        Err(ImageError::Unsupported(_)) => return Err(AnimationError::Format),
        Err(e) => return Err(e.into()),
    };

    let (width, height) = image.dimensions();
    let frame = ScratchFrame {
        pixels: image.into_raw(),
        delay_centis: 0,
    };
    DecodedAnimation::pack(width, height, vec![frame])
}

/// A fully decoded animation stored as one packed frame buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAnimation {
    layout: FrameLayout,
    packed: Vec<u8>,
}

impl DecodedAnimation {
    /// Pack scratch frames into a single buffer, releasing each scratch frame
    /// once its pixels are copied.
    fn pack(width: u32, height: u32, scratch: Vec<ScratchFrame>) -> Result<Self, AnimationError> {
        if scratch.is_empty() || width == 0 || height == 0 {
            return Err(AnimationError::NoFrames);
        }

        let layout = FrameLayout::new(width, height, scratch.len());
        let mut packed = Vec::with_capacity(layout.total_size());
        for (index, frame) in scratch.into_iter().enumerate() {
            if frame.pixels.len() != layout.pixel_size() {
                return Err(AnimationError::FrameSize {
                    index,
                    actual: frame.pixels.len(),
                    expected: layout.pixel_size(),
                });
            }
            format::push_frame(&mut packed, &frame.pixels, frame.delay_centis);
        }

        debug_assert_eq!(packed.len(), layout.total_size());
        Ok(Self { layout, packed })
    }

    /// Wrap an existing packed buffer, validating its length against the
    /// frame geometry.
    pub fn from_packed(width: u32, height: u32, packed: Vec<u8>) -> Result<Self, AnimationError> {
        let unit_size = FrameLayout::new(width, height, 1).unit_size();
        if packed.is_empty() || width == 0 || height == 0 {
            return Err(AnimationError::NoFrames);
        }
        if packed.len() % unit_size != 0 {
            return Err(AnimationError::Misaligned {
                len: packed.len(),
                unit_size,
            });
        }

        let layout = FrameLayout::new(width, height, packed.len() / unit_size);
        Ok(Self { layout, packed })
    }

    pub fn width(&self) -> u32 {
        self.layout.width
    }

    pub fn height(&self) -> u32 {
        self.layout.height
    }

    pub fn frame_count(&self) -> usize {
        self.layout.frame_count
    }

    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    /// The raw packed buffer.
    pub fn packed_frames(&self) -> &[u8] {
        &self.packed
    }

    /// Consume the animation, returning the packed buffer.
    pub fn into_packed(self) -> Vec<u8> {
        self.packed
    }

    /// Pixel data of frame `index`.
    ///
    /// Panics if `index >= frame_count()`.
    pub fn pixels(&self, index: usize) -> &[u8] {
        assert!(index < self.frame_count(), "frame index {} out of range", index);
        self.layout.pixels(&self.packed, index)
    }

    /// Delay of frame `index` in centiseconds.
    ///
    /// Panics if `index >= frame_count()`.
    pub fn delay_centis(&self, index: usize) -> u16 {
        assert!(index < self.frame_count(), "frame index {} out of range", index);
        self.layout.delay_centis(&self.packed, index)
    }

    /// Delay of frame `index` in seconds.
    pub fn delay_secs(&self, index: usize) -> f32 {
        format::centis_to_secs(self.delay_centis(index))
    }

    /// View of frame `index`, or `None` if out of range.
    pub fn frame(&self, index: usize) -> Option<FrameView<'_>> {
        (index < self.frame_count()).then(|| FrameView {
            index,
            pixels: self.layout.pixels(&self.packed, index),
            delay_centis: self.layout.delay_centis(&self.packed, index),
        })
    }

    /// Iterate over all frames in order.
    pub fn frames(&self) -> impl ExactSizeIterator<Item = FrameView<'_>> + '_ {
        (0..self.frame_count()).map(move |i| FrameView {
            index: i,
            pixels: self.layout.pixels(&self.packed, i),
            delay_centis: self.layout.delay_centis(&self.packed, i),
        })
    }
}

/// Borrowed view of one frame in a packed buffer.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub index: usize,
    /// RGBA pixels, row-major.
    pub pixels: &'a [u8],
    /// Display time in hundredths of a second.
    pub delay_centis: u16,
}

impl FrameView<'_> {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_centis as u64 * 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::fixtures;
    use tempfile::tempdir;

    #[test]
    fn test_decode_multi_frame_gif() {
        let delays = [10, 25, 3];
        let bytes = fixtures::gif_with_delays(4, 3, &delays);

        let animation = decode_bytes(&bytes).unwrap();
        assert_eq!(animation.frame_count(), 3);
        assert_eq!(animation.width(), 4);
        assert_eq!(animation.height(), 3);
        assert_eq!(animation.packed_frames().len(), 3 * (4 * 4 * 3 + 2));

        for (frame, &delay) in animation.frames().zip(delays.iter()) {
            assert_eq!(frame.delay_centis, delay);
            let expected = fixtures::solid_frame(4, 3, fixtures::frame_color(frame.index));
            assert_eq!(frame.pixels, expected.as_slice());
        }
    }

    #[test]
    fn test_decode_composites_partial_frames() {
        let bytes = fixtures::gif_with_partial_frame();
        let animation = decode_bytes(&bytes).unwrap();
        assert_eq!(animation.frame_count(), 2);

        let red = [255, 0, 0, 255];
        let blue = [0, 0, 255, 255];
        assert_eq!(animation.pixels(0), [red, red, red, red].concat().as_slice());
        assert_eq!(animation.pixels(1), [blue, red, red, red].concat().as_slice());
        assert_eq!(animation.delay_centis(1), 9);
    }

    #[test]
    fn test_single_frame_gif_keeps_trailer() {
        let bytes = fixtures::gif_with_delays(2, 2, &[42]);
        let animation = decode_bytes(&bytes).unwrap();
        assert_eq!(animation.frame_count(), 1);
        assert_eq!(animation.packed_frames().len(), 2 * 2 * 4 + 2);
        assert_eq!(animation.delay_centis(0), 42);
    }

    #[test]
    fn test_decode_png_still() {
        let pixels: Vec<u8> = (0..3 * 2 * 4).map(|i| (i * 9) as u8).collect();
        let bytes = fixtures::png(3, 2, &pixels);

        let animation = decode_bytes(&bytes).unwrap();
        assert_eq!(animation.frame_count(), 1);
        assert_eq!(animation.pixels(0), pixels.as_slice());
        assert_eq!(animation.delay_centis(0), 0);
        assert_eq!(animation.packed_frames().len(), pixels.len() + 2);
    }

    #[test]
    fn test_decode_is_deterministic() {
        let bytes = fixtures::gif_with_delays(5, 5, &[1, 2, 3, 4]);
        let a = decode_bytes(&bytes).unwrap();
        let b = decode_bytes(&bytes).unwrap();
        assert_eq!(a.packed_frames(), b.packed_frames());
    }

    #[test]
    fn test_unrecognized_signature() {
        let err = decode_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, AnimationError::Format));

        let err = decode_bytes(b"").unwrap_err();
        assert!(matches!(err, AnimationError::Format));

        // Truncated signature
        let err = decode_bytes(b"GIF8").unwrap_err();
        assert!(matches!(err, AnimationError::Format));
    }

    #[test]
    fn test_truncated_gif_is_decode_failure() {
        let bytes = fixtures::gif_with_delays(4, 4, &[5, 5]);
        let err = decode_bytes(&bytes[..8]).unwrap_err();
        assert!(err.is_decode_failure(), "unexpected error: {err}");
    }

    #[test]
    fn test_gif_without_frames() {
        let mut bytes = Vec::new();
        {
            let mut encoder = gif::Encoder::new(&mut bytes, 4, 4, &[0, 0, 0]).unwrap();
            encoder.set_repeat(gif::Repeat::Infinite).unwrap();
        }

        let err = decode_bytes(&bytes).unwrap_err();
        assert!(err.is_decode_failure(), "unexpected error: {err}");
    }

    #[test]
    fn test_decode_file_and_memory_agree() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        let bytes = fixtures::gif_with_delays(3, 3, &[8, 16]);
        fs::write(&path, &bytes).unwrap();

        let from_file = decode_file(&path).unwrap();
        let from_memory = decode(&bytes).unwrap();
        assert_eq!(from_file, from_memory);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = decode_file(dir.path().join("missing.gif")).unwrap_err();
        assert!(matches!(err, AnimationError::Io(_)));
        assert!(!err.is_decode_failure());
    }

    #[test]
    fn test_from_packed_validates_length() {
        let packed = vec![0u8; 2 * (4 + 2)];
        let animation = DecodedAnimation::from_packed(1, 1, packed).unwrap();
        assert_eq!(animation.frame_count(), 2);

        assert!(matches!(
            DecodedAnimation::from_packed(1, 1, vec![0u8; 7]),
            Err(AnimationError::Misaligned { len: 7, unit_size: 6 })
        ));
        assert!(matches!(
            DecodedAnimation::from_packed(2, 1, vec![0u8; 3 * 10 - 1]),
            Err(AnimationError::Misaligned { len: 29, unit_size: 10 })
        ));
        let err = DecodedAnimation::from_packed(1, 1, vec![0u8; 7]).unwrap_err();
        assert!(err.is_decode_failure());
        assert!(err.to_string().contains("7 bytes"));
        assert!(matches!(
            DecodedAnimation::from_packed(1, 1, Vec::new()),
            Err(AnimationError::NoFrames)
        ));
    }

    #[test]
    fn test_frame_view_out_of_range() {
        let bytes = fixtures::gif_with_delays(1, 1, &[4]);
        let animation = decode_bytes(&bytes).unwrap();
        assert!(animation.frame(1).is_none());
        assert_eq!(animation.frame(0).unwrap().delay(), Duration::from_millis(40));
    }
}
