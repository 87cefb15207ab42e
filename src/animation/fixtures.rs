//! In-memory image fixtures for tests.

use std::borrow::Cow;
use std::io::Cursor;

use image::{ExtendedColorType, ImageFormat};

/// Solid opaque color of frame `i`, distinct for the first 64 frames.
pub fn frame_color(i: usize) -> [u8; 4] {
    [(i * 40) as u8, 255 - (i * 30) as u8, (i * 7) as u8, 255]
}

/// RGBA pixels of a solid frame.
pub fn solid_frame(width: u16, height: u16, color: [u8; 4]) -> Vec<u8> {
    color
        .iter()
        .copied()
        .cycle()
        .take(width as usize * height as usize * 4)
        .collect()
}

/// Encode a GIF with one full-canvas solid frame per delay.
pub fn gif_with_delays(width: u16, height: u16, delays: &[u16]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut out, width, height, &[]).unwrap();
        encoder.set_repeat(gif::Repeat::Infinite).unwrap();
        for (i, &delay) in delays.iter().enumerate() {
            let mut pixels = solid_frame(width, height, frame_color(i));
            let mut frame = gif::Frame::from_rgba_speed(width, height, &mut pixels, 10);
            frame.delay = delay;
            encoder.write_frame(&frame).unwrap();
        }
    }
    out
}

/// Encode a two-frame GIF whose second frame only covers the top-left pixel.
pub fn gif_with_partial_frame() -> Vec<u8> {
    let mut out = Vec::new();
    {
        let palette = [255, 0, 0, 0, 0, 255];
        let mut encoder = gif::Encoder::new(&mut out, 2, 2, &palette).unwrap();

        let mut full = gif::Frame::default();
        full.width = 2;
        full.height = 2;
        full.delay = 5;
        full.buffer = Cow::Owned(vec![0, 0, 0, 0]);
        encoder.write_frame(&full).unwrap();

        let mut patch = gif::Frame::default();
        patch.width = 1;
        patch.height = 1;
        patch.delay = 9;
        patch.buffer = Cow::Owned(vec![1]);
        encoder.write_frame(&patch).unwrap();
    }
    out
}

/// Encode RGBA pixels as a PNG.
pub fn png(width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::write_buffer_with_format(
        &mut out,
        pixels,
        width,
        height,
        ExtendedColorType::Rgba8,
        ImageFormat::Png,
    )
    .unwrap();
    out.into_inner()
}
