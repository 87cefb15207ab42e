//! Frame extraction to standalone PNG files.

use std::path::{Path, PathBuf};

use image::{ExtendedColorType, ImageFormat};

use super::AnimationError;
use super::decoder::{DecodedAnimation, decode_file};

/// Output path of frame `index` of `source`: the source's base name with a
/// two-digit frame suffix and a `.png` extension, next to the source.
///
/// `a/b.gif` becomes `a/b_00.png`, `a/b_01.png`, ...
pub fn frame_artifact_path(source: &Path, index: usize) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{}_{:02}.png", stem, index))
}

/// Decode `path` and write each frame next to it as a PNG.
///
/// Decoding failures are returned as errors. Frames that cannot be written
/// are logged and left out of the result, so an empty list means the
/// animation decoded but nothing could be written.
pub fn extract<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>, AnimationError> {
    let path = path.as_ref();
    let animation = decode_file(path)?;
    Ok(extract_frames(path, &animation))
}

/// Write every frame of an already decoded animation as a PNG named after
/// `source`. Returns the paths that were written, in frame order.
pub fn extract_frames(source: &Path, animation: &DecodedAnimation) -> Vec<PathBuf> {
    let mut written = Vec::with_capacity(animation.frame_count());

    for frame in animation.frames() {
        let out = frame_artifact_path(source, frame.index);
        let result = image::save_buffer_with_format(
            &out,
            frame.pixels,
            animation.width(),
            animation.height(),
            ExtendedColorType::Rgba8,
            ImageFormat::Png,
        );

        match result {
            Ok(()) => {
                log::info!(
                    "Generated `{}` with frame delay {}",
                    out.display(),
                    frame.delay_centis
                );
                written.push(out);
            }
            Err(source) => {
                let err = AnimationError::Write { path: out, source };
                log::warn!("{}", err);
            }
        }
    }

    written
}
