//! PNG saving, integer upscaling, and frame path naming

use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Stem used when no output path is given.
const DEFAULT_STEM: &str = "drift";

/// Error writing rendered frames to disk
#[derive(Debug, Error)]
pub enum OutputError {
    /// File or directory operation failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Frame could not be encoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Create the missing parents of `path`, if any.
pub(crate) fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent)
        }
        _ => Ok(()),
    }
}

/// Save a rendered frame as a PNG, creating parent directories as needed.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    ensure_parent_dir(path)?;
    image.save(path)?;
    Ok(())
}

/// Upscale a frame by an integer factor with nearest-neighbor sampling.
///
/// Nearest keeps edges crisp, which suits the field's single-pixel lines.
/// A factor of 0 or 1 returns the frame untouched.
pub fn scale_image(image: RgbaImage, factor: u8) -> RgbaImage {
    if factor <= 1 {
        return image;
    }
    let (w, h) = image.dimensions();
    imageops::resize(&image, w * factor as u32, h * factor as u32, FilterType::Nearest)
}

/// Resolve where one frame of a render lands.
///
/// Single frames keep the bare stem (`drift.png`, or the `-o` path as given);
/// sequences get a `_0000` style index. An output ending in `/` (or naming an
/// existing directory) switches to `dir/frame_NNNN.png` naming, with
/// `dir/frame.png` for a lone frame.
///
/// # Arguments
///
/// * `output_arg` - The `-o` argument value, if provided
/// * `index` - Zero-based frame index
/// * `total` - Total number of frames being written
pub fn frame_output_path(output_arg: Option<&Path>, index: u32, total: u32) -> PathBuf {
    let single = total <= 1;

    let Some(output) = output_arg else {
        return if single {
            PathBuf::from(format!("{}.png", DEFAULT_STEM))
        } else {
            PathBuf::from(format!("{}_{:04}.png", DEFAULT_STEM, index))
        };
    };

    let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();
    if is_dir {
        return if single {
            output.join("frame.png")
        } else {
            output.join(format!("frame_{:04}.png", index))
        };
    }

    if single {
        return output.to_path_buf();
    }

    let stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or(DEFAULT_STEM);
    let indexed = format!("{}_{:04}.png", stem, index);
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(indexed),
        _ => PathBuf::from(indexed),
    }
}
