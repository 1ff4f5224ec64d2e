//! Animated GIF encoding for rendered field frames

use crate::output::{ensure_parent_dir, OutputError};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Encode a sequence of rendered frames as an animated GIF.
///
/// The per-frame delay is given in milliseconds; GIF stores delays in
/// centiseconds, so the value is rounded down and floored at one
/// centisecond. An empty frame list writes nothing and creates no file.
///
/// # Errors
///
/// Returns [`OutputError`] when the file cannot be created or a frame fails
/// to encode.
pub fn render_gif(
    frames: &[RgbaImage],
    frame_delay_ms: u32,
    loop_anim: bool,
    path: &Path,
) -> Result<(), OutputError> {
    if frames.is_empty() {
        return Ok(());
    }

    ensure_parent_dir(path)?;
    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = GifEncoder::new(writer);
    encoder.set_repeat(if loop_anim { Repeat::Infinite } else { Repeat::Finite(0) })?;

    let delay_cs = (frame_delay_ms / 10).max(1);
    let delay = Delay::from_numer_denom_ms(delay_cs * 10, 1);

    for image in frames {
        encoder.encode_frame(Frame::from_parts(image.clone(), 0, 0, delay))?;
    }

    Ok(())
}
