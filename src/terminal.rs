//! Terminal rendering for field frames
//!
//! Generates ANSI escape sequences for terminal emulators that support
//! 24-bit color. Frames are packed two image rows per text line using the
//! upper-half-block glyph, so a W x H frame needs W columns and ceil(H/2)
//! lines.

use image::{Rgba, RgbaImage};

/// ANSI escape sequence to reset all formatting
pub const ANSI_RESET: &str = "\x1b[0m";

/// Render an RGBA image to ANSI terminal output.
///
/// Each text cell is a "▀" (upper half block) with the foreground set to the
/// top pixel and the background to the bottom pixel. Field frames are fully
/// opaque, so colors map straight through; the dangling row of an odd-height
/// image keeps the terminal's default background below it.
///
/// Lines are separated by `\n` and each ends with a reset, so the output can
/// be printed as-is in cooked mode or repositioned line-by-line in raw mode.
pub fn render_image_ansi(image: &RgbaImage) -> String {
    let width = image.width() as usize;
    let height = image.height() as usize;

    if width == 0 || height == 0 {
        return String::new();
    }

    let mut output = String::new();

    // Two rows of pixels per line of text
    for y in (0..height).step_by(2) {
        for x in 0..width {
            let top = *image.get_pixel(x as u32, y as u32);
            let bottom: Option<Rgba<u8>> =
                if y + 1 < height { Some(*image.get_pixel(x as u32, (y + 1) as u32)) } else { None };

            match bottom {
                Some(b) => {
                    output.push_str(&format!(
                        "\x1b[48;2;{};{};{}m\x1b[38;2;{};{};{}m▀",
                        b[0], b[1], b[2], top[0], top[1], top[2]
                    ));
                }
                None => {
                    // Default background under the dangling half row
                    output.push_str(&format!(
                        "\x1b[49m\x1b[38;2;{};{};{}m▀",
                        top[0], top[1], top[2]
                    ));
                }
            }
        }
        output.push_str(ANSI_RESET);
        output.push('\n');
    }

    output
}
