//! Field rendering onto an RGBA raster surface.
//!
//! One frame is: clear to the background color, draw a faint line for every
//! pair of particles closer than the link distance (opacity falls off
//! linearly with distance), then draw each particle as a filled disc. The
//! pair scan is O(N^2), which is fine at the default pool size.

use crate::field::FieldState;
use image::{Rgba, RgbaImage};

/// Render one frame of the field.
///
/// Returns an image sized to the field's surface; an uninitialized or
/// zero-sized field renders as an empty image.
pub fn draw(state: &FieldState) -> RgbaImage {
    let width = state.width() as u32;
    let height = state.height() as u32;
    if width == 0 || height == 0 {
        return RgbaImage::new(0, 0);
    }

    let mut canvas = RgbaImage::from_pixel(width, height, state.params().background);
    draw_links(&mut canvas, state);
    draw_particles(&mut canvas, state);
    canvas
}

/// Draw connection lines between all pairs closer than the link distance.
fn draw_links(canvas: &mut RgbaImage, state: &FieldState) {
    let particles = state.particles();
    let params = state.params();
    if params.link_distance <= 0.0 || params.line_alpha <= 0.0 {
        return;
    }

    let max_dist_sq = params.link_distance * params.link_distance;

    for i in 0..particles.len() {
        for j in (i + 1)..particles.len() {
            let a = &particles[i];
            let b = &particles[j];
            let dx = b.x - a.x;
            let dy = b.y - a.y;
            let dist_sq = dx * dx + dy * dy;
            if dist_sq >= max_dist_sq {
                continue;
            }

            let dist = dist_sq.sqrt();
            let alpha = (1.0 - dist / params.link_distance) * params.line_alpha;
            plot_line(
                canvas,
                (a.x.round() as i32, a.y.round() as i32),
                (b.x.round() as i32, b.y.round() as i32),
                a.color,
                alpha,
            );
        }
    }
}

/// Draw each particle as a filled disc with its own color and opacity.
fn draw_particles(canvas: &mut RgbaImage, state: &FieldState) {
    for p in state.particles() {
        plot_disc(canvas, p.x.round() as i32, p.y.round() as i32, p.radius, p.color, p.alpha);
    }
}

/// Plot a line between two points (Bresenham), blending each pixel.
fn plot_line(canvas: &mut RgbaImage, p0: (i32, i32), p1: (i32, i32), color: Rgba<u8>, alpha: f64) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        plot_pixel(canvas, x0, y0, color, alpha);

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Plot a filled disc centered at (cx, cy).
///
/// Sub-pixel radii still produce a visible dot: the radius is rounded and
/// floored at one pixel.
fn plot_disc(canvas: &mut RgbaImage, cx: i32, cy: i32, radius: f64, color: Rgba<u8>, alpha: f64) {
    let r = (radius.round() as i32).max(1);
    let r_sq = r * r;

    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r_sq {
                plot_pixel(canvas, cx + dx, cy + dy, color, alpha);
            }
        }
    }
}

/// Blend a single pixel onto the canvas; out-of-bounds plots are ignored.
fn plot_pixel(canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, alpha: f64) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }

    let src_alpha = alpha.clamp(0.0, 1.0) * (color[3] as f64 / 255.0);
    if src_alpha <= 0.0 {
        return;
    }

    let dst = *canvas.get_pixel(x as u32, y as u32);
    let blended = alpha_blend(&color, &dst, src_alpha);
    canvas.put_pixel(x as u32, y as u32, blended);
}

/// Alpha-blend source over destination with modified source alpha.
fn alpha_blend(src: &Rgba<u8>, dst: &Rgba<u8>, src_alpha: f64) -> Rgba<u8> {
    let sa = src_alpha;
    let da = dst[3] as f64 / 255.0;

    // Standard "source over" compositing
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |s: u8, d: u8| -> u8 {
        let sf = s as f64 / 255.0;
        let df = d as f64 / 255.0;
        let out = (sf * sa + df * da * (1.0 - sa)) / out_a;
        (out * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldParams, FieldState};

    fn field_with(params: FieldParams, width: u32, height: u32) -> FieldState {
        let mut state = FieldState::new(params);
        state.init(width, height);
        state
    }

    #[test]
    fn test_draw_matches_surface_dimensions() {
        let params = FieldParams { seed: Some(1), count: 20, ..FieldParams::default() };
        let state = field_with(params, 320, 200);
        let frame = draw(&state);
        assert_eq!(frame.width(), 320);
        assert_eq!(frame.height(), 200);
    }

    #[test]
    fn test_draw_uninitialized_field_is_empty() {
        let state = FieldState::new(FieldParams { seed: Some(1), ..FieldParams::default() });
        let frame = draw(&state);
        assert_eq!(frame.width(), 0);
        assert_eq!(frame.height(), 0);
    }

    #[test]
    fn test_empty_pool_renders_pure_background() {
        let params = FieldParams { seed: Some(1), count: 0, ..FieldParams::default() };
        let state = field_with(params, 64, 64);
        let background = state.params().background;

        let frame = draw(&state);
        assert!(frame.pixels().all(|p| *p == background));
    }

    #[test]
    fn test_single_opaque_particle_is_visible() {
        let params = FieldParams {
            seed: Some(3),
            count: 1,
            palette: vec![Rgba([255, 0, 0, 255])],
            background: Rgba([0, 0, 0, 255]),
            min_alpha: 1.0,
            max_alpha: 1.0,
            min_radius: 2.0,
            max_radius: 2.0,
            ..FieldParams::default()
        };
        let state = field_with(params, 100, 100);
        let p = &state.particles()[0];

        let frame = draw(&state);
        // Clamp the sample point: a particle sitting exactly on the far edge
        // still paints the adjacent in-bounds pixels of its disc.
        let sx = (p.x.round() as u32).min(99);
        let sy = (p.y.round() as u32).min(99);
        assert_eq!(*frame.get_pixel(sx, sy), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_links_drawn_between_close_particles() {
        // Invisible discs so only link lines can paint; two particles on a
        // 10x10 surface are always within the default link distance.
        let base = FieldParams {
            seed: Some(4),
            count: 2,
            min_alpha: 0.0,
            max_alpha: 0.0,
            ..FieldParams::default()
        };
        let linked = field_with(base.clone(), 10, 10);
        let muted = field_with(FieldParams { line_alpha: 0.0, ..base }, 10, 10);
        let background = linked.params().background;

        assert_eq!(linked.particles(), muted.particles());
        assert!(draw(&linked).pixels().any(|p| *p != background));
        assert!(draw(&muted).pixels().all(|p| *p == background));
    }

    #[test]
    fn test_draw_is_deterministic() {
        let params = FieldParams { seed: Some(5), count: 40, ..FieldParams::default() };
        let a = field_with(params.clone(), 128, 96);
        let b = field_with(params, 128, 96);
        assert_eq!(draw(&a), draw(&b));
    }

    #[test]
    fn test_plot_pixel_out_of_bounds_ignored() {
        let mut canvas = RgbaImage::new(4, 4);
        plot_pixel(&mut canvas, -1, 0, Rgba([255, 255, 255, 255]), 1.0);
        plot_pixel(&mut canvas, 0, -1, Rgba([255, 255, 255, 255]), 1.0);
        plot_pixel(&mut canvas, 4, 0, Rgba([255, 255, 255, 255]), 1.0);
        plot_pixel(&mut canvas, 0, 4, Rgba([255, 255, 255, 255]), 1.0);
        assert!(canvas.pixels().all(|p| *p == Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn test_plot_line_endpoints() {
        let mut canvas = RgbaImage::new(8, 8);
        plot_line(&mut canvas, (1, 1), (6, 4), Rgba([255, 255, 255, 255]), 1.0);
        assert!(canvas.get_pixel(1, 1)[3] > 0);
        assert!(canvas.get_pixel(6, 4)[3] > 0);
    }

    #[test]
    fn test_plot_disc_subpixel_radius_still_plots() {
        let mut canvas = RgbaImage::new(8, 8);
        plot_disc(&mut canvas, 4, 4, 0.4, Rgba([255, 255, 255, 255]), 1.0);
        assert!(canvas.get_pixel(4, 4)[3] > 0);
    }

    #[test]
    fn test_alpha_blend() {
        // Fully opaque source over transparent destination
        let src = Rgba([255, 0, 0, 255]);
        let dst = Rgba([0, 0, 0, 0]);
        let result = alpha_blend(&src, &dst, 1.0);
        assert_eq!(result, Rgba([255, 0, 0, 255]));

        // Half-opacity source over opaque destination
        let src = Rgba([255, 0, 0, 255]);
        let dst = Rgba([0, 0, 255, 255]);
        let result = alpha_blend(&src, &dst, 0.5);
        assert!(result[0] > 100); // Some red
        assert!(result[2] > 100); // Some blue
        assert_eq!(result[3], 255); // Full alpha
    }

    #[test]
    fn test_translucent_color_channel_scales_alpha() {
        let mut canvas = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        // Alpha 1.0 but a half-transparent color still blends, not overwrites.
        plot_pixel(&mut canvas, 0, 0, Rgba([255, 255, 255, 128]), 1.0);
        let px = canvas.get_pixel(0, 0);
        assert!(px[0] > 0 && px[0] < 255);
    }
}
