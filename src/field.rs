//! Particle field simulation core.
//!
//! Implements the ambient background field: a fixed pool of particles with
//! per-millisecond velocities, stepped once per frame with pointer
//! attraction, constant friction, boundary reflection, and a slow rotation
//! drift around the surface center.
//!
//! # Architecture
//!
//! The field is an instance-owned state machine with no I/O:
//!
//! 1. Build a [`FieldState`] from [`FieldParams`] (usually resolved from a
//!    config file)
//! 2. Call [`FieldState::init`] with the surface dimensions; call it again
//!    whenever the surface is resized (the pool is fully re-randomized)
//! 3. Call [`FieldState::step`] once per frame with the elapsed time and the
//!    current pointer position, if any
//!
//! Rendering lives in [`crate::render`]; hosts (CLI, live terminal) own the
//! frame clock and feed `step` measured deltas.
//!
//! # Example
//!
//! ```
//! use driftfield::field::{FieldParams, FieldState};
//!
//! let params = FieldParams { seed: Some(7), ..FieldParams::default() };
//! let mut field = FieldState::new(params);
//! field.init(320, 200);
//! field.step(16.0, None);
//! assert!(field.particles().iter().all(|p| p.x >= 0.0 && p.x <= 320.0));
//! ```

use image::Rgba;
use std::time::{SystemTime, UNIX_EPOCH};

/// One point in the ambient field.
///
/// Position is bounded to `[0, width] x [0, height]`; velocity is in surface
/// units per millisecond. Radius, alpha, and color are fixed at creation and
/// only read by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Current X position (sub-pixel precision)
    pub x: f64,
    /// Current Y position (sub-pixel precision)
    pub y: f64,
    /// X velocity (units per millisecond)
    pub vx: f64,
    /// Y velocity (units per millisecond)
    pub vy: f64,
    /// Draw radius in pixels
    pub radius: f64,
    /// Draw opacity in [0, 1]
    pub alpha: f64,
    /// Draw color
    pub color: Rgba<u8>,
}

impl Particle {
    /// Returns the velocity magnitude in units per millisecond.
    pub fn speed(&self) -> f64 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }
}

/// Tunable constants for simulation and rendering.
///
/// `Default` carries the stock look: 120 particles, two accent colors on a
/// near-black background, gentle attraction and a barely perceptible swirl.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldParams {
    /// Particle pool size
    pub count: u32,
    /// Initial velocity range, symmetric: each component in [-max, max]
    pub max_speed: f64,
    /// Draw radius range
    pub min_radius: f64,
    /// Draw radius range
    pub max_radius: f64,
    /// Particle opacity range
    pub min_alpha: f64,
    /// Particle opacity range
    pub max_alpha: f64,
    /// Colors particles are drawn with, chosen uniformly at spawn
    pub palette: Vec<Rgba<u8>>,
    /// Surface clear color
    pub background: Rgba<u8>,
    /// Per-step velocity multiplier, in (0, 1]
    pub friction: f64,
    /// Pointer influence radius
    pub attract_radius: f64,
    /// Pointer impulse scale at zero distance
    pub attract_force: f64,
    /// Maximum distance for a connecting line between two particles
    pub link_distance: f64,
    /// Base opacity of connecting lines
    pub line_alpha: f64,
    /// Rotation of the drift field, radians per millisecond
    pub rotation_speed: f64,
    /// Fraction of the rotated position blended in per step
    pub drift_blend: f64,
    /// Position units per (velocity unit x millisecond)
    pub integration_scale: f64,
    /// Upper bound applied to frame deltas before use
    pub max_dt_ms: f64,
    /// RNG seed; `None` seeds from the system clock
    pub seed: Option<u64>,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            count: 120,
            max_speed: 0.35,
            min_radius: 0.5,
            max_radius: 2.0,
            min_alpha: 0.2,
            max_alpha: 0.7,
            palette: vec![Rgba([0x22, 0xd3, 0xee, 0xff]), Rgba([0xec, 0x48, 0x99, 0xff])],
            background: Rgba([0x05, 0x05, 0x0a, 0xff]),
            friction: 0.992,
            attract_radius: 150.0,
            attract_force: 0.012,
            link_distance: 130.0,
            line_alpha: 0.35,
            rotation_speed: 0.00004,
            drift_blend: 0.004,
            integration_scale: 0.06,
            max_dt_ms: 40.0,
            seed: None,
        }
    }
}

/// A simple deterministic PRNG (xorshift64) for reproducible fields.
#[derive(Debug, Clone)]
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        // Ensure non-zero state
        Self { state: if seed == 0 { 0x12345678_9ABCDEF0 } else { seed } }
    }

    /// Generate next u64 value.
    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate a random f64 in [0.0, 1.0).
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a random f64 in [min, max].
    fn range(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_f64()
    }

    /// Generate a random usize in [0, len).
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.next_u64() % len as u64) as usize
    }
}

/// The particle field: pool, clock, and the RNG that seeded it.
///
/// All mutation happens through [`init`](FieldState::init) and
/// [`step`](FieldState::step); the renderer only reads.
#[derive(Debug, Clone)]
pub struct FieldState {
    params: FieldParams,
    particles: Vec<Particle>,
    /// Surface width in units (0 until `init` is called)
    width: f64,
    /// Surface height in units (0 until `init` is called)
    height: f64,
    /// Accumulated drift rotation in radians
    angle: f64,
    rng: Rng,
}

impl FieldState {
    /// Create an empty field. Call [`init`](FieldState::init) before stepping.
    pub fn new(params: FieldParams) -> Self {
        let seed = params.seed.unwrap_or_else(seed_from_clock);
        Self {
            params,
            particles: Vec::new(),
            width: 0.0,
            height: 0.0,
            angle: 0.0,
            rng: Rng::new(seed),
        }
    }

    /// (Re)initialize the pool for a surface of `width` x `height`.
    ///
    /// Allocates the full particle count with random positions, velocities,
    /// radii, alphas, and palette colors. Any existing particles are
    /// discarded; nothing is carried over or interpolated. Zero dimensions
    /// leave the pool empty (the field renders nothing until a valid resize).
    ///
    /// The accumulated drift angle survives reinitialization.
    pub fn init(&mut self, width: u32, height: u32) {
        self.width = width as f64;
        self.height = height as f64;
        self.particles.clear();

        if width == 0 || height == 0 {
            return;
        }

        let count = self.params.count;
        self.particles.reserve(count as usize);
        for _ in 0..count {
            let p = self.spawn_particle();
            self.particles.push(p);
        }
    }

    /// Advance the simulation by `dt_ms` milliseconds.
    ///
    /// `pointer` is the current pointer position in surface units, or `None`
    /// when the pointer is outside the tracking area. The delta is clamped to
    /// [`FieldParams::max_dt_ms`] so stalls (tab switches, suspended
    /// terminals) do not teleport particles.
    ///
    /// Per particle, in order: pointer attraction, friction, integration,
    /// boundary reflection, rotation drift. Finally the drift angle advances
    /// by `rotation_speed * dt`.
    pub fn step(&mut self, dt_ms: f64, pointer: Option<(f64, f64)>) {
        // Degenerate surface: skip the frame's work entirely.
        if self.width <= 0.0 || self.height <= 0.0 {
            return;
        }

        let dt = if dt_ms.is_finite() { dt_ms.clamp(0.0, self.params.max_dt_ms) } else { 0.0 };

        let cx = self.width / 2.0;
        let cy = self.height / 2.0;
        let (sin_a, cos_a) = self.angle.sin_cos();
        let p = &self.params;

        for part in &mut self.particles {
            // 1. Pointer attraction
            if let Some((px, py)) = pointer {
                let dx = px - part.x;
                let dy = py - part.y;
                let dist = (dx * dx + dy * dy).sqrt();
                // Coincident pointer would divide by zero; contributes nothing.
                if dist < p.attract_radius && dist > 1e-6 {
                    let strength = (p.attract_radius - dist) / p.attract_radius * p.attract_force;
                    part.vx += dx / dist * strength;
                    part.vy += dy / dist * strength;
                }
            }

            // 2. Friction: once per step, not scaled by dt
            part.vx *= p.friction;
            part.vy *= p.friction;

            // 3. Integrate position
            part.x += part.vx * dt * p.integration_scale;
            part.y += part.vy * dt * p.integration_scale;

            // 4. Boundary reflection
            if part.x < 0.0 {
                part.x = 0.0;
                part.vx = -part.vx;
            } else if part.x > self.width {
                part.x = self.width;
                part.vx = -part.vx;
            }
            if part.y < 0.0 {
                part.y = 0.0;
                part.vy = -part.vy;
            } else if part.y > self.height {
                part.y = self.height;
                part.vy = -part.vy;
            }

            // 5. Rotation drift: blend a fraction of the position rotated
            //    about the surface center by the accumulated angle
            let ox = part.x - cx;
            let oy = part.y - cy;
            let rx = cx + ox * cos_a - oy * sin_a;
            let ry = cy + ox * sin_a + oy * cos_a;
            part.x += (rx - part.x) * p.drift_blend;
            part.y += (ry - part.y) * p.drift_blend;

            // The drift can nudge a particle just past an edge; re-clamp
            // without reflecting so the bounds invariant holds after every step.
            part.x = part.x.clamp(0.0, self.width);
            part.y = part.y.clamp(0.0, self.height);
        }

        self.angle += p.rotation_speed * dt;
    }

    /// Spawn a single particle with randomized properties.
    fn spawn_particle(&mut self) -> Particle {
        let x = self.rng.range(0.0, self.width);
        let y = self.rng.range(0.0, self.height);
        let vx = self.rng.range(-self.params.max_speed, self.params.max_speed);
        let vy = self.rng.range(-self.params.max_speed, self.params.max_speed);
        let radius = self.rng.range(self.params.min_radius, self.params.max_radius);
        let alpha = self.rng.range(self.params.min_alpha, self.params.max_alpha);
        let color = if self.params.palette.is_empty() {
            Rgba([255, 255, 255, 255])
        } else {
            let idx = self.rng.index(self.params.palette.len());
            self.params.palette[idx]
        };

        Particle { x, y, vx, vy, radius, alpha, color }
    }

    /// The current particle pool (empty before `init`).
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// The accumulated drift angle in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Surface width in units.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Surface height in units.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// The parameters this field was built with.
    pub fn params(&self) -> &FieldParams {
        &self.params
    }
}

/// Clock-derived seed for unseeded fields.
fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED_F1E1D)
}
