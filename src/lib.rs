//! Driftfield - ambient particle-field simulation and rendering
//!
//! This library provides functionality to:
//! - Simulate a fixed pool of drifting particles with pointer attraction,
//!   friction, boundary reflection, and rotation drift
//! - Render field states to RGBA images, PNG/GIF files, or ANSI terminal art
//! - Load field parameters from drift.toml

pub mod cli;
pub mod color;
pub mod config;
pub mod field;
pub mod gif;
pub mod live;
pub mod output;
pub mod render;
pub mod terminal;
pub mod watch;
