//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod check;
mod init;
mod live;
mod render;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{find_config, load_config, ConfigError, FieldConfig};

pub use render::OutputFormat;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Load the field config, resolving which file to use.
///
/// An explicit path wins, then the nearest `drift.toml`, then built-in
/// defaults. The returned path is the file actually loaded, `None` when
/// defaults were used.
pub(crate) fn load_field_config(
    path: Option<&Path>,
) -> Result<(FieldConfig, Option<PathBuf>), ConfigError> {
    match path.map(Path::to_path_buf).or_else(find_config) {
        Some(p) => load_config(Some(&p)).map(|config| (config, Some(p))),
        None => Ok((FieldConfig::default(), None)),
    }
}

/// Map a config error to the exit code contract.
///
/// Unreadable files are runtime errors; unparseable or invalid configs count
/// as invalid input.
pub(crate) fn config_exit_code(error: &ConfigError) -> u8 {
    match error {
        ConfigError::Io(_) => EXIT_ERROR,
        _ => EXIT_INVALID_ARGS,
    }
}

/// Driftfield - ambient particle-field simulator and renderer
#[derive(Parser)]
#[command(name = "drift")]
#[command(about = "Driftfield - simulate an ambient particle field and render it to PNG, GIF or the terminal")]
#[command(version)]
pub struct Cli {
    /// Config file (default: nearest drift.toml, else built-in defaults)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate the field offline and write PNG frames, an animated GIF, or an ANSI preview
    Render {
        /// Surface width in pixels
        #[arg(long, default_value = "800", value_parser = clap::value_parser!(u32).range(1..))]
        width: u32,

        /// Surface height in pixels
        #[arg(long, default_value = "600", value_parser = clap::value_parser!(u32).range(1..))]
        height: u32,

        /// Number of frames to simulate
        #[arg(short = 'n', long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        frames: u32,

        /// Milliseconds of simulated time per frame
        #[arg(long, default_value = "16")]
        dt: f64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "png")]
        format: OutputFormat,

        /// Output file or directory.
        /// If omitted: drift.png (single), drift_0000.png... (sequence), drift.gif
        /// If directory (ends with /): dir/frame_0000.png
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Scale output by integer factor (1-128, default: 1)
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=128))]
        scale: u8,

        /// Override the config seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Pin a synthetic pointer at X,Y for the whole run (e.g. --pointer 400,300)
        #[arg(long, value_name = "X,Y")]
        pointer: Option<String>,

        /// Play the GIF once instead of looping
        #[arg(long)]
        no_loop: bool,

        /// Re-render whenever the config file changes
        #[arg(short, long)]
        watch: bool,

        /// Report each frame as it is rendered
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run the field interactively in the terminal (mouse steers the pointer)
    Live {
        /// Target frames per second
        #[arg(long, default_value = "30", value_parser = clap::value_parser!(u32).range(1..=120))]
        fps: u32,
    },

    /// Write a commented default drift.toml
    Init {
        /// Target file or directory (default: ./drift.toml)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Load the config and report validation results
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Render {
            width,
            height,
            frames,
            dt,
            format,
            output,
            scale,
            seed,
            pointer,
            no_loop,
            watch,
            verbose,
        } => render::run_render(
            config,
            width,
            height,
            frames,
            dt,
            format,
            output.as_deref(),
            scale,
            seed,
            pointer.as_deref(),
            no_loop,
            watch,
            verbose,
        ),
        Commands::Live { fps } => live::run_live(config, fps),
        Commands::Init { path, force } => init::run_init(path.as_deref(), force),
        Commands::Check { json } => check::run_check(config, json),
    }
}
