//! Render command implementation

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use image::RgbaImage;
use rayon::prelude::*;

use super::{config_exit_code, load_field_config, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::config::{find_config, ConfigError, CONFIG_FILE_NAME};
use crate::field::FieldState;
use crate::output::{frame_output_path, save_png, scale_image};
use crate::watch::{watch_and_render, RenderReport, WatchOptions};

/// Offline output encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// PNG frame files
    Png,
    /// Animated GIF
    Gif,
    /// ANSI preview of the final frame on stdout
    Ansi,
}

/// Everything a single render pass needs besides the config
struct RenderJob {
    width: u32,
    height: u32,
    frames: u32,
    dt: f64,
    format: OutputFormat,
    output: Option<PathBuf>,
    scale: u8,
    seed: Option<u64>,
    pointer: Option<(f64, f64)>,
    loop_gif: bool,
    verbose: bool,
}

#[derive(Debug)]
enum RenderError {
    Config(ConfigError),
    Output(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Config(e) => write!(f, "{}", e),
            RenderError::Output(msg) => write!(f, "{}", msg),
        }
    }
}

/// Parse a "X,Y" pointer argument
fn parse_pointer(s: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return Err(format!("Invalid pointer '{}': expected X,Y", s));
    }
    let x = parts[0]
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Invalid pointer x coordinate '{}'", parts[0]))?;
    let y = parts[1]
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Invalid pointer y coordinate '{}'", parts[1]))?;
    if !x.is_finite() || !y.is_finite() {
        return Err(format!("Invalid pointer '{}': coordinates must be finite", s));
    }
    Ok((x, y))
}

/// Resolve the output path for GIF encoding
fn gif_output_path(output: Option<&Path>) -> PathBuf {
    match output {
        Some(p) if p.is_dir() || p.to_string_lossy().ends_with('/') => p.join("drift.gif"),
        Some(p) => p.to_path_buf(),
        None => PathBuf::from("drift.gif"),
    }
}

/// Execute the render command
#[allow(clippy::too_many_arguments)]
pub fn run_render(
    config: Option<&Path>,
    width: u32,
    height: u32,
    frames: u32,
    dt: f64,
    format: OutputFormat,
    output: Option<&Path>,
    scale: u8,
    seed: Option<u64>,
    pointer: Option<&str>,
    no_loop: bool,
    watch: bool,
    verbose: bool,
) -> ExitCode {
    if !dt.is_finite() || dt <= 0.0 {
        eprintln!("Error: --dt must be a positive number of milliseconds");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let pointer = match pointer.map(parse_pointer).transpose() {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let job = RenderJob {
        width,
        height,
        frames,
        dt,
        format,
        output: output.map(Path::to_path_buf),
        scale,
        seed,
        pointer,
        loop_gif: !no_loop,
        verbose,
    };

    if watch {
        // Watch mode needs a real file to observe
        let config_path = match config.map(Path::to_path_buf).or_else(find_config) {
            Some(p) => p,
            None => {
                eprintln!("Error: No {} found to watch", CONFIG_FILE_NAME);
                eprintln!("Run 'drift init' to create one");
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        };

        let options = WatchOptions { config_path, ..Default::default() };
        match watch_and_render(options, |path| {
            render_pass(Some(path), &job).map_err(|e| e.to_string())
        }) {
            Ok(()) => ExitCode::from(EXIT_SUCCESS),
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        }
    } else {
        match render_pass(config, &job) {
            Ok(report) => {
                println!(
                    "Rendered {} frame{} to {}",
                    report.frames_written,
                    if report.frames_written == 1 { "" } else { "s" },
                    report.destination
                );
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(RenderError::Config(e)) => {
                eprintln!("Error: {}", e);
                ExitCode::from(config_exit_code(&e))
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        }
    }
}

/// Load the config, simulate, and write output in the requested format
fn render_pass(config_path: Option<&Path>, job: &RenderJob) -> Result<RenderReport, RenderError> {
    let (config, _source) = load_field_config(config_path).map_err(RenderError::Config)?;
    let mut params = config.resolve().map_err(RenderError::Config)?;
    if let Some(seed) = job.seed {
        params.seed = Some(seed);
    }

    if job.dt > params.max_dt_ms {
        eprintln!(
            "Warning: --dt {} exceeds max_dt_ms {}; steps are clamped",
            job.dt, params.max_dt_ms
        );
    }

    let mut field = FieldState::new(params);
    field.init(job.width, job.height);

    match job.format {
        OutputFormat::Png => render_png_frames(&mut field, job),
        OutputFormat::Gif => render_gif_animation(&mut field, job),
        OutputFormat::Ansi => render_ansi_preview(&mut field, job),
    }
}

/// Step the field once per frame and collect the drawn (optionally scaled) frames
fn simulate_frames(field: &mut FieldState, job: &RenderJob) -> Vec<RgbaImage> {
    let mut frames = Vec::with_capacity(job.frames as usize);
    for i in 0..job.frames {
        field.step(job.dt, job.pointer);
        let mut image = crate::render::draw(field);
        if job.scale > 1 {
            image = scale_image(image, job.scale);
        }
        if job.verbose {
            eprintln!("Rendered frame {}/{}", i + 1, job.frames);
        }
        frames.push(image);
    }
    frames
}

fn render_png_frames(field: &mut FieldState, job: &RenderJob) -> Result<RenderReport, RenderError> {
    let frames = simulate_frames(field, job);
    let total = frames.len() as u32;

    // Encoding dominates multi-frame renders; save in parallel
    frames.par_iter().enumerate().try_for_each(|(i, image)| {
        let path = frame_output_path(job.output.as_deref(), i as u32, total);
        save_png(image, &path).map_err(|e| RenderError::Output(e.to_string()))
    })?;

    let destination = if total == 1 {
        frame_output_path(job.output.as_deref(), 0, 1).display().to_string()
    } else {
        let first = frame_output_path(job.output.as_deref(), 0, total);
        match first.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => format!("{}/", dir.display()),
            _ => "./".to_string(),
        }
    };

    Ok(RenderReport {
        frames_written: total as usize,
        destination,
        duration: Duration::ZERO,
    })
}

fn render_gif_animation(
    field: &mut FieldState,
    job: &RenderJob,
) -> Result<RenderReport, RenderError> {
    let frames = simulate_frames(field, job);
    let path = gif_output_path(job.output.as_deref());
    let delay_ms = job.dt.round().max(1.0) as u32;

    crate::gif::render_gif(&frames, delay_ms, job.loop_gif, &path)
        .map_err(|e| RenderError::Output(e.to_string()))?;

    Ok(RenderReport {
        frames_written: frames.len(),
        destination: path.display().to_string(),
        duration: Duration::ZERO,
    })
}

fn render_ansi_preview(
    field: &mut FieldState,
    job: &RenderJob,
) -> Result<RenderReport, RenderError> {
    for i in 0..job.frames {
        field.step(job.dt, job.pointer);
        if job.verbose {
            eprintln!("Simulated frame {}/{}", i + 1, job.frames);
        }
    }

    let mut image = crate::render::draw(field);
    if job.scale > 1 {
        image = scale_image(image, job.scale);
    }

    if atty::is(atty::Stream::Stdout) {
        if let Ok((cols, _)) = crossterm::terminal::size() {
            if image.width() > cols as u32 {
                eprintln!(
                    "Warning: frame is wider than the terminal ({} > {} columns); pass --width to fit",
                    image.width(),
                    cols
                );
            }
        }
    }

    let ansi = crate::terminal::render_image_ansi(&image);
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(ansi.as_bytes())
        .and_then(|_| handle.flush())
        .map_err(|e| RenderError::Output(e.to_string()))?;

    Ok(RenderReport {
        frames_written: 1,
        destination: "stdout".to_string(),
        duration: Duration::ZERO,
    })
}
