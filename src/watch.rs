//! Watch mode for automatic re-renders on config changes
//!
//! Backs `drift render --watch`: render once, then re-render on each
//! debounced change to the config file. The watcher observes the config
//! file's parent directory so that editors which save via rename-and-replace
//! still trigger.

use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant, SystemTime};
use thiserror::Error;

/// Error during watch mode
#[derive(Debug, Error)]
pub enum WatchError {
    /// The file watcher could not be set up
    #[error("Failed to initialize file watcher: {0}")]
    WatcherInit(notify::Error),
    /// The config directory could not be watched
    #[error("Failed to watch path: {0}")]
    WatchPath(notify::Error),
    /// The debouncer's event channel closed
    #[error("Watch channel error: {0}")]
    ChannelError(String),
    /// No config file to observe
    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),
}

/// Options for watch mode
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Config file to watch
    pub config_path: PathBuf,
    /// Debounce window in milliseconds
    pub debounce_ms: u64,
    /// Clear the screen before each render
    pub clear_screen: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(crate::config::CONFIG_FILE_NAME),
            debounce_ms: 100,
            clear_screen: true,
        }
    }
}

/// Result of a single render pass under watch mode
#[derive(Debug)]
pub struct RenderReport {
    /// Number of frames written
    pub frames_written: usize,
    /// Human-readable destination ("drift.png", "frames/", ...)
    pub destination: String,
    /// Render duration
    pub duration: Duration,
}

/// Clear the screen and home the cursor
fn clear_screen() {
    print!("\x1B[2J\x1B[1;1H");
}

/// Render a duration as "340ms" below a second, "1.24s" above
fn format_duration(duration: Duration) -> String {
    if duration < Duration::from_secs(1) {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

/// Wall-clock HH:MM:SS stamp for status lines
fn timestamp() -> String {
    let since_midnight = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        % 86_400;
    format!(
        "{:02}:{:02}:{:02}",
        since_midnight / 3600,
        since_midnight / 60 % 60,
        since_midnight % 60
    )
}

/// Perform a single timed render pass.
///
/// Called on startup and after each config change.
pub fn do_render<F>(config_path: &Path, render_fn: F) -> Result<RenderReport, String>
where
    F: FnOnce(&Path) -> Result<RenderReport, String>,
{
    let start = Instant::now();
    let mut report = render_fn(config_path)?;
    report.duration = start.elapsed();
    Ok(report)
}

/// Whether a debounced event touches the watched config file.
///
/// Compared by file name only: rename-over saves report the final name from
/// a temp path.
fn is_config_event(event_path: &Path, config_path: &Path) -> bool {
    match (event_path.file_name(), config_path.file_name()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn print_report(report: &RenderReport) {
    println!(
        "[{}] Rendered {} frame{} to {} ({})",
        timestamp(),
        report.frames_written,
        if report.frames_written == 1 { "" } else { "s" },
        report.destination,
        format_duration(report.duration)
    );
}

/// Run one render pass and report the outcome on stdout/stderr.
fn render_and_report<F>(options: &WatchOptions, render_fn: F)
where
    F: FnOnce(&Path) -> Result<RenderReport, String>,
{
    if options.clear_screen {
        clear_screen();
    }
    println!("[{}] Rendering...", timestamp());
    match do_render(&options.config_path, render_fn) {
        Ok(report) => print_report(&report),
        Err(msg) => eprintln!("[{}] Error: {}", timestamp(), msg),
    }
    println!("[{}] Watching {} for changes...", timestamp(), options.config_path.display());
}

/// Watch the config file and re-render automatically.
///
/// Blocks until interrupted (Ctrl+C). A render failure is reported and
/// watching continues, so a half-saved config does not kill the session.
pub fn watch_and_render<F>(options: WatchOptions, mut render_fn: F) -> Result<(), WatchError>
where
    F: FnMut(&Path) -> Result<RenderReport, String>,
{
    if !options.config_path.exists() {
        return Err(WatchError::ConfigNotFound(options.config_path.clone()));
    }

    // Watch the parent directory so rename-over saves are seen
    let watch_dir = options
        .config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let (tx, rx) = channel();
    let mut debouncer =
        new_debouncer(Duration::from_millis(options.debounce_ms), tx).map_err(WatchError::WatcherInit)?;
    debouncer
        .watcher()
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .map_err(WatchError::WatchPath)?;

    render_and_report(&options, &mut render_fn);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|e| {
                    matches!(e.kind, DebouncedEventKind::Any)
                        && is_config_event(&e.path, &options.config_path)
                });
                if relevant {
                    render_and_report(&options, &mut render_fn);
                }
            }
            Ok(Err(error)) => {
                // Non-fatal watcher hiccup; keep the session alive
                eprintln!("[{}] Watch error: {:?}", timestamp(), error);
            }
            Err(e) => return Err(WatchError::ChannelError(e.to_string())),
        }
    }
}
