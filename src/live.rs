//! Live terminal mode
//!
//! Runs the field interactively in the terminal: raw mode plus alternate
//! screen, mouse movement steering the pointer attractor, and half-block
//! frames redrawn at a fixed cadence. The last text row is a status bar.
//!
//! Cell mapping: one text column is one pixel wide, one text row is two
//! pixels tall (the half-block encoding in [`crate::terminal`]).

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::cursor;
use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyCode, KeyEvent, KeyModifiers, MouseEventKind,
};
use crossterm::terminal::{self, ClearType};
use crossterm::{execute, queue};

use crate::field::{FieldParams, FieldState};

/// Error during live mode
#[derive(Debug)]
pub enum LiveError {
    /// Stdout is not an interactive terminal
    NotATty,
    /// Terminal I/O failed
    Io(io::Error),
}

impl std::fmt::Display for LiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LiveError::NotATty => write!(f, "Live mode requires an interactive terminal"),
            LiveError::Io(e) => write!(f, "Terminal I/O error: {}", e),
        }
    }
}

impl std::error::Error for LiveError {}

impl From<io::Error> for LiveError {
    fn from(e: io::Error) -> Self {
        LiveError::Io(e)
    }
}

/// Options for live mode
#[derive(Debug, Clone)]
pub struct LiveOptions {
    /// Target frames per second
    pub target_fps: u32,
}

impl Default for LiveOptions {
    fn default() -> Self {
        Self { target_fps: 30 }
    }
}

/// Map a terminal size to field pixel dimensions.
///
/// The bottom row is reserved for the status bar; every other row carries
/// two pixel rows.
fn field_dimensions(cols: u16, rows: u16) -> (u32, u32) {
    let width = cols as u32;
    let height = rows.saturating_sub(1) as u32 * 2;
    (width, height)
}

/// Map a mouse cell position to field pixel coordinates
fn cell_to_pixel(column: u16, row: u16) -> (f64, f64) {
    (column as f64, row as f64 * 2.0)
}

fn is_quit_key(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Run the field live in the terminal until the user quits.
///
/// Blocks until `q`, `Esc` or Ctrl+C. Mouse movement sets the pointer
/// attractor, losing focus releases it, and resizing the terminal
/// re-initializes the field at the new dimensions.
///
/// # Arguments
/// * `params` - Field parameters, usually from a resolved config
/// * `options` - Live mode options
///
/// # Returns
/// * `Err(LiveError::NotATty)` when stdout is not a terminal
pub fn run_live(params: FieldParams, options: LiveOptions) -> Result<(), LiveError> {
    if !atty::is(atty::Stream::Stdout) {
        return Err(LiveError::NotATty);
    }

    let (cols, rows) = terminal::size()?;
    let (width, height) = field_dimensions(cols, rows);

    let mut field = FieldState::new(params);
    field.init(width, height);

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        EnableMouseCapture,
        EnableFocusChange,
        terminal::Clear(ClearType::All)
    )?;

    let result = run_live_loop(&mut field, &mut stdout, &options);

    // Restore the terminal even when the loop failed
    let _ = execute!(
        stdout,
        DisableFocusChange,
        DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show
    );
    let _ = terminal::disable_raw_mode();

    result
}

fn run_live_loop(
    field: &mut FieldState,
    stdout: &mut io::Stdout,
    options: &LiveOptions,
) -> Result<(), LiveError> {
    let frame_budget = Duration::from_millis(1000 / options.target_fps.max(1) as u64);
    let mut pointer: Option<(f64, f64)> = None;
    let mut last_frame = Instant::now();

    draw_frame(field, stdout)?;

    loop {
        // The event poll doubles as the frame pacer
        let timeout = frame_budget.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if is_quit_key(key) => break,
                Event::Mouse(mouse) => {
                    if matches!(
                        mouse.kind,
                        MouseEventKind::Moved
                            | MouseEventKind::Drag(_)
                            | MouseEventKind::Down(_)
                    ) {
                        pointer = Some(cell_to_pixel(mouse.column, mouse.row));
                    }
                }
                Event::FocusLost => pointer = None,
                Event::Resize(cols, rows) => {
                    let (width, height) = field_dimensions(cols, rows);
                    field.init(width, height);
                    pointer = None;
                    execute!(stdout, terminal::Clear(ClearType::All))?;
                }
                _ => {}
            }
            continue;
        }

        let now = Instant::now();
        let dt_ms = (now - last_frame).as_secs_f64() * 1000.0;
        last_frame = now;

        field.step(dt_ms, pointer);
        draw_frame(field, stdout)?;
    }

    Ok(())
}

fn draw_frame(field: &FieldState, stdout: &mut io::Stdout) -> Result<(), LiveError> {
    let image = crate::render::draw(field);
    let ansi = crate::terminal::render_image_ansi(&image);

    // '\n' does not return the carriage in raw mode, so position each line
    for (row, line) in ansi.lines().enumerate() {
        queue!(stdout, cursor::MoveTo(0, row as u16))?;
        write!(stdout, "{}", line)?;
    }

    let (_, rows) = terminal::size()?;
    queue!(stdout, cursor::MoveTo(0, rows.saturating_sub(1)))?;
    queue!(stdout, terminal::Clear(ClearType::CurrentLine))?;
    write!(
        stdout,
        "\x1b[7m drift | {}x{} | {} particles | q quit \x1b[0m",
        field.width() as u32,
        field.height() as u32,
        field.particles().len()
    )?;

    stdout.flush()?;
    Ok(())
}
