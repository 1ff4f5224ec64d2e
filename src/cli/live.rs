//! Live command implementation

use std::path::Path;
use std::process::ExitCode;

use super::{config_exit_code, load_field_config, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::live::{LiveError, LiveOptions};

/// Execute the live command
pub fn run_live(config: Option<&Path>, fps: u32) -> ExitCode {
    let (config, _source) = match load_field_config(config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(config_exit_code(&e));
        }
    };

    let params = match config.resolve() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(config_exit_code(&e));
        }
    };

    match crate::live::run_live(params, LiveOptions { target_fps: fps }) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e @ LiveError::NotATty) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_INVALID_ARGS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
