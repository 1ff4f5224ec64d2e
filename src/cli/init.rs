//! Init command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::config::{CONFIG_FILE_NAME, DEFAULT_CONFIG_TEMPLATE};

/// Resolve the file `drift init` writes to
fn config_target(path: Option<&Path>) -> PathBuf {
    match path {
        Some(p) if p.is_dir() || p.to_string_lossy().ends_with('/') => p.join(CONFIG_FILE_NAME),
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(CONFIG_FILE_NAME),
    }
}

/// Execute the init command
pub fn run_init(path: Option<&Path>, force: bool) -> ExitCode {
    let target = config_target(path);

    if target.exists() && !force {
        eprintln!("Error: {} already exists", target.display());
        eprintln!("Use --force to overwrite");
        return ExitCode::from(EXIT_ERROR);
    }

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: Failed to create {}: {}", parent.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    match std::fs::write(&target, DEFAULT_CONFIG_TEMPLATE) {
        Ok(()) => {
            println!("Created {}", target.display());
            println!();
            println!("Next steps:");
            println!("  drift check");
            println!("  drift render --frames 90 --format gif");
            println!("  drift live");
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: Failed to write {}: {}", target.display(), e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
