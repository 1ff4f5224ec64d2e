//! Check command implementation

use std::path::Path;
use std::process::ExitCode;

use serde::Serialize;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::config::{find_config, ConfigValidationError, FieldConfig};

/// Validation summary, printable as text or JSON
#[derive(Debug, Serialize)]
struct CheckReport {
    /// Config file that was checked, `None` for built-in defaults
    config: Option<String>,
    valid: bool,
    count: u32,
    palette: Vec<String>,
    seed: Option<u64>,
    errors: Vec<ConfigValidationError>,
}

fn build_report(config: &FieldConfig, source: Option<&Path>) -> CheckReport {
    let errors = config.validate();
    CheckReport {
        config: source.map(|p| p.display().to_string()),
        valid: errors.is_empty(),
        count: config.count,
        palette: config.palette.clone(),
        seed: config.seed,
        errors,
    }
}

/// Execute the check command
pub fn run_check(config_arg: Option<&Path>, json: bool) -> ExitCode {
    let source = config_arg.map(Path::to_path_buf).or_else(find_config);

    // Parse without bailing on validation errors so every problem is reported
    let config = match &source {
        Some(path) => {
            let contents = match std::fs::read_to_string(path) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error: Failed to read {}: {}", path.display(), e);
                    return ExitCode::from(EXIT_ERROR);
                }
            };
            match toml::from_str::<FieldConfig>(&contents) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error: Failed to parse {}: {}", path.display(), e);
                    return ExitCode::from(EXIT_INVALID_ARGS);
                }
            }
        }
        None => FieldConfig::default(),
    };

    let report = build_report(&config, source.as_deref());

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        match &report.config {
            Some(path) => println!("Config: {}", path),
            None => println!("Config: (built-in defaults)"),
        }
        if report.valid {
            println!(
                "OK - {} particles, {} color{}, seed {}",
                report.count,
                report.palette.len(),
                if report.palette.len() == 1 { "" } else { "s" },
                match report.seed {
                    Some(s) => s.to_string(),
                    None => "from clock".to_string(),
                }
            );
        } else {
            for error in &report.errors {
                eprintln!("Error: {}", error);
            }
        }
    }

    if report.valid {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_INVALID_ARGS)
    }
}
