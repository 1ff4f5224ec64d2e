//! Configuration loading and validation for `drift.toml`
//!
//! A flat table of field parameters; every key is optional and defaults to
//! the stock look. Unknown keys are rejected so typos surface instead of
//! silently falling back.

use crate::color::{parse_color, ColorError};
use crate::field::FieldParams;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for when no explicit config path is given.
pub const CONFIG_FILE_NAME: &str = "drift.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse drift.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Color parsing error
    #[error("Invalid color in config: {0}")]
    Color(#[from] ColorError),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

fn default_count() -> u32 {
    120
}

fn default_max_speed() -> f64 {
    0.35
}

fn default_min_radius() -> f64 {
    0.5
}

fn default_max_radius() -> f64 {
    2.0
}

fn default_min_alpha() -> f64 {
    0.2
}

fn default_max_alpha() -> f64 {
    0.7
}

fn default_palette() -> Vec<String> {
    vec!["#22d3ee".to_string(), "#ec4899".to_string()]
}

fn default_background() -> String {
    "#05050a".to_string()
}

fn default_friction() -> f64 {
    0.992
}

fn default_attract_radius() -> f64 {
    150.0
}

fn default_attract_force() -> f64 {
    0.012
}

fn default_link_distance() -> f64 {
    130.0
}

fn default_line_alpha() -> f64 {
    0.35
}

fn default_rotation_speed() -> f64 {
    0.00004
}

fn default_drift_blend() -> f64 {
    0.004
}

fn default_integration_scale() -> f64 {
    0.06
}

fn default_max_dt_ms() -> f64 {
    40.0
}

/// Complete drift.toml configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    /// Particle pool size
    #[serde(default = "default_count")]
    pub count: u32,
    /// Initial velocity range, symmetric: each component in [-max, max] units/ms
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
    /// Draw radius range in pixels
    #[serde(default = "default_min_radius")]
    pub min_radius: f64,
    /// Draw radius range in pixels
    #[serde(default = "default_max_radius")]
    pub max_radius: f64,
    /// Particle opacity range
    #[serde(default = "default_min_alpha")]
    pub min_alpha: f64,
    /// Particle opacity range
    #[serde(default = "default_max_alpha")]
    pub max_alpha: f64,
    /// Hex colors particles spawn with, chosen uniformly
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    /// Surface clear color (hex)
    #[serde(default = "default_background")]
    pub background: String,
    /// Per-step velocity multiplier, in (0, 1]
    #[serde(default = "default_friction")]
    pub friction: f64,
    /// Pointer influence radius
    #[serde(default = "default_attract_radius")]
    pub attract_radius: f64,
    /// Pointer impulse scale at zero distance
    #[serde(default = "default_attract_force")]
    pub attract_force: f64,
    /// Maximum distance for a connecting line between two particles
    #[serde(default = "default_link_distance")]
    pub link_distance: f64,
    /// Base opacity of connecting lines
    #[serde(default = "default_line_alpha")]
    pub line_alpha: f64,
    /// Drift field rotation in radians per millisecond
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f64,
    /// Fraction of the rotated position blended in per step
    #[serde(default = "default_drift_blend")]
    pub drift_blend: f64,
    /// Position units per (velocity unit x millisecond)
    #[serde(default = "default_integration_scale")]
    pub integration_scale: f64,
    /// Upper bound applied to frame deltas before use
    #[serde(default = "default_max_dt_ms")]
    pub max_dt_ms: f64,
    /// Random seed for reproducible fields
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            max_speed: default_max_speed(),
            min_radius: default_min_radius(),
            max_radius: default_max_radius(),
            min_alpha: default_min_alpha(),
            max_alpha: default_max_alpha(),
            palette: default_palette(),
            background: default_background(),
            friction: default_friction(),
            attract_radius: default_attract_radius(),
            attract_force: default_attract_force(),
            link_distance: default_link_distance(),
            line_alpha: default_line_alpha(),
            rotation_speed: default_rotation_speed(),
            drift_blend: default_drift_blend(),
            integration_scale: default_integration_scale(),
            max_dt_ms: default_max_dt_ms(),
            seed: None,
        }
    }
}

/// Configuration validation error
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValidationError {
    /// Name of the invalid field (e.g., "palette[1]")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "drift.toml: '{}' {}", self.field, self.message)
    }
}

impl FieldConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        let mut err = |field: &str, message: &str| {
            errors.push(ConfigValidationError {
                field: field.to_string(),
                message: message.to_string(),
            });
        };

        if self.count == 0 {
            err("count", "must be a positive integer");
        }

        if !self.max_speed.is_finite() || self.max_speed < 0.0 {
            err("max_speed", "must be a non-negative number");
        }

        if !self.min_radius.is_finite() || self.min_radius < 0.0 {
            err("min_radius", "must be a non-negative number");
        }
        if !self.max_radius.is_finite() || self.max_radius < 0.0 {
            err("max_radius", "must be a non-negative number");
        } else if self.min_radius.is_finite() && self.min_radius > self.max_radius {
            err("min_radius", "must not exceed max_radius");
        }

        if !self.min_alpha.is_finite() || self.min_alpha < 0.0 || self.min_alpha > 1.0 {
            err("min_alpha", "must be in [0, 1]");
        }
        if !self.max_alpha.is_finite() || self.max_alpha < 0.0 || self.max_alpha > 1.0 {
            err("max_alpha", "must be in [0, 1]");
        } else if self.min_alpha.is_finite() && self.min_alpha > self.max_alpha {
            err("min_alpha", "must not exceed max_alpha");
        }

        if self.palette.is_empty() {
            err("palette", "must contain at least one color");
        }
        for (i, color) in self.palette.iter().enumerate() {
            if let Err(e) = parse_color(color) {
                err(&format!("palette[{}]", i), &e.to_string());
            }
        }

        if let Err(e) = parse_color(&self.background) {
            err("background", &e.to_string());
        }

        if !self.friction.is_finite() || self.friction <= 0.0 || self.friction > 1.0 {
            err("friction", "must be in (0, 1]");
        }

        if !self.attract_radius.is_finite() || self.attract_radius < 0.0 {
            err("attract_radius", "must be a non-negative number");
        }
        if !self.attract_force.is_finite() || self.attract_force < 0.0 {
            err("attract_force", "must be a non-negative number");
        }

        if !self.link_distance.is_finite() || self.link_distance < 0.0 {
            err("link_distance", "must be a non-negative number");
        }
        if !self.line_alpha.is_finite() || self.line_alpha < 0.0 || self.line_alpha > 1.0 {
            err("line_alpha", "must be in [0, 1]");
        }

        if !self.rotation_speed.is_finite() {
            err("rotation_speed", "must be a finite number");
        }
        if !self.drift_blend.is_finite() || self.drift_blend < 0.0 || self.drift_blend > 1.0 {
            err("drift_blend", "must be in [0, 1]");
        }

        if !self.integration_scale.is_finite() || self.integration_scale <= 0.0 {
            err("integration_scale", "must be a positive number");
        }
        if !self.max_dt_ms.is_finite() || self.max_dt_ms <= 0.0 {
            err("max_dt_ms", "must be a positive number");
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Validate and resolve into simulation parameters (colors parsed).
    pub fn resolve(&self) -> Result<FieldParams, ConfigError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(ConfigError::Validation(
                errors.into_iter().map(|e| e.to_string()).collect(),
            ));
        }

        let palette =
            self.palette.iter().map(|s| parse_color(s)).collect::<Result<Vec<_>, _>>()?;
        let background = parse_color(&self.background)?;

        Ok(FieldParams {
            count: self.count,
            max_speed: self.max_speed,
            min_radius: self.min_radius,
            max_radius: self.max_radius,
            min_alpha: self.min_alpha,
            max_alpha: self.max_alpha,
            palette,
            background,
            friction: self.friction,
            attract_radius: self.attract_radius,
            attract_force: self.attract_force,
            link_distance: self.link_distance,
            line_alpha: self.line_alpha,
            rotation_speed: self.rotation_speed,
            drift_blend: self.drift_blend,
            integration_scale: self.integration_scale,
            max_dt_ms: self.max_dt_ms,
            seed: self.seed,
        })
    }
}

/// Find drift.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for drift.toml
/// 2. Check XDG_CONFIG_HOME/driftfield/drift.toml (or ~/.config/driftfield/drift.toml)
///
/// # Returns
/// - `Some(path)` if a drift.toml file is found
/// - `None` if no config file is found
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find drift.toml in XDG config directory.
fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("driftfield").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find drift.toml by walking up from a specific directory.
///
/// This is the internal implementation that allows specifying the start
/// directory, useful for testing.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a drift.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses
/// [`find_config`] to locate one. If no config file is found, returns the
/// default configuration.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&Path>) -> Result<FieldConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(FieldConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<FieldConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: FieldConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Annotated default configuration, written by `drift init`.
///
/// Parses back to `FieldConfig::default()`; a test keeps them in sync.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r##"# driftfield configuration
# Every key is optional; the values below are the defaults.

# Particle pool size.
count = 120

# Initial velocity range: each component is drawn from [-max_speed, max_speed],
# in surface units per millisecond.
max_speed = 0.35

# Draw radius range in pixels.
min_radius = 0.5
max_radius = 2.0

# Particle opacity range.
min_alpha = 0.2
max_alpha = 0.7

# Colors particles spawn with, chosen uniformly. Hex only.
palette = ["#22d3ee", "#ec4899"]

# Surface clear color.
background = "#05050a"

# Per-step velocity multiplier, in (0, 1]. Applied once per frame.
friction = 0.992

# Pointer influence radius and impulse scale.
attract_radius = 150.0
attract_force = 0.012

# Connection lines: maximum distance and base opacity.
link_distance = 130.0
line_alpha = 0.35

# Drift swirl: field rotation in radians per millisecond, and the fraction of
# the rotated position blended into each particle per step.
rotation_speed = 0.00004
drift_blend = 0.004

# Position units advanced per (velocity unit x millisecond).
integration_scale = 0.06

# Frame deltas are clamped to this many milliseconds.
max_dt_ms = 40.0

# Uncomment for reproducible runs.
# seed = 42
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_parses_to_defaults() {
        let config: FieldConfig = toml::from_str("").unwrap();
        assert_eq!(config, FieldConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let toml = r#"
count = 10
friction = 0.9
"#;
        let config: FieldConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.count, 10);
        assert_eq!(config.friction, 0.9);
        assert_eq!(config.link_distance, 130.0);
        assert_eq!(config.palette.len(), 2);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<FieldConfig, _> = toml::from_str("particle_count = 10");
        assert!(result.is_err());
    }

    #[test]
    fn test_template_matches_defaults() {
        let config: FieldConfig = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, FieldConfig::default());
    }

    #[test]
    fn test_default_resolves_to_default_params() {
        let params = FieldConfig::default().resolve().unwrap();
        assert_eq!(params, FieldParams::default());
    }

    #[test]
    fn test_resolve_parses_colors() {
        let toml = r##"
palette = ["#f00", "#00ff00"]
background = "#000"
"##;
        let config: FieldConfig = toml::from_str(toml).unwrap();
        let params = config.resolve().unwrap();
        assert_eq!(params.palette[0], Rgba([255, 0, 0, 255]));
        assert_eq!(params.palette[1], Rgba([0, 255, 0, 255]));
        assert_eq!(params.background, Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_validation_zero_count() {
        let config = FieldConfig { count: 0, ..Default::default() };
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "count"));
    }

    #[test]
    fn test_validation_friction_out_of_range() {
        let config = FieldConfig { friction: 0.0, ..Default::default() };
        assert!(config.validate().iter().any(|e| e.field == "friction"));

        let config = FieldConfig { friction: 1.5, ..Default::default() };
        assert!(config.validate().iter().any(|e| e.field == "friction"));

        let config = FieldConfig { friction: 1.0, ..Default::default() };
        assert!(config.validate().iter().all(|e| e.field != "friction"));
    }

    #[test]
    fn test_validation_inverted_ranges() {
        let config = FieldConfig { min_radius: 3.0, max_radius: 1.0, ..Default::default() };
        assert!(config.validate().iter().any(|e| e.field == "min_radius"));

        let config = FieldConfig { min_alpha: 0.9, max_alpha: 0.1, ..Default::default() };
        assert!(config.validate().iter().any(|e| e.field == "min_alpha"));
    }

    #[test]
    fn test_validation_empty_palette() {
        let config = FieldConfig { palette: Vec::new(), ..Default::default() };
        assert!(config.validate().iter().any(|e| e.field == "palette"));
    }

    #[test]
    fn test_validation_bad_palette_color() {
        let config = FieldConfig {
            palette: vec!["#22d3ee".to_string(), "magenta".to_string()],
            ..Default::default()
        };
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "palette[1]"));
    }

    #[test]
    fn test_validation_bad_background() {
        let config = FieldConfig { background: "#12345".to_string(), ..Default::default() };
        assert!(config.validate().iter().any(|e| e.field == "background"));
    }

    #[test]
    fn test_validation_nan_rejected() {
        let config = FieldConfig { attract_radius: f64::NAN, ..Default::default() };
        assert!(config.validate().iter().any(|e| e.field == "attract_radius"));
    }

    #[test]
    fn test_resolve_invalid_config_errors() {
        let config = FieldConfig { count: 0, ..Default::default() };
        assert!(matches!(config.resolve(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(FieldConfig::default().is_valid());
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(b"count = 5")
            .expect("should write config content");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(b"count = 5")
            .expect("should write config content");

        let subdir = temp.path().join("a").join("b");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        assert_eq!(find_config_from(temp.path().to_path_buf()), None);
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(
                br##"
count = 30
palette = ["#a8e6cf"]
seed = 7
"##,
            )
            .expect("should write config content");

        let config = load_config(Some(&config_path)).expect("should load valid config");
        assert_eq!(config.count, 30);
        assert_eq!(config.palette, vec!["#a8e6cf".to_string()]);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_load_config_missing_file_errors() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join("nonexistent.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(b"this is not valid toml {{{")
            .expect("should write invalid config");

        let result = load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(b"friction = 2.0")
            .expect("should write invalid config");

        let result = load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
