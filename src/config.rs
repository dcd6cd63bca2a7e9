//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. An explicit path (the `--config` flag)
//! 2. `$GRADVIZ_CONFIG` environment variable
//! 3. `~/.config/gradviz/config.toml`
//! 4. Built-in defaults (everything is optional)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::functions::plot3d::{RenderOptions, SurfaceOptions};
use crate::gradient::{
  DEFAULT_DISPLAY_LENGTH, DEFAULT_EXPRESSION, EvaluatorOptions, Point,
};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
  pub evaluator: EvaluatorConfig,
  pub point: PointConfig,
  pub surface: SurfaceConfig,
  pub render: RenderConfig,
}

/// What to evaluate when the command line leaves it out.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvaluatorConfig {
  pub default_expression: String,
  /// Length of the steepest-ascent arrow in plot units.
  pub display_length: f64,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PointConfig {
  pub x: f64,
  pub y: f64,
}

/// Sampling of the plotted surface. Points must also lie in this domain.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurfaceConfig {
  pub domain_min: f64,
  pub domain_max: f64,
  pub resolution: usize,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
  pub width: u32,
  pub height: u32,
  /// Arrow head size in plot units.
  pub cone_size: f64,
  pub mesh: bool,
}

// --- Defaults ---

impl Default for EvaluatorConfig {
  fn default() -> Self {
    Self {
      default_expression: DEFAULT_EXPRESSION.into(),
      display_length: DEFAULT_DISPLAY_LENGTH,
    }
  }
}

impl Default for PointConfig {
  fn default() -> Self {
    Self { x: 1.0, y: 1.0 }
  }
}

impl Default for SurfaceConfig {
  fn default() -> Self {
    let surface = SurfaceOptions::default();
    Self {
      domain_min: surface.domain_min,
      domain_max: surface.domain_max,
      resolution: surface.resolution,
    }
  }
}

impl Default for RenderConfig {
  fn default() -> Self {
    let render = RenderOptions::default();
    Self {
      width: render.width,
      height: render.height,
      cone_size: render.cone_size,
      mesh: render.mesh,
    }
  }
}

impl Config {
  /// Reject values the pipeline cannot work with.
  pub fn validate(&self) -> Result<()> {
    if !(self.evaluator.display_length.is_finite()
      && self.evaluator.display_length > 0.0)
    {
      bail!(
        "evaluator.display_length must be positive, got {}",
        self.evaluator.display_length
      );
    }
    if !(self.surface.domain_min < self.surface.domain_max) {
      bail!(
        "surface.domain_min ({}) must be below surface.domain_max ({})",
        self.surface.domain_min,
        self.surface.domain_max
      );
    }
    if self.surface.resolution < 2 {
      bail!(
        "surface.resolution must be at least 2, got {}",
        self.surface.resolution
      );
    }
    if !(self.render.cone_size >= 0.0) {
      bail!("render.cone_size must not be negative");
    }
    Ok(())
  }

  pub fn evaluator_options(&self) -> EvaluatorOptions {
    EvaluatorOptions {
      display_length: self.evaluator.display_length,
      surface: SurfaceOptions {
        domain_min: self.surface.domain_min,
        domain_max: self.surface.domain_max,
        resolution: self.surface.resolution,
      },
    }
  }

  pub fn render_options(&self) -> RenderOptions {
    RenderOptions {
      width: self.render.width,
      height: self.render.height,
      cone_size: self.render.cone_size,
      mesh: self.render.mesh,
    }
  }

  pub fn default_point(&self) -> Point {
    Point::new(self.point.x, self.point.y)
  }
}

/// Load config from disk. Returns defaults if no config file exists.
/// An explicit path must exist.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
  let config = match explicit {
    Some(p) => read_config(p)?,
    None => match config_path() {
      Some(p) if p.exists() => read_config(&p)?,
      _ => Config::default(),
    },
  };
  config.validate()?;
  Ok(config)
}

fn read_config(path: &Path) -> Result<Config> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("reading {}", path.display()))?;
  toml::from_str(&content)
    .with_context(|| format!("parsing {}", path.display()))
}

/// Resolve the config file path.
pub fn config_path() -> Option<PathBuf> {
  if let Ok(p) = std::env::var("GRADVIZ_CONFIG") {
    return Some(PathBuf::from(p));
  }

  std::env::var("HOME").ok().map(|home| {
    PathBuf::from(home)
      .join(".config")
      .join("gradviz")
      .join("config.toml")
  })
}

/// Show the active config path (for `gradviz config`).
pub fn show_config_path(explicit: Option<&Path>) -> String {
  match explicit.map(Path::to_path_buf).or_else(config_path) {
    Some(p) if p.exists() => format!("{} (loaded)", p.display()),
    Some(p) => format!("{} (not found, using defaults)", p.display()),
    None => "no config path resolved (using defaults)".into(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.evaluator.default_expression, "x**2 - y**2");
    assert_eq!(config.evaluator.display_length, 1.5);
    assert_eq!(config.surface.resolution, 50);
    assert_eq!(config.render.cone_size, 0.5);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_parse_minimal_toml() {
    let toml_str = r#"
[evaluator]
display_length = 2.0
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.evaluator.display_length, 2.0);
    // Other fields should be defaults
    assert_eq!(config.evaluator.default_expression, "x**2 - y**2");
    assert_eq!(config.surface.domain_max, 5.0);
  }

  #[test]
  fn test_parse_full_toml() {
    let toml_str = r#"
[evaluator]
default_expression = "sin(x)*cos(y)"
display_length = 1.0

[point]
x = 0.0
y = -2.5

[surface]
domain_min = -3.0
domain_max = 3.0
resolution = 20

[render]
width = 400
height = 300
cone_size = 0.25
mesh = false
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.evaluator.default_expression, "sin(x)*cos(y)");
    assert_eq!(config.default_point(), Point::new(0.0, -2.5));
    let options = config.evaluator_options();
    assert_eq!(options.display_length, 1.0);
    assert_eq!(options.surface.resolution, 20);
    let render = config.render_options();
    assert_eq!((render.width, render.height), (400, 300));
    assert!(!render.mesh);
  }

  #[test]
  fn test_invalid_values_are_rejected() {
    let mut config = Config::default();
    config.evaluator.display_length = 0.0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.surface.domain_min = 5.0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.surface.resolution = 1;
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_explicit_path_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[point]\nx = 2.0\n").unwrap();
    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.point.x, 2.0);
    assert_eq!(config.point.y, 1.0);
  }

  #[test]
  fn test_missing_explicit_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
    assert!(format!("{err:#}").contains("nope.toml"));
  }
}
