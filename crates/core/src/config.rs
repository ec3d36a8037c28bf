//! Application configuration loaded from TOML and the environment.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    level::{DEFAULT_CAR_SHARE, DEFAULT_MOTORCYCLE_SHARE},
    lot::ReleasePolicy,
};

/// Directory under `~/.config` holding the config file.
pub const DEFAULT_CONFIG_DIR: &str = "parklot";
/// Environment variable prefix, e.g. `PARKLOT_MODE=tui`.
pub const ENV_PREFIX: &str = "PARKLOT";

/// What the binary does after building the lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Run the scripted park/unpark demonstration and exit.
    #[default]
    Demo,
    /// Open the interactive terminal dashboard.
    Tui,
}

/// Output format for printed availability reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One line per spot.
    #[default]
    Text,
    /// Pretty-printed JSON array of spot records.
    Json,
}

/// Shares of each level reserved for motorcycles and cars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixConfig {
    /// Fraction of spots for motorcycles.
    pub motorcycle: f64,
    /// Fraction of spots for cars.
    pub car: f64,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            motorcycle: DEFAULT_MOTORCYCLE_SHARE,
            car: DEFAULT_CAR_SHARE,
        }
    }
}

/// One level to build at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Floor number.
    pub floor: i32,
    /// Total number of spots on the floor.
    pub spots: usize,
}

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Demo script or interactive dashboard.
    pub mode: RunMode,
    /// How the demo prints reports.
    pub report_format: ReportFormat,
    /// Spot selection rule for unparking.
    pub release_policy: ReleasePolicy,
    /// Category shares applied to every level.
    pub mix: MixConfig,
    /// Levels in the order they are added to the lot.
    pub levels: Vec<LevelConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            report_format: ReportFormat::default(),
            release_policy: ReleasePolicy::default(),
            mix: MixConfig::default(),
            levels: vec![
                LevelConfig {
                    floor: 1,
                    spots: 100,
                },
                LevelConfig {
                    floor: 2,
                    spots: 80,
                },
            ],
        }
    }
}

impl AppConfig {
    /// Load from the default config file, then `PARKLOT_*` overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load from `path` (which may be missing), then `PARKLOT_*` overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_layered(path.as_ref(), environment())
    }

    fn load_layered(path: &Path, env: Environment) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(env)
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("failed to parse config {}", path.display()))
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Default config file location.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_CONFIG_DIR)
        .join("config.toml")
}

/// Write a default config file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(config_path())
}

/// Write a default config file at `path` if none exists yet.
pub fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let serialized =
        toml::to_string_pretty(&AppConfig::default()).context("failed to serialize config")?;
    fs::write(path, serialized)
        .with_context(|| format!("failed to write config {}", path.display()))?;
    info!("wrote default config to {}", path.display());
    Ok(())
}
