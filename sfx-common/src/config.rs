//! Bootstrap configuration loading and config file resolution
//!
//! Configuration comes from a single TOML file. Resolution order for the
//! file location:
//! 1. Command-line argument (highest priority)
//! 2. `SFX_CONFIG` environment variable
//! 3. Platform config directory (`<config_dir>/sfx/config.toml`)
//! 4. Compiled defaults (no file at all)
//!
//! A missing file is not fatal: a warning is logged and compiled defaults
//! are used. A file that exists but does not parse is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SFX_CONFIG";

/// Default number of voices created at warm-up
pub const DEFAULT_INITIAL_POOL_SIZE: usize = 10;

/// Default event bus capacity
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 100;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Voice pool sizing
    #[serde(default)]
    pub pool: PoolConfig,

    /// Initial mixer group volumes (normalized 0.0-1.0)
    #[serde(default)]
    pub volume: VolumeConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Number of events buffered by the EventBus before old events drop
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

/// Voice pool sizing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoolConfig {
    /// Voices created eagerly at warm-up
    #[serde(default = "default_initial_size")]
    pub initial_size: usize,

    /// Upper bound on voices; defaults to `initial_size`
    #[serde(default)]
    pub capacity: Option<usize>,
}

impl PoolConfig {
    /// Effective capacity: explicit bound, never below the warm-up size
    pub fn effective_capacity(&self) -> usize {
        self.capacity
            .unwrap_or(self.initial_size)
            .max(self.initial_size)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_size: DEFAULT_INITIAL_POOL_SIZE,
            capacity: None,
        }
    }
}

/// Normalized group volumes applied to the mixer at startup
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VolumeConfig {
    #[serde(default = "default_volume")]
    pub master: f32,
    #[serde(default = "default_volume")]
    pub music: f32,
    #[serde(default = "default_volume")]
    pub sfx: f32,
}

impl VolumeConfig {
    /// Copy with every value clamped to 0.0-1.0
    pub fn clamped(&self) -> Self {
        Self {
            master: self.master.clamp(0.0, 1.0),
            music: self.music.clamp(0.0, 1.0),
            sfx: self.sfx.clamp(0.0, 1.0),
        }
    }
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            master: default_volume(),
            music: default_volume(),
            sfx: default_volume(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            pool: PoolConfig::default(),
            volume: VolumeConfig::default(),
            logging: LoggingConfig::default(),
            event_bus_capacity: default_event_bus_capacity(),
        }
    }
}

fn default_initial_size() -> usize {
    DEFAULT_INITIAL_POOL_SIZE
}

fn default_volume() -> f32 {
    1.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_event_bus_capacity() -> usize {
    DEFAULT_EVENT_BUS_CAPACITY
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load configuration from a file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults when no file exists
    ///
    /// Parse errors in an existing file are still reported.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                warn!(
                    "Config file {} not found, using compiled defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                info!("No config file found, using compiled defaults");
                Ok(Self::default())
            }
        }
    }

    /// Serialize back to TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize TOML: {}", e)))
    }
}

/// Resolve which config file to use
///
/// Returns `None` when neither the CLI, the environment nor the platform
/// config directory names an existing file. An explicit CLI or environment
/// path is returned even if missing so the caller can warn about it.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path().filter(|path| path.exists())
}

/// Platform default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sfx").join("config.toml"))
}
