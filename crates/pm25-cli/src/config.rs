//! Configuration file management.
//!
//! Settings live in `<config dir>/pm25/config.toml`. A missing file means
//! defaults; command-line flags override individual values through
//! [`Overrides`] before the result is validated.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use pm25_core::SyncConfig;
use pm25_core::client::MAX_HISTORY_HOURS;

/// Shortest allowed refresh interval in seconds.
pub const MIN_REFRESH_INTERVAL: u64 = 10;

/// Longest allowed refresh interval in seconds.
pub const MAX_REFRESH_INTERVAL: u64 = 3600;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root URL of the prediction server.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub chat: ChatConfig,
}

/// Dashboard refresh settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Seconds between sync cycles.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,

    /// History window requested from the server.
    #[serde(default = "default_history_hours")]
    pub history_hours: u32,

    /// Keep every n-th history point for the chart.
    #[serde(default = "default_history_stride")]
    pub history_stride: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_server_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_refresh_interval() -> u64 {
    30
}

fn default_history_hours() -> u32 {
    168
}

fn default_history_stride() -> usize {
    3
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            timeout: default_timeout(),
            no_color: false,
            dashboard: DashboardConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            history_hours: default_history_hours(),
            history_stride: default_history_stride(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Values given on the command line, applied over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server_url: Option<String>,
    pub timeout: Option<u64>,
    pub no_color: bool,
    pub refresh_interval: Option<u64>,
    pub history_hours: Option<u32>,
    pub history_stride: Option<usize>,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pm25")
            .join("config.toml")
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Load from `path`, or return defaults if the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(url) = overrides.server_url {
            self.server_url = url;
        }
        if let Some(timeout) = overrides.timeout {
            self.timeout = timeout;
        }
        self.no_color |= overrides.no_color;
        if let Some(interval) = overrides.refresh_interval {
            self.dashboard.refresh_interval = interval;
        }
        if let Some(hours) = overrides.history_hours {
            self.dashboard.history_hours = hours;
        }
        if let Some(stride) = overrides.history_stride {
            self.dashboard.history_stride = stride;
        }
        self
    }

    /// Validate the configuration, reporting every problem at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let url = self.server_url.trim();
        if url.is_empty() {
            errors.push(ValidationError {
                field: "server_url".to_string(),
                message: "server URL cannot be empty".to_string(),
            });
        } else if !url.starts_with("http://") && !url.starts_with("https://") {
            errors.push(ValidationError {
                field: "server_url".to_string(),
                message: format!("'{}' must start with http:// or https://", url),
            });
        }

        if self.timeout == 0 {
            errors.push(ValidationError {
                field: "timeout".to_string(),
                message: "timeout must be at least 1 second".to_string(),
            });
        }

        errors.extend(self.dashboard.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Sync engine settings derived from the dashboard section.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            refresh_interval: Duration::from_secs(self.dashboard.refresh_interval),
            history_hours: self.dashboard.history_hours,
            history_stride: self.dashboard.history_stride,
            ..SyncConfig::default()
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !(MIN_REFRESH_INTERVAL..=MAX_REFRESH_INTERVAL).contains(&self.refresh_interval) {
            errors.push(ValidationError {
                field: "dashboard.refresh_interval".to_string(),
                message: format!(
                    "refresh interval {} is out of range ({}-{} seconds)",
                    self.refresh_interval, MIN_REFRESH_INTERVAL, MAX_REFRESH_INTERVAL
                ),
            });
        }

        if !(1..=MAX_HISTORY_HOURS).contains(&self.history_hours) {
            errors.push(ValidationError {
                field: "dashboard.history_hours".to_string(),
                message: format!(
                    "history window {} is out of range (1-{} hours)",
                    self.history_hours, MAX_HISTORY_HOURS
                ),
            });
        }

        if self.history_stride == 0 {
            errors.push(ValidationError {
                field: "dashboard.history_stride".to_string(),
                message: "history stride must be at least 1".to_string(),
            });
        }

        errors
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field path (e.g., `dashboard.history_hours`).
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}
