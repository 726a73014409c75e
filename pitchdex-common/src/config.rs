//! Configuration loading and path resolution
//!
//! Bootstrap configuration comes from an optional TOML file. Paths resolve in
//! priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not an error: defaults are used and a warning is
//! logged.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{Error, Metric, Result};

/// Environment variable overriding the database path
pub const DATABASE_ENV: &str = "PITCHDEX_DATABASE";

/// Environment variable overriding the dictionary path
pub const DICTIONARY_ENV: &str = "PITCHDEX_DICT";

const DEFAULT_DATABASE: &str = "pitchdex.db";
const DEFAULT_DICTIONARY: &str = "/usr/share/dict/words";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Path to the SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Word list used by the "Words invented" metric
    #[serde(default)]
    pub dictionary_path: Option<PathBuf>,

    /// Wire names of the metrics to compute (all when omitted)
    #[serde(default)]
    pub metrics: Option<Vec<String>>,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8585
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load configuration
    ///
    /// An explicit path must exist and parse. Without one, the platform
    /// default location is tried and its absence falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let content = std::fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
            })?;
            info!("Loaded configuration from {}", path.display());
            return Self::from_toml_str(&content);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)?;
                info!("Loaded configuration from {}", path.display());
                Self::from_toml_str(&content)
            }
            _ => {
                warn!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Metrics selected by the `metrics` key
    ///
    /// Returns `None` when the key is absent (compute everything). Unknown
    /// names and the derived composite are configuration errors.
    pub fn selected_metrics(&self) -> Result<Option<Vec<Metric>>> {
        let Some(names) = &self.metrics else {
            return Ok(None);
        };

        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let metric = Metric::from_name(name)
                .ok_or_else(|| Error::Config(format!("Unknown metric name '{}'", name)))?;
            if metric.is_derived() {
                return Err(Error::Config(format!(
                    "'{}' is derived and cannot be selected for scoring",
                    name
                )));
            }
            if !selected.contains(&metric) {
                selected.push(metric);
            }
        }
        Ok(Some(selected))
    }
}

/// Default config file location (`<config dir>/pitchdex/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pitchdex").join("config.toml"))
}

fn resolve_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    configured: Option<&Path>,
    default: &str,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = configured {
        return path.to_path_buf();
    }

    // Priority 4: Compiled default
    PathBuf::from(default)
}

/// Resolve the database path
pub fn resolve_database_path(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    resolve_path(
        cli_arg,
        DATABASE_ENV,
        config.database_path.as_deref(),
        DEFAULT_DATABASE,
    )
}

/// Resolve the dictionary word-list path
pub fn resolve_dictionary_path(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    resolve_path(
        cli_arg,
        DICTIONARY_ENV,
        config.dictionary_path.as_deref(),
        DEFAULT_DICTIONARY,
    )
}
