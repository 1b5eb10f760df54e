//! Configuration management and validation.
//!
//! Provides layered configuration for output and parsing defaults:
//! built-in defaults, then an optional TOML file, then CLI overrides
//! applied by the command layer.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_LOG_LEVEL, DEFAULT_OUTPUT_DELIMITER,
    DEFAULT_SKIP_MALFORMED, delimiter_char,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output formatting defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Delimiter name for projected/converted output ("tab" or "comma")
    pub delimiter: String,

    /// Emit a header row before projected/converted data
    pub include_header: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_OUTPUT_DELIMITER.to_string(),
            include_header: true,
        }
    }
}

/// Parsing behaviour defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Skip malformed records and report them instead of aborting.
    /// Never the default: silently dropping variant records is a
    /// correctness hazard.
    pub skip_malformed: bool,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            skip_malformed: DEFAULT_SKIP_MALFORMED,
        }
    }
}

/// Logging defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flags are given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Global configuration for vcfquery
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub parsing: ParsingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Default config file location (`~/.config/vcfquery/config.toml` on Linux)
    pub fn default_config_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| Error::configuration("could not determine user config directory"))?;
        Ok(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("failed to read config file {}", path.display()), e))?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            Error::configuration(format!("invalid config file {}: {}", path.display(), e))
        })?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load with layered resolution: defaults, then an explicit config file
    /// if given, otherwise the default location when it exists.
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let config = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::configuration(format!(
                        "config file does not exist: {}",
                        path.display()
                    )));
                }
                Self::load_from_file(path)?
            }
            None => {
                let default_path = Self::default_config_path().ok();
                match default_path.filter(|p| p.exists()) {
                    Some(path) => Self::load_from_file(&path)?,
                    None => {
                        debug!("No config file found, using defaults");
                        Self::default()
                    }
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values for consistency
    pub fn validate(&self) -> Result<()> {
        if delimiter_char(&self.output.delimiter).is_none() {
            return Err(Error::configuration(format!(
                "unknown output delimiter '{}' (expected 'tab' or 'comma')",
                self.output.delimiter
            )));
        }

        match self.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            other => Err(Error::configuration(format!(
                "unknown log level '{}'",
                other
            ))),
        }
    }
}
