//! Configuration file management.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use verdant_core::{ControllerOptions, Error, OptimalRange, RangeTable, TierMultipliers, Zone};
use verdant_types::SensorType;

/// Configuration file structure.
///
/// Every field is optional; anything left out falls back to the built-in
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Time zone for labels and day boundaries: an IANA name such as
    /// `Europe/Berlin`, a fixed offset like `+02:00`, `UTC` or `local`.
    pub timezone: Option<String>,
    /// Maximum number of chart axis labels.
    pub max_labels: Option<usize>,
    /// Tier multipliers for the critical bands.
    pub multipliers: Option<TierMultipliers>,
    /// Per-sensor optimal range overrides.
    pub ranges: BTreeMap<SensorType, OptimalRange>,
}

impl Config {
    /// Load configuration from the default path, or defaults if it is absent.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
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

    /// Validate the configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if let Some(timezone) = &self.timezone
            && let Err(e) = timezone.parse::<Zone>()
        {
            errors.push(ValidationError {
                field: "timezone".to_string(),
                message: config_message(e),
            });
        }

        if self.max_labels == Some(0) {
            errors.push(ValidationError {
                field: "max_labels".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        if let Some(multipliers) = &self.multipliers
            && let Err(e) = multipliers.validate()
        {
            errors.push(ValidationError {
                field: "multipliers".to_string(),
                message: config_message(e),
            });
        }

        for (sensor, range) in &self.ranges {
            if let Err(e) = range.validate() {
                errors.push(ValidationError {
                    field: format!("ranges.{}", sensor.key()),
                    message: config_message(e),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// The configured zone, the system zone when unset or unparsable.
    pub fn zone(&self) -> Zone {
        self.timezone
            .as_deref()
            .and_then(|tz| tz.parse().ok())
            .unwrap_or(Zone::Local)
    }

    /// Default ranges with this file's overrides applied.
    pub fn range_table(&self) -> RangeTable {
        let table = RangeTable::default().with_overrides(self.ranges.clone());
        match self.multipliers {
            Some(multipliers) => table.with_multipliers(multipliers),
            None => table,
        }
    }

    /// Controller options derived from this file.
    pub fn controller_options(&self) -> ControllerOptions {
        let options = ControllerOptions::new().zone(self.zone());
        match self.max_labels {
            Some(max_labels) => options.max_labels(max_labels),
            None => options,
        }
    }
}

fn config_message(error: Error) -> String {
    match error {
        Error::InvalidConfig(message) => message,
        other => other.to_string(),
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
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `max_labels` or `ranges.temperature`).
    pub field: String,
    /// Description of the validation failure.
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

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("verdant")
        .join("config.toml")
}
