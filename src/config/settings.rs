//! TOML-based configuration for carrier-pivot.
//!
//! Supports a config file (carrier-pivot.toml) with environment variable
//! expansion in the dataset path.
//!
//! Example configuration:
//! ```toml
//! [dataset]
//! path = "${DATA_DIR}/carriers.json"
//! date_format = "%Y-%m-%d"
//!
//! [pivot]
//! rows = ["Entity"]
//! columns = ["Operating status"]
//! value = "Power units"
//! aggregation = "sum"
//! date_bucket = "none"
//!
//! [worker]
//! timeout_secs = 30
//! max_concurrent = 2
//!
//! [logging]
//! filter = "carrier_pivot=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::DEFAULT_DATE_FORMAT;
use crate::pivot::{Aggregation, DateBucket, PivotError, PivotSpec};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CARRIER_PIVOT_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("No dataset path given and none configured in [dataset]")]
    NoDataset,

    #[error("Invalid [pivot] settings: {0}")]
    InvalidPivot(#[from] PivotError),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Row file to load when none is given on the command line.
    pub dataset: DatasetSettings,

    /// Initial pivot configuration.
    pub pivot: PivotSettings,

    /// Execution boundary configuration.
    pub worker: WorkerSettings,

    /// Log filter configuration.
    pub logging: LoggingSettings,
}

/// Dataset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasetSettings {
    /// Path to a JSON row file (supports ${ENV_VAR} expansion).
    pub path: Option<String>,

    /// chrono format date-like fields were normalized to.
    pub date_format: String,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            path: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl DatasetSettings {
    /// Get the dataset path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.path
            .as_deref()
            .map(|path| expand_env_vars(path).map(PathBuf::from))
            .transpose()
    }
}

/// Initial pivot configuration.
///
/// Names stay as strings here so a bad value is reported as a settings
/// error rather than a TOML type error.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PivotSettings {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub value: String,
    pub aggregation: String,
    pub date_bucket: String,
}

impl Default for PivotSettings {
    fn default() -> Self {
        Self {
            rows: vec!["Entity".to_string()],
            columns: vec!["Operating status".to_string()],
            value: "Power units".to_string(),
            aggregation: Aggregation::Sum.to_string(),
            date_bucket: DateBucket::None.to_string(),
        }
    }
}

impl PivotSettings {
    /// Convert to a pivot spec, failing fast on unknown aggregation or
    /// bucket names.
    pub fn to_spec(&self) -> Result<PivotSpec, SettingsError> {
        let aggregation: Aggregation = self.aggregation.parse()?;
        let date_bucket: DateBucket = self.date_bucket.parse()?;
        Ok(PivotSpec::new(self.rows.iter().cloned(), self.value.clone())
            .with_columns(self.columns.iter().cloned())
            .with_aggregation(aggregation)
            .with_date_bucket(date_bucket))
    }
}

/// Worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Seconds a one-shot request waits for its result.
    pub timeout_secs: u64,

    /// Computations allowed to run at the same time.
    pub max_concurrent: usize,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_concurrent: 2,
        }
    }
}

impl WorkerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directives, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `CARRIER_PIVOT_CONFIG`
    /// 2. `./carrier-pivot.toml`
    /// 3. `~/.config/carrier-pivot/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("carrier-pivot.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("carrier-pivot").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Pick the dataset path: an explicit one wins over `[dataset] path`.
    pub fn dataset_path(&self, explicit: Option<PathBuf>) -> Result<PathBuf, SettingsError> {
        match explicit {
            Some(path) => Ok(path),
            None => self.dataset.resolved_path()?.ok_or(SettingsError::NoDataset),
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
