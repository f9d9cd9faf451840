//! Configuration module for carrier-pivot.
//!
//! Handles the settings file, environment variables and pivot defaults.

mod settings;

pub use settings::{
    expand_env_vars, DatasetSettings, LoggingSettings, PivotSettings, Settings, SettingsError,
    WorkerSettings, CONFIG_ENV_VAR,
};
