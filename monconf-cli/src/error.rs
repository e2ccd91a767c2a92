//! Error types for monconf-cli

use monconf_ini::{LoadError, WriteError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or editing the settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot find home directory")]
    NoHomeDir,

    #[error("unknown setting '{0}' (known: config_dir, files.backends, files.instances, files.module)")]
    UnknownKey(String),

    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },

    #[error("failed to create settings directory: {0}")]
    CreateDir(#[source] std::io::Error),

    #[error("'{0}' in the settings file is not a table")]
    NotATable(String),

    #[error("invalid settings: {0}")]
    Invalid(#[source] toml::de::Error),

    #[error("failed to save settings: {0}")]
    Write(#[from] WriteError),
}

/// Top-level CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// The entity named on the command line does not exist
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    NotReadable(#[from] LoadError),

    /// A persist attempt failed; details were already reported
    #[error("configuration was not saved")]
    NotSaved,

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render settings: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
