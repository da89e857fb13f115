//! Error types for the settings file.
//!
//! Conversion errors live in [`crate::easyeda::error`]; this module only
//! covers loading and validating the settings file that controls the
//! output layout and library update policy.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file exists but could not be read.
    #[error("Failed to read settings file: {path}")]
    Read {
        /// Path to the settings file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The settings file is not valid JSON or carries unknown fields.
    #[error("Malformed settings file {path}: {source}")]
    Malformed {
        /// Path to the settings file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An explicitly requested settings file does not exist.
    #[error("Settings file not found: {path}")]
    Missing {
        /// Path where the settings file was expected.
        path: PathBuf,
    },

    /// A setting has a value the converter cannot work with.
    #[error("Invalid setting '{setting}': {reason}")]
    Invalid {
        /// Dotted path of the offending setting (e.g. "output.model_dir").
        setting: String,
        /// What is wrong with the value.
        reason: String,
    },
}

impl ConfigError {
    /// Creates a file read error.
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a malformed-file error.
    pub fn malformed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Malformed {
            path: path.into(),
            source,
        }
    }

    /// Creates a missing-file error.
    pub fn missing(path: impl Into<PathBuf>) -> Self {
        Self::Missing { path: path.into() }
    }

    /// Creates an invalid-setting error.
    pub fn invalid(setting: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            setting: setting.into(),
            reason: reason.into(),
        }
    }
}
