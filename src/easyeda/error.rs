//! Error types for component conversion.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors that can occur while converting an EasyEDA component.
///
/// `Parse` and `Geometry` errors are recoverable: the dispatcher drops the
/// offending primitive and continues with the rest of the document.
/// `Container`, `FileRead` and `FileWrite` errors are fatal for the file
/// they name.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Failed to open or read a file.
    #[error("Failed to read file: {path}")]
    FileRead {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write a file.
    #[error("Failed to write file: {path}")]
    FileWrite {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A shape record could not be decoded.
    #[error("Record '{tag}': {message}")]
    Parse {
        /// Record tag (e.g. "PAD").
        tag: String,
        /// Description of what's wrong.
        message: String,
    },

    /// Derived geometry is degenerate or infeasible.
    #[error("Geometry error: {message}")]
    Geometry {
        /// Description of what's wrong.
        message: String,
    },

    /// An expected metadata field is absent from the component payload.
    #[error("Missing field '{field}' in component data")]
    ExternalData {
        /// Name of the missing field.
        field: String,
    },

    /// The component payload envelope could not be deserialised.
    #[error("Invalid component payload: {source}")]
    Payload {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A library container is structurally broken and must not be rewritten.
    #[error("Library container {path}: {message}")]
    Container {
        /// Path to the container file.
        path: PathBuf,
        /// Description of what's wrong.
        message: String,
    },
}

impl ConvertError {
    /// Creates a file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a file write error.
    pub fn file_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse error for a record tag.
    pub fn parse(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            tag: tag.into(),
            message: message.into(),
        }
    }

    /// Creates a geometry error.
    pub fn geometry(message: impl Into<String>) -> Self {
        Self::Geometry {
            message: message.into(),
        }
    }

    /// Creates a missing-field error.
    pub fn external_data(field: impl Into<String>) -> Self {
        Self::ExternalData {
            field: field.into(),
        }
    }

    /// Creates a container error.
    pub fn container(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Container {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns true if the error only affects a single primitive.
    ///
    /// Recoverable errors are logged and the rest of the document continues;
    /// all other errors abort the conversion of the current file.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Geometry { .. })
    }
}
