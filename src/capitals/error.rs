//! Capital resolution errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable error kind shared by the resolver and the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    DataIntegrity,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NotFound => "not_found",
            ErrorKind::DataIntegrity => "data_integrity",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while resolving a capital.
///
/// Enrichment failures never show up here: they degrade the record
/// inside the resolver instead of failing the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapitalError {
    /// Malformed or empty identifier.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Well-formed identifier with no capital in the dataset.
    #[error("No capital known for {0}")]
    NotFound(String),

    /// A dataset row exists but lacks a mandatory field.
    #[error("Capital data for {code} is missing mandatory field '{field}'")]
    DataIntegrity { code: String, field: &'static str },

    /// Unexpected fault in a collaborator.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CapitalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CapitalError::InvalidInput(_) => ErrorKind::InvalidInput,
            CapitalError::NotFound(_) => ErrorKind::NotFound,
            CapitalError::DataIntegrity { .. } => ErrorKind::DataIntegrity,
            CapitalError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Errors that can occur while loading the capital dataset.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Dataset file could not be read.
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Dataset is not valid JSON or does not match the row layout.
    #[error("Dataset parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Country code is not two ASCII letters.
    #[error("Invalid country code in dataset: '{0}'")]
    InvalidCode(String),

    /// Two rows share a country code.
    #[error("Duplicate country code in dataset: {0}")]
    DuplicateCode(String),

    /// A row lacks a field needed to place it on the roster.
    #[error("Dataset row {code} is missing '{field}'")]
    Incomplete { code: String, field: &'static str },

    /// Coordinates outside the valid latitude/longitude range.
    #[error("Dataset row {code} has out-of-range coordinates")]
    InvalidCoordinates { code: String },
}
