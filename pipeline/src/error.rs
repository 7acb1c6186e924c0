//! Pipeline-specific error types

use std::path::{Path, PathBuf};

use shared::{RunKey, SharedError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Result store unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("Run not yet computed: {missing}")]
    BaselineMissing { missing: RunKey },

    #[error("Baseline {baseline} has a zero {quantity}, ratio is undefined")]
    DegenerateBaseline { baseline: RunKey, quantity: String },

    #[error("Configuration error: {field}: {message}")]
    ConfigurationError { field: String, message: String },

    #[error("File system operation failed: {operation} on {path}: {source}")]
    FileSystemError {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Phase order violated: {message}")]
    PhaseOrder { message: String },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build a `map_err` adapter that tags an I/O error with the operation and path
    pub fn fs<'a>(operation: &'a str, path: &'a Path) -> impl FnOnce(std::io::Error) -> Self + 'a {
        move |source| Self::FileSystemError {
            operation: operation.to_string(),
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether the error only means "not comparable yet" rather than a failure
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::BaselineMissing { .. } | Self::DegenerateBaseline { .. })
    }
}

impl From<rusqlite::Error> for PipelineError {
    fn from(err: rusqlite::Error) -> Self {
        Self::StorageUnavailable { message: err.to_string() }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
