//! Shared error types for the experiment pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Malformed result: {reason}")]
    MalformedResult { reason: String },
}

impl SharedError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResult { reason: reason.into() }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResult { .. })
    }
}

pub type SharedResult<T> = Result<T, SharedError>;
