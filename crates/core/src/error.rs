//! Error types for the sectree section hierarchy library.

use thiserror::Error;

/// Primary error type for section normalization, hierarchy building and export.
#[derive(Error, Debug)]
pub enum SectionError {
    #[error("malformed {kind} section: {reason}")]
    MalformedSection { kind: &'static str, reason: String },

    #[error("{kind} section references unknown owner {owner}")]
    OrphanReference { kind: &'static str, owner: String },

    #[error("invalid tree index: {0:?}")]
    InvalidIndex(String),

    #[error("invalid cell coordinate: {0:?}")]
    InvalidCell(String),

    #[error("unrecognized detector response: {0}")]
    DetectorResponse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl SectionError {
    pub(crate) fn malformed(kind: &'static str, reason: impl Into<String>) -> Self {
        SectionError::MalformedSection {
            kind,
            reason: reason.into(),
        }
    }
}

/// Convenience Result type alias for SectionError.
pub type Result<T> = std::result::Result<T, SectionError>;
