// src/error.rs
use crate::core::types::PieceType;
use thiserror::Error;

/// Every failure the lookup engine can report. All of them are local to a
/// single query; none leaves the dataset cache or the lettering corrupted.
#[derive(Debug, Error)]
pub enum CommError {
    /// The raw query is not exactly three distinct letters.
    #[error("invalid search")]
    InvalidQuery { input: String },

    /// A letter is outside the configured scheme, or the scheme is malformed.
    #[error("invalid letter: {0}")]
    InvalidLetter(String),

    #[error("unknown piece type: {0}")]
    UnknownPieceType(String),

    /// The dataset for a piece type could not be fetched or parsed.
    #[error("{piece_type} dataset unavailable: {reason}")]
    DatasetUnavailable { piece_type: PieceType, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CommError {
    pub(crate) fn invalid_query(input: &str) -> Self {
        CommError::InvalidQuery { input: input.to_string() }
    }

    pub(crate) fn unavailable(piece_type: PieceType, reason: impl ToString) -> Self {
        CommError::DatasetUnavailable { piece_type, reason: reason.to_string() }
    }
}

impl From<bincode::Error> for CommError {
    fn from(e: bincode::Error) -> Self {
        CommError::Persistence(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CommError>;
