//! Error types for filter lexing and parsing

use thiserror::Error;

/// A syntax problem in a CQL filter, located by byte offset
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("Filter is empty")]
    Empty,

    #[error("Unterminated string literal starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("Unterminated quoted identifier starting at offset {offset}")]
    UnterminatedIdentifier { offset: usize },

    #[error("Invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("Filter nests deeper than {limit} levels at offset {offset}")]
    TooDeep { limit: usize, offset: usize },

    #[error("Expected {expected} at offset {offset}, found {found}")]
    UnexpectedToken { expected: String, found: String, offset: usize },
}

pub type Result<T> = std::result::Result<T, FilterError>;
