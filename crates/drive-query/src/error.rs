use crate::field::ValueType;
use crate::predicate::ComparisonOperator;

#[derive(Debug, thiserror::Error)]
pub enum DriveQueryError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Type mismatch on field {field}: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: ValueType,
        actual: ValueType,
    },

    #[error("Unsupported operator {operator} on {value_type} field {field}")]
    UnsupportedOperator {
        field: String,
        operator: ComparisonOperator,
        value_type: ValueType,
    },

    #[error("Empty combinator: {0} requires at least one child")]
    EmptyCombinator(&'static str),

    #[error("Remote store error: {0}")]
    Remote(#[from] StoreError),

    #[error("Index out of range: {index} (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DriveQueryError {
    /// Returns true for failures the user can recover from by retrying.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

/// Failure reported by a remote store collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("query rejected: {0}")]
    Rejected(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, DriveQueryError>;

pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(DriveQueryError::IndexOutOfRange { index, len })
    }
}
