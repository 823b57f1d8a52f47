//! Error types raised by store implementations.

use thiserror::Error;

/// Errors surfaced by [`Store`](super::Store) implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("write attempted outside a transaction")]
    NoTransaction,

    #[error("a transaction is already active")]
    TransactionActive,

    #[error("unknown savepoint {0}")]
    UnknownSavepoint(usize),

    #[error("unique constraint violated on {table}: {key}")]
    UniqueViolation { table: &'static str, key: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
