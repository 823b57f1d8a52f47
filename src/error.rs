//! Error types for card, pattern and game operations.
//!
//! Every fallible operation returns [`Result`]. Each variant carries a short
//! message (its `Display`) and classifies into an [`ErrorKind`] so callers
//! can branch without matching every variant.

use thiserror::Error;

use crate::cards::CardStatus;
use crate::core::{GameId, PatternId};
use crate::game::GameStatus;
use crate::store::StoreError;

/// Coarse classification of failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced id or serial is absent.
    NotFound,
    /// The operation is not allowed in the current state.
    InvalidState,
    /// Malformed grid, out-of-range number, invalid status string.
    InvalidInput,
    /// Duplicate call, duplicate attach, card not available.
    Conflict,
    /// Deletion blocked by referencing records.
    DependencyInUse,
    /// The store itself failed.
    Store,
}

/// Errors surfaced by the card store, pattern store and game engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BingoError {
    #[error("card {0} not found")]
    CardNotFound(String),

    #[error("pattern {0} not found")]
    PatternNotFound(PatternId),

    #[error("game {0} not found")]
    GameNotFound(GameId),

    #[error("card {serial} is not in game {game}")]
    CardNotInGame { game: GameId, serial: String },

    #[error("game {game} is {actual}, expected {expected}")]
    InvalidState {
        game: GameId,
        actual: GameStatus,
        expected: GameStatus,
    },

    #[error("no game selected")]
    NoActiveGame,

    #[error("all 75 numbers have already been called in game {0}")]
    NumbersExhausted(GameId),

    #[error("invalid number {0} (must be 1-75)")]
    InvalidNumber(u8),

    #[error("invalid card numbers: {0}")]
    InvalidCardNumbers(String),

    #[error("invalid grid format: {0}")]
    InvalidGrid(String),

    #[error("invalid status `{0}`, must be one of: available, in_play, won")]
    InvalidStatus(String),

    #[error("invalid setting `{key}`: {value}")]
    InvalidSetting { key: String, value: String },

    #[error("no updates provided")]
    EmptyUpdate,

    #[error("card {0} already exists")]
    DuplicateSerial(String),

    #[error("card {serial} is not available (status {status})")]
    CardNotAvailable { serial: String, status: CardStatus },

    #[error("card {serial} is already attached to game {game}")]
    DuplicateAttach { game: GameId, serial: String },

    #[error("number {number} already called in game {game}")]
    DuplicateCall { game: GameId, number: u8 },

    #[error("pattern {pattern} is used by {games} game(s) and cannot be deleted")]
    PatternInUse { pattern: PatternId, games: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BingoError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            BingoError::CardNotFound(_)
            | BingoError::PatternNotFound(_)
            | BingoError::GameNotFound(_)
            | BingoError::CardNotInGame { .. } => ErrorKind::NotFound,
            BingoError::InvalidState { .. }
            | BingoError::NoActiveGame
            | BingoError::NumbersExhausted(_) => ErrorKind::InvalidState,
            BingoError::InvalidNumber(_)
            | BingoError::InvalidCardNumbers(_)
            | BingoError::InvalidGrid(_)
            | BingoError::InvalidStatus(_)
            | BingoError::InvalidSetting { .. }
            | BingoError::EmptyUpdate => ErrorKind::InvalidInput,
            BingoError::DuplicateSerial(_)
            | BingoError::CardNotAvailable { .. }
            | BingoError::DuplicateAttach { .. }
            | BingoError::DuplicateCall { .. } => ErrorKind::Conflict,
            BingoError::PatternInUse { .. } => ErrorKind::DependencyInUse,
            BingoError::Store(_) => ErrorKind::Store,
        }
    }
}

pub type Result<T> = std::result::Result<T, BingoError>;
