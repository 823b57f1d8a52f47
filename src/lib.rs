//! # bingo-hall
//!
//! Core of a 75-ball bingo hall: card inventory, winning patterns (static or
//! moving) and the game engine that calls numbers and verifies winners.
//!
//! ## Design Principles
//!
//! 1. **Store-Agnostic**: All state lives behind the [`Store`] trait. The
//!    engine never caches game state; every operation reads what it needs.
//!
//! 2. **Atomic Operations**: Each mutating operation is one transaction.
//!    Operations compose: nested calls join the outer transaction.
//!
//! 3. **Pure Pattern Movement**: A moving pattern's shape is recomputed from
//!    its base grid and the current call count on every query.
//!
//! ## Modules
//!
//! - `core`: ids, grid geometry, RNG, clock, configuration
//! - `store`: store trait, transaction helper, in-memory store
//! - `cards`: card numbers, card store, bulk import
//! - `patterns`: pattern grids, movement rules, pattern store
//! - `game`: game engine, events, win verification
//! - `session`: controller façade with a current game

pub mod cards;
pub mod core;
pub mod error;
pub mod game;
pub mod patterns;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use crate::core::{Clock, FixedClock, GameId, HallConfig, PatternId, Position, SystemClock};

pub use crate::error::{BingoError, ErrorKind, Result};

pub use crate::store::{with_txn, MemoryStore, Savepoint, Store, StoreError};

pub use crate::cards::{Card, CardNumbers, CardStatus, CardStore, ImportRecord, ImportReport};

pub use crate::patterns::{
    apply_movement, Direction, MovementRule, NewPattern, Pattern, PatternGrid, PatternStore,
    PatternUpdate,
};

pub use crate::game::{
    BallCall, CallOutcome, Game, GameEngine, GameEvent, GameSnapshot, GameStatus, ListenerId,
};

pub use crate::session::Session;
