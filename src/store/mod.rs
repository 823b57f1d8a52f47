//! Store contract for cards, patterns, games and their calls.
//!
//! The engine never talks to a database directly. It consumes the [`Store`]
//! trait: typed get/put/query per record kind, id sequences, and explicit
//! `begin`/`commit`/`rollback` with savepoints inside an open transaction.
//! Every mutating operation runs inside [`with_txn`], so it either commits as
//! a whole or leaves no trace, even when it joins a caller's transaction.
//!
//! ## Implementations
//!
//! - [`MemoryStore`]: persistent-map store with O(1) snapshots, used for
//!   local runs and tests.

pub mod error;
pub mod memory;

use tracing::warn;

use crate::cards::{Card, CardStatus};
use crate::core::{GameId, IdKind, PatternId};
use crate::game::{BallCall, Game};
use crate::patterns::Pattern;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;

/// Card search criteria. Omitted (or empty) filters do not constrain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CardFilter {
    pub batch_number: Option<String>,
    pub status: Option<CardStatus>,
}

impl CardFilter {
    #[must_use]
    pub fn matches(&self, card: &Card) -> bool {
        let batch_ok = match self.batch_number.as_deref() {
            Some(batch) if !batch.is_empty() => card.batch_number == batch,
            _ => true,
        };
        batch_ok && self.status.map_or(true, |status| card.status == status)
    }
}

/// Pattern search criteria. Omitted (or empty) filters do not constrain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatternFilter {
    pub category: Option<String>,
    pub is_moving: Option<bool>,
}

impl PatternFilter {
    #[must_use]
    pub fn matches(&self, pattern: &Pattern) -> bool {
        let category_ok = match self.category.as_deref() {
            Some(category) if !category.is_empty() => pattern.category == category,
            _ => true,
        };
        category_ok && self.is_moving.map_or(true, |moving| pattern.is_moving == moving)
    }
}

/// A point inside an open transaction that writes can be rolled back to.
///
/// Savepoints nest: rolling back to or releasing one also drops every
/// savepoint taken after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Savepoint(usize);

impl Savepoint {
    #[must_use]
    pub const fn new(depth: usize) -> Self {
        Self(depth)
    }

    /// Nesting depth, starting at 0 for the first savepoint of a transaction.
    #[must_use]
    pub const fn depth(self) -> usize {
        self.0
    }
}

/// Transactional record store.
///
/// Reads are allowed at any time. Writes require an open transaction and
/// fail with [`StoreError::NoTransaction`] otherwise. Only one transaction
/// may be open at a time; nesting is handled by [`with_txn`].
pub trait Store {
    // === Transactions ===

    fn begin(&mut self) -> StoreResult<()>;

    fn commit(&mut self) -> StoreResult<()>;

    fn rollback(&mut self) -> StoreResult<()>;

    fn in_transaction(&self) -> bool;

    /// Mark the current state of the open transaction.
    fn savepoint(&mut self) -> StoreResult<Savepoint>;

    /// Undo every write made since `savepoint`. The transaction stays open.
    fn rollback_to(&mut self, savepoint: Savepoint) -> StoreResult<()>;

    /// Keep the writes made since `savepoint` and forget the mark.
    fn release(&mut self, savepoint: Savepoint) -> StoreResult<()>;

    /// Allocate the next identifier of a kind. Sequences start at 1.
    fn next_id(&mut self, kind: IdKind) -> StoreResult<u64>;

    // === Cards ===

    fn card(&self, serial: &str) -> StoreResult<Option<Card>>;

    /// Insert a new card. Fails with `UniqueViolation` if the serial exists.
    fn insert_card(&mut self, card: Card) -> StoreResult<()>;

    /// Set a card's status. Returns `false` if the serial is absent.
    fn set_card_status(&mut self, serial: &str, status: CardStatus) -> StoreResult<bool>;

    /// Cards matching the filter, in serial order.
    fn query_cards(&self, filter: &CardFilter) -> StoreResult<Vec<Card>>;

    // === Patterns ===

    fn pattern(&self, id: PatternId) -> StoreResult<Option<Pattern>>;

    /// Insert or replace a pattern.
    fn put_pattern(&mut self, pattern: Pattern) -> StoreResult<()>;

    /// Remove a pattern. Returns `false` if it was absent.
    fn remove_pattern(&mut self, id: PatternId) -> StoreResult<bool>;

    /// Patterns matching the filter, in id order.
    fn query_patterns(&self, filter: &PatternFilter) -> StoreResult<Vec<Pattern>>;

    // === Games ===

    fn game(&self, id: GameId) -> StoreResult<Option<Game>>;

    /// Insert or replace a game.
    fn put_game(&mut self, game: Game) -> StoreResult<()>;

    /// Number of games referencing a pattern.
    fn games_using_pattern(&self, id: PatternId) -> StoreResult<usize>;

    /// Ball calls of a game, ordered by call order.
    fn calls(&self, game: GameId) -> StoreResult<Vec<BallCall>>;

    /// Append a call. Number and call order are each unique within a game.
    fn insert_call(&mut self, game: GameId, call: BallCall) -> StoreResult<()>;

    /// Serials attached to a game, in attach order.
    fn game_cards(&self, game: GameId) -> StoreResult<Vec<String>>;

    /// Attach a card to a game. (game, serial) is unique.
    fn attach_card(&mut self, game: GameId, serial: &str) -> StoreResult<()>;
}

/// Run `op` inside a transaction.
///
/// 1) A transaction is already open → join it under a savepoint. On `Err`
///    the savepoint is rolled back, so the outer scope never sees a partial
///    write; the outer scope still decides commit or rollback.
/// 2) Otherwise → begin, run, commit on `Ok`, roll back on `Err` keeping the
///    original error.
pub fn with_txn<S, T, E, F>(store: &mut S, op: F) -> Result<T, E>
where
    S: Store + ?Sized,
    E: From<StoreError>,
    F: FnOnce(&mut S) -> Result<T, E>,
{
    if store.in_transaction() {
        let savepoint = store.savepoint()?;
        return match op(store) {
            Ok(value) => {
                store.release(savepoint)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = store.rollback_to(savepoint) {
                    warn!(error = %rollback_err, "rollback to savepoint failed");
                }
                Err(err)
            }
        };
    }

    store.begin()?;
    match op(store) {
        Ok(value) => match store.commit() {
            Ok(()) => Ok(value),
            Err(err) => {
                if let Err(rollback_err) = store.rollback() {
                    warn!(error = %rollback_err, "rollback after failed commit also failed");
                }
                Err(err.into())
            }
        },
        Err(err) => {
            if let Err(rollback_err) = store.rollback() {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
