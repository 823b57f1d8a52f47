//! In-memory store implementation.
//!
//! Tables are `im` persistent maps, so `begin` snapshots the whole store
//! with an O(1) clone and `rollback` simply restores the snapshot. Savepoints
//! are a stack of further snapshots taken inside the transaction. Id
//! sequences live in the snapshot too and roll back with everything else.

use im::{OrdMap, Vector};

use crate::cards::{Card, CardStatus};
use crate::core::{GameId, IdKind, PatternId};
use crate::game::{BallCall, Game};
use crate::patterns::Pattern;

use super::{CardFilter, PatternFilter, Savepoint, Store, StoreError, StoreResult};

#[derive(Clone, Debug, Default)]
struct Tables {
    cards: OrdMap<String, Card>,
    patterns: OrdMap<PatternId, Pattern>,
    games: OrdMap<GameId, Game>,
    calls: OrdMap<GameId, Vector<BallCall>>,
    game_cards: OrdMap<GameId, Vector<String>>,
    next_pattern_id: u64,
    next_game_id: u64,
}

/// In-memory [`Store`].
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: Tables,
    /// State at `begin`, restored on `rollback`.
    snapshot: Option<Tables>,
    /// Open savepoints, innermost last.
    savepoints: Vec<Tables>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_savepoint(&self, savepoint: Savepoint) -> StoreResult<()> {
        self.ensure_txn()?;
        if savepoint.depth() < self.savepoints.len() {
            Ok(())
        } else {
            Err(StoreError::UnknownSavepoint(savepoint.depth()))
        }
    }

    fn ensure_txn(&self) -> StoreResult<()> {
        if self.snapshot.is_some() {
            Ok(())
        } else {
            Err(StoreError::NoTransaction)
        }
    }
}

impl Store for MemoryStore {
    fn begin(&mut self) -> StoreResult<()> {
        if self.snapshot.is_some() {
            return Err(StoreError::TransactionActive);
        }
        self.snapshot = Some(self.tables.clone());
        Ok(())
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.snapshot.take().ok_or(StoreError::NoTransaction)?;
        self.savepoints.clear();
        Ok(())
    }

    fn rollback(&mut self) -> StoreResult<()> {
        let snapshot = self.snapshot.take().ok_or(StoreError::NoTransaction)?;
        self.tables = snapshot;
        self.savepoints.clear();
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    fn savepoint(&mut self) -> StoreResult<Savepoint> {
        self.ensure_txn()?;
        self.savepoints.push(self.tables.clone());
        Ok(Savepoint::new(self.savepoints.len() - 1))
    }

    fn rollback_to(&mut self, savepoint: Savepoint) -> StoreResult<()> {
        self.ensure_savepoint(savepoint)?;
        self.savepoints.truncate(savepoint.depth() + 1);
        if let Some(tables) = self.savepoints.pop() {
            self.tables = tables;
        }
        Ok(())
    }

    fn release(&mut self, savepoint: Savepoint) -> StoreResult<()> {
        self.ensure_savepoint(savepoint)?;
        self.savepoints.truncate(savepoint.depth());
        Ok(())
    }

    fn next_id(&mut self, kind: IdKind) -> StoreResult<u64> {
        self.ensure_txn()?;
        let counter = match kind {
            IdKind::Pattern => &mut self.tables.next_pattern_id,
            IdKind::Game => &mut self.tables.next_game_id,
        };
        *counter += 1;
        Ok(*counter)
    }

    fn card(&self, serial: &str) -> StoreResult<Option<Card>> {
        Ok(self.tables.cards.get(serial).cloned())
    }

    fn insert_card(&mut self, card: Card) -> StoreResult<()> {
        self.ensure_txn()?;
        if self.tables.cards.contains_key(&card.serial_number) {
            return Err(StoreError::UniqueViolation {
                table: "cards",
                key: card.serial_number,
            });
        }
        self.tables.cards.insert(card.serial_number.clone(), card);
        Ok(())
    }

    fn set_card_status(&mut self, serial: &str, status: CardStatus) -> StoreResult<bool> {
        self.ensure_txn()?;
        match self.tables.cards.get_mut(serial) {
            Some(card) => {
                card.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn query_cards(&self, filter: &CardFilter) -> StoreResult<Vec<Card>> {
        Ok(self
            .tables
            .cards
            .values()
            .filter(|card| filter.matches(card))
            .cloned()
            .collect())
    }

    fn pattern(&self, id: PatternId) -> StoreResult<Option<Pattern>> {
        Ok(self.tables.patterns.get(&id).cloned())
    }

    fn put_pattern(&mut self, pattern: Pattern) -> StoreResult<()> {
        self.ensure_txn()?;
        self.tables.patterns.insert(pattern.id, pattern);
        Ok(())
    }

    fn remove_pattern(&mut self, id: PatternId) -> StoreResult<bool> {
        self.ensure_txn()?;
        Ok(self.tables.patterns.remove(&id).is_some())
    }

    fn query_patterns(&self, filter: &PatternFilter) -> StoreResult<Vec<Pattern>> {
        Ok(self
            .tables
            .patterns
            .values()
            .filter(|pattern| filter.matches(pattern))
            .cloned()
            .collect())
    }

    fn game(&self, id: GameId) -> StoreResult<Option<Game>> {
        Ok(self.tables.games.get(&id).cloned())
    }

    fn put_game(&mut self, game: Game) -> StoreResult<()> {
        self.ensure_txn()?;
        self.tables.games.insert(game.id, game);
        Ok(())
    }

    fn games_using_pattern(&self, id: PatternId) -> StoreResult<usize> {
        Ok(self
            .tables
            .games
            .values()
            .filter(|game| game.pattern_id == id)
            .count())
    }

    fn calls(&self, game: GameId) -> StoreResult<Vec<BallCall>> {
        Ok(self
            .tables
            .calls
            .get(&game)
            .map(|calls| calls.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn insert_call(&mut self, game: GameId, call: BallCall) -> StoreResult<()> {
        self.ensure_txn()?;
        let calls = self.tables.calls.get(&game).cloned().unwrap_or_default();
        if calls.iter().any(|c| c.number == call.number) {
            return Err(StoreError::UniqueViolation {
                table: "ball_calls",
                key: format!("{game}/number {}", call.number),
            });
        }
        if calls.iter().any(|c| c.call_order == call.call_order) {
            return Err(StoreError::UniqueViolation {
                table: "ball_calls",
                key: format!("{game}/order {}", call.call_order),
            });
        }
        let mut calls = calls;
        calls.push_back(call);
        self.tables.calls.insert(game, calls);
        Ok(())
    }

    fn game_cards(&self, game: GameId) -> StoreResult<Vec<String>> {
        Ok(self
            .tables
            .game_cards
            .get(&game)
            .map(|serials| serials.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn attach_card(&mut self, game: GameId, serial: &str) -> StoreResult<()> {
        self.ensure_txn()?;
        let mut serials = self.tables.game_cards.get(&game).cloned().unwrap_or_default();
        if serials.iter().any(|attached| attached == serial) {
            return Err(StoreError::UniqueViolation {
                table: "game_cards",
                key: format!("{game}/{serial}"),
            });
        }
        serials.push_back(serial.to_string());
        self.tables.game_cards.insert(game, serials);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardNumbers;
    use crate::core::DrawRng;
    use chrono::Utc;

    fn card(serial: &str) -> Card {
        Card::new(serial, "B1", CardNumbers::generate(&mut DrawRng::new(5)))
    }

    #[test]
    fn test_writes_require_transaction() {
        let mut store = MemoryStore::new();
        assert_eq!(store.insert_card(card("S1")), Err(StoreError::NoTransaction));
        assert_eq!(store.next_id(IdKind::Game), Err(StoreError::NoTransaction));
        assert_eq!(store.commit(), Err(StoreError::NoTransaction));
        assert_eq!(store.rollback(), Err(StoreError::NoTransaction));
    }

    #[test]
    fn test_single_transaction_at_a_time() {
        let mut store = MemoryStore::new();
        store.begin().unwrap();
        assert_eq!(store.begin(), Err(StoreError::TransactionActive));
    }

    #[test]
    fn test_rollback_restores_everything() {
        let mut store = MemoryStore::new();
        store.begin().unwrap();
        store.insert_card(card("S1")).unwrap();
        assert_eq!(store.next_id(IdKind::Pattern).unwrap(), 1);
        store.commit().unwrap();

        store.begin().unwrap();
        store.set_card_status("S1", CardStatus::InPlay).unwrap();
        store.insert_card(card("S2")).unwrap();
        assert_eq!(store.next_id(IdKind::Pattern).unwrap(), 2);
        store.rollback().unwrap();

        assert_eq!(store.card("S1").unwrap().unwrap().status, CardStatus::Available);
        assert!(store.card("S2").unwrap().is_none());

        store.begin().unwrap();
        assert_eq!(store.next_id(IdKind::Pattern).unwrap(), 2);
    }

    #[test]
    fn test_savepoints_nest() {
        let mut store = MemoryStore::new();
        assert_eq!(store.savepoint(), Err(StoreError::NoTransaction));

        store.begin().unwrap();
        store.insert_card(card("S1")).unwrap();
        let outer = store.savepoint().unwrap();
        store.insert_card(card("S2")).unwrap();
        let inner = store.savepoint().unwrap();
        store.insert_card(card("S3")).unwrap();
        assert_eq!(inner.depth(), 1);

        store.rollback_to(inner).unwrap();
        assert!(store.card("S3").unwrap().is_none());
        assert!(store.card("S2").unwrap().is_some());
        assert_eq!(store.release(inner), Err(StoreError::UnknownSavepoint(1)));

        let again = store.savepoint().unwrap();
        assert_eq!(again.depth(), 1);
        store.rollback_to(outer).unwrap();
        assert!(store.card("S2").unwrap().is_none());
        assert_eq!(store.rollback_to(again), Err(StoreError::UnknownSavepoint(1)));

        store.commit().unwrap();
        assert!(store.card("S1").unwrap().is_some());
    }

    #[test]
    fn test_id_sequences_are_per_kind() {
        let mut store = MemoryStore::new();
        store.begin().unwrap();
        assert_eq!(store.next_id(IdKind::Pattern).unwrap(), 1);
        assert_eq!(store.next_id(IdKind::Game).unwrap(), 1);
        assert_eq!(store.next_id(IdKind::Game).unwrap(), 2);
    }

    #[test]
    fn test_duplicate_serial_rejected() {
        let mut store = MemoryStore::new();
        store.begin().unwrap();
        store.insert_card(card("S1")).unwrap();
        assert!(matches!(
            store.insert_card(card("S1")),
            Err(StoreError::UniqueViolation { table: "cards", .. })
        ));
    }

    #[test]
    fn test_set_status_of_missing_card() {
        let mut store = MemoryStore::new();
        store.begin().unwrap();
        assert_eq!(store.set_card_status("nope", CardStatus::Won), Ok(false));
    }

    #[test]
    fn test_call_uniqueness() {
        let mut store = MemoryStore::new();
        let game = GameId::new(1);
        let now = Utc::now();
        store.begin().unwrap();
        store.insert_call(game, BallCall::new(7, 1, now)).unwrap();

        assert!(store.insert_call(game, BallCall::new(7, 2, now)).is_err());
        assert!(store.insert_call(game, BallCall::new(8, 1, now)).is_err());
        store.insert_call(game, BallCall::new(8, 2, now)).unwrap();

        // Same number in another game is fine.
        store.insert_call(GameId::new(2), BallCall::new(7, 1, now)).unwrap();

        let orders: Vec<_> = store.calls(game).unwrap().iter().map(|c| c.call_order).collect();
        assert_eq!(orders, vec![1, 2]);
    }

    #[test]
    fn test_attach_uniqueness_and_order() {
        let mut store = MemoryStore::new();
        let game = GameId::new(1);
        store.begin().unwrap();
        store.attach_card(game, "S2").unwrap();
        store.attach_card(game, "S1").unwrap();
        assert!(store.attach_card(game, "S2").is_err());
        assert_eq!(store.game_cards(game).unwrap(), vec!["S2".to_string(), "S1".to_string()]);
        assert!(store.game_cards(GameId::new(9)).unwrap().is_empty());
    }

    #[test]
    fn test_query_cards_in_serial_order() {
        let mut store = MemoryStore::new();
        store.begin().unwrap();
        for serial in ["C", "A", "B"] {
            store.insert_card(card(serial)).unwrap();
        }
        let serials: Vec<_> = store
            .query_cards(&CardFilter::default())
            .unwrap()
            .into_iter()
            .map(|c| c.serial_number)
            .collect();
        assert_eq!(serials, vec!["A", "B", "C"]);
    }
}
