//! Hall session: one store, one current game.
//!
//! A thin controller over the card store, pattern store and game engine.
//! It remembers which game is running so a front end can issue calls
//! without threading the game id through every request.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::{info, warn};

use crate::cards::{Card, CardNumbers, CardStore, ImportRecord, ImportReport};
use crate::core::{GameId, HallConfig, PatternId};
use crate::error::{BingoError, Result};
use crate::game::{CallOutcome, Game, GameEngine, GameEvent, GameSnapshot, ListenerId};
use crate::patterns::{NewPattern, Pattern, PatternStore};
use crate::store::Store;

/// Controller façade over a store.
///
/// ## Example
///
/// ```
/// use bingo_hall::core::HallConfig;
/// use bingo_hall::patterns::{NewPattern, PatternGrid};
/// use bingo_hall::session::Session;
/// use bingo_hall::store::MemoryStore;
///
/// let mut session = Session::new(MemoryStore::new(), HallConfig::new().with_seed(7));
/// session.create_card("A-1", "BATCH", None).unwrap();
///
/// let blackout = PatternGrid::from_positions(bingo_hall::core::Position::all());
/// let pattern = session
///     .create_pattern(NewPattern::new("Blackout", "full", blackout.to_rows()))
///     .unwrap();
///
/// session.create_game(pattern.id, ["A-1"]).unwrap();
/// session.start_game().unwrap();
/// for _ in 0..75 {
///     session.call_random().unwrap();
/// }
/// assert!(session.verify_winner("A-1").unwrap());
/// ```
#[derive(Debug)]
pub struct Session<S: Store> {
    store: S,
    cards: CardStore,
    patterns: PatternStore,
    engine: GameEngine,
    current_game: Option<GameId>,
}

impl<S: Store> Session<S> {
    /// Open a session. Card numbers and ball draws use separate streams of
    /// the configured seed.
    pub fn new(store: S, config: HallConfig) -> Self {
        let cards = CardStore::new(config.rng().for_context("cards"));
        Self {
            store,
            cards,
            patterns: PatternStore::new(),
            engine: GameEngine::new(config),
            current_game: None,
        }
    }

    /// Replace the engine, e.g. to install a fixed clock.
    #[must_use]
    pub fn with_engine(mut self, engine: GameEngine) -> Self {
        self.engine = engine;
        self
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    #[must_use]
    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    #[must_use]
    pub fn current_game(&self) -> Option<GameId> {
        self.current_game
    }

    /// Make an existing game current.
    pub fn select_game(&mut self, game_id: GameId) -> Result<Game> {
        let game = self.engine.get(&self.store, game_id)?;
        self.current_game = Some(game_id);
        Ok(game)
    }

    fn require_game(&self) -> Result<GameId> {
        self.current_game.ok_or(BingoError::NoActiveGame)
    }

    // === Inventory ===

    pub fn create_card(
        &mut self,
        serial: &str,
        batch: &str,
        numbers: Option<CardNumbers>,
    ) -> Result<Card> {
        self.cards.create(&mut self.store, serial, batch, numbers)
    }

    pub fn import_cards(&mut self, records: impl IntoIterator<Item = ImportRecord>) -> ImportReport {
        self.cards.import(&mut self.store, records)
    }

    pub fn import_cards_json(&mut self, json: &str) -> ImportReport {
        self.cards.import_json(&mut self.store, json)
    }

    /// Import cards from a CSV file on disk.
    pub fn import_cards_file(&mut self, path: impl AsRef<Path>) -> ImportReport {
        match File::open(path.as_ref()) {
            Ok(file) => self.cards.import_csv(&mut self.store, BufReader::new(file)),
            Err(err) => {
                warn!(path = %path.as_ref().display(), error = %err, "card import file unreadable");
                ImportReport {
                    imported: 0,
                    errors: vec![format!("Import error: {err}")],
                }
            }
        }
    }

    pub fn create_pattern(&mut self, new: NewPattern) -> Result<Pattern> {
        self.patterns.create(&mut self.store, new)
    }

    pub fn delete_pattern(&mut self, id: PatternId) -> Result<()> {
        self.patterns.delete(&mut self.store, id)
    }

    // === Current game ===

    /// Create a game and attach its cards in one transaction, then make it
    /// current.
    pub fn create_game<I>(&mut self, pattern_id: PatternId, serials: I) -> Result<Game>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let game = self.engine.transact(&mut self.store, |engine, s| {
            let game = engine.create(s, pattern_id)?;
            engine.add_cards(s, game.id, serials)?;
            Ok(game)
        })?;
        self.current_game = Some(game.id);
        info!(game_id = %game.id, "current game set");
        Ok(game)
    }

    pub fn start_game(&mut self) -> Result<Game> {
        let game_id = self.require_game()?;
        self.engine.start(&mut self.store, game_id)
    }

    pub fn call_number(&mut self, number: u8) -> Result<CallOutcome> {
        let game_id = self.require_game()?;
        self.engine.call_number(&mut self.store, game_id, number)
    }

    pub fn call_random(&mut self) -> Result<CallOutcome> {
        let game_id = self.require_game()?;
        self.engine.call_random(&mut self.store, game_id)
    }

    pub fn verify_winner(&self, serial: &str) -> Result<bool> {
        let game_id = self.require_game()?;
        self.engine.verify_winner(&self.store, game_id, serial)
    }

    /// Numbers the card still needs in the current game.
    pub fn numbers_needed(&self, serial: &str) -> Result<Vec<u8>> {
        let game_id = self.require_game()?;
        self.engine.numbers_needed(&self.store, game_id, serial)
    }

    /// End the current game and clear it.
    pub fn end_game(&mut self, winner: Option<&str>, cancelled: bool) -> Result<Game> {
        let game_id = self.require_game()?;
        let game = self.engine.end(&mut self.store, game_id, winner, cancelled)?;
        self.current_game = None;
        Ok(game)
    }

    /// Board state of the current game.
    pub fn game_state(&self) -> Result<GameSnapshot> {
        let game_id = self.require_game()?;
        self.engine.snapshot(&self.store, game_id)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + Send + 'static) -> ListenerId {
        self.engine.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.engine.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::MemoryStore;

    #[test]
    fn test_no_current_game() {
        let mut session = Session::new(MemoryStore::new(), HallConfig::new().with_seed(1));
        assert_eq!(session.current_game(), None);
        assert_eq!(session.start_game().unwrap_err(), BingoError::NoActiveGame);
        assert_eq!(session.call_number(5).unwrap_err().kind(), ErrorKind::InvalidState);
        assert!(session.game_state().is_err());
    }

    #[test]
    fn test_select_game_requires_existing() {
        let mut session = Session::new(MemoryStore::new(), HallConfig::new().with_seed(1));
        assert_eq!(
            session.select_game(GameId::new(3)).unwrap_err(),
            BingoError::GameNotFound(GameId::new(3))
        );
        assert_eq!(session.current_game(), None);
    }
}
