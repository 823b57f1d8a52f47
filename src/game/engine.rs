//! Game engine: lifecycle, ball calling and win verification.
//!
//! Every mutating operation runs through [`GameEngine::transact`], which wraps
//! it in one store transaction. A failure anywhere rolls the whole operation
//! back, and its events are dropped with it.
//!
//! ## State machine
//!
//! ```text
//! pending ──start──▶ in_progress ──end──▶ completed
//!                                  └─end(cancelled)──▶ cancelled
//! ```
//!
//! Cards attach only while pending. Numbers are called and cards verified
//! only while in progress.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::events::{EventBus, GameEvent, ListenerId};
use super::game::{BallCall, Game, GameStatus, MAX_NUMBER, MIN_NUMBER};
use super::verify::{card_matches, missing_numbers, CalledSet};
use crate::cards::{CardNumbers, CardStatus, CardStore};
use crate::core::{Clock, DrawRng, GameId, HallConfig, IdKind, PatternId, SystemClock};
use crate::error::{BingoError, Result};
use crate::patterns::{Pattern, PatternGrid};
use crate::store::{with_txn, Store, StoreError};

/// Result of a successful call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOutcome {
    pub call: BallCall,
    /// Attached cards that now match, when auto-verify is on.
    pub winners: Vec<String>,
}

/// Everything a caller needs to draw a game board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game: Game,
    pub pattern: Pattern,
    /// In call order.
    pub calls: Vec<BallCall>,
    pub cards: Vec<String>,
    /// Pattern shape at the current call count.
    pub effective_grid: PatternGrid,
}

/// Runs games against a [`Store`].
///
/// The engine holds no game state of its own; the store is the single
/// source of truth. It owns the draw RNG, the clock and the event bus.
pub struct GameEngine {
    config: HallConfig,
    rng: DrawRng,
    clock: Box<dyn Clock>,
    events: EventBus,
}

impl GameEngine {
    /// Create an engine. Random draws use the `calls` stream of the
    /// configured seed.
    #[must_use]
    pub fn new(config: HallConfig) -> Self {
        let rng = config.rng().for_context("calls");
        Self {
            config,
            rng,
            clock: Box::new(SystemClock),
            events: EventBus::new(),
        }
    }

    /// Use a different time source.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    #[must_use]
    pub fn config(&self) -> &HallConfig {
        &self.config
    }

    // === Observers ===

    /// Register a listener for committed events.
    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + Send + 'static) -> ListenerId {
        self.events.subscribe(Box::new(listener))
    }

    /// Returns `false` if the listener was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Deliver events queued under a transaction the caller committed itself.
    pub fn flush_events(&mut self) {
        self.events.flush();
    }

    /// Drop events queued under a transaction the caller rolled back.
    pub fn discard_events(&mut self) {
        self.events.discard();
    }

    /// Run `op` as one atomic unit.
    ///
    /// Joins an open transaction under a savepoint, otherwise owns one.
    /// A failing `op` leaves neither writes nor queued events behind. Events
    /// queued by a successful `op` are delivered when the owned transaction
    /// commits; under a joined one they wait for the caller.
    pub fn transact<S, T, F>(&mut self, store: &mut S, op: F) -> Result<T>
    where
        S: Store + ?Sized,
        F: FnOnce(&mut Self, &mut S) -> Result<T>,
    {
        let outermost = !store.in_transaction();
        let queued = self.events.pending_len();
        let result = with_txn(store, |s| op(self, s));
        match (&result, outermost) {
            (Ok(_), true) => self.events.flush(),
            (Ok(_), false) => {}
            (Err(_), _) => self.events.discard_from(queued),
        }
        result
    }

    // === Lifecycle ===

    /// Create a pending game for a pattern.
    pub fn create<S: Store + ?Sized>(&mut self, store: &mut S, pattern_id: PatternId) -> Result<Game> {
        let game = self.transact(store, |engine, s| {
            if s.pattern(pattern_id)?.is_none() {
                return Err(BingoError::PatternNotFound(pattern_id));
            }
            let id = GameId::new(s.next_id(IdKind::Game)?);
            let game = Game::new(id, pattern_id, engine.clock.now());
            s.put_game(game.clone())?;
            engine.events.queue(GameEvent::GameCreated {
                game: id,
                pattern: pattern_id,
            });
            Ok(game)
        })?;

        info!(game_id = %game.id, pattern_id = %pattern_id, "game created");
        Ok(game)
    }

    /// Attach cards to a pending game and mark them in play.
    ///
    /// All or nothing: one missing, unavailable or already attached card
    /// leaves the game and every card untouched.
    pub fn add_cards<S, I>(&mut self, store: &mut S, game_id: GameId, serials: I) -> Result<()>
    where
        S: Store + ?Sized,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let serials: Vec<String> = serials.into_iter().map(|s| s.as_ref().to_string()).collect();

        self.transact(store, |engine, s| {
            let game = load_game(s, game_id)?;
            require_status(&game, GameStatus::Pending)?;

            let mut attached: FxHashSet<String> = s.game_cards(game_id)?.into_iter().collect();
            for serial in &serials {
                if !attached.insert(serial.clone()) {
                    return Err(BingoError::DuplicateAttach {
                        game: game_id,
                        serial: serial.clone(),
                    });
                }
                let card = s
                    .card(serial)?
                    .ok_or_else(|| BingoError::CardNotFound(serial.clone()))?;
                if !card.is_available() {
                    return Err(BingoError::CardNotAvailable {
                        serial: serial.clone(),
                        status: card.status,
                    });
                }
                s.attach_card(game_id, serial).map_err(|err| match err {
                    StoreError::UniqueViolation { .. } => BingoError::DuplicateAttach {
                        game: game_id,
                        serial: serial.clone(),
                    },
                    other => other.into(),
                })?;
                CardStore::set_status(s, serial, CardStatus::InPlay)?;
            }

            if !serials.is_empty() {
                engine.events.queue(GameEvent::CardsAttached {
                    game: game_id,
                    serials: serials.clone(),
                });
            }
            Ok(())
        })
        .map_err(|err| {
            warn!(game_id = %game_id, error = %err, "adding cards rejected");
            err
        })?;

        info!(game_id = %game_id, count = serials.len(), "cards attached");
        Ok(())
    }

    /// Move a pending game into play.
    pub fn start<S: Store + ?Sized>(&mut self, store: &mut S, game_id: GameId) -> Result<Game> {
        let game = self.transact(store, |engine, s| {
            let mut game = load_game(s, game_id)?;
            require_status(&game, GameStatus::Pending)?;
            game.status = GameStatus::InProgress;
            game.start_time = Some(engine.clock.now());
            s.put_game(game.clone())?;
            engine.events.queue(GameEvent::GameStarted { game: game_id });
            Ok(game)
        })?;

        info!(game_id = %game_id, "game started");
        Ok(game)
    }

    /// End a game in progress.
    ///
    /// The winner's card becomes `won`; every other attached card returns to
    /// `available`. A cancelled game records no winner.
    pub fn end<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        game_id: GameId,
        winner: Option<&str>,
        cancelled: bool,
    ) -> Result<Game> {
        let winner = if cancelled { None } else { winner };

        let game = self.transact(store, |engine, s| {
            let mut game = load_game(s, game_id)?;
            require_status(&game, GameStatus::InProgress)?;

            let attached = s.game_cards(game_id)?;
            if let Some(serial) = winner {
                if !attached.iter().any(|a| a == serial) {
                    return Err(BingoError::CardNotInGame {
                        game: game_id,
                        serial: serial.to_string(),
                    });
                }
            }

            game.status = if cancelled {
                GameStatus::Cancelled
            } else {
                GameStatus::Completed
            };
            game.end_time = Some(engine.clock.now());
            game.winner_card = winner.map(str::to_string);
            s.put_game(game.clone())?;

            for serial in &attached {
                let status = if Some(serial.as_str()) == winner {
                    CardStatus::Won
                } else {
                    CardStatus::Available
                };
                CardStore::set_status(s, serial, status)?;
            }

            engine.events.queue(GameEvent::GameEnded {
                game: game_id,
                status: game.status,
                winner: game.winner_card.clone(),
            });
            Ok(game)
        })?;

        info!(game_id = %game_id, status = %game.status, winner = ?game.winner_card, "game ended");
        Ok(game)
    }

    // === Calling ===

    /// Call a specific number.
    pub fn call_number<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        game_id: GameId,
        number: u8,
    ) -> Result<CallOutcome> {
        if !(MIN_NUMBER..=MAX_NUMBER).contains(&number) {
            warn!(game_id = %game_id, number, "number out of range");
            return Err(BingoError::InvalidNumber(number));
        }

        self.transact(store, |engine, s| {
            let game = load_game(s, game_id)?;
            require_status(&game, GameStatus::InProgress)?;
            let calls = s.calls(game_id)?;
            if calls.iter().any(|c| c.number == number) {
                warn!(game_id = %game_id, number, "number already called");
                return Err(BingoError::DuplicateCall {
                    game: game_id,
                    number,
                });
            }
            engine.record_call(s, &game, &calls, number)
        })
    }

    /// Call a number drawn uniformly from those not yet called.
    pub fn call_random<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        game_id: GameId,
    ) -> Result<CallOutcome> {
        self.transact(store, |engine, s| {
            let game = load_game(s, game_id)?;
            require_status(&game, GameStatus::InProgress)?;
            let calls = s.calls(game_id)?;
            let called: CalledSet = calls.iter().map(|c| c.number).collect();
            let remaining: Vec<u8> = (MIN_NUMBER..=MAX_NUMBER)
                .filter(|n| !called.contains(n))
                .collect();
            let number = engine
                .rng
                .choose(&remaining)
                .copied()
                .ok_or(BingoError::NumbersExhausted(game_id))?;
            engine.record_call(s, &game, &calls, number)
        })
    }

    fn record_call<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        game: &Game,
        calls: &[BallCall],
        number: u8,
    ) -> Result<CallOutcome> {
        let call_order = calls.iter().map(|c| c.call_order).max().unwrap_or(0) + 1;
        let call = BallCall::new(number, call_order, self.clock.now());
        store.insert_call(game.id, call).map_err(|err| match err {
            StoreError::UniqueViolation { .. } => BingoError::DuplicateCall {
                game: game.id,
                number,
            },
            other => other.into(),
        })?;

        let winners = if self.config.auto_verify {
            let mut called: CalledSet = calls.iter().map(|c| c.number).collect();
            called.insert(number);
            find_winners(store, game, &called)?
        } else {
            Vec::new()
        };

        info!(game_id = %game.id, number, call_order, winners = winners.len(), "number called");
        self.events.queue(GameEvent::NumberCalled {
            game: game.id,
            call,
            winners: winners.clone(),
        });
        Ok(CallOutcome { call, winners })
    }

    // === Verification ===

    /// Does the card cover the game's pattern with the numbers called so far?
    ///
    /// Moving patterns are checked in their shape at the current call count.
    pub fn verify_winner<S: Store + ?Sized>(
        &self,
        store: &S,
        game_id: GameId,
        serial: &str,
    ) -> Result<bool> {
        let (numbers, grid, called) = attached_card_view(store, game_id, serial)?;
        let is_winner = card_matches(&numbers, &grid, &called);

        debug!(game_id = %game_id, serial, calls = called.len(), is_winner, "card verified");
        Ok(is_winner)
    }

    /// Numbers `serial` still needs under the current effective grid.
    ///
    /// Same preconditions as [`verify_winner`](Self::verify_winner); empty
    /// exactly when it would return `true`.
    pub fn numbers_needed<S: Store + ?Sized>(
        &self,
        store: &S,
        game_id: GameId,
        serial: &str,
    ) -> Result<Vec<u8>> {
        let (numbers, grid, called) = attached_card_view(store, game_id, serial)?;
        Ok(missing_numbers(&numbers, &grid, &called))
    }

    // === Reads ===

    pub fn get<S: Store + ?Sized>(&self, store: &S, game_id: GameId) -> Result<Game> {
        load_game(store, game_id)
    }

    /// Calls in call order.
    pub fn get_called_numbers<S: Store + ?Sized>(
        &self,
        store: &S,
        game_id: GameId,
    ) -> Result<Vec<BallCall>> {
        load_game(store, game_id)?;
        Ok(store.calls(game_id)?)
    }

    /// Attached serials in attach order.
    pub fn get_game_cards<S: Store + ?Sized>(
        &self,
        store: &S,
        game_id: GameId,
    ) -> Result<Vec<String>> {
        load_game(store, game_id)?;
        Ok(store.game_cards(game_id)?)
    }

    pub fn snapshot<S: Store + ?Sized>(&self, store: &S, game_id: GameId) -> Result<GameSnapshot> {
        let game = load_game(store, game_id)?;
        let pattern = load_pattern(store, game.pattern_id)?;
        let calls = store.calls(game_id)?;
        let cards = store.game_cards(game_id)?;
        let effective_grid = pattern.effective_grid(calls.len());
        Ok(GameSnapshot {
            game,
            pattern,
            calls,
            cards,
            effective_grid,
        })
    }
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("config", &self.config)
            .field("rng", &self.rng)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

fn load_game<S: Store + ?Sized>(store: &S, id: GameId) -> Result<Game> {
    store.game(id)?.ok_or(BingoError::GameNotFound(id))
}

fn load_pattern<S: Store + ?Sized>(store: &S, id: PatternId) -> Result<Pattern> {
    store.pattern(id)?.ok_or(BingoError::PatternNotFound(id))
}

fn require_status(game: &Game, expected: GameStatus) -> Result<()> {
    if game.status == expected {
        Ok(())
    } else {
        Err(BingoError::InvalidState {
            game: game.id,
            actual: game.status,
            expected,
        })
    }
}

/// Card numbers, effective grid and called set for an attached card of a
/// running game.
fn attached_card_view<S: Store + ?Sized>(
    store: &S,
    game_id: GameId,
    serial: &str,
) -> Result<(CardNumbers, PatternGrid, CalledSet)> {
    let game = load_game(store, game_id)?;
    require_status(&game, GameStatus::InProgress)?;
    if !store.game_cards(game_id)?.iter().any(|a| a == serial) {
        return Err(BingoError::CardNotInGame {
            game: game_id,
            serial: serial.to_string(),
        });
    }

    let called: CalledSet = store.calls(game_id)?.iter().map(|c| c.number).collect();
    let pattern = load_pattern(store, game.pattern_id)?;
    let grid = pattern.effective_grid(called.len());
    let card = store
        .card(serial)?
        .ok_or_else(|| BingoError::CardNotFound(serial.to_string()))?;
    Ok((card.numbers, grid, called))
}

fn card_wins<S: Store + ?Sized>(
    store: &S,
    serial: &str,
    grid: &PatternGrid,
    called: &CalledSet,
) -> Result<bool> {
    let card = store
        .card(serial)?
        .ok_or_else(|| BingoError::CardNotFound(serial.to_string()))?;
    Ok(card_matches(&card.numbers, grid, called))
}

/// Attached cards matching the pattern at the given called set.
fn find_winners<S: Store + ?Sized>(store: &S, game: &Game, called: &CalledSet) -> Result<Vec<String>> {
    let pattern = load_pattern(store, game.pattern_id)?;
    let grid = pattern.effective_grid(called.len());
    let mut winners = Vec::new();
    for serial in store.game_cards(game.id)? {
        if card_wins(store, &serial, &grid, called)? {
            winners.push(serial);
        }
    }
    Ok(winners)
}
