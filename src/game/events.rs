//! Engine events and listener registration.
//!
//! Listeners see an event only after the transaction that produced it has
//! committed. Work that rolls back is never announced.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::game::{BallCall, GameStatus};
use crate::core::{GameId, PatternId};

/// Listener handle returned by `subscribe`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u32);

impl ListenerId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listener({})", self.0)
    }
}

/// Something that happened to a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    GameCreated {
        game: GameId,
        pattern: PatternId,
    },
    CardsAttached {
        game: GameId,
        serials: Vec<String>,
    },
    GameStarted {
        game: GameId,
    },
    NumberCalled {
        game: GameId,
        call: BallCall,
        /// Cards found winning by auto-verify. Empty when it is off.
        winners: Vec<String>,
    },
    GameEnded {
        game: GameId,
        status: GameStatus,
        winner: Option<String>,
    },
}

impl GameEvent {
    /// The game this event belongs to.
    #[must_use]
    pub fn game(&self) -> GameId {
        match self {
            GameEvent::GameCreated { game, .. }
            | GameEvent::CardsAttached { game, .. }
            | GameEvent::GameStarted { game }
            | GameEvent::NumberCalled { game, .. }
            | GameEvent::GameEnded { game, .. } => *game,
        }
    }
}

/// Callback invoked for each delivered event.
pub type Listener = Box<dyn FnMut(&GameEvent) + Send>;

/// Registered listeners plus events waiting for commit.
#[derive(Default)]
pub struct EventBus {
    listeners: FxHashMap<ListenerId, Listener>,
    next_id: u32,
    pending: Vec<GameEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId::new(self.next_id);
        self.listeners.insert(id, listener);
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Queue an event until the current transaction resolves.
    pub fn queue(&mut self, event: GameEvent) {
        self.pending.push(event);
    }

    /// Deliver queued events in order, to listeners in subscription order.
    pub fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let mut ids: Vec<ListenerId> = self.listeners.keys().copied().collect();
        ids.sort_unstable();
        for event in std::mem::take(&mut self.pending) {
            for id in &ids {
                if let Some(listener) = self.listeners.get_mut(id) {
                    listener(&event);
                }
            }
        }
    }

    /// Drop queued events.
    pub fn discard(&mut self) {
        self.pending.clear();
    }

    /// Number of events waiting for commit.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop events queued after the first `keep`.
    pub fn discard_from(&mut self, keep: usize) {
        self.pending.truncate(keep);
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}
