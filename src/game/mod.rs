//! Games: lifecycle, ball calls and win verification.
//!
//! ## Key Types
//!
//! - [`Game`], [`GameStatus`], [`BallCall`]: stored records
//! - [`GameEngine`]: the state machine over a [`Store`](crate::store::Store)
//! - [`GameEvent`]: what listeners are told after each committed change
//! - [`card_matches`]: the pure winning check

pub mod engine;
pub mod events;
pub mod game;
pub mod verify;

pub use engine::{CallOutcome, GameEngine, GameSnapshot};
pub use events::{EventBus, GameEvent, Listener, ListenerId};
pub use game::{BallCall, Game, GameStatus, MAX_NUMBER, MIN_NUMBER};
pub use verify::{card_matches, missing_numbers, CalledSet};
