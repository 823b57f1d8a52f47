//! Game records and ball calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{GameId, PatternId};

/// Lowest callable number.
pub const MIN_NUMBER: u8 = 1;
/// Highest callable number.
pub const MAX_NUMBER: u8 = 75;

/// Game lifecycle: `pending → in_progress → completed | cancelled`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl GameStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Pending => "pending",
            GameStatus::InProgress => "in_progress",
            GameStatus::Completed => "completed",
            GameStatus::Cancelled => "cancelled",
        }
    }

    /// No transition leaves a terminal state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Completed | GameStatus::Cancelled)
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A game bound to one pattern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub pattern_id: PatternId,
    pub status: GameStatus,
    pub created_at: DateTime<Utc>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Serial of the winning card, if one was declared.
    pub winner_card: Option<String>,
}

impl Game {
    /// A new pending game.
    #[must_use]
    pub fn new(id: GameId, pattern_id: PatternId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            pattern_id,
            status: GameStatus::Pending,
            created_at,
            start_time: None,
            end_time: None,
            winner_card: None,
        }
    }
}

/// One called number. `call_order` starts at 1 within each game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallCall {
    pub number: u8,
    pub call_order: u32,
    pub called_at: DateTime<Utc>,
}

impl BallCall {
    #[must_use]
    pub fn new(number: u8, call_order: u32, called_at: DateTime<Utc>) -> Self {
        Self {
            number,
            call_order,
            called_at,
        }
    }

    /// Column letter of the number (B, I, N, G or O).
    #[must_use]
    pub fn letter(&self) -> Option<char> {
        crate::cards::COLUMN_RANGES
            .iter()
            .position(|range| range.contains(&self.number))
            .map(|col| crate::cards::COLUMN_LETTERS[col])
    }
}

impl std::fmt::Display for BallCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.letter() {
            Some(letter) => write!(f, "{letter}-{}", self.number),
            None => write!(f, "{}", self.number),
        }
    }
}
