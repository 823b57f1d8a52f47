//! Record identifiers.
//!
//! Cards are identified by their printed serial number (a string). Patterns
//! and games get numeric ids allocated by the store, one sequence per kind.

use serde::{Deserialize, Serialize};

/// Identifier of a winning pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PatternId(pub u64);

impl PatternId {
    /// Create a new pattern ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PatternId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Pattern({})", self.0)
    }
}

/// Identifier of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameId(pub u64);

impl GameId {
    /// Create a new game ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Game({})", self.0)
    }
}

/// Which id sequence to draw from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdKind {
    Pattern,
    Game,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PatternId::new(3)), "Pattern(3)");
        assert_eq!(format!("{}", GameId::new(12)), "Game(12)");
    }

    #[test]
    fn test_ordering_follows_raw_value() {
        assert!(GameId::new(1) < GameId::new(2));
        assert_eq!(PatternId::new(7).raw(), 7);
    }

    #[test]
    fn test_serialization_is_transparent_number() {
        let json = serde_json::to_string(&GameId::new(42)).unwrap();
        assert_eq!(json, "42");
        let back: GameId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, GameId::new(42));
    }
}
