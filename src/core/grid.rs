//! 5×5 grid geometry shared by cards and patterns.
//!
//! Rows and columns are 0-indexed. The centre cell is the FREE slot: it
//! holds no number on a card and is always satisfied during verification.

use serde::{Deserialize, Serialize};

/// Width and height of every card and pattern grid.
pub const GRID_SIZE: usize = 5;

/// The FREE slot at the centre of the card.
pub const FREE_SPACE: Position = Position::new(2, 2);

/// A 5×5 array of cells, row-major.
pub type Cells<T> = [[T; GRID_SIZE]; GRID_SIZE];

/// A cell position on a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Is this the FREE slot?
    #[must_use]
    pub const fn is_free(self) -> bool {
        self.row == FREE_SPACE.row && self.col == FREE_SPACE.col
    }

    /// All 25 positions in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..GRID_SIZE).flat_map(|row| (0..GRID_SIZE).map(move |col| Position::new(row, col)))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
