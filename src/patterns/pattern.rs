//! Winning patterns: the required-cell mask and its metadata.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::movement::{apply_movement, Direction, MovementRule};
use crate::core::{Cells, PatternId, Position, GRID_SIZE};
use crate::error::BingoError;

/// Required cells of a pattern, at most one per grid cell.
pub type RequiredCells = SmallVec<[Position; GRID_SIZE * GRID_SIZE]>;

/// 5×5 mask: `true` means the cell must be covered to win.
///
/// Serializes as a nested array of booleans.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternGrid(pub Cells<bool>);

impl PatternGrid {
    /// A grid requiring exactly the given cells.
    #[must_use]
    pub fn from_positions(positions: impl IntoIterator<Item = Position>) -> Self {
        let mut cells = [[false; GRID_SIZE]; GRID_SIZE];
        for pos in positions {
            cells[pos.row][pos.col] = true;
        }
        Self(cells)
    }

    /// Build from nested rows, which must be exactly 5×5.
    pub fn from_rows(rows: &[Vec<bool>]) -> Result<Self, BingoError> {
        if !validate_grid(rows) {
            return Err(BingoError::InvalidGrid(format!(
                "grid must be {GRID_SIZE}x{GRID_SIZE}"
            )));
        }
        let mut cells = [[false; GRID_SIZE]; GRID_SIZE];
        for (row, values) in rows.iter().enumerate() {
            cells[row].copy_from_slice(values);
        }
        Ok(Self(cells))
    }

    /// Build from a JSON value: a 5×5 nested array of booleans.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, BingoError> {
        let rows: Vec<Vec<bool>> = serde_json::from_value(value.clone())
            .map_err(|err| BingoError::InvalidGrid(err.to_string()))?;
        Self::from_rows(&rows)
    }

    /// Nested-row form, as stored.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        self.0.iter().map(|row| row.to_vec()).collect()
    }

    #[must_use]
    pub fn get(&self, pos: Position) -> bool {
        self.0[pos.row][pos.col]
    }

    /// Positions that must be covered, row-major.
    #[must_use]
    pub fn required(&self) -> RequiredCells {
        Position::all().filter(|pos| self.get(*pos)).collect()
    }

    /// One-cell cyclic shift.
    #[must_use]
    pub fn shifted(&self, direction: &Direction) -> Self {
        let mut cells = self.0;
        match direction {
            Direction::Right => cells.iter_mut().for_each(|row| row.rotate_right(1)),
            Direction::Left => cells.iter_mut().for_each(|row| row.rotate_left(1)),
            Direction::Up => cells.rotate_left(1),
            Direction::Down => cells.rotate_right(1),
            Direction::Other(_) | Direction::Null => {}
        }
        Self(cells)
    }

    /// 90° clockwise turn: result (r, c) is the base cell (4 - c, r).
    #[must_use]
    pub fn rotated_clockwise(&self) -> Self {
        let mut cells = [[false; GRID_SIZE]; GRID_SIZE];
        for (r, row) in cells.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = self.0[GRID_SIZE - 1 - c][r];
            }
        }
        Self(cells)
    }
}

/// Is this a 5×5 grid?
///
/// Cell types are enforced by `bool`; for untyped input use
/// [`PatternGrid::from_json`].
#[must_use]
pub fn validate_grid(rows: &[Vec<bool>]) -> bool {
    rows.len() == GRID_SIZE && rows.iter().all(|row| row.len() == GRID_SIZE)
}

impl std::fmt::Display for PatternGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.0 {
            let cells: Vec<&str> = row.iter().map(|&on| if on { "X" } else { "." }).collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

/// A stored winning pattern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: PatternId,
    pub name: String,
    /// Free-form label ("lines", "letters", ...).
    pub category: String,
    pub grid: PatternGrid,
    pub is_moving: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement_rules: Option<MovementRule>,
}

impl Pattern {
    /// The grid to check after `call_count` calls.
    ///
    /// Static patterns always use their base grid.
    #[must_use]
    pub fn effective_grid(&self, call_count: usize) -> PatternGrid {
        if self.is_moving {
            apply_movement(&self.grid, self.movement_rules.as_ref(), call_count)
        } else {
            self.grid
        }
    }
}

/// Input for creating a pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPattern {
    pub name: String,
    pub category: String,
    /// Raw rows; must be 5×5.
    pub grid: Vec<Vec<bool>>,
    pub is_moving: bool,
    pub movement_rules: Option<MovementRule>,
}

impl NewPattern {
    /// A static pattern.
    pub fn new(name: impl Into<String>, category: impl Into<String>, grid: Vec<Vec<bool>>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            grid,
            is_moving: false,
            movement_rules: None,
        }
    }

    /// Make the pattern move according to `rule`.
    #[must_use]
    pub fn moving(mut self, rule: MovementRule) -> Self {
        self.is_moving = true;
        self.movement_rules = Some(rule);
        self
    }
}

/// Partial pattern update. Unset fields are left alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatternUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub grid: Option<Vec<Vec<bool>>>,
    pub is_moving: Option<bool>,
    /// `Some(None)` clears the rules.
    pub movement_rules: Option<Option<MovementRule>>,
}

impl PatternUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn grid(mut self, grid: Vec<Vec<bool>>) -> Self {
        self.grid = Some(grid);
        self
    }

    #[must_use]
    pub fn is_moving(mut self, moving: bool) -> Self {
        self.is_moving = Some(moving);
        self
    }

    #[must_use]
    pub fn movement_rules(mut self, rules: Option<MovementRule>) -> Self {
        self.movement_rules = Some(rules);
        self
    }

    /// Does this update change nothing?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.grid.is_none()
            && self.is_moving.is_none()
            && self.movement_rules.is_none()
    }
}
