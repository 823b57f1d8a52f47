//! Card model: the number grid and the status lifecycle.
//!
//! ## Column ranges
//!
//! | Column | Letter | Numbers |
//! |--------|--------|---------|
//! | 0      | B      | 1–15    |
//! | 1      | I      | 16–30   |
//! | 2      | N      | 31–45   |
//! | 3      | G      | 46–60   |
//! | 4      | O      | 61–75   |
//!
//! The centre cell is the FREE slot and never holds a number.

use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{Cells, DrawRng, Position, FREE_SPACE, GRID_SIZE};
use crate::error::BingoError;

/// Allowed numbers per column.
pub const COLUMN_RANGES: [RangeInclusive<u8>; GRID_SIZE] = [1..=15, 16..=30, 31..=45, 46..=60, 61..=75];

/// Column header letters.
pub const COLUMN_LETTERS: [char; GRID_SIZE] = ['B', 'I', 'N', 'G', 'O'];

/// Card status lifecycle. Only the game engine moves cards between states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    #[default]
    Available,
    InPlay,
    Won,
}

impl CardStatus {
    /// The stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CardStatus::Available => "available",
            CardStatus::InPlay => "in_play",
            CardStatus::Won => "won",
        }
    }
}

impl std::fmt::Display for CardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardStatus {
    type Err = BingoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(CardStatus::Available),
            "in_play" => Ok(CardStatus::InPlay),
            "won" => Ok(CardStatus::Won),
            other => Err(BingoError::InvalidStatus(other.to_string())),
        }
    }
}

/// The 5×5 number grid of a card. `None` marks the FREE slot.
///
/// Serializes as a nested array, `null` at the centre.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardNumbers(pub Cells<Option<u8>>);

impl CardNumbers {
    /// Generate a valid grid: five distinct numbers per column, sampled
    /// without replacement from that column's range.
    #[must_use]
    pub fn generate(rng: &mut DrawRng) -> Self {
        let mut cells = [[None; GRID_SIZE]; GRID_SIZE];
        for (col, range) in COLUMN_RANGES.iter().enumerate() {
            let drawn = rng.sample_distinct(range.clone(), GRID_SIZE);
            for (row, number) in drawn.into_iter().enumerate() {
                if !Position::new(row, col).is_free() {
                    cells[row][col] = Some(number);
                }
            }
        }
        Self(cells)
    }

    /// Build from nested rows, checking shape and number rules.
    pub fn from_rows(rows: &[Vec<Option<u8>>]) -> Result<Self, BingoError> {
        check_rows(rows).map_err(BingoError::InvalidCardNumbers)?;
        let mut cells = [[None; GRID_SIZE]; GRID_SIZE];
        for (row, values) in rows.iter().enumerate() {
            cells[row].copy_from_slice(values);
        }
        Ok(Self(cells))
    }

    /// Number at a position (`None` for the FREE slot).
    #[must_use]
    pub fn get(&self, pos: Position) -> Option<u8> {
        self.0[pos.row][pos.col]
    }

    /// Check the grid rules, describing the first violation.
    pub fn check(&self) -> Result<(), String> {
        if self.get(FREE_SPACE).is_some() {
            return Err("FREE space must be empty".to_string());
        }
        for (col, range) in COLUMN_RANGES.iter().enumerate() {
            let mut seen = [false; 76];
            for row in 0..GRID_SIZE {
                let pos = Position::new(row, col);
                if pos.is_free() {
                    continue;
                }
                let Some(number) = self.get(pos) else {
                    return Err(format!("missing number at {pos}"));
                };
                if !range.contains(&number) {
                    return Err(format!(
                        "{number} at {pos} is outside column {} range {}-{}",
                        COLUMN_LETTERS[col],
                        range.start(),
                        range.end()
                    ));
                }
                if std::mem::replace(&mut seen[usize::from(number)], true) {
                    return Err(format!("{number} repeated in column {}", COLUMN_LETTERS[col]));
                }
            }
        }
        Ok(())
    }

    /// Does this grid satisfy every card rule?
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }

    /// Iterate over the 24 numbers with their positions.
    pub fn numbers(&self) -> impl Iterator<Item = (Position, u8)> + '_ {
        Position::all().filter_map(move |pos| self.get(pos).map(|n| (pos, n)))
    }
}

/// Validate a raw nested grid (as read from an import file or the store).
#[must_use]
pub fn validate(rows: &[Vec<Option<u8>>]) -> bool {
    check_rows(rows).is_ok()
}

fn check_rows(rows: &[Vec<Option<u8>>]) -> Result<(), String> {
    if rows.len() != GRID_SIZE || rows.iter().any(|row| row.len() != GRID_SIZE) {
        return Err(format!("grid must be {GRID_SIZE}x{GRID_SIZE}"));
    }
    let mut cells = [[None; GRID_SIZE]; GRID_SIZE];
    for (row, values) in rows.iter().enumerate() {
        cells[row].copy_from_slice(values);
    }
    CardNumbers(cells).check()
}

impl std::fmt::Display for CardNumbers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "B  I  N  G  O")?;
        writeln!(f, "{}", "-".repeat(15))?;
        for row in &self.0 {
            let cells: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Some(n) => format!("{n:2}"),
                    None => "FR".to_string(),
                })
                .collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

/// A bingo card in the hall's inventory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Unique printed identifier.
    pub serial_number: String,

    /// Print batch the card came from.
    pub batch_number: String,

    /// Never changes after creation.
    pub numbers: CardNumbers,

    pub status: CardStatus,
}

impl Card {
    /// A fresh, available card.
    pub fn new(
        serial_number: impl Into<String>,
        batch_number: impl Into<String>,
        numbers: CardNumbers,
    ) -> Self {
        Self {
            serial_number: serial_number.into(),
            batch_number: batch_number.into(),
            numbers,
            status: CardStatus::Available,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == CardStatus::Available
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A known-valid grid used across tests.
    pub(crate) fn sample_rows() -> Vec<Vec<Option<u8>>> {
        vec![
            vec![Some(3), Some(16), Some(31), Some(46), Some(61)],
            vec![Some(5), Some(18), Some(33), Some(48), Some(63)],
            vec![Some(7), Some(20), None, Some(50), Some(65)],
            vec![Some(9), Some(22), Some(37), Some(52), Some(67)],
            vec![Some(11), Some(24), Some(39), Some(54), Some(69)],
        ]
    }

    #[test]
    fn test_generate_is_valid() {
        let mut rng = DrawRng::new(42);
        for _ in 0..1000 {
            let numbers = CardNumbers::generate(&mut rng);
            assert_eq!(numbers.check(), Ok(()));
            assert_eq!(numbers.get(FREE_SPACE), None);
            assert_eq!(numbers.numbers().count(), 24);
        }
    }

    #[test]
    fn test_from_rows() {
        let numbers = CardNumbers::from_rows(&sample_rows()).unwrap();
        assert_eq!(numbers.get(Position::new(0, 0)), Some(3));
        assert_eq!(numbers.get(Position::new(4, 4)), Some(69));
    }

    #[test]
    fn test_validate_rejects_wrong_shape() {
        let mut rows = sample_rows();
        rows.pop();
        assert!(!validate(&rows));

        let mut rows = sample_rows();
        rows[1].push(Some(70));
        assert!(!validate(&rows));
    }

    #[test]
    fn test_validate_rejects_filled_free_space() {
        let mut rows = sample_rows();
        rows[2][2] = Some(35);
        assert!(!validate(&rows));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut rows = sample_rows();
        rows[0][0] = Some(16);
        assert!(!validate(&rows));

        let mut rows = sample_rows();
        rows[3][4] = Some(76);
        assert!(!validate(&rows));
    }

    #[test]
    fn test_validate_rejects_duplicates_in_column() {
        let mut rows = sample_rows();
        rows[1][1] = Some(16);
        assert!(!validate(&rows));
    }

    #[test]
    fn test_validate_rejects_missing_number() {
        let mut rows = sample_rows();
        rows[4][0] = None;
        let err = CardNumbers::from_rows(&rows).unwrap_err();
        assert!(err.to_string().contains("missing number"));
    }

    #[test]
    fn test_status_round_trip_strings() {
        for status in [CardStatus::Available, CardStatus::InPlay, CardStatus::Won] {
            assert_eq!(status.as_str().parse::<CardStatus>().unwrap(), status);
        }
        assert_eq!(
            "retired".parse::<CardStatus>(),
            Err(BingoError::InvalidStatus("retired".into()))
        );
    }

    #[test]
    fn test_display_grid() {
        let numbers = CardNumbers::from_rows(&sample_rows()).unwrap();
        let text = numbers.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "B  I  N  G  O");
        assert_eq!(lines[1], "---------------");
        assert_eq!(lines[2], " 3 16 31 46 61");
        assert_eq!(lines[4], " 7 20 FR 50 65");
    }

    #[test]
    fn test_serializes_as_nested_array() {
        let numbers = CardNumbers::from_rows(&sample_rows()).unwrap();
        let json = serde_json::to_value(numbers).unwrap();
        assert_eq!(json[2][2], serde_json::Value::Null);
        assert_eq!(json[0][0], 3);
    }
}
