//! Win verification.
//!
//! A card wins when every cell the effective grid requires is covered: the
//! FREE slot covers itself, any other cell needs its number in the called
//! set.

use rustc_hash::FxHashSet;

use crate::cards::CardNumbers;
use crate::patterns::PatternGrid;

/// Numbers called so far in a game.
pub type CalledSet = FxHashSet<u8>;

/// Does `numbers` cover every required cell of `grid`?
///
/// No validation of the card is done here; an empty cell anywhere counts as
/// free.
#[must_use]
pub fn card_matches(numbers: &CardNumbers, grid: &PatternGrid, called: &CalledSet) -> bool {
    grid.required()
        .iter()
        .all(|&pos| numbers.get(pos).map_or(true, |number| called.contains(&number)))
}

/// Required cells still waiting for a call.
#[must_use]
pub fn missing_numbers(numbers: &CardNumbers, grid: &PatternGrid, called: &CalledSet) -> Vec<u8> {
    grid.required()
        .iter()
        .filter_map(|&pos| numbers.get(pos))
        .filter(|number| !called.contains(number))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Position, GRID_SIZE};

    fn four_corners() -> PatternGrid {
        PatternGrid::from_positions([
            Position::new(0, 0),
            Position::new(0, 4),
            Position::new(4, 0),
            Position::new(4, 4),
        ])
    }

    /// A card with the given corner numbers and nothing else checked.
    fn card_with_corners(corners: [u8; 4]) -> CardNumbers {
        let mut cells = [[Some(30); GRID_SIZE]; GRID_SIZE];
        cells[0][0] = Some(corners[0]);
        cells[0][4] = Some(corners[1]);
        cells[4][0] = Some(corners[2]);
        cells[4][4] = Some(corners[3]);
        cells[2][2] = None;
        CardNumbers(cells)
    }

    #[test]
    fn test_four_corners_scenario() {
        let card = card_with_corners([3, 58, 61, 6]);
        let grid = four_corners();
        let mut called: CalledSet = [3, 58, 61].into_iter().collect();

        assert!(!card_matches(&card, &grid, &called));
        assert_eq!(missing_numbers(&card, &grid, &called), vec![6]);

        called.insert(6);
        assert!(card_matches(&card, &grid, &called));
        assert!(missing_numbers(&card, &grid, &called).is_empty());
    }

    #[test]
    fn test_corners_only_needs_corner_numbers() {
        let card = card_with_corners([1, 16, 61, 75]);
        let called: CalledSet = [1, 16, 61, 75].into_iter().collect();
        assert!(card_matches(&card, &four_corners(), &called));
    }

    #[test]
    fn test_free_cell_is_covered() {
        let card = card_with_corners([1, 2, 3, 4]);
        let center = PatternGrid::from_positions([Position::new(2, 2)]);
        assert!(card_matches(&card, &center, &CalledSet::default()));
    }

    #[test]
    fn test_empty_pattern_always_matches() {
        let card = card_with_corners([1, 2, 3, 4]);
        assert!(card_matches(&card, &PatternGrid::default(), &CalledSet::default()));
    }
}
