//! Pattern movement rules.
//!
//! A moving pattern changes shape once enough numbers have been called. The
//! shape at any moment is a pure function of the base grid, the rule and
//! the current call count: [`apply_movement`] recomputes it from the base
//! grid on every query and never mutates stored state.
//!
//! ## Interchange shape
//!
//! ```json
//! {"type": "shift", "direction": "right", "trigger": {"type": "call_count", "value": 5}}
//! ```
//!
//! `type` is `shift` or `rotate`; `direction` (shift only) is one of
//! `left`, `right`, `up`, `down` and defaults to `right` when the key is
//! absent. Unrecognized values, and an explicit `null` direction, are kept
//! as-is so a rule round-trips unchanged; they simply do not move the
//! pattern. A fractional trigger `value` is read as the smallest whole call
//! count that reaches it.

use serde::{Deserialize, Deserializer, Serialize};

use super::pattern::PatternGrid;

/// Shift direction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    /// Unrecognized direction: shifting leaves the grid unchanged.
    Other(String),
    /// `"direction": null`: same as unrecognized.
    Null,
}

impl Direction {
    /// Outer `None`: key absent. Inner `None`: explicit `null`.
    fn parse(raw: Option<Option<String>>) -> Self {
        let Some(raw) = raw else {
            return Direction::Right;
        };
        match raw.as_deref() {
            None => Direction::Null,
            Some("right") => Direction::Right,
            Some("left") => Direction::Left,
            Some("up") => Direction::Up,
            Some("down") => Direction::Down,
            Some(other) => Direction::Other(other.to_string()),
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            Direction::Left => Some("left"),
            Direction::Right => Some("right"),
            Direction::Up => Some("up"),
            Direction::Down => Some("down"),
            Direction::Other(s) => Some(s),
            Direction::Null => None,
        }
    }
}

/// What happens to the grid once the rule is active.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Movement {
    /// Rows (left/right) or the row set (up/down) rotate cyclically by one cell.
    Shift(Direction),
    /// Whole grid turns 90° clockwise.
    Rotate,
    /// Missing or unknown `type`: no movement.
    Unrecognized(Option<String>),
}

/// When the rule becomes active.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Active once at least this many numbers have been called.
    CallCount(i64),
    /// Any other trigger type never holds movement back.
    Other { kind: Option<String>, value: Option<i64> },
}

impl Trigger {
    /// Is the rule active at this call count?
    #[must_use]
    pub fn is_active(&self, call_count: usize) -> bool {
        match self {
            Trigger::CallCount(threshold) => {
                i64::try_from(call_count).unwrap_or(i64::MAX) >= *threshold
            }
            Trigger::Other { .. } => true,
        }
    }
}

/// A movement rule attached to a pattern.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawRule", into = "RawRule")]
pub struct MovementRule {
    pub movement: Movement,
    /// `None`: always active.
    pub trigger: Option<Trigger>,
}

impl MovementRule {
    /// Shift in `direction` once `after_calls` numbers have been called.
    #[must_use]
    pub fn shift(direction: Direction, after_calls: i64) -> Self {
        Self {
            movement: Movement::Shift(direction),
            trigger: Some(Trigger::CallCount(after_calls)),
        }
    }

    /// Rotate clockwise once `after_calls` numbers have been called.
    #[must_use]
    pub fn rotate(after_calls: i64) -> Self {
        Self {
            movement: Movement::Rotate,
            trigger: Some(Trigger::CallCount(after_calls)),
        }
    }

    /// Is the rule active at this call count?
    #[must_use]
    pub fn is_active(&self, call_count: usize) -> bool {
        self.trigger.as_ref().map_or(true, |t| t.is_active(call_count))
    }
}

/// The grid as it stands after `call_count` calls.
///
/// Pure: the same inputs always give the same output and `grid` is never
/// modified. With no rule, an unrecognized rule type, or a trigger that has
/// not fired yet, the base grid is returned unchanged.
#[must_use]
pub fn apply_movement(
    grid: &PatternGrid,
    rule: Option<&MovementRule>,
    call_count: usize,
) -> PatternGrid {
    let Some(rule) = rule else {
        return *grid;
    };
    if !rule.is_active(call_count) {
        return *grid;
    }
    match &rule.movement {
        Movement::Shift(direction) => grid.shifted(direction),
        Movement::Rotate => grid.rotated_clockwise(),
        Movement::Unrecognized(_) => *grid,
    }
}

// === Wire form ===

#[derive(Serialize, Deserialize)]
struct RawRule {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    direction: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trigger: Option<RawTrigger>,
}

#[derive(Serialize, Deserialize)]
struct RawTrigger {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "threshold", skip_serializing_if = "Option::is_none")]
    value: Option<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Whole(i64),
    Fraction(f64),
}

/// Keeps a present-but-null field distinct from a missing one.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn threshold<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawValue>::deserialize(deserializer)?.map(|value| match value {
        RawValue::Whole(n) => n,
        // Call counts are whole: `count >= 4.5` exactly when `count >= 5`.
        RawValue::Fraction(f) => f.ceil() as i64,
    }))
}

impl From<RawRule> for MovementRule {
    fn from(raw: RawRule) -> Self {
        let movement = match raw.kind.as_deref() {
            Some("shift") => Movement::Shift(Direction::parse(raw.direction)),
            Some("rotate") => Movement::Rotate,
            _ => Movement::Unrecognized(raw.kind),
        };
        let trigger = raw.trigger.map(|t| match t.kind.as_deref() {
            // No threshold given: active from the first query.
            Some("call_count") => Trigger::CallCount(t.value.unwrap_or(0)),
            _ => Trigger::Other {
                kind: t.kind,
                value: t.value,
            },
        });
        Self { movement, trigger }
    }
}

impl From<MovementRule> for RawRule {
    fn from(rule: MovementRule) -> Self {
        let (kind, direction) = match rule.movement {
            Movement::Shift(direction) => {
                let direction = direction.as_str().map(str::to_string);
                (Some("shift".to_string()), Some(direction))
            }
            Movement::Rotate => (Some("rotate".to_string()), None),
            Movement::Unrecognized(kind) => (kind, None),
        };
        let trigger = rule.trigger.map(|t| match t {
            Trigger::CallCount(value) => RawTrigger {
                kind: Some("call_count".to_string()),
                value: Some(value),
            },
            Trigger::Other { kind, value } => RawTrigger { kind, value },
        });
        Self {
            kind,
            direction,
            trigger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Position;

    fn corner_grid() -> PatternGrid {
        PatternGrid::from_positions([Position::new(0, 0), Position::new(0, 1)])
    }

    #[test]
    fn test_no_rule_is_identity() {
        let grid = corner_grid();
        assert_eq!(apply_movement(&grid, None, 40), grid);
    }

    #[test]
    fn test_trigger_threshold() {
        let grid = corner_grid();
        let rule = MovementRule::shift(Direction::Right, 5);

        assert_eq!(apply_movement(&grid, Some(&rule), 4), grid);
        let moved = apply_movement(&grid, Some(&rule), 5);
        assert_eq!(
            moved,
            PatternGrid::from_positions([Position::new(0, 1), Position::new(0, 2)])
        );
        // Re-evaluated from the base grid: still a single shift later on.
        assert_eq!(apply_movement(&grid, Some(&rule), 30), moved);
    }

    #[test]
    fn test_shift_directions() {
        let grid = PatternGrid::from_positions([Position::new(0, 4), Position::new(4, 0)]);

        let right = apply_movement(&grid, Some(&MovementRule::shift(Direction::Right, 0)), 0);
        assert_eq!(
            right,
            PatternGrid::from_positions([Position::new(0, 0), Position::new(4, 1)])
        );

        let left = apply_movement(&grid, Some(&MovementRule::shift(Direction::Left, 0)), 0);
        assert_eq!(
            left,
            PatternGrid::from_positions([Position::new(0, 3), Position::new(4, 4)])
        );

        let up = apply_movement(&grid, Some(&MovementRule::shift(Direction::Up, 0)), 0);
        assert_eq!(
            up,
            PatternGrid::from_positions([Position::new(4, 4), Position::new(3, 0)])
        );

        let down = apply_movement(&grid, Some(&MovementRule::shift(Direction::Down, 0)), 0);
        assert_eq!(
            down,
            PatternGrid::from_positions([Position::new(1, 4), Position::new(0, 0)])
        );
    }

    #[test]
    fn test_rotate_clockwise() {
        // Top row becomes right column.
        let top_row = PatternGrid::from_positions((0..5).map(|c| Position::new(0, c)));
        let rotated = apply_movement(&top_row, Some(&MovementRule::rotate(0)), 0);
        assert_eq!(
            rotated,
            PatternGrid::from_positions((0..5).map(|r| Position::new(r, 4)))
        );

        // (r, c) of the result comes from (4 - c, r) of the base.
        let grid = PatternGrid::from_positions([Position::new(4, 0)]);
        let rotated = grid.rotated_clockwise();
        assert!(rotated.get(Position::new(0, 0)));
        assert_eq!(rotated.required().len(), 1);
    }

    #[test]
    fn test_unknown_direction_and_type_are_identity() {
        let grid = corner_grid();
        let diagonal = MovementRule::shift(Direction::Other("diagonal".into()), 0);
        assert_eq!(apply_movement(&grid, Some(&diagonal), 10), grid);

        let spin = MovementRule {
            movement: Movement::Unrecognized(Some("spin".into())),
            trigger: None,
        };
        assert_eq!(apply_movement(&grid, Some(&spin), 10), grid);
    }

    #[test]
    fn test_parse_interchange_shape() {
        let rule: MovementRule = serde_json::from_str(
            r#"{"type": "shift", "direction": "up", "trigger": {"type": "call_count", "value": 5}}"#,
        )
        .unwrap();
        assert_eq!(rule, MovementRule::shift(Direction::Up, 5));

        let rule: MovementRule = serde_json::from_str(r#"{"type": "shift"}"#).unwrap();
        assert_eq!(rule.movement, Movement::Shift(Direction::Right));
        assert_eq!(rule.trigger, None);

        let rule: MovementRule = serde_json::from_str(r#"{"direction": "left"}"#).unwrap();
        assert_eq!(rule.movement, Movement::Unrecognized(None));

        let rule: MovementRule =
            serde_json::from_str(r#"{"type": "rotate", "trigger": {"type": "timer", "value": 30}}"#)
                .unwrap();
        assert!(rule.is_active(0));
    }

    #[test]
    fn test_null_direction_does_not_move() {
        let grid = corner_grid();
        let rule: MovementRule =
            serde_json::from_str(r#"{"type": "shift", "direction": null}"#).unwrap();
        assert_eq!(rule.movement, Movement::Shift(Direction::Null));
        assert_eq!(apply_movement(&grid, Some(&rule), 10), grid);
        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            serde_json::json!({"type": "shift", "direction": null})
        );
    }

    #[test]
    fn test_fractional_trigger_value() {
        let rule: MovementRule = serde_json::from_str(
            r#"{"type": "rotate", "trigger": {"type": "call_count", "value": 5.0}}"#,
        )
        .unwrap();
        assert_eq!(rule, MovementRule::rotate(5));

        let rule: MovementRule = serde_json::from_str(
            r#"{"type": "rotate", "trigger": {"type": "call_count", "value": 4.5}}"#,
        )
        .unwrap();
        assert!(!rule.is_active(4));
        assert!(rule.is_active(5));
    }

    #[test]
    fn test_serialize_interchange_shape() {
        let json = serde_json::to_value(MovementRule::shift(Direction::Left, 3)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "shift", "direction": "left", "trigger": {"type": "call_count", "value": 3}})
        );

        let json = serde_json::to_value(MovementRule::rotate(10)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "rotate", "trigger": {"type": "call_count", "value": 10}})
        );
    }

    #[test]
    fn test_call_count_without_value_is_always_active() {
        let rule: MovementRule =
            serde_json::from_str(r#"{"type": "rotate", "trigger": {"type": "call_count"}}"#).unwrap();
        assert_eq!(rule.trigger, Some(Trigger::CallCount(0)));
        assert!(rule.is_active(0));
    }
}
