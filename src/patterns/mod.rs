//! Winning patterns and how they move.
//!
//! ## Key Types
//!
//! - [`PatternGrid`]: 5×5 required-cell mask
//! - [`Pattern`]: a stored pattern with optional [`MovementRule`]
//! - [`PatternStore`]: create/update/delete/search
//! - [`apply_movement`]: effective grid at a given call count

pub mod movement;
pub mod pattern;
pub mod store;

pub use movement::{apply_movement, Direction, Movement, MovementRule, Trigger};
pub use pattern::{validate_grid, NewPattern, Pattern, PatternGrid, PatternUpdate, RequiredCells};
pub use store::PatternStore;
