//! Pattern store: create, edit, delete and search winning patterns.

use tracing::{debug, info, warn};

use super::pattern::{NewPattern, Pattern, PatternGrid, PatternUpdate};
use crate::core::{IdKind, PatternId};
use crate::error::{BingoError, Result};
use crate::store::{with_txn, PatternFilter, Store};

/// Pattern catalogue operations.
///
/// Stateless: every call acts on the store it is given.
#[derive(Clone, Copy, Debug, Default)]
pub struct PatternStore;

impl PatternStore {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Create a pattern. The grid must be 5×5.
    pub fn create<S: Store + ?Sized>(&self, store: &mut S, new: NewPattern) -> Result<Pattern> {
        let grid = PatternGrid::from_rows(&new.grid)?;
        let pattern = with_txn(store, |s| {
            let id = PatternId::new(s.next_id(IdKind::Pattern)?);
            let pattern = Pattern {
                id,
                name: new.name,
                category: new.category,
                grid,
                is_moving: new.is_moving,
                movement_rules: new.movement_rules,
            };
            s.put_pattern(pattern.clone())?;
            Ok::<_, BingoError>(pattern)
        })?;

        info!(pattern_id = %pattern.id, name = %pattern.name, moving = pattern.is_moving, "pattern created");
        Ok(pattern)
    }

    /// Apply a partial update and return the stored result.
    pub fn update<S: Store + ?Sized>(
        &self,
        store: &mut S,
        id: PatternId,
        update: PatternUpdate,
    ) -> Result<Pattern> {
        if update.is_empty() {
            return Err(BingoError::EmptyUpdate);
        }
        let grid = update.grid.as_deref().map(PatternGrid::from_rows).transpose()?;

        let pattern = with_txn(store, |s| {
            let mut pattern = s.pattern(id)?.ok_or(BingoError::PatternNotFound(id))?;
            if let Some(name) = update.name {
                pattern.name = name;
            }
            if let Some(category) = update.category {
                pattern.category = category;
            }
            if let Some(grid) = grid {
                pattern.grid = grid;
            }
            if let Some(moving) = update.is_moving {
                pattern.is_moving = moving;
            }
            if let Some(rules) = update.movement_rules {
                pattern.movement_rules = rules;
            }
            s.put_pattern(pattern.clone())?;
            Ok::<_, BingoError>(pattern)
        })?;

        info!(pattern_id = %id, "pattern updated");
        Ok(pattern)
    }

    /// Delete a pattern no game refers to.
    pub fn delete<S: Store + ?Sized>(&self, store: &mut S, id: PatternId) -> Result<()> {
        with_txn(store, |s| {
            let games = s.games_using_pattern(id)?;
            if games > 0 {
                warn!(pattern_id = %id, games, "pattern delete blocked");
                return Err(BingoError::PatternInUse { pattern: id, games });
            }
            if !s.remove_pattern(id)? {
                return Err(BingoError::PatternNotFound(id));
            }
            Ok(())
        })?;

        info!(pattern_id = %id, "pattern deleted");
        Ok(())
    }

    pub fn get<S: Store + ?Sized>(&self, store: &S, id: PatternId) -> Result<Option<Pattern>> {
        let pattern = store.pattern(id)?;
        debug!(pattern_id = %id, found = pattern.is_some(), "pattern lookup");
        Ok(pattern)
    }

    /// Search patterns. Both filters must hold; `None` means no constraint.
    pub fn search<S: Store + ?Sized>(
        &self,
        store: &S,
        category: Option<&str>,
        is_moving: Option<bool>,
    ) -> Result<Vec<Pattern>> {
        let filter = PatternFilter {
            category: category.map(str::to_string),
            is_moving,
        };
        Ok(store.query_patterns(&filter)?)
    }
}
