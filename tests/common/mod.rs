//! Shared helpers for integration tests.

#![allow(dead_code)]

use bingo_hall::cards::{Card, CardNumbers, CardStatus};
use bingo_hall::core::{GameId, IdKind, PatternId, Position};
use bingo_hall::game::{BallCall, Game};
use bingo_hall::patterns::{Pattern, PatternGrid};
use bingo_hall::store::{
    CardFilter, MemoryStore, PatternFilter, Savepoint, Store, StoreError, StoreResult,
};

/// Install a test-writer subscriber once. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Proptest config; `PROPTEST_CASES` overrides the case count.
pub fn proptest_config() -> proptest::prelude::ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(64)
        .max(1);
    proptest::prelude::ProptestConfig::with_cases(cases)
}

pub fn four_corners() -> PatternGrid {
    PatternGrid::from_positions([
        Position::new(0, 0),
        Position::new(0, 4),
        Position::new(4, 0),
        Position::new(4, 4),
    ])
}

/// A valid card whose corners hold `[top-left, top-right, bottom-left, bottom-right]`.
///
/// Left corners must be in 1..=15 and right corners in 61..=75, and must not
/// collide with the filler numbers of their column.
pub fn numbers_with_corners(corners: [u8; 4]) -> CardNumbers {
    let mut cells = [[None; 5]; 5];
    let fillers: [[u8; 3]; 5] = [
        [8, 9, 10],
        [16, 17, 18],
        [31, 32, 33],
        [46, 47, 48],
        [64, 65, 66],
    ];
    for col in 0..5 {
        for (i, row) in (1..4).enumerate() {
            cells[row][col] = Some(fillers[col][i]);
        }
    }
    cells[0][0] = Some(corners[0]);
    cells[0][4] = Some(corners[1]);
    cells[4][0] = Some(corners[2]);
    cells[4][4] = Some(corners[3]);
    for (col, top, bottom) in [(1, 19, 20), (2, 34, 35), (3, 49, 50)] {
        cells[0][col] = Some(top);
        cells[4][col] = Some(bottom);
    }
    cells[2][2] = None;
    CardNumbers(cells)
}

/// Store wrapper that fails the n-th write (1-based) with `Unavailable`.
///
/// Writes are counted across transactions. Reads never fail.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    writes: usize,
    fail_at: Option<usize>,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self { inner, writes: 0, fail_at: None }
    }

    /// Fail the `n`-th write from now on.
    pub fn fail_after(&mut self, n: usize) {
        self.writes = 0;
        self.fail_at = Some(n);
    }

    pub fn heal(&mut self) {
        self.fail_at = None;
    }

    fn write(&mut self) -> StoreResult<()> {
        self.writes += 1;
        if self.fail_at == Some(self.writes) {
            return Err(StoreError::Unavailable(format!("injected failure at write {}", self.writes)));
        }
        Ok(())
    }
}

impl Store for FlakyStore {
    fn begin(&mut self) -> StoreResult<()> {
        self.inner.begin()
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.inner.commit()
    }

    fn rollback(&mut self) -> StoreResult<()> {
        self.inner.rollback()
    }

    fn in_transaction(&self) -> bool {
        self.inner.in_transaction()
    }

    fn savepoint(&mut self) -> StoreResult<Savepoint> {
        self.inner.savepoint()
    }

    fn rollback_to(&mut self, savepoint: Savepoint) -> StoreResult<()> {
        self.inner.rollback_to(savepoint)
    }

    fn release(&mut self, savepoint: Savepoint) -> StoreResult<()> {
        self.inner.release(savepoint)
    }

    fn next_id(&mut self, kind: IdKind) -> StoreResult<u64> {
        self.write()?;
        self.inner.next_id(kind)
    }

    fn card(&self, serial: &str) -> StoreResult<Option<Card>> {
        self.inner.card(serial)
    }

    fn insert_card(&mut self, card: Card) -> StoreResult<()> {
        self.write()?;
        self.inner.insert_card(card)
    }

    fn set_card_status(&mut self, serial: &str, status: CardStatus) -> StoreResult<bool> {
        self.write()?;
        self.inner.set_card_status(serial, status)
    }

    fn query_cards(&self, filter: &CardFilter) -> StoreResult<Vec<Card>> {
        self.inner.query_cards(filter)
    }

    fn pattern(&self, id: PatternId) -> StoreResult<Option<Pattern>> {
        self.inner.pattern(id)
    }

    fn put_pattern(&mut self, pattern: Pattern) -> StoreResult<()> {
        self.write()?;
        self.inner.put_pattern(pattern)
    }

    fn remove_pattern(&mut self, id: PatternId) -> StoreResult<bool> {
        self.write()?;
        self.inner.remove_pattern(id)
    }

    fn query_patterns(&self, filter: &PatternFilter) -> StoreResult<Vec<Pattern>> {
        self.inner.query_patterns(filter)
    }

    fn game(&self, id: GameId) -> StoreResult<Option<Game>> {
        self.inner.game(id)
    }

    fn put_game(&mut self, game: Game) -> StoreResult<()> {
        self.write()?;
        self.inner.put_game(game)
    }

    fn games_using_pattern(&self, id: PatternId) -> StoreResult<usize> {
        self.inner.games_using_pattern(id)
    }

    fn calls(&self, game: GameId) -> StoreResult<Vec<BallCall>> {
        self.inner.calls(game)
    }

    fn insert_call(&mut self, game: GameId, call: BallCall) -> StoreResult<()> {
        self.write()?;
        self.inner.insert_call(game, call)
    }

    fn game_cards(&self, game: GameId) -> StoreResult<Vec<String>> {
        self.inner.game_cards(game)
    }

    fn attach_card(&mut self, game: GameId, serial: &str) -> StoreResult<()> {
        self.write()?;
        self.inner.attach_card(game, serial)
    }
}
