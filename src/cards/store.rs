//! Card store: creation, status updates and lookup.
//!
//! The card store owns the RNG stream used for number generation. Every
//! operation takes the [`Store`] it should act on, so a caller can compose
//! several operations inside one transaction.

use tracing::{debug, info, warn};

use super::card::{Card, CardNumbers, CardStatus};
use crate::core::DrawRng;
use crate::error::{BingoError, Result};
use crate::store::{with_txn, CardFilter, Store, StoreError};

/// Card inventory operations.
///
/// ## Example
///
/// ```
/// use bingo_hall::cards::{CardStatus, CardStore};
/// use bingo_hall::core::DrawRng;
/// use bingo_hall::store::MemoryStore;
///
/// let mut store = MemoryStore::new();
/// let mut cards = CardStore::new(DrawRng::new(42));
///
/// let card = cards.create(&mut store, "A-0001", "BATCH-1", None).unwrap();
/// assert_eq!(card.status, CardStatus::Available);
/// assert!(card.numbers.is_valid());
/// ```
#[derive(Clone, Debug)]
pub struct CardStore {
    rng: DrawRng,
}

impl CardStore {
    /// Create a card store drawing numbers from `rng`.
    #[must_use]
    pub fn new(rng: DrawRng) -> Self {
        Self { rng }
    }

    /// Generate a fresh valid number grid.
    pub fn generate_numbers(&mut self) -> CardNumbers {
        CardNumbers::generate(&mut self.rng)
    }

    /// Create a card with status `available`.
    ///
    /// Numbers are generated when `numbers` is `None`.
    pub fn create<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        serial: &str,
        batch: &str,
        numbers: Option<CardNumbers>,
    ) -> Result<Card> {
        let numbers = match numbers {
            Some(numbers) => numbers,
            None => self.generate_numbers(),
        };
        numbers.check().map_err(BingoError::InvalidCardNumbers)?;

        let card = Card::new(serial, batch, numbers);
        with_txn(store, |s| {
            if s.card(serial)?.is_some() {
                return Err(BingoError::DuplicateSerial(serial.to_string()));
            }
            s.insert_card(card.clone()).map_err(|err| match err {
                StoreError::UniqueViolation { .. } => BingoError::DuplicateSerial(serial.to_string()),
                other => other.into(),
            })
        })?;

        info!(serial, batch, "card created");
        Ok(card)
    }

    /// Update a card's status from its string form.
    ///
    /// Accepts `available`, `in_play` or `won`.
    pub fn update_status<S: Store + ?Sized>(
        &self,
        store: &mut S,
        serial: &str,
        status: &str,
    ) -> Result<()> {
        let status: CardStatus = status.parse()?;
        with_txn(store, |s| Self::set_status(s, serial, status))?;
        info!(serial, %status, "card status updated");
        Ok(())
    }

    /// Set a card's status, failing if the card is absent.
    pub(crate) fn set_status<S: Store + ?Sized>(
        store: &mut S,
        serial: &str,
        status: CardStatus,
    ) -> Result<()> {
        if store.set_card_status(serial, status)? {
            Ok(())
        } else {
            warn!(serial, "status update for unknown card");
            Err(BingoError::CardNotFound(serial.to_string()))
        }
    }

    /// Look up a card by serial.
    pub fn get<S: Store + ?Sized>(&self, store: &S, serial: &str) -> Result<Option<Card>> {
        let card = store.card(serial)?;
        debug!(serial, found = card.is_some(), "card lookup");
        Ok(card)
    }

    /// Search cards. Both filters must hold; `None` means no constraint.
    pub fn search<S: Store + ?Sized>(
        &self,
        store: &S,
        batch: Option<&str>,
        status: Option<CardStatus>,
    ) -> Result<Vec<Card>> {
        let filter = CardFilter {
            batch_number: batch.map(str::to_string),
            status,
        };
        Ok(store.query_cards(&filter)?)
    }
}
