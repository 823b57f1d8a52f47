//! Card inventory: number grids, status lifecycle, store and import.
//!
//! ## Key Types
//!
//! - `CardNumbers`: the 5×5 grid, FREE slot at the centre
//! - `CardStatus`: available → in_play → won/available, driven by games
//! - `Card`: serial, batch, numbers, status
//! - `CardStore`: create, update status, get, search, bulk import

pub mod card;
pub mod import;
pub mod store;

pub use card::{validate, Card, CardNumbers, CardStatus, COLUMN_LETTERS, COLUMN_RANGES};
pub use import::{ImportRecord, ImportReport, REQUIRED_COLUMNS};
pub use store::CardStore;
