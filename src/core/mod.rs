//! Core building blocks: identifiers, grid geometry, RNG, configuration, clock.
//!
//! Nothing here knows about cards, patterns or games; those areas build on
//! these types.

pub mod clock;
pub mod config;
pub mod grid;
pub mod ids;
pub mod rng;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::HallConfig;
pub use grid::{Cells, Position, FREE_SPACE, GRID_SIZE};
pub use ids::{GameId, IdKind, PatternId};
pub use rng::DrawRng;
