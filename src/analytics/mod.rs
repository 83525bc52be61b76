//! Aggregation and ranking over the loaded and derived tables.
//!
//! Responsibilities:
//!
//! - top-N rankings and percentage shares (`rank`)
//! - regional rollups over the fixed region map (`region`)
//! - ISO-week rollups of the daily series (`weekly`)
//! - price-range filtering and statistics (`prices`)
//! - the cost calculator and currency conversion (`calculator`)
//! - state and monthly headline numbers (`summary`)

pub mod calculator;
pub mod prices;
pub mod rank;
pub mod region;
pub mod summary;
pub mod weekly;

pub use calculator::*;
pub use prices::*;
pub use rank::*;
pub use region::*;
pub use summary::*;
pub use weekly::*;
