//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - derived-table CSV exports (`export`)
//! - snapshot JSON read/write (`snapshot`)

pub mod export;
pub mod ingest;
pub mod snapshot;

pub use export::*;
pub use ingest::*;
pub use snapshot::*;
