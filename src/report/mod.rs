//! Reporting utilities: formatted terminal output for every dashboard section.
//!
//! The numbers themselves come from `analytics`; this module only decides how
//! they read in a terminal (grouping, currency symbols, fixed-width tables).

pub mod format;

pub use format::*;
