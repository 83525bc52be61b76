//! Terminal plots for the CLI commands (`prices`, `states`, `daily`, `plot`).

pub mod ascii;

pub use ascii::*;
