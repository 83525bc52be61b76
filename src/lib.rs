//! `silver-dash` library crate.
//!
//! The binary (`silver`) is a thin wrapper around this library so that:
//!
//! - loading, derivation and aggregation are testable without spawning processes
//! - the CLI reports and the TUI share one pipeline

pub mod analytics;
pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
