//! Data sources beyond the two input tables.
//!
//! - synthetic monthly/daily derivation from the state totals (`synth`)
//! - optional GeoJSON state boundaries for the choropleth (`geo`)

pub mod geo;
pub mod synth;

pub use geo::*;
pub use synth::*;
