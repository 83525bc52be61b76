//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input rows (`PricePoint`, `StatePurchase`)
//! - derived series (`MonthlyPurchase`, `DailyPurchase`, `WeeklyRollup`, `RegionTotal`)
//! - presentation options (`Currency`, `WeightUnit`, `PriceBand`)
//! - run configuration (`DashboardConfig`) and the JSON snapshot schema

pub mod types;

pub use types::*;
