//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the derivation and aggregation stages
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, IsoWeek, NaiveDate, Weekday};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Calendar month, serialized as its three-letter abbreviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    pub fn abbrev(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }

    /// 1-based month number.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    /// Parse a three-letter abbreviation (case-insensitive).
    pub fn parse(raw: &str) -> Option<Month> {
        let raw = raw.trim();
        Month::ALL
            .into_iter()
            .find(|m| m.abbrev().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

/// One row of the historical price table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub year: i32,
    pub month: Month,
    /// INR per kilogram.
    pub price_per_kg: f64,
}

impl PricePoint {
    /// Sort key: `(year, month)`.
    pub fn period(&self) -> (i32, u32) {
        (self.year, self.month.number())
    }

    /// First day of the period.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month.number(), 1)
    }

    pub fn price_per_gram(&self) -> f64 {
        self.price_per_kg / 1000.0
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.month, self.year)
    }
}

/// One row of the state purchase table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatePurchase {
    pub state: String,
    pub quantity_kg: f64,
}

impl StatePurchase {
    pub fn new(state: impl Into<String>, quantity_kg: f64) -> Self {
        Self {
            state: state.into(),
            quantity_kg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPurchase {
    pub month: Month,
    pub quantity_kg: f64,
}

/// One day of the synthetic national series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPurchase {
    pub date: NaiveDate,
    pub weekday: Weekday,
    /// May be negative when the noise term dominates; left unclamped.
    pub quantity_kg: f64,
}

/// ISO-8601 week identifier (ISO year + week number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeekId {
    pub year: i32,
    pub week: u32,
}

impl From<IsoWeek> for WeekId {
    fn from(value: IsoWeek) -> Self {
        Self {
            year: value.year(),
            week: value.week(),
        }
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRollup {
    pub week: WeekId,
    pub sum_kg: f64,
    pub mean_kg: f64,
    pub day_count: usize,
}

/// Fixed geographic grouping used for regional reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    South,
    West,
    North,
    East,
    Central,
    NorthEast,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::South,
        Region::West,
        Region::North,
        Region::East,
        Region::Central,
        Region::NorthEast,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Region::South => "South",
            Region::West => "West",
            Region::North => "North",
            Region::East => "East",
            Region::Central => "Central",
            Region::NorthEast => "North-East",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionTotal {
    pub region: Region,
    pub total_kg: f64,
}

/// Target currency for conversion of INR totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Aed,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Eur, Currency::Gbp, Currency::Aed];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Aed => "AED",
        }
    }

    /// INR per one unit of this currency (fixed table, not fetched).
    pub fn inr_rate(self) -> f64 {
        match self {
            Currency::Usd => 85.50,
            Currency::Eur => 92.30,
            Currency::Gbp => 107.80,
            Currency::Aed => 23.28,
        }
    }

    pub fn next(self) -> Currency {
        match self {
            Currency::Usd => Currency::Eur,
            Currency::Eur => Currency::Gbp,
            Currency::Gbp => Currency::Aed,
            Currency::Aed => Currency::Usd,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Grams,
    #[value(name = "kg", alias = "kilograms")]
    Kilograms,
}

impl WeightUnit {
    pub fn display_name(self) -> &'static str {
        match self {
            WeightUnit::Grams => "grams",
            WeightUnit::Kilograms => "kilograms",
        }
    }
}

/// Price-range filter for the historical series (INR per kg).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum PriceBand {
    All,
    /// `<= 20,000`
    #[value(name = "upto-20k")]
    UpTo20k,
    /// `> 20,000 and <= 30,000`
    #[value(name = "20k-30k")]
    From20kTo30k,
    /// `>= 30,000`
    #[value(name = "from-30k")]
    From30k,
}

impl PriceBand {
    pub const ALL: [PriceBand; 4] = [
        PriceBand::All,
        PriceBand::UpTo20k,
        PriceBand::From20kTo30k,
        PriceBand::From30k,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            PriceBand::All => "All Prices",
            PriceBand::UpTo20k => "<= ₹20,000 per kg",
            PriceBand::From20kTo30k => "₹20,000 - ₹30,000 per kg",
            PriceBand::From30k => ">= ₹30,000 per kg",
        }
    }

    pub fn contains(self, price_per_kg: f64) -> bool {
        match self {
            PriceBand::All => true,
            PriceBand::UpTo20k => price_per_kg <= 20_000.0,
            PriceBand::From20kTo30k => price_per_kg > 20_000.0 && price_per_kg <= 30_000.0,
            PriceBand::From30k => price_per_kg >= 30_000.0,
        }
    }

    pub fn next(self) -> PriceBand {
        match self {
            PriceBand::All => PriceBand::UpTo20k,
            PriceBand::UpTo20k => PriceBand::From20kTo30k,
            PriceBand::From20kTo30k => PriceBand::From30k,
            PriceBand::From30k => PriceBand::All,
        }
    }
}

/// Which series a saved snapshot should plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Prices,
    Monthly,
    Daily,
}

/// Input file locations.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub prices_csv: PathBuf,
    pub states_csv: PathBuf,
}

impl DataPaths {
    pub const PRICES_FILE: &'static str = "historical_silver_price.csv";
    pub const STATES_FILE: &'static str = "state_wise_silver_purchased_kg.csv";

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            prices_csv: dir.join(Self::PRICES_FILE),
            states_csv: dir.join(Self::STATES_FILE),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags, environment variables, and defaults.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data: DataPaths,

    /// State whose annual total is spread across months.
    pub focus_state: String,
    pub top_n: usize,

    pub daily_start: NaiveDate,
    /// Inclusive.
    pub daily_end: NaiveDate,
    pub daily_seed: u64,

    pub geojson_url: Option<String>,
    pub geojson_name_key: String,
    pub map: bool,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

pub const DEFAULT_FOCUS_STATE: &str = "Karnataka";
pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_DAILY_SEED: u64 = 42;
pub const DEFAULT_GEOJSON_NAME_KEY: &str = "st_nm";

pub fn default_daily_window() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default(),
        NaiveDate::from_ymd_opt(2026, 1, 30).unwrap_or_default(),
    )
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let (daily_start, daily_end) = default_daily_window();
        Self {
            data: DataPaths::in_dir("data"),
            focus_state: DEFAULT_FOCUS_STATE.to_string(),
            top_n: DEFAULT_TOP_N,
            daily_start,
            daily_end,
            daily_seed: DEFAULT_DAILY_SEED,
            geojson_url: None,
            geojson_name_key: DEFAULT_GEOJSON_NAME_KEY.to_string(),
            map: true,
            plot: true,
            plot_width: 100,
            plot_height: 25,
        }
    }
}

/// A saved snapshot of every derived table (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub tool: String,
    pub focus_state: String,
    pub daily_seed: u64,
    pub prices: Vec<PricePoint>,
    pub states: Vec<StatePurchase>,
    pub focus_monthly: Vec<MonthlyPurchase>,
    pub daily: Vec<DailyPurchase>,
    pub weekly: Vec<WeeklyRollup>,
    pub regions: Vec<RegionTotal>,
    pub unmapped_states: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_parse_is_case_insensitive() {
        assert_eq!(Month::parse("jan"), Some(Month::Jan));
        assert_eq!(Month::parse(" DEC "), Some(Month::Dec));
        assert_eq!(Month::parse("Sept"), None);
        assert_eq!(Month::Sep.number(), 9);
    }

    #[test]
    fn price_band_boundaries() {
        assert!(PriceBand::UpTo20k.contains(20_000.0));
        assert!(!PriceBand::From20kTo30k.contains(20_000.0));
        assert!(PriceBand::From20kTo30k.contains(30_000.0));
        // 30,000 sits in both upper bands.
        assert!(PriceBand::From30k.contains(30_000.0));
        assert!(PriceBand::All.contains(-1.0));
    }

    #[test]
    fn week_id_orders_by_year_then_week() {
        let a = WeekId { year: 2025, week: 52 };
        let b = WeekId { year: 2026, week: 1 };
        assert!(a < b);
        assert_eq!(b.to_string(), "2026-W01");
    }
}
