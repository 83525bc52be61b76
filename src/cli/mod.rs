//! Command-line parsing for the silver price & purchase dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the derivation/aggregation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{
    Currency, DEFAULT_DAILY_SEED, DEFAULT_FOCUS_STATE, DEFAULT_TOP_N, PriceBand, SeriesKind, WeightUnit,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "silver", version, about = "Silver Price Calculator & Sales Analysis Dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Price a quantity of silver and convert the total to another currency.
    Calc(CalcArgs),
    /// Historical price table, statistics and chart for a price band.
    Prices(PricesArgs),
    /// State-wise purchase table, summary and map coverage (or bar chart).
    States(StatesArgs),
    /// Top-N states, focus-state monthly trend and regional distribution.
    Insights(InsightsArgs),
    /// Synthetic daily national series and its ISO-week rollup.
    Daily(DailyArgs),
    /// Write every derived table as CSV (and optionally a snapshot JSON).
    Export(ExportArgs),
    /// Plot one series of a previously exported snapshot JSON.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as the other commands, but renders
    /// results in a terminal UI using Ratatui.
    Tui(TuiArgs),
}

/// Input table locations shared by every data-backed command.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Directory holding both input CSVs.
    #[arg(long, env = "SILVER_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Historical price CSV (overrides --data-dir).
    #[arg(long, value_name = "CSV")]
    pub prices_file: Option<PathBuf>,

    /// State purchase CSV (overrides --data-dir).
    #[arg(long, value_name = "CSV")]
    pub states_file: Option<PathBuf>,
}

/// Synthetic-series and ranking options.
#[derive(Debug, Args, Clone)]
pub struct AnalysisArgs {
    /// State whose annual total drives the monthly trend.
    #[arg(long, default_value = DEFAULT_FOCUS_STATE)]
    pub focus_state: String,

    /// Number of states in the top-N insights.
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top: usize,

    /// First day of the daily series (YYYY-MM-DD).
    #[arg(long, default_value = "2026-01-01")]
    pub start: NaiveDate,

    /// Last day of the daily series, inclusive (YYYY-MM-DD).
    #[arg(long, default_value = "2026-01-30")]
    pub end: NaiveDate,

    /// Random seed for the daily series.
    #[arg(long, default_value_t = DEFAULT_DAILY_SEED)]
    pub seed: u64,
}

/// Terminal plot options.
#[derive(Debug, Args, Clone)]
pub struct PlotSizeArgs {
    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct CalcArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Price per gram in INR (defaults to the latest historical price).
    #[arg(long)]
    pub price_per_gram: Option<f64>,

    /// Weight to price.
    #[arg(short = 'w', long, default_value_t = 1.0)]
    pub weight: f64,

    #[arg(short = 'u', long, value_enum, default_value_t = WeightUnit::Grams)]
    pub unit: WeightUnit,

    /// Target currency for conversion.
    #[arg(short = 'c', long, value_enum, default_value_t = Currency::Usd)]
    pub currency: Currency,
}

#[derive(Debug, Args, Clone)]
pub struct PricesArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Price range filter (INR per kg).
    #[arg(short = 'b', long, value_enum, default_value_t = PriceBand::All)]
    pub band: PriceBand,

    /// Also print every row of the filtered table.
    #[arg(long)]
    pub table: bool,

    #[command(flatten)]
    pub plot: PlotSizeArgs,
}

#[derive(Debug, Args, Clone)]
pub struct StatesArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// GeoJSON FeatureCollection with state boundaries.
    #[arg(long, env = "SILVER_GEOJSON_URL")]
    pub geojson_url: Option<String>,

    /// Feature property holding the state name.
    #[arg(long, env = "SILVER_GEOJSON_NAME_KEY", default_value = crate::domain::DEFAULT_GEOJSON_NAME_KEY)]
    pub geojson_name_key: String,

    /// Skip the map and draw the bar chart.
    #[arg(long)]
    pub no_map: bool,

    /// Bar chart width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,
}

#[derive(Debug, Args, Clone)]
pub struct InsightsArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

#[derive(Debug, Args, Clone)]
pub struct DailyArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub analysis: AnalysisArgs,

    #[command(flatten)]
    pub plot: PlotSizeArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub analysis: AnalysisArgs,

    /// Directory receiving the CSV exports.
    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,

    /// Also write a snapshot JSON (for `silver plot`).
    #[arg(long, value_name = "JSON")]
    pub snapshot: Option<PathBuf>,
}

/// Options for plotting a saved snapshot.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Snapshot JSON file produced by `silver export --snapshot`.
    #[arg(long, value_name = "JSON")]
    pub snapshot: PathBuf,

    #[arg(long, value_enum, default_value_t = SeriesKind::Prices)]
    pub series: SeriesKind,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub analysis: AnalysisArgs,

    /// GeoJSON FeatureCollection with state boundaries.
    #[arg(long, env = "SILVER_GEOJSON_URL")]
    pub geojson_url: Option<String>,

    /// Feature property holding the state name.
    #[arg(long, env = "SILVER_GEOJSON_NAME_KEY", default_value = crate::domain::DEFAULT_GEOJSON_NAME_KEY)]
    pub geojson_name_key: String,

    /// Skip the map on the Sales tab.
    #[arg(long)]
    pub no_map: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calc_flags_parse() {
        let cli = Cli::try_parse_from(["silver", "calc", "-w", "2", "-u", "kg", "-c", "aed"]).unwrap();
        let Command::Calc(args) = cli.command else {
            panic!("expected calc");
        };
        assert_eq!(args.weight, 2.0);
        assert_eq!(args.unit, WeightUnit::Kilograms);
        assert_eq!(args.currency, Currency::Aed);
        assert_eq!(args.price_per_gram, None);
    }

    #[test]
    fn band_names_parse() {
        let cli = Cli::try_parse_from(["silver", "prices", "--band", "20k-30k", "--no-plot"]).unwrap();
        let Command::Prices(args) = cli.command else {
            panic!("expected prices");
        };
        assert_eq!(args.band, PriceBand::From20kTo30k);
        assert!(args.plot.no_plot);
    }

    #[test]
    fn daily_window_parses_dates() {
        let cli = Cli::try_parse_from(["silver", "daily", "--start", "2025-12-27", "--end", "2026-01-05"]).unwrap();
        let Command::Daily(args) = cli.command else {
            panic!("expected daily");
        };
        assert_eq!(args.analysis.start, NaiveDate::from_ymd_opt(2025, 12, 27).unwrap());
        assert_eq!(args.analysis.focus_state, "Karnataka");
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(Cli::try_parse_from(["silver", "daily", "--start", "2026-13-01"]).is_err());
    }
}
