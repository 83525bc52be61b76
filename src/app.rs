//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the input tables and derives the dashboard
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::analytics::{filter_by_band, latest_price, price_stats, quote, rank_all, state_summary};
use crate::cli::{
    AnalysisArgs, CalcArgs, Command, DailyArgs, DataArgs, ExportArgs, InsightsArgs, PlotArgs, PricesArgs,
    StatesArgs,
};
use crate::data::{join_choropleth, load_boundaries};
use crate::domain::{DashboardConfig, DataPaths, PricePoint};
use crate::error::AppError;
use crate::io::ingest::{load_price_history, load_state_purchases};
use crate::plot::{render_bar_chart, render_choropleth, render_line_plot};
use crate::report;

pub mod pipeline;

/// Env var holding the tracing filter directives.
pub const LOG_ENV: &str = "SILVER_LOG";

/// Entry point for the `silver` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want `silver` and `silver --focus-state Goa` to behave like `silver tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // Log lines on stderr would tear the TUI, so it stays silent unless asked.
    let default_filter = if matches!(cli.command, Command::Tui(_)) { "off" } else { "warn" };
    init_tracing(default_filter);

    match cli.command {
        Command::Calc(args) => handle_calc(args),
        Command::Prices(args) => handle_prices(args),
        Command::States(args) => handle_states(args),
        Command::Insights(args) => handle_insights(args),
        Command::Daily(args) => handle_daily(args),
        Command::Export(args) => handle_export(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => {
            let mut config = dashboard_config_from_args(&args.data, &args.analysis);
            config.geojson_url = args.geojson_url;
            config.geojson_name_key = args.geojson_name_key;
            config.map = !args.no_map;
            crate::tui::run(config)
        }
    }
}

/// Install the global subscriber: `SILVER_LOG` directives, else `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));
    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn handle_calc(args: CalcArgs) -> Result<(), AppError> {
    let price_per_gram = match args.price_per_gram {
        Some(p) => p,
        None => {
            let paths = data_paths(&args.data);
            let prices = load_price_history(&paths.prices_csv)?;
            let latest = latest_price(&prices)
                .ok_or_else(|| AppError::new(3, "No historical prices available."))?;
            info!(period = %latest.label(), "using latest price");
            latest.price_per_gram()
        }
    };

    let q = quote(price_per_gram, args.weight, args.unit, args.currency)?;
    println!("{}", report::format_quote(&q));
    println!("{}", report::format_quick_reference(price_per_gram));
    Ok(())
}

fn handle_prices(args: PricesArgs) -> Result<(), AppError> {
    let paths = data_paths(&args.data);
    let prices = load_price_history(&paths.prices_csv)?;

    let filtered = filter_by_band(&prices, args.band);
    let stats = price_stats(&filtered);
    println!("{}", report::format_price_stats(args.band, stats.as_ref()));

    if args.table {
        println!("{}", report::format_price_table(&filtered));
    }

    if args.plot.plot && !args.plot.no_plot && !filtered.is_empty() {
        let points: Vec<(f64, f64)> = filtered.iter().map(price_xy).collect();
        let highlights: Vec<(f64, f64)> = [
            filtered.iter().max_by(|a, b| a.price_per_kg.total_cmp(&b.price_per_kg)),
            filtered.iter().min_by(|a, b| a.price_per_kg.total_cmp(&b.price_per_kg)),
        ]
        .into_iter()
        .flatten()
        .map(price_xy)
        .collect();
        let title = format!("Silver price, INR/kg ({})", args.band.display_name());
        println!(
            "{}",
            render_line_plot(&title, &points, &highlights, args.plot.width, args.plot.height)
        );
    }
    Ok(())
}

fn handle_states(args: StatesArgs) -> Result<(), AppError> {
    let paths = data_paths(&args.data);
    let states = load_state_purchases(&paths.states_csv)?;

    let ranked = rank_all(&states)?;
    println!("{}", report::format_state_table(&ranked));
    println!("{}", report::format_state_summary(&state_summary(&states)?));

    let boundaries = if args.no_map {
        None
    } else {
        load_boundaries(args.geojson_url, Some(args.geojson_name_key))
    };

    match boundaries {
        Some(boundaries) => {
            let layer = join_choropleth(&boundaries, &states);
            let height = (args.width / 2).max(10);
            println!(
                "{}",
                render_choropleth("State-wise Silver Purchase Distribution", &layer, args.width, height)
            );
            println!("{}", report::format_choropleth(&layer));
        }
        None => {
            let rows: Vec<(String, f64)> = ranked.iter().map(|r| (r.state.clone(), r.quantity_kg)).collect();
            println!(
                "{}",
                render_bar_chart("State-wise Silver Purchase Distribution (kg)", &rows, args.width)
            );
        }
    }
    Ok(())
}

fn handle_insights(args: InsightsArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args.data, &args.analysis);
    let data = pipeline::load_dashboard(&config)?;

    println!("{}", report::format_insights(&data.rankings, &data.ranked, &data.focus.state));
    println!("{}", report::format_monthly(&data.focus.state, &data.focus_monthly));
    println!("{}", report::format_regions(&data.regional));
    print!("{}", report::format_footer(&data));
    Ok(())
}

fn handle_daily(args: DailyArgs) -> Result<(), AppError> {
    let mut config = dashboard_config_from_args(&args.data, &args.analysis);
    config.plot = args.plot.plot && !args.plot.no_plot;
    config.plot_width = args.plot.width;
    config.plot_height = args.plot.height;
    let data = pipeline::load_dashboard(&config)?;

    println!(
        "Daily national purchases {}..={} (base {} kg/day, seed {}):",
        config.daily_start,
        config.daily_end,
        report::fmt_grouped(data.daily_base, 2),
        config.daily_seed
    );
    println!("{}", report::format_daily_table(&data.daily));
    println!("Weekly rollup (ISO weeks):");
    println!("{}", report::format_weekly_table(&data.weekly));

    if config.plot {
        let points: Vec<(f64, f64)> = data
            .daily
            .iter()
            .enumerate()
            .map(|(i, d)| ((i + 1) as f64, d.quantity_kg))
            .collect();
        println!(
            "{}",
            render_line_plot("Daily purchases (kg)", &points, &[], config.plot_width, config.plot_height)
        );
    }
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args.data, &args.analysis);
    let data = pipeline::load_dashboard(&config)?;

    for path in crate::io::export::write_all_exports(&args.out_dir, &data)? {
        println!("wrote {}", path.display());
    }
    if let Some(path) = &args.snapshot {
        crate::io::snapshot::write_snapshot_json(path, &data, &config)?;
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let snapshot = crate::io::snapshot::read_snapshot_json(&args.snapshot)?;
    let (title, points) = crate::io::snapshot::snapshot_series(&snapshot, args.series);
    if points.is_empty() {
        return Err(AppError::new(3, format!("Snapshot has no {:?} data to plot.", args.series)));
    }

    println!("{}", render_line_plot(&title, &points, &[], args.width, args.height));
    Ok(())
}

/// Price point as `(fractional year, INR/kg)`.
pub(crate) fn price_xy(p: &PricePoint) -> (f64, f64) {
    (p.year as f64 + (p.month.number() - 1) as f64 / 12.0, p.price_per_kg)
}

fn data_paths(args: &DataArgs) -> DataPaths {
    let defaults = DataPaths::in_dir(&args.data_dir);
    DataPaths {
        prices_csv: args.prices_file.clone().unwrap_or(defaults.prices_csv),
        states_csv: args.states_file.clone().unwrap_or(defaults.states_csv),
    }
}

pub fn dashboard_config_from_args(data: &DataArgs, analysis: &AnalysisArgs) -> DashboardConfig {
    DashboardConfig {
        data: data_paths(data),
        focus_state: analysis.focus_state.clone(),
        top_n: analysis.top,
        daily_start: analysis.start,
        daily_end: analysis.end,
        daily_seed: analysis.seed,
        ..DashboardConfig::default()
    }
}

/// Rewrite argv so `silver` defaults to `silver tui`.
///
/// Rules:
/// - `silver`                          -> `silver tui`
/// - `silver --focus-state Goa ...`    -> `silver tui --focus-state Goa ...`
/// - `silver --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "calc" | "prices" | "states" | "insights" | "daily" | "export" | "plot" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["silver"])), argv(&["silver", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["silver", "--focus-state", "Goa"])),
            argv(&["silver", "tui", "--focus-state", "Goa"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(rewrite_args(argv(&["silver", "calc"])), argv(&["silver", "calc"]));
        assert_eq!(rewrite_args(argv(&["silver", "--help"])), argv(&["silver", "--help"]));
        assert_eq!(rewrite_args(argv(&["silver", "bogus"])), argv(&["silver", "bogus"]));
    }

    #[test]
    fn explicit_files_override_data_dir() {
        let args = DataArgs {
            data_dir: PathBuf::from("in"),
            prices_file: Some(PathBuf::from("p.csv")),
            states_file: None,
        };
        let paths = data_paths(&args);
        assert_eq!(paths.prices_csv, PathBuf::from("p.csv"));
        assert_eq!(paths.states_csv, PathBuf::from("in").join(DataPaths::STATES_FILE));
    }

    #[test]
    fn config_carries_analysis_flags() {
        let cli = crate::cli::Cli::parse_from(argv(&["silver", "insights", "--top", "3", "--focus-state", "Goa"]));
        let Command::Insights(args) = cli.command else {
            panic!("expected insights");
        };
        let config = dashboard_config_from_args(&args.data, &args.analysis);
        assert_eq!(config.top_n, 3);
        assert_eq!(config.focus_state, "Goa");
        assert_eq!(config.daily_seed, 42);
    }
}
