//! Debug bundle writer for inspecting the loaded inputs and derived series.
//!
//! The bundle is a single markdown file with every intermediate table, so a
//! surprising number on screen can be traced back to its inputs.

use std::fmt::Write as _;
use std::fs::{create_dir_all, write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::pipeline::DashboardData;
use crate::domain::{DashboardConfig, Month};
use crate::error::AppError;

pub const DEFAULT_DEBUG_DIR: &str = "debug";

/// Write a markdown bundle into `dir` and return its path.
pub fn write_debug_bundle(dir: &Path, data: &DashboardData, config: &DashboardConfig) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("silver_debug_seed{}_{ts}.md", config.daily_seed));

    let body = render_bundle(data, config)
        .map_err(|e| AppError::new(4, format!("Failed to render debug bundle: {e}")))?;
    write(&path, body).map_err(|e| AppError::new(4, format!("Failed to write debug file: {e}")))?;

    Ok(path)
}

fn render_bundle(data: &DashboardData, config: &DashboardConfig) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(out, "# silver debug bundle")?;
    writeln!(out, "- generated: {}", Local::now().to_rfc3339())?;
    writeln!(out, "- prices_csv: {}", config.data.prices_csv.display())?;
    writeln!(out, "- states_csv: {}", config.data.states_csv.display())?;
    writeln!(out, "- focus_state: {}", data.focus.state)?;
    writeln!(out, "- daily_window: {}..={}", config.daily_start, config.daily_end)?;
    writeln!(out, "- daily_seed: {}", config.daily_seed)?;
    writeln!(out, "- daily_base_kg: {:.4}", data.daily_base)?;
    writeln!(out, "- top_n: {}", config.top_n)?;

    writeln!(out, "- price_rows: {}", data.prices.len())?;
    writeln!(out, "- state_rows: {}", data.states.len())?;

    writeln!(out, "\n## State rankings")?;
    writeln!(out, "| rank | state | kg | share % |")?;
    writeln!(out, "| - | - | - | - |")?;
    for r in &data.ranked {
        writeln!(out, "| {} | {} | {:.2} | {:.2} |", r.rank, r.state, r.quantity_kg, r.share_pct)?;
    }

    writeln!(out, "\n## Regions")?;
    writeln!(out, "| region | kg |")?;
    writeln!(out, "| - | - |")?;
    for t in &data.regional.totals {
        writeln!(out, "| {} | {:.2} |", t.region.display_name(), t.total_kg)?;
    }
    if !data.regional.unmapped.is_empty() {
        writeln!(out, "\nUnmapped: {}", data.regional.unmapped.join(", "))?;
    }

    writeln!(out, "\n## State monthly breakdown (kg)")?;
    let months: Vec<&str> = Month::ALL.iter().map(|m| m.abbrev()).collect();
    writeln!(out, "| state | {} |", months.join(" | "))?;
    writeln!(out, "|{}", " - |".repeat(13))?;
    for s in &data.state_monthly {
        let cells: Vec<String> = s.months.iter().map(|q| format!("{q:.2}")).collect();
        writeln!(out, "| {} | {} |", s.state, cells.join(" | "))?;
    }

    writeln!(out, "\n## Daily series")?;
    writeln!(out, "| date | weekday | kg |")?;
    writeln!(out, "| - | - | - |")?;
    for d in &data.daily {
        writeln!(out, "| {} | {} | {:.4} |", d.date, d.weekday, d.quantity_kg)?;
    }

    writeln!(out, "\n## Weekly rollup")?;
    writeln!(out, "| week | days | sum kg | mean kg |")?;
    writeln!(out, "| - | - | - | - |")?;
    for w in &data.weekly {
        writeln!(out, "| {} | {} | {:.4} | {:.4} |", w.week, w.day_count, w.sum_kg, w.mean_kg)?;
    }

    Ok(out)
}
