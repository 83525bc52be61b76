//! Export derived tables to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs;
use std::path::{Path, PathBuf};

use csv::Writer;
use tracing::info;

use crate::analytics::{RankedState, monthly_display_rows};
use crate::app::pipeline::DashboardData;
use crate::data::StateMonthly;
use crate::domain::{DailyPurchase, Month, MonthlyPurchase, RegionTotal, WeeklyRollup};
use crate::error::AppError;

pub const STATE_RANKINGS_CSV: &str = "state_rankings.csv";
pub const FOCUS_MONTHLY_CSV: &str = "focus_monthly.csv";
pub const STATE_MONTHLY_CSV: &str = "state_monthly.csv";
pub const DAILY_CSV: &str = "daily.csv";
pub const WEEKLY_CSV: &str = "weekly.csv";
pub const REGIONS_CSV: &str = "regions.csv";

/// Write every derived table into `out_dir`, creating it if needed.
///
/// Returns the written paths in a fixed order.
pub fn write_all_exports(out_dir: &Path, data: &DashboardData) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(out_dir)
        .map_err(|e| AppError::new(2, format!("Failed to create export dir '{}': {e}", out_dir.display())))?;

    let path = |name: &str| out_dir.join(name);
    let written = vec![
        path(STATE_RANKINGS_CSV),
        path(FOCUS_MONTHLY_CSV),
        path(STATE_MONTHLY_CSV),
        path(DAILY_CSV),
        path(WEEKLY_CSV),
        path(REGIONS_CSV),
    ];

    write_rankings_csv(&written[0], &data.ranked)?;
    write_monthly_csv(&written[1], &data.focus_monthly)?;
    write_state_monthly_csv(&written[2], &data.state_monthly)?;
    write_daily_csv(&written[3], &data.daily)?;
    write_weekly_csv(&written[4], &data.weekly)?;
    write_regions_csv(&written[5], &data.regional.totals)?;

    info!(dir = %out_dir.display(), files = written.len(), "wrote exports");
    Ok(written)
}

pub fn write_rankings_csv(path: &Path, rows: &[RankedState]) -> Result<(), AppError> {
    let mut w = create(path)?;
    write_row(&mut w, ["rank", "state", "silver_purchased_kg", "share_pct"])?;
    for r in rows {
        write_row(
            &mut w,
            [
                r.rank.to_string(),
                r.state.clone(),
                format!("{:.0}", r.quantity_kg),
                format!("{:.2}", r.share_pct),
            ],
        )?;
    }
    finish(w)
}

/// Whole-kg monthly rows with their share of the year.
pub fn write_monthly_csv(path: &Path, months: &[MonthlyPurchase]) -> Result<(), AppError> {
    let rows = monthly_display_rows(months)?;
    let mut w = create(path)?;
    write_row(&mut w, ["month", "silver_purchased_kg", "share_pct"])?;
    for r in rows {
        write_row(
            &mut w,
            [r.month.to_string(), r.quantity_kg.to_string(), format!("{:.2}", r.share_pct)],
        )?;
    }
    finish(w)
}

pub fn write_state_monthly_csv(path: &Path, rows: &[StateMonthly]) -> Result<(), AppError> {
    let mut w = create(path)?;
    let header: Vec<String> = std::iter::once("state".to_string())
        .chain(Month::ALL.iter().map(|m| m.to_string()))
        .collect();
    write_row(&mut w, header)?;
    for r in rows {
        let record: Vec<String> = std::iter::once(r.state.clone())
            .chain(r.months.iter().map(|q| format!("{q:.2}")))
            .collect();
        write_row(&mut w, record)?;
    }
    finish(w)
}

pub fn write_daily_csv(path: &Path, days: &[DailyPurchase]) -> Result<(), AppError> {
    let mut w = create(path)?;
    write_row(&mut w, ["date", "weekday", "silver_purchased_kg"])?;
    for d in days {
        write_row(
            &mut w,
            [d.date.to_string(), d.weekday.to_string(), format!("{:.2}", d.quantity_kg)],
        )?;
    }
    finish(w)
}

pub fn write_weekly_csv(path: &Path, weeks: &[WeeklyRollup]) -> Result<(), AppError> {
    let mut w = create(path)?;
    write_row(&mut w, ["iso_week", "days", "sum_kg", "mean_kg"])?;
    for r in weeks {
        write_row(
            &mut w,
            [
                r.week.to_string(),
                r.day_count.to_string(),
                format!("{:.2}", r.sum_kg),
                format!("{:.2}", r.mean_kg),
            ],
        )?;
    }
    finish(w)
}

pub fn write_regions_csv(path: &Path, totals: &[RegionTotal]) -> Result<(), AppError> {
    let mut w = create(path)?;
    write_row(&mut w, ["region", "total_kg"])?;
    for r in totals {
        write_row(&mut w, [r.region.display_name().to_string(), format!("{:.0}", r.total_kg)])?;
    }
    finish(w)
}

fn create(path: &Path) -> Result<Writer<fs::File>, AppError> {
    Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))
}

fn write_row<I, T>(w: &mut Writer<fs::File>, record: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    w.write_record(record)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))
}

fn finish(mut w: Writer<fs::File>) -> Result<(), AppError> {
    w.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::tests::small_dashboard;

    #[test]
    fn writes_every_table() {
        let data = small_dashboard();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/out");

        let written = write_all_exports(&out, &data).unwrap();
        assert_eq!(written.len(), 6);
        assert!(written.iter().all(|p| p.exists()));

        let rankings = fs::read_to_string(out.join(STATE_RANKINGS_CSV)).unwrap();
        let mut lines = rankings.lines();
        assert_eq!(lines.next(), Some("rank,state,silver_purchased_kg,share_pct"));
        assert_eq!(lines.next(), Some("1,Karnataka,16800,89.36"));

        let daily = fs::read_to_string(out.join(DAILY_CSV)).unwrap();
        assert_eq!(daily.lines().count(), 31);
        assert!(daily.lines().nth(1).unwrap().starts_with("2026-01-01,Thu,"));

        let monthly = fs::read_to_string(out.join(STATE_MONTHLY_CSV)).unwrap();
        assert!(monthly.starts_with("state,Jan,Feb,"));
    }
}
