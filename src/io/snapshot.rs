//! Read/write snapshot JSON files.
//!
//! A snapshot is the portable form of one dashboard run: the loaded tables
//! plus every derived series, enough to re-plot without the input CSVs.
//!
//! The schema is defined by `domain::SnapshotFile`.

use std::fs::File;
use std::path::Path;

use crate::app::pipeline::DashboardData;
use crate::domain::{DashboardConfig, SeriesKind, SnapshotFile};
use crate::error::AppError;

/// Write a snapshot JSON file.
pub fn write_snapshot_json(path: &Path, data: &DashboardData, config: &DashboardConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create snapshot JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &data.snapshot(config))
        .map_err(|e| AppError::new(2, format!("Failed to write snapshot JSON: {e}")))?;

    Ok(())
}

/// Read a snapshot JSON file.
pub fn read_snapshot_json(path: &Path) -> Result<SnapshotFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open snapshot JSON '{}': {e}", path.display())))?;
    let snapshot: SnapshotFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid snapshot JSON: {e}")))?;
    Ok(snapshot)
}

/// `(x, y)` points and a title for one series of a snapshot.
///
/// - prices: x = fractional year, y = INR per kg
/// - monthly: x = month number, y = kg
/// - daily: x = day index from 1, y = kg
pub fn snapshot_series(snapshot: &SnapshotFile, kind: SeriesKind) -> (String, Vec<(f64, f64)>) {
    match kind {
        SeriesKind::Prices => (
            "Silver price (INR/kg)".to_string(),
            snapshot
                .prices
                .iter()
                .map(|p| (p.year as f64 + (p.month.number() - 1) as f64 / 12.0, p.price_per_kg))
                .collect(),
        ),
        SeriesKind::Monthly => (
            format!("{} monthly purchases (kg)", snapshot.focus_state),
            snapshot
                .focus_monthly
                .iter()
                .map(|m| (m.month.number() as f64, m.quantity_kg))
                .collect(),
        ),
        SeriesKind::Daily => (
            "Daily national purchases (kg)".to_string(),
            snapshot
                .daily
                .iter()
                .enumerate()
                .map(|(i, d)| ((i + 1) as f64, d.quantity_kg))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::tests::small_dashboard;

    #[test]
    fn snapshot_survives_a_round_trip() {
        let data = small_dashboard();
        let config = DashboardConfig::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        write_snapshot_json(&path, &data, &config).unwrap();
        let back = read_snapshot_json(&path).unwrap();

        assert_eq!(back.tool, "silver");
        assert_eq!(back.focus_state, "Karnataka");
        assert_eq!(back.daily, data.daily);
        assert_eq!(back.weekly, data.weekly);
        assert_eq!(back.unmapped_states, vec!["Atlantis".to_string()]);
    }

    #[test]
    fn series_use_natural_axes() {
        let snapshot = small_dashboard().snapshot(&DashboardConfig::default());

        let (_, prices) = snapshot_series(&snapshot, SeriesKind::Prices);
        assert_eq!(prices[1], (2024.0 + 11.0 / 12.0, 90_000.0));

        let (title, monthly) = snapshot_series(&snapshot, SeriesKind::Monthly);
        assert!(title.starts_with("Karnataka"));
        assert_eq!(monthly.len(), 12);
        assert_eq!(monthly[0].0, 1.0);

        let (_, daily) = snapshot_series(&snapshot, SeriesKind::Daily);
        assert_eq!(daily.last().unwrap().0, 30.0);
    }

    #[test]
    fn invalid_json_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(read_snapshot_json(&path).unwrap_err().exit_code(), 2);
    }
}
