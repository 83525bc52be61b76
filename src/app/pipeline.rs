//! Shared "dashboard pipeline" used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load tables -> derive monthly/daily series -> rank/roll up -> summarize
//!
//! The result is a single `DashboardData` value built once per process and
//! passed by reference to every consumer.

use tracing::{debug, info};

use crate::analytics::{
    RankedState, RegionMap, RegionalRollup, Rankings, StateSummary, rank_all, rank_states, rollup_by_region,
    state_summary, weekly_rollup,
};
use crate::data::{
    CalendarRules, FESTIVAL_WEIGHTS, StateMonthly, days_in_year, distribute_daily, monthly_breakdown,
    state_monthly_breakdown,
};
use crate::domain::{
    DailyPurchase, DashboardConfig, MonthlyPurchase, PricePoint, SnapshotFile, StatePurchase, WeeklyRollup,
};
use crate::error::AppError;
use crate::io::ingest::{load_price_history, load_state_purchases};

/// Every loaded and derived table of one run.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub prices: Vec<PricePoint>,
    pub states: Vec<StatePurchase>,

    pub focus: StatePurchase,
    pub focus_monthly: Vec<MonthlyPurchase>,
    pub state_monthly: Vec<StateMonthly>,

    /// National annual total spread evenly over the start year.
    pub daily_base: f64,
    pub daily: Vec<DailyPurchase>,
    pub weekly: Vec<WeeklyRollup>,

    pub ranked: Vec<RankedState>,
    pub rankings: Rankings,
    pub regional: RegionalRollup,
    pub summary: StateSummary,
}

impl DashboardData {
    /// Flatten into the JSON snapshot schema.
    pub fn snapshot(&self, config: &DashboardConfig) -> SnapshotFile {
        SnapshotFile {
            tool: "silver".to_string(),
            focus_state: self.focus.state.clone(),
            daily_seed: config.daily_seed,
            prices: self.prices.clone(),
            states: self.states.clone(),
            focus_monthly: self.focus_monthly.clone(),
            daily: self.daily.clone(),
            weekly: self.weekly.clone(),
            regions: self.regional.totals.clone(),
            unmapped_states: self.regional.unmapped.clone(),
        }
    }
}

/// Load both input tables and derive everything else.
pub fn load_dashboard(config: &DashboardConfig) -> Result<DashboardData, AppError> {
    info!(path = %config.data.prices_csv.display(), "loading price history");
    let prices = load_price_history(&config.data.prices_csv)?;
    info!(path = %config.data.states_csv.display(), "loading state purchases");
    let states = load_state_purchases(&config.data.states_csv)?;

    derive_dashboard(config, prices, states)
}

/// Derive every table from already-loaded inputs.
pub fn derive_dashboard(
    config: &DashboardConfig,
    prices: Vec<PricePoint>,
    states: Vec<StatePurchase>,
) -> Result<DashboardData, AppError> {
    let focus = find_state(&states, &config.focus_state)
        .cloned()
        .ok_or_else(|| AppError::new(2, format!("Focus state '{}' not found in the state table.", config.focus_state)))?;

    let focus_monthly = monthly_breakdown(focus.quantity_kg, &FESTIVAL_WEIGHTS)?;
    let state_monthly = state_monthly_breakdown(&states, &FESTIVAL_WEIGHTS)?;
    let summary = state_summary(&states)?;

    let daily_base = summary.total_kg / days_in_year(config.daily_start) as f64;
    let daily = distribute_daily(
        daily_base,
        config.daily_start,
        config.daily_end,
        &CalendarRules::default(),
        config.daily_seed,
    )?;
    let weekly = weekly_rollup(&daily);
    debug!(days = daily.len(), weeks = weekly.len(), base = daily_base, "derived daily series");

    let ranked = rank_all(&states)?;
    let rankings = rank_states(&states, config.top_n)?;
    let regional = rollup_by_region(&states, &RegionMap::india());

    info!(
        prices = prices.len(),
        states = states.len(),
        focus = %focus.state,
        "dashboard ready"
    );

    Ok(DashboardData {
        prices,
        states,
        focus,
        focus_monthly,
        state_monthly,
        daily_base,
        daily,
        weekly,
        ranked,
        rankings,
        regional,
        summary,
    })
}

/// Case-insensitive lookup in the state table.
pub fn find_state<'a>(rows: &'a [StatePurchase], name: &str) -> Option<&'a StatePurchase> {
    let name = name.trim();
    rows.iter().find(|r| r.state.eq_ignore_ascii_case(name))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{DataPaths, Month};

    pub(crate) fn small_dashboard() -> DashboardData {
        let prices = vec![
            PricePoint { year: 2024, month: Month::Nov, price_per_kg: 95_000.0 },
            PricePoint { year: 2024, month: Month::Dec, price_per_kg: 90_000.0 },
        ];
        let states = vec![
            StatePurchase::new("Karnataka", 16_800.0),
            StatePurchase::new("Goa", 1_900.0),
            StatePurchase::new("Atlantis", 100.0),
        ];
        derive_dashboard(&DashboardConfig::default(), prices, states).unwrap()
    }

    #[test]
    fn derives_every_table() {
        let data = small_dashboard();
        assert_eq!(data.focus.state, "Karnataka");
        assert_eq!(data.focus_monthly.len(), 12);
        assert_eq!(data.state_monthly.len(), 3);
        assert_eq!(data.daily.len(), 30);
        assert_eq!(data.weekly.iter().map(|w| w.day_count).sum::<usize>(), 30);
        assert_eq!(data.ranked[0].state, "Karnataka");
        assert_eq!(data.regional.unmapped, vec!["Atlantis".to_string()]);
        assert!((data.daily_base - 18_800.0 / 365.0).abs() < 1e-9);
    }

    #[test]
    fn missing_focus_state_is_an_input_error() {
        let config = DashboardConfig {
            focus_state: "Nowhere".to_string(),
            ..DashboardConfig::default()
        };
        let err = derive_dashboard(&config, Vec::new(), vec![StatePurchase::new("Goa", 1.0)])
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn focus_lookup_ignores_case() {
        let config = DashboardConfig {
            focus_state: "  karnataka ".to_string(),
            ..DashboardConfig::default()
        };
        let data = derive_dashboard(
            &config,
            Vec::new(),
            vec![StatePurchase::new("Karnataka", 1_220.0)],
        )
        .unwrap();
        assert_eq!(data.focus.quantity_kg, 1_220.0);
    }

    #[test]
    fn corrupt_state_row_stops_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let states_csv = dir.path().join("states.csv");
        std::fs::write(&states_csv, "State,Silver_Purchased_kg\nKarnataka,16800\nMaharashtra,22,000\n").unwrap();
        let config = DashboardConfig {
            data: DataPaths {
                prices_csv: concat!(env!("CARGO_MANIFEST_DIR"), "/data/historical_silver_price.csv").into(),
                states_csv,
            },
            ..DashboardConfig::default()
        };

        let err = load_dashboard(&config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("line 3"));
    }

    #[test]
    fn bundled_data_ranks_maharashtra_first() {
        let config = DashboardConfig {
            data: DataPaths::in_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/data")),
            ..DashboardConfig::default()
        };
        let data = load_dashboard(&config).unwrap();

        assert_eq!(data.states.len(), 28);
        assert_eq!(data.summary.total_kg, 215_990.0);
        let leader = data.rankings.leader().unwrap();
        assert_eq!(leader.state, "Maharashtra");
        assert_eq!(leader.share_pct, 10.19);
        assert_eq!(data.rankings.top.len(), 5);
        assert_eq!(data.rankings.top[4].state, "Karnataka");

        let share_sum: f64 = data.ranked.iter().map(|r| r.share_pct).sum();
        assert!((share_sum - 100.0).abs() <= 0.05);
        assert!(data.regional.unmapped.is_empty());
        assert_eq!(data.prices.len(), 312);
    }
}
