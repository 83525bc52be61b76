//! Synthetic purchase series derived from coarse annual totals.
//!
//! - monthly: an annual total spread over 12 months by seasonal weights
//! - daily: a per-day national baseline with calendar-aware boosts and noise
//! - state-wise monthly: every state's annual total pushed through the monthly curve

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use tracing::debug;

use crate::domain::{DailyPurchase, Month, MonthlyPurchase, StatePurchase};
use crate::error::AnalyticsError;

/// Festival-season weights (Jan..Dec); Oct-Dec carry the Diwali/wedding peak.
pub const FESTIVAL_WEIGHTS: [f64; 12] = [1.0, 0.9, 1.1, 0.95, 0.85, 0.9, 0.88, 0.92, 1.05, 1.15, 1.2, 1.3];

/// Split `annual_total` into 12 parts proportional to `weights`.
pub fn distribute_monthly(annual_total: f64, weights: &[f64; 12]) -> Result<[f64; 12], AnalyticsError> {
    if !(annual_total.is_finite() && annual_total >= 0.0) {
        return Err(AnalyticsError::InvalidInput(format!(
            "annual total must be finite and >= 0 (got {annual_total})"
        )));
    }
    if let Some((idx, w)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !(w.is_finite() && **w > 0.0))
    {
        return Err(AnalyticsError::InvalidInput(format!(
            "seasonal weight for {} must be finite and > 0 (got {w})",
            Month::ALL[idx]
        )));
    }

    let total_weight: f64 = weights.iter().sum();
    let mut out = [0.0; 12];
    for (slot, w) in out.iter_mut().zip(weights) {
        *slot = annual_total * w / total_weight;
    }
    Ok(out)
}

/// `distribute_monthly` with month labels attached.
pub fn monthly_breakdown(annual_total: f64, weights: &[f64; 12]) -> Result<Vec<MonthlyPurchase>, AnalyticsError> {
    let values = distribute_monthly(annual_total, weights)?;
    Ok(Month::ALL
        .into_iter()
        .zip(values)
        .map(|(month, quantity_kg)| MonthlyPurchase { month, quantity_kg })
        .collect())
}

/// One state's annual total split into months.
#[derive(Debug, Clone)]
pub struct StateMonthly {
    pub state: String,
    pub months: [f64; 12],
}

/// Pro-rate every state's annual total with the same seasonal weights.
pub fn state_monthly_breakdown(
    rows: &[StatePurchase],
    weights: &[f64; 12],
) -> Result<Vec<StateMonthly>, AnalyticsError> {
    rows.iter()
        .map(|row| {
            Ok(StateMonthly {
                state: row.state.clone(),
                months: distribute_monthly(row.quantity_kg, weights)?,
            })
        })
        .collect()
}

/// Calendar rules for the daily distributor.
///
/// All ranges are in kilograms and sampled uniformly (inclusive bounds).
#[derive(Debug, Clone)]
pub struct CalendarRules {
    pub weekend_boost: RangeInclusive<f64>,
    pub mid_month_days: RangeInclusive<u32>,
    pub mid_month_boost: RangeInclusive<f64>,
    pub month_end_days: RangeInclusive<u32>,
    pub month_end_boost: RangeInclusive<f64>,
    /// `(month, day, boost_kg)` added on that calendar date every year.
    pub fixed_dates: Vec<(u32, u32, f64)>,
    pub noise: RangeInclusive<f64>,
}

impl Default for CalendarRules {
    fn default() -> Self {
        Self {
            weekend_boost: 50.0..=150.0,
            mid_month_days: 14..=16,
            mid_month_boost: 30.0..=80.0,
            month_end_days: 28..=31,
            month_end_boost: 80.0..=160.0,
            fixed_dates: vec![
                // Republic Day.
                (1, 26, 250.0),
                // Makar Sankranti.
                (1, 14, 180.0),
            ],
            noise: -60.0..=60.0,
        }
    }
}

impl CalendarRules {
    fn validate(&self) -> Result<(), AnalyticsError> {
        for (name, range) in [
            ("weekend_boost", &self.weekend_boost),
            ("mid_month_boost", &self.mid_month_boost),
            ("month_end_boost", &self.month_end_boost),
            ("noise", &self.noise),
        ] {
            let (lo, hi) = (*range.start(), *range.end());
            if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
                return Err(AnalyticsError::InvalidInput(format!(
                    "{name} range must be finite with start <= end (got {lo}..={hi})"
                )));
            }
        }
        Ok(())
    }
}

/// Synthesize one quantity per calendar day in `start..=end`.
///
/// The random stream is a `StdRng` seeded from `seed` and owned by this call,
/// so repeated calls with the same arguments return identical series.
/// Quantities are not clamped and can go negative if the noise dominates.
pub fn distribute_daily(
    base_per_day: f64,
    start: NaiveDate,
    end: NaiveDate,
    rules: &CalendarRules,
    seed: u64,
) -> Result<Vec<DailyPurchase>, AnalyticsError> {
    if !base_per_day.is_finite() {
        return Err(AnalyticsError::InvalidInput(format!(
            "daily baseline must be finite (got {base_per_day})"
        )));
    }
    if end < start {
        return Err(AnalyticsError::InvalidInput(format!(
            "daily window end {end} is before start {start}"
        )));
    }
    rules.validate()?;

    let mut rng = StdRng::seed_from_u64(seed);
    let days = (end - start).num_days() as usize + 1;
    let mut out = Vec::with_capacity(days);

    for date in start.iter_days().take(days) {
        let mut quantity_kg = base_per_day;
        let weekday = date.weekday();

        if matches!(weekday, Weekday::Sat | Weekday::Sun) {
            quantity_kg += rng.gen_range(rules.weekend_boost.clone());
        }
        if rules.mid_month_days.contains(&date.day()) {
            quantity_kg += rng.gen_range(rules.mid_month_boost.clone());
        }
        if rules.month_end_days.contains(&date.day()) {
            quantity_kg += rng.gen_range(rules.month_end_boost.clone());
        }
        for &(month, day, boost) in &rules.fixed_dates {
            if date.month() == month && date.day() == day {
                quantity_kg += boost;
            }
        }
        quantity_kg += rng.gen_range(rules.noise.clone());

        out.push(DailyPurchase {
            date,
            weekday,
            quantity_kg,
        });
    }

    debug!(%start, %end, days = out.len(), seed, "generated daily series");
    Ok(out)
}

/// Days in the calendar year containing `date` (365 or 366).
pub fn days_in_year(date: NaiveDate) -> u32 {
    if date.leap_year() { 366 } else { 365 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn monthly_distribution_preserves_total() {
        let months = distribute_monthly(16_800.0, &FESTIVAL_WEIGHTS).unwrap();
        let sum: f64 = months.iter().sum();
        assert!((sum - 16_800.0).abs() < 1e-9, "sum={sum}");

        // December carries the largest weight, May the smallest.
        let (max_idx, _) = months
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap();
        let (min_idx, _) = months
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap();
        assert_eq!(Month::ALL[max_idx], Month::Dec);
        assert_eq!(Month::ALL[min_idx], Month::May);
    }

    #[test]
    fn monthly_distribution_with_uniform_weights() {
        let months = distribute_monthly(1200.0, &[2.0; 12]).unwrap();
        assert!(months.iter().all(|m| (m - 100.0).abs() < 1e-12));
    }

    #[test]
    fn monthly_distribution_rejects_non_positive_weights() {
        let mut weights = FESTIVAL_WEIGHTS;
        weights[4] = 0.0;
        let err = distribute_monthly(100.0, &weights).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput(ref m) if m.contains("May")));

        weights[4] = -1.0;
        assert!(distribute_monthly(100.0, &weights).is_err());
        assert!(distribute_monthly(f64::NAN, &FESTIVAL_WEIGHTS).is_err());
    }

    #[test]
    fn zero_total_yields_zero_months() {
        let months = distribute_monthly(0.0, &FESTIVAL_WEIGHTS).unwrap();
        assert!(months.iter().all(|m| *m == 0.0));
    }

    #[test]
    fn daily_window_is_inclusive() {
        let rules = CalendarRules::default();
        let series = distribute_daily(590.0, ymd(2026, 1, 1), ymd(2026, 1, 30), &rules, 42).unwrap();
        assert_eq!(series.len(), 30);
        assert_eq!(series[0].date, ymd(2026, 1, 1));
        assert_eq!(series[0].weekday, Weekday::Thu);
        assert_eq!(series[29].date, ymd(2026, 1, 30));
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));

        let single = distribute_daily(590.0, ymd(2026, 3, 5), ymd(2026, 3, 5), &rules, 1).unwrap();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn daily_series_is_deterministic_per_seed() {
        let rules = CalendarRules::default();
        let a = distribute_daily(590.0, ymd(2026, 1, 1), ymd(2026, 1, 30), &rules, 7).unwrap();
        let b = distribute_daily(590.0, ymd(2026, 1, 1), ymd(2026, 1, 30), &rules, 7).unwrap();
        let bits = |s: &[DailyPurchase]| s.iter().map(|d| d.quantity_kg.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));

        let c = distribute_daily(590.0, ymd(2026, 1, 1), ymd(2026, 1, 30), &rules, 8).unwrap();
        assert_ne!(bits(&a), bits(&c));
    }

    #[test]
    fn fixed_rules_apply_exactly_without_noise() {
        let rules = CalendarRules {
            weekend_boost: 100.0..=100.0,
            mid_month_boost: 10.0..=10.0,
            month_end_boost: 20.0..=20.0,
            noise: 0.0..=0.0,
            ..CalendarRules::default()
        };
        let series = distribute_daily(500.0, ymd(2026, 1, 1), ymd(2026, 1, 31), &rules, 0).unwrap();
        let on = |d: u32| series[(d - 1) as usize].quantity_kg;

        // Thu Jan 1: plain weekday.
        assert_eq!(on(1), 500.0);
        // Sat Jan 3: weekend.
        assert_eq!(on(3), 600.0);
        // Wed Jan 14: mid-month + Makar Sankranti.
        assert_eq!(on(14), 500.0 + 10.0 + 180.0);
        // Mon Jan 26: Republic Day.
        assert_eq!(on(26), 750.0);
        // Sat Jan 31: weekend + month-end stack.
        assert_eq!(on(31), 620.0);
    }

    #[test]
    fn noise_can_push_days_negative() {
        let rules = CalendarRules {
            noise: -100.0..=-100.0,
            ..CalendarRules::default()
        };
        let series = distribute_daily(0.0, ymd(2026, 2, 2), ymd(2026, 2, 2), &rules, 0).unwrap();
        assert_eq!(series[0].quantity_kg, -100.0);
    }

    #[test]
    fn daily_rejects_reversed_window() {
        let rules = CalendarRules::default();
        let err = distribute_daily(1.0, ymd(2026, 1, 2), ymd(2026, 1, 1), &rules, 0).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput(_)));
    }

    #[test]
    fn state_breakdown_covers_every_state() {
        let rows = vec![StatePurchase::new("A", 1200.0), StatePurchase::new("B", 0.0)];
        let out = state_monthly_breakdown(&rows, &[1.0; 12]).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].months[0], 100.0);
        assert_eq!(out[1].months.iter().sum::<f64>(), 0.0);
    }

    #[test]
    fn leap_years_have_366_days() {
        assert_eq!(days_in_year(ymd(2024, 6, 1)), 366);
        assert_eq!(days_in_year(ymd(2026, 1, 1)), 365);
    }
}
