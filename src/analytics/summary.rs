//! Headline numbers for the state table and the focus-state monthly curve.

use crate::domain::{Month, MonthlyPurchase, StatePurchase};
use crate::error::AnalyticsError;

use super::rank::share_of_total;

#[derive(Debug, Clone, PartialEq)]
pub struct StateSummary {
    pub total_kg: f64,
    pub mean_kg: f64,
    pub state_count: usize,
    pub highest_kg: f64,
}

pub fn state_summary(rows: &[StatePurchase]) -> Result<StateSummary, AnalyticsError> {
    if rows.is_empty() {
        return Err(AnalyticsError::EmptyInput("state purchase table is empty"));
    }
    let total_kg: f64 = rows.iter().map(|r| r.quantity_kg).sum();
    let highest_kg = rows.iter().map(|r| r.quantity_kg).fold(f64::NEG_INFINITY, f64::max);
    Ok(StateSummary {
        total_kg,
        mean_kg: total_kg / rows.len() as f64,
        state_count: rows.len(),
        highest_kg,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyStats {
    pub highest: MonthlyPurchase,
    pub lowest: MonthlyPurchase,
    pub mean_kg: f64,
    pub total_kg: f64,
}

/// Highest/lowest month (first occurrence wins), mean and total.
pub fn monthly_stats(months: &[MonthlyPurchase]) -> Result<MonthlyStats, AnalyticsError> {
    let first = *months
        .first()
        .ok_or(AnalyticsError::EmptyInput("monthly series is empty"))?;

    let mut highest = first;
    let mut lowest = first;
    let mut total_kg = 0.0;
    for m in months {
        if m.quantity_kg > highest.quantity_kg {
            highest = *m;
        }
        if m.quantity_kg < lowest.quantity_kg {
            lowest = *m;
        }
        total_kg += m.quantity_kg;
    }

    Ok(MonthlyStats {
        highest,
        lowest,
        mean_kg: total_kg / months.len() as f64,
        total_kg,
    })
}

/// A monthly table row as displayed: whole kilograms and share of the year.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyDisplayRow {
    pub month: Month,
    pub quantity_kg: i64,
    pub share_pct: f64,
}

/// Round each month to whole kg, then take shares of the rounded total.
pub fn monthly_display_rows(months: &[MonthlyPurchase]) -> Result<Vec<MonthlyDisplayRow>, AnalyticsError> {
    let rounded: Vec<(Month, i64)> = months
        .iter()
        .map(|m| (m.month, m.quantity_kg.round() as i64))
        .collect();
    let total = rounded.iter().map(|(_, q)| *q as f64).sum::<f64>();

    rounded
        .into_iter()
        .map(|(month, quantity_kg)| {
            Ok(MonthlyDisplayRow {
                month,
                quantity_kg,
                share_pct: share_of_total(quantity_kg as f64, total)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synth::{FESTIVAL_WEIGHTS, monthly_breakdown};

    #[test]
    fn summary_over_states() {
        let rows = vec![
            StatePurchase::new("A", 10.0),
            StatePurchase::new("B", 30.0),
            StatePurchase::new("C", 20.0),
        ];
        let s = state_summary(&rows).unwrap();
        assert_eq!(s.total_kg, 60.0);
        assert_eq!(s.mean_kg, 20.0);
        assert_eq!(s.state_count, 3);
        assert_eq!(s.highest_kg, 30.0);
        assert!(state_summary(&[]).is_err());
    }

    #[test]
    fn festival_curve_peaks_in_december() {
        let months = monthly_breakdown(16_800.0, &FESTIVAL_WEIGHTS).unwrap();
        let stats = monthly_stats(&months).unwrap();
        assert_eq!(stats.highest.month, Month::Dec);
        assert_eq!(stats.lowest.month, Month::May);
        assert!((stats.total_kg - 16_800.0).abs() < 1e-9);
        assert!((stats.mean_kg - 1_400.0).abs() < 1e-9);
    }

    #[test]
    fn display_rows_use_rounded_values() {
        let months = monthly_breakdown(16_800.0, &FESTIVAL_WEIGHTS).unwrap();
        let rows = monthly_display_rows(&months).unwrap();
        assert_eq!(rows.len(), 12);
        // 16,800 * 1.3 / 12.2 = 1790.16...
        assert_eq!(rows[11].quantity_kg, 1790);
        let share_sum: f64 = rows.iter().map(|r| r.share_pct).sum();
        assert!((share_sum - 100.0).abs() <= 0.05);
    }

    #[test]
    fn monthly_stats_on_empty_is_an_error() {
        assert!(matches!(monthly_stats(&[]), Err(AnalyticsError::EmptyInput(_))));
    }
}
