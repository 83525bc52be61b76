//! Top-N rankings and percentage shares.

use crate::domain::StatePurchase;
use crate::error::AnalyticsError;

/// A state row with its 1-based rank and share of the national total.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedState {
    pub rank: usize,
    pub state: String,
    pub quantity_kg: f64,
    pub share_pct: f64,
}

/// Top-N rows plus their combined weight.
#[derive(Debug, Clone)]
pub struct Rankings {
    pub total_kg: f64,
    pub top: Vec<RankedState>,
    pub top_total_kg: f64,
    pub top_share_pct: f64,
}

impl Rankings {
    pub fn leader(&self) -> Option<&RankedState> {
        self.top.first()
    }
}

/// Rows sorted by quantity, descending. Ties keep input order.
pub fn sort_descending(rows: &[StatePurchase]) -> Vec<StatePurchase> {
    let mut sorted = rows.to_vec();
    // `sort_by` is stable, which gives the tie-break for free.
    sorted.sort_by(|a, b| b.quantity_kg.partial_cmp(&a.quantity_kg).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

/// The `n` largest rows, descending by quantity.
pub fn top_n(rows: &[StatePurchase], n: usize) -> Vec<StatePurchase> {
    let mut sorted = sort_descending(rows);
    sorted.truncate(n);
    sorted
}

/// `value / total * 100`, rounded to 2 decimals.
pub fn share_of_total(value: f64, total: f64) -> Result<f64, AnalyticsError> {
    if total == 0.0 {
        return Err(AnalyticsError::DivisionByZero);
    }
    Ok(round_to(value / total * 100.0, 2))
}

/// Combined share of the top `n` rows.
pub fn top_share(rows: &[StatePurchase], n: usize, total: f64) -> Result<f64, AnalyticsError> {
    let top_sum: f64 = top_n(rows, n).iter().map(|r| r.quantity_kg).sum();
    share_of_total(top_sum, total)
}

pub fn total_quantity(rows: &[StatePurchase]) -> f64 {
    rows.iter().map(|r| r.quantity_kg).sum()
}

/// Every row ranked, with shares. Used for the full state table.
pub fn rank_all(rows: &[StatePurchase]) -> Result<Vec<RankedState>, AnalyticsError> {
    let total = total_quantity(rows);
    ranked(sort_descending(rows), total)
}

/// Rank the top `n` states and compute their combined share.
pub fn rank_states(rows: &[StatePurchase], n: usize) -> Result<Rankings, AnalyticsError> {
    let total_kg = total_quantity(rows);
    let top = ranked(top_n(rows, n), total_kg)?;
    let top_total_kg: f64 = top.iter().map(|r| r.quantity_kg).sum();
    let top_share_pct = share_of_total(top_total_kg, total_kg)?;

    Ok(Rankings {
        total_kg,
        top,
        top_total_kg,
        top_share_pct,
    })
}

fn ranked(sorted: Vec<StatePurchase>, total: f64) -> Result<Vec<RankedState>, AnalyticsError> {
    sorted
        .into_iter()
        .enumerate()
        .map(|(idx, row)| {
            Ok(RankedState {
                rank: idx + 1,
                share_pct: share_of_total(row.quantity_kg, total)?,
                state: row.state,
                quantity_kg: row.quantity_kg,
            })
        })
        .collect()
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
