//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::analytics::{
    MonthlyStats, PriceStats, Quote, RankedState, RegionalRollup, Rankings, StateSummary, monthly_display_rows,
    monthly_stats, quick_reference,
};
use crate::app::pipeline::DashboardData;
use crate::data::ChoroplethLayer;
use crate::domain::{Currency, DailyPurchase, MonthlyPurchase, PriceBand, PricePoint, WeeklyRollup};

pub const NOT_AVAILABLE: &str = "N/A";

/// `1234567.891` -> `"1,234,567.89"` (with `decimals = 2`).
pub fn fmt_grouped(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && raw.chars().any(|c| c != '0' && c != '.');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

/// Rupee amount with two decimals: `₹1,234.56`.
pub fn fmt_inr(value: f64) -> String {
    format!("₹{}", fmt_grouped(value, 2))
}

/// Whole rupees: `₹186,429`.
pub fn fmt_inr_whole(value: f64) -> String {
    format!("₹{}", fmt_grouped(value, 0))
}

/// Foreign amount with the ISO code: `USD 2,000.00`.
pub fn fmt_currency(value: f64, currency: Currency) -> String {
    format!("{} {}", currency.code(), fmt_grouped(value, 2))
}

pub fn fmt_kg(value: f64) -> String {
    format!("{} kg", fmt_grouped(value, 0))
}

pub fn fmt_pct(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

/// `1` -> `1st`, `12` -> `12th`, `22` -> `22nd`.
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Right,
}

/// Render a fixed-width table with a dashed rule under the header.
fn render_table(columns: &[(&str, usize, Align)], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    let line = |cells: Vec<String>| -> String {
        let parts: Vec<String> = cells
            .iter()
            .zip(columns)
            .map(|(cell, &(_, width, align))| match align {
                Align::Left => format!("{:<width$}", truncate(cell, width)),
                Align::Right => format!("{:>width$}", truncate(cell, width)),
            })
            .collect();
        parts.join(" ").trim_end().to_string()
    };

    out.push_str(&line(columns.iter().map(|(h, _, _)| h.to_string()).collect()));
    out.push('\n');
    out.push_str(&line(columns.iter().map(|&(_, w, _)| "-".repeat(w)).collect()));
    out.push('\n');
    for row in rows {
        out.push_str(&line(row.clone()));
        out.push('\n');
    }
    out
}

/// Calculator result plus the breakdown table.
pub fn format_quote(quote: &Quote) -> String {
    let mut out = String::new();
    out.push_str("=== Silver Price Calculator ===\n");
    out.push_str(&format!("Total Cost: {}\n", fmt_inr(quote.total_inr)));
    out.push_str(&format!(
        "{} Equivalent: {}\n\n",
        quote.currency.code(),
        fmt_currency(quote.converted, quote.currency)
    ));

    out.push_str("Price Breakdown:\n");
    out.push_str(&format!("  Weight          {:.2} grams\n", quote.weight_grams));
    out.push_str(&format!("  Price per gram  {}\n", fmt_inr(quote.price_per_gram)));
    out.push_str(&format!("  Total (INR)     {}\n", fmt_inr(quote.total_inr)));
    out.push_str(&format!(
        "  Total ({})     {}\n",
        quote.currency.code(),
        fmt_currency(quote.converted, quote.currency)
    ));
    out
}

pub fn format_quick_reference(price_per_gram: f64) -> String {
    let mut out = String::from("Quick Reference (Current Rates):\n");
    for (label, cost) in quick_reference(price_per_gram) {
        out.push_str(&format!("  {label:<10} {}\n", fmt_inr(cost)));
    }
    out
}

pub fn format_price_table(prices: &[PricePoint]) -> String {
    let rows: Vec<Vec<String>> = prices
        .iter()
        .map(|p| vec![p.label(), fmt_inr_whole(p.price_per_kg), fmt_inr(p.price_per_gram())])
        .collect();
    render_table(
        &[
            ("period", 10, Align::Left),
            ("INR/kg", 12, Align::Right),
            ("INR/g", 10, Align::Right),
        ],
        &rows,
    )
}

/// Price statistics for a band; every figure is "N/A" when the band is empty.
pub fn format_price_stats(band: PriceBand, stats: Option<&PriceStats>) -> String {
    let mut out = format!("Price statistics ({}):\n", band.display_name());
    let per_kg = |v: Option<f64>| v.map(|v| format!("{}/kg", fmt_inr_whole(v))).unwrap_or_else(|| NOT_AVAILABLE.to_string());

    out.push_str(&format!("  Months          {}\n", stats.map(|s| s.count).unwrap_or(0)));
    out.push_str(&format!("  Highest Price   {}\n", per_kg(stats.map(|s| s.highest))));
    out.push_str(&format!("  Lowest Price    {}\n", per_kg(stats.map(|s| s.lowest))));
    out.push_str(&format!("  Average Price   {}\n", per_kg(stats.map(|s| s.mean))));
    out.push_str(&format!(
        "  Change %        {}\n",
        stats
            .and_then(|s| s.change_pct)
            .map(|c| fmt_pct(c, 2))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    ));
    out
}

pub fn format_state_table(ranked: &[RankedState]) -> String {
    let rows: Vec<Vec<String>> = ranked
        .iter()
        .map(|r| {
            vec![
                r.rank.to_string(),
                r.state.clone(),
                fmt_grouped(r.quantity_kg, 0),
                fmt_pct(r.share_pct, 2),
            ]
        })
        .collect();
    render_table(
        &[
            ("#", 3, Align::Right),
            ("state", 20, Align::Left),
            ("purchased kg", 12, Align::Right),
            ("share", 8, Align::Right),
        ],
        &rows,
    )
}

pub fn format_state_summary(summary: &StateSummary) -> String {
    let mut out = String::from("State summary:\n");
    out.push_str(&format!("  Total Purchases     {}\n", fmt_kg(summary.total_kg)));
    out.push_str(&format!("  Average per State   {}\n", fmt_kg(summary.mean_kg)));
    out.push_str(&format!("  States Analyzed     {}\n", summary.state_count));
    out.push_str(&format!("  Highest Purchase    {}\n", fmt_kg(summary.highest_kg)));
    out
}

/// Top-N table with the leader, combined share and the focus state's rank.
pub fn format_insights(rankings: &Rankings, ranked: &[RankedState], focus_state: &str) -> String {
    let n = rankings.top.len();
    let mut out = format!("Top {n} States with Highest Silver Purchases:\n");
    out.push_str(&format_state_table(&rankings.top));
    out.push('\n');

    out.push_str("Key Insights:\n");
    if let Some(leader) = rankings.leader() {
        out.push_str(&format!(
            "- {} leads with {} ({} of total)\n",
            leader.state,
            fmt_kg(leader.quantity_kg),
            fmt_pct(leader.share_pct, 1)
        ));
    }
    out.push_str(&format!(
        "- Top {n} states account for {} of total purchases\n",
        fmt_pct(rankings.top_share_pct, 1)
    ));
    if let Some(focus) = ranked.iter().find(|r| r.state.eq_ignore_ascii_case(focus_state)) {
        out.push_str(&format!(
            "- {} ranks {} with {}\n",
            focus.state,
            ordinal(focus.rank),
            fmt_kg(focus.quantity_kg)
        ));
    }
    out.push_str(&format!("- Combined purchases: {}\n", fmt_kg(rankings.top_total_kg)));
    out
}

/// Monthly table (whole kg, % of annual) followed by the headline stats.
pub fn format_monthly(state: &str, months: &[MonthlyPurchase]) -> String {
    let mut out = format!("{state} Monthly Silver Purchase Trends:\n");

    match monthly_display_rows(months) {
        Ok(rows) => {
            let rows: Vec<Vec<String>> = rows
                .iter()
                .map(|r| vec![r.month.to_string(), fmt_grouped(r.quantity_kg as f64, 0), fmt_pct(r.share_pct, 2)])
                .collect();
            out.push_str(&render_table(
                &[
                    ("month", 5, Align::Left),
                    ("purchase kg", 12, Align::Right),
                    ("% of annual", 12, Align::Right),
                ],
                &rows,
            ));
        }
        Err(err) => out.push_str(&format!("  {err}\n")),
    }

    if let Ok(stats) = monthly_stats(months) {
        out.push('\n');
        out.push_str(&format_monthly_stats(&stats));
    }
    out
}

pub fn format_monthly_stats(stats: &MonthlyStats) -> String {
    format!(
        "  Highest Month     {} ({:.0} kg)\n  Lowest Month      {} ({:.0} kg)\n  Average Purchase  {:.0} kg/month\n  Total Annual      {}\n",
        stats.highest.month,
        stats.highest.quantity_kg,
        stats.lowest.month,
        stats.lowest.quantity_kg,
        stats.mean_kg,
        fmt_kg(stats.total_kg),
    )
}

pub fn format_regions(rollup: &RegionalRollup) -> String {
    let grand = rollup.grand_total();
    let rows: Vec<Vec<String>> = rollup
        .totals
        .iter()
        .map(|t| {
            let share = if grand > 0.0 { t.total_kg / grand * 100.0 } else { 0.0 };
            vec![
                t.region.display_name().to_string(),
                fmt_grouped(t.total_kg, 0),
                fmt_pct(share, 1),
            ]
        })
        .collect();

    let mut out = String::from("Regional Distribution:\n");
    out.push_str(&render_table(
        &[
            ("region", 12, Align::Left),
            ("total kg", 12, Align::Right),
            ("share", 7, Align::Right),
        ],
        &rows,
    ));
    if !rollup.unmapped.is_empty() {
        out.push_str(&format!(
            "(not in any region, excluded: {})\n",
            rollup.unmapped.join(", ")
        ));
    }
    out
}

pub fn format_daily_table(days: &[DailyPurchase]) -> String {
    let rows: Vec<Vec<String>> = days
        .iter()
        .map(|d| vec![d.date.to_string(), d.weekday.to_string(), fmt_grouped(d.quantity_kg, 0)])
        .collect();
    render_table(
        &[
            ("date", 10, Align::Left),
            ("day", 3, Align::Left),
            ("purchase kg", 12, Align::Right),
        ],
        &rows,
    )
}

pub fn format_weekly_table(weeks: &[WeeklyRollup]) -> String {
    let rows: Vec<Vec<String>> = weeks
        .iter()
        .map(|w| {
            vec![
                w.week.to_string(),
                w.day_count.to_string(),
                fmt_grouped(w.sum_kg, 0),
                fmt_grouped(w.mean_kg, 0),
            ]
        })
        .collect();
    render_table(
        &[
            ("week", 8, Align::Left),
            ("days", 4, Align::Right),
            ("sum kg", 10, Align::Right),
            ("mean kg", 10, Align::Right),
        ],
        &rows,
    )
}

/// Map join coverage: shaded features, features without data, and data without features.
pub fn format_choropleth(layer: &ChoroplethLayer) -> String {
    let matched = layer.cells.iter().filter(|c| c.quantity_kg.is_some()).count();
    let mut out = format!(
        "Map: {} features, {matched} with data (max {})\n",
        layer.cells.len(),
        fmt_kg(layer.max_kg)
    );
    let no_data: Vec<&str> = layer
        .cells
        .iter()
        .filter(|c| c.quantity_kg.is_none())
        .map(|c| c.name.as_str())
        .collect();
    if !no_data.is_empty() {
        out.push_str(&format!("  No Data: {}\n", no_data.join(", ")));
    }
    if !layer.unmatched_states.is_empty() {
        out.push_str(&format!("  No boundary for: {}\n", layer.unmatched_states.join(", ")));
    }
    out
}

pub fn format_footer(data: &DashboardData) -> String {
    let mut out = String::new();
    if let (Some(first), Some(last)) = (data.prices.first(), data.prices.last()) {
        out.push_str(&format!("Data Period: {}-{}\n", first.year, last.year));
        out.push_str(&format!(
            "Latest Silver Price ({}): {}/gram | {}/kg\n",
            last.label(),
            fmt_inr(last.price_per_gram()),
            fmt_inr_whole(last.price_per_kg)
        ));
    }
    out.push_str(&format!(
        "Total National Silver Purchases: {} across {} states\n",
        fmt_kg(data.summary.total_kg),
        data.summary.state_count
    ));
    out
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{quote, rank_all, rank_states};
    use crate::domain::{StatePurchase, WeightUnit};

    #[test]
    fn grouped_numbers() {
        assert_eq!(fmt_grouped(0.0, 2), "0.00");
        assert_eq!(fmt_grouped(999.0, 0), "999");
        assert_eq!(fmt_grouped(1000.0, 0), "1,000");
        assert_eq!(fmt_grouped(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(fmt_grouped(-215_990.0, 0), "-215,990");
        assert_eq!(fmt_grouped(-0.001, 2), "0.00");
        assert_eq!(fmt_grouped(f64::NAN, 2), NOT_AVAILABLE);
    }

    #[test]
    fn currency_strings() {
        assert_eq!(fmt_inr(1234.56), "₹1,234.56");
        assert_eq!(fmt_inr_whole(186_429.0), "₹186,429");
        assert_eq!(fmt_currency(2000.0, Currency::Usd), "USD 2,000.00");
        assert_eq!(fmt_kg(215_990.0), "215,990 kg");
    }

    #[test]
    fn ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(5), "5th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(22), "22nd");
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("Andhra Pradesh", 20), "Andhra Pradesh");
        assert_eq!(truncate("Andhra Pradesh", 6), "Andhr.");
    }

    #[test]
    fn quote_breakdown() {
        let q = quote(171.0, 1.0, WeightUnit::Kilograms, Currency::Usd).unwrap();
        let txt = format_quote(&q);
        assert!(txt.contains("Total Cost: ₹171,000.00"));
        assert!(txt.contains("USD Equivalent: USD 2,000.00"));
        assert!(txt.contains("1000.00 grams"));
    }

    #[test]
    fn empty_band_reports_not_available() {
        let txt = format_price_stats(PriceBand::UpTo20k, None);
        assert!(txt.contains("Highest Price   N/A"));
        assert!(txt.contains("Change %        N/A"));
    }

    #[test]
    fn insights_name_leader_and_focus() {
        let rows = vec![
            StatePurchase::new("Maharashtra", 22_000.0),
            StatePurchase::new("Karnataka", 16_800.0),
            StatePurchase::new("Goa", 1_200.0),
        ];
        let rankings = rank_states(&rows, 2).unwrap();
        let ranked = rank_all(&rows).unwrap();
        let txt = format_insights(&rankings, &ranked, "karnataka");
        assert!(txt.starts_with("Top 2 States"));
        assert!(txt.contains("- Maharashtra leads with 22,000 kg (55.0% of total)"));
        assert!(txt.contains("- Top 2 states account for 97.0% of total purchases"));
        assert!(txt.contains("- Karnataka ranks 2nd with 16,800 kg"));
        assert!(txt.contains("- Combined purchases: 38,800 kg"));
    }

    #[test]
    fn state_table_snapshot() {
        let rows = vec![StatePurchase::new("Goa", 1_900.0), StatePurchase::new("Kerala", 9_200.0)];
        let txt = format_state_table(&rank_all(&rows).unwrap());
        let expected = concat!(
            "  # state                purchased kg    share\n",
            "--- -------------------- ------------ --------\n",
            "  1 Kerala                      9,200   82.88%\n",
            "  2 Goa                         1,900   17.12%\n",
        );
        assert_eq!(txt, expected);
    }
}
