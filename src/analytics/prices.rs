//! Historical price filtering and summary statistics.

use crate::domain::{PriceBand, PricePoint};

/// Summary of a (possibly filtered) price series, INR per kg.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceStats {
    pub count: usize,
    pub highest: f64,
    pub lowest: f64,
    pub mean: f64,
    /// First-to-last change in percent; `None` with fewer than two rows.
    pub change_pct: Option<f64>,
}

/// Rows whose price falls in `band`, order preserved.
pub fn filter_by_band(prices: &[PricePoint], band: PriceBand) -> Vec<PricePoint> {
    prices
        .iter()
        .filter(|p| band.contains(p.price_per_kg))
        .cloned()
        .collect()
}

/// Statistics over `prices` in their given order.
///
/// Returns `None` on empty input so callers can show "N/A" rather than
/// dividing by zero.
pub fn price_stats(prices: &[PricePoint]) -> Option<PriceStats> {
    let first = prices.first()?;
    let last = prices.last()?;

    let mut highest = f64::NEG_INFINITY;
    let mut lowest = f64::INFINITY;
    let mut sum = 0.0;
    for p in prices {
        highest = highest.max(p.price_per_kg);
        lowest = lowest.min(p.price_per_kg);
        sum += p.price_per_kg;
    }

    let change_pct = if prices.len() > 1 && first.price_per_kg != 0.0 {
        Some((last.price_per_kg - first.price_per_kg) / first.price_per_kg * 100.0)
    } else {
        None
    };

    Some(PriceStats {
        count: prices.len(),
        highest,
        lowest,
        mean: sum / prices.len() as f64,
        change_pct,
    })
}

/// The most recent row (the series is sorted ascending on load).
pub fn latest_price(prices: &[PricePoint]) -> Option<&PricePoint> {
    prices.last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Month;

    fn p(year: i32, month: Month, price: f64) -> PricePoint {
        PricePoint {
            year,
            month,
            price_per_kg: price,
        }
    }

    fn sample() -> Vec<PricePoint> {
        vec![
            p(2008, Month::Jan, 18_000.0),
            p(2008, Month::Feb, 20_000.0),
            p(2008, Month::Mar, 25_000.0),
            p(2008, Month::Apr, 30_000.0),
            p(2008, Month::May, 36_000.0),
        ]
    }

    #[test]
    fn bands_filter_on_inclusive_edges() {
        let prices = sample();
        assert_eq!(filter_by_band(&prices, PriceBand::All).len(), 5);
        assert_eq!(filter_by_band(&prices, PriceBand::UpTo20k).len(), 2);
        assert_eq!(filter_by_band(&prices, PriceBand::From20kTo30k).len(), 2);
        assert_eq!(filter_by_band(&prices, PriceBand::From30k).len(), 2);
    }

    #[test]
    fn stats_over_series() {
        let stats = price_stats(&sample()).unwrap();
        assert_eq!(stats.count, 5);
        assert_eq!(stats.highest, 36_000.0);
        assert_eq!(stats.lowest, 18_000.0);
        assert_eq!(stats.mean, 25_800.0);
        assert_eq!(stats.change_pct, Some(100.0));
    }

    #[test]
    fn single_row_has_no_change() {
        let stats = price_stats(&sample()[..1]).unwrap();
        assert_eq!(stats.change_pct, None);
        assert_eq!(stats.highest, stats.lowest);
    }

    #[test]
    fn empty_filter_result_is_not_applicable() {
        let prices = vec![p(2020, Month::Jan, 60_000.0)];
        let filtered = filter_by_band(&prices, PriceBand::UpTo20k);
        assert!(filtered.is_empty());
        assert_eq!(price_stats(&filtered), None);
        assert_eq!(latest_price(&filtered), None);
        assert_eq!(latest_price(&prices).unwrap().price_per_kg, 60_000.0);
    }
}
