//! ISO-week rollup of the daily series.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::domain::{DailyPurchase, WeekId, WeeklyRollup};

/// Group days by ISO week; ascending by week.
///
/// Weeks cut by the window boundary keep their real `day_count`.
pub fn weekly_rollup(daily: &[DailyPurchase]) -> Vec<WeeklyRollup> {
    let mut groups: BTreeMap<WeekId, (f64, usize)> = BTreeMap::new();
    for day in daily {
        let entry = groups.entry(WeekId::from(day.date.iso_week())).or_insert((0.0, 0));
        entry.0 += day.quantity_kg;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(week, (sum_kg, day_count))| WeeklyRollup {
            week,
            sum_kg,
            mean_kg: sum_kg / day_count as f64,
            day_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(start: NaiveDate, days: usize) -> Vec<DailyPurchase> {
        start
            .iter_days()
            .take(days)
            .enumerate()
            .map(|(i, date)| DailyPurchase {
                date,
                weekday: date.weekday(),
                quantity_kg: i as f64,
            })
            .collect()
    }

    #[test]
    fn partial_weeks_are_kept() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let weeks = weekly_rollup(&series(start, 30));

        let counts: Vec<usize> = weeks.iter().map(|w| w.day_count).collect();
        assert_eq!(counts, vec![4, 7, 7, 7, 5]);
        assert_eq!(counts.iter().sum::<usize>(), 30);
        assert_eq!(weeks[0].week, WeekId { year: 2026, week: 1 });
        assert_eq!(weeks[4].week, WeekId { year: 2026, week: 5 });

        // Jan 1-4 carry values 0..=3.
        assert_eq!(weeks[0].sum_kg, 6.0);
        assert_eq!(weeks[0].mean_kg, 1.5);
    }

    #[test]
    fn weeks_spanning_a_year_boundary_sort_by_iso_year() {
        // 2025-12-29 is the Monday of ISO week 2026-W01.
        let start = NaiveDate::from_ymd_opt(2025, 12, 27).unwrap();
        let weeks = weekly_rollup(&series(start, 10));
        let ids: Vec<String> = weeks.iter().map(|w| w.week.to_string()).collect();
        assert_eq!(ids, vec!["2025-W52", "2026-W01", "2026-W02"]);
        assert_eq!(weeks[0].day_count, 2);
        assert_eq!(weeks[1].day_count, 7);
        assert_eq!(weeks[2].day_count, 1);
    }

    #[test]
    fn empty_series_has_no_weeks() {
        assert!(weekly_rollup(&[]).is_empty());
    }
}
