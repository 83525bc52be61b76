//! Regional rollup over a fixed state → region map.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::{Region, RegionTotal, StatePurchase};

/// Static partition of state names into regions.
#[derive(Debug, Clone)]
pub struct RegionMap {
    entries: Vec<(Region, Vec<String>)>,
}

impl RegionMap {
    pub fn new(entries: Vec<(Region, Vec<String>)>) -> Self {
        Self { entries }
    }

    /// The six-region grouping of Indian states and union territories.
    pub fn india() -> Self {
        let group = |states: &[&str]| states.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self::new(vec![
            (
                Region::South,
                group(&["Andhra Pradesh", "Karnataka", "Kerala", "Tamil Nadu", "Telangana"]),
            ),
            (Region::West, group(&["Gujarat", "Maharashtra", "Goa"])),
            (
                Region::North,
                group(&[
                    "Delhi",
                    "Haryana",
                    "Himachal Pradesh",
                    "Jammu & Kashmir",
                    "Punjab",
                    "Rajasthan",
                    "Uttarakhand",
                    "Ladakh",
                ]),
            ),
            (Region::East, group(&["Bihar", "Jharkhand", "Odisha", "West Bengal"])),
            (
                Region::Central,
                group(&["Chhattisgarh", "Madhya Pradesh", "Uttar Pradesh"]),
            ),
            (
                Region::NorthEast,
                group(&[
                    "Arunachal Pradesh",
                    "Assam",
                    "Manipur",
                    "Meghalaya",
                    "Mizoram",
                    "Nagaland",
                    "Sikkim",
                    "Tripura",
                ]),
            ),
        ])
    }

    pub fn entries(&self) -> &[(Region, Vec<String>)] {
        &self.entries
    }

    /// Every region containing `state` (exact name match).
    pub fn regions_of(&self, state: &str) -> Vec<Region> {
        self.entries
            .iter()
            .filter(|(_, states)| states.iter().any(|s| s == state))
            .map(|(region, _)| *region)
            .collect()
    }
}

/// Per-region totals plus the states that matched no region.
#[derive(Debug, Clone, Default)]
pub struct RegionalRollup {
    /// Descending by total; ties keep map order.
    pub totals: Vec<RegionTotal>,
    /// States left out of every total.
    pub unmapped: Vec<String>,
}

impl RegionalRollup {
    pub fn grand_total(&self) -> f64 {
        self.totals.iter().map(|t| t.total_kg).sum()
    }
}

/// Sum quantities per region.
///
/// A state contributes once to each region listing it. States listed in no
/// region are dropped from the totals without failing; they are returned in
/// `unmapped` and logged.
pub fn rollup_by_region(rows: &[StatePurchase], map: &RegionMap) -> RegionalRollup {
    let by_state: HashMap<&str, f64> = rows.iter().map(|r| (r.state.as_str(), r.quantity_kg)).collect();

    let mut totals: Vec<RegionTotal> = map
        .entries()
        .iter()
        .map(|(region, states)| RegionTotal {
            region: *region,
            total_kg: states.iter().filter_map(|s| by_state.get(s.as_str())).sum(),
        })
        .collect();
    totals.sort_by(|a, b| b.total_kg.partial_cmp(&a.total_kg).unwrap_or(std::cmp::Ordering::Equal));

    let unmapped: Vec<String> = rows
        .iter()
        .filter(|r| map.regions_of(&r.state).is_empty())
        .map(|r| r.state.clone())
        .collect();
    if !unmapped.is_empty() {
        warn!(
            count = unmapped.len(),
            states = %unmapped.join(", "),
            "states missing from region map were left out of regional totals"
        );
    }

    RegionalRollup { totals, unmapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_of(rollup: &RegionalRollup, region: Region) -> f64 {
        rollup
            .totals
            .iter()
            .find(|t| t.region == region)
            .map(|t| t.total_kg)
            .unwrap()
    }

    #[test]
    fn unmapped_states_are_excluded_from_totals() {
        let map = RegionMap::new(vec![(Region::South, vec!["A".to_string()])]);
        let rows = vec![StatePurchase::new("A", 10.0), StatePurchase::new("B", 5.0)];

        let rollup = rollup_by_region(&rows, &map);
        assert_eq!(rollup.grand_total(), 10.0);
        assert_eq!(rollup.unmapped, vec!["B".to_string()]);
    }

    #[test]
    fn india_map_groups_and_sorts() {
        let rows = vec![
            StatePurchase::new("Maharashtra", 22_000.0),
            StatePurchase::new("Goa", 1_900.0),
            StatePurchase::new("Karnataka", 16_800.0),
            StatePurchase::new("Kerala", 9_200.0),
            StatePurchase::new("Assam", 2_400.0),
            StatePurchase::new("Atlantis", 1.0),
        ];
        let rollup = rollup_by_region(&rows, &RegionMap::india());

        assert_eq!(rollup.totals.len(), 6);
        assert_eq!(rollup.totals[0].region, Region::South);
        assert_eq!(total_of(&rollup, Region::South), 26_000.0);
        assert_eq!(total_of(&rollup, Region::West), 23_900.0);
        assert_eq!(total_of(&rollup, Region::NorthEast), 2_400.0);
        assert_eq!(total_of(&rollup, Region::East), 0.0);
        assert_eq!(rollup.grand_total(), 52_300.0);
        assert_eq!(rollup.unmapped, vec!["Atlantis".to_string()]);
        assert!(rollup.totals.windows(2).all(|w| w[0].total_kg >= w[1].total_kg));
    }

    #[test]
    fn india_map_is_disjoint() {
        let map = RegionMap::india();
        for (_, states) in map.entries() {
            for state in states {
                assert_eq!(map.regions_of(state).len(), 1, "{state} appears in several regions");
            }
        }
    }
}
