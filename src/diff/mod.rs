//! Pairwise region comparison
//!
//! For each unordered pair of regions the active probes are split into three
//! disjoint sets: unique to the first region, unique to the second, shared.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::data::ProbeId;
use crate::filter::RegionProbeSet;

/// Set algebra result for one region pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    pub region_a: String,
    pub region_b: String,
    pub unique_a: BTreeSet<ProbeId>,
    pub unique_b: BTreeSet<ProbeId>,
    pub shared: BTreeSet<ProbeId>,
}

impl DiffResult {
    /// Compare the probe sets of two regions
    pub fn new(
        region_a: &str,
        probes_a: &BTreeSet<ProbeId>,
        region_b: &str,
        probes_b: &BTreeSet<ProbeId>,
    ) -> Self {
        Self {
            region_a: region_a.to_string(),
            region_b: region_b.to_string(),
            unique_a: probes_a.difference(probes_b).copied().collect(),
            unique_b: probes_b.difference(probes_a).copied().collect(),
            shared: probes_a.intersection(probes_b).copied().collect(),
        }
    }

    /// Display name of the pair, e.g. `LHM - PHA`
    pub fn name(&self) -> String {
        format!("{} - {}", self.region_a, self.region_b)
    }

    /// Probes unique to `region`, if it is one of the pair
    pub fn unique(&self, region: &str) -> Option<&BTreeSet<ProbeId>> {
        if region == self.region_a {
            Some(&self.unique_a)
        } else if region == self.region_b {
            Some(&self.unique_b)
        } else {
            None
        }
    }

    /// The pair's unique sets in pair order
    pub fn unique_sets(&self) -> [(&str, &BTreeSet<ProbeId>); 2] {
        [
            (self.region_a.as_str(), &self.unique_a),
            (self.region_b.as_str(), &self.unique_b),
        ]
    }

    /// All probes active in either region
    pub fn union(&self) -> BTreeSet<ProbeId> {
        self.unique_a
            .iter()
            .chain(&self.unique_b)
            .chain(&self.shared)
            .copied()
            .collect()
    }
}

/// Compare every unordered pair of regions, in region order:
/// `(R0,R1) (R0,R2) ... (R1,R2) ...`
pub fn compute_region_diffs(probe_set: &RegionProbeSet) -> Vec<DiffResult> {
    let sets: Vec<(&str, BTreeSet<ProbeId>)> = probe_set
        .regions()
        .iter()
        .map(|r| (r.region.as_str(), r.probe_set()))
        .collect();

    let mut diffs = Vec::with_capacity(sets.len() * sets.len().saturating_sub(1) / 2);
    for (i, (name_a, set_a)) in sets.iter().enumerate() {
        for (name_b, set_b) in &sets[i + 1..] {
            diffs.push(DiffResult::new(name_a, set_a, name_b, set_b));
        }
    }
    log::info!("Compared {} region pairs", diffs.len());
    diffs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[ProbeId]) -> BTreeSet<ProbeId> {
        ids.iter().copied().collect()
    }

    fn probe_set(regions: &[(&str, Vec<ProbeId>)]) -> RegionProbeSet {
        let mut ps = RegionProbeSet::default();
        for (name, ids) in regions {
            ps.extend_region(name, ids.iter().copied());
        }
        ps
    }

    #[test]
    fn test_diff_result() {
        let diff = DiffResult::new("A", &set(&[10, 15]), "B", &set(&[15, 20]));
        assert_eq!(diff.name(), "A - B");
        assert_eq!(diff.unique("A"), Some(&set(&[10])));
        assert_eq!(diff.unique("B"), Some(&set(&[20])));
        assert_eq!(diff.unique("C"), None);
        assert_eq!(diff.shared, set(&[15]));

        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(json["region_b"], "B");
        assert_eq!(json["unique_a"], serde_json::json!([10]));
        assert_eq!(json["shared"], serde_json::json!([15]));
    }

    #[test]
    fn test_pair_enumeration_order() {
        let ps = probe_set(&[("LHM", vec![1]), ("PHA", vec![2]), ("CB", vec![3])]);
        let names: Vec<String> = compute_region_diffs(&ps).iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["LHM - PHA", "LHM - CB", "PHA - CB"]);
    }

    #[test]
    fn test_fewer_than_two_regions() {
        assert!(compute_region_diffs(&probe_set(&[])).is_empty());
        assert!(compute_region_diffs(&probe_set(&[("A", vec![1, 2])])).is_empty());
    }

    #[test]
    fn test_set_algebra_invariants() {
        let ps = probe_set(&[
            ("A", vec![1, 2, 3, 3, 4, 9]),
            ("B", vec![3, 4, 5, 6]),
            ("C", vec![]),
            ("D", vec![1, 6, 7, 7]),
        ]);
        for diff in compute_region_diffs(&ps) {
            assert!(diff.unique_a.is_disjoint(&diff.unique_b));
            assert!(diff.unique_a.is_disjoint(&diff.shared));
            assert!(diff.unique_b.is_disjoint(&diff.shared));

            let a = ps.probe_set(&diff.region_a).unwrap();
            let b = ps.probe_set(&diff.region_b).unwrap();
            let expected: BTreeSet<ProbeId> = a.union(&b).copied().collect();
            assert_eq!(diff.union(), expected, "{}", diff.name());
        }
    }

    #[test]
    fn test_symmetry() {
        let a = set(&[1, 2, 3]);
        let b = set(&[2, 3, 4, 5]);
        let ab = DiffResult::new("A", &a, "B", &b);
        let ba = DiffResult::new("B", &b, "A", &a);

        assert_eq!(ab.shared, ba.shared);
        assert_eq!(ab.unique("A"), ba.unique("A"));
        assert_eq!(ab.unique("B"), ba.unique("B"));
        assert_eq!(ab.unique_a, ba.unique_b);
    }
}
