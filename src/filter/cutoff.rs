//! Expression cutoff filtering per (region, sample column)
//!
//! Each (region, column index) pair is an independent task that scans the
//! whole reduced expression map. Tasks run on the rayon pool and their
//! outputs are concatenated per region in task order.

use std::collections::BTreeSet;

use rayon::prelude::*;
use serde::Serialize;

use crate::data::{ProbeId, ReducedExpression, SampleAnnotationIndex};
use crate::error::{RegionDiffError, Result};

/// Probe ids that cleared the cutoff in at least one sample of a region.
///
/// The list may hold the same id several times (once per passing sample);
/// use [`RegionProbes::probe_set`] for the distinct ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionProbes {
    pub region: String,
    pub probe_ids: Vec<ProbeId>,
}

impl RegionProbes {
    pub fn probe_set(&self) -> BTreeSet<ProbeId> {
        self.probe_ids.iter().copied().collect()
    }
}

/// Filtered probe ids for every requested region, in request order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionProbeSet {
    regions: Vec<RegionProbes>,
}

impl RegionProbeSet {
    /// Start with an empty list for each region name
    pub fn with_regions<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            regions: names
                .iter()
                .map(|name| RegionProbes {
                    region: name.as_ref().to_string(),
                    probe_ids: Vec::new(),
                })
                .collect(),
        }
    }

    /// Append probe ids to a region, adding the region if it is new
    pub fn extend_region(&mut self, region: &str, probe_ids: impl IntoIterator<Item = ProbeId>) {
        match self.regions.iter_mut().find(|r| r.region == region) {
            Some(entry) => entry.probe_ids.extend(probe_ids),
            None => self.regions.push(RegionProbes {
                region: region.to_string(),
                probe_ids: probe_ids.into_iter().collect(),
            }),
        }
    }

    pub fn regions(&self) -> &[RegionProbes] {
        &self.regions
    }

    pub fn region_names(&self) -> Vec<&str> {
        self.regions.iter().map(|r| r.region.as_str()).collect()
    }

    /// Raw (non-deduplicated) probe list of a region
    pub fn probe_ids(&self, region: &str) -> Option<&[ProbeId]> {
        self.regions
            .iter()
            .find(|r| r.region == region)
            .map(|r| r.probe_ids.as_slice())
    }

    pub fn probe_set(&self, region: &str) -> Option<BTreeSet<ProbeId>> {
        self.regions
            .iter()
            .find(|r| r.region == region)
            .map(|r| r.probe_set())
    }

    /// Every probe id referenced by any region
    pub fn all_probe_ids(&self) -> BTreeSet<ProbeId> {
        self.regions
            .iter()
            .flat_map(|r| r.probe_ids.iter().copied())
            .collect()
    }

}

/// Probe ids whose expression at `column_index` is at least `cutoff`
pub fn probes_passing_cutoff(
    expression: &ReducedExpression,
    column_index: usize,
    cutoff: f64,
) -> Vec<ProbeId> {
    expression
        .iter()
        .filter(|row| row.expression_at(column_index) >= cutoff)
        .map(|row| row.probe_id())
        .collect()
}

/// Run the cutoff test for every (region, column index) pair in parallel
pub fn filter_by_cutoff(
    expression: &ReducedExpression,
    cutoff: f64,
    annotation: &SampleAnnotationIndex,
) -> Result<RegionProbeSet> {
    if !cutoff.is_finite() {
        return Err(RegionDiffError::InvalidInput {
            reason: format!("cutoff must be a finite number, got {}", cutoff),
        });
    }

    let tasks: Vec<(usize, usize)> = annotation
        .regions()
        .iter()
        .enumerate()
        .flat_map(|(region_idx, region)| {
            region
                .column_indices()
                .map(move |column_index| (region_idx, column_index))
        })
        .collect();
    log::info!(
        "Filtering {} probes at cutoff {} across {} sample tasks",
        expression.n_probes(),
        cutoff,
        tasks.len()
    );

    let outputs: Vec<(usize, Vec<ProbeId>)> = tasks
        .into_par_iter()
        .map(|(region_idx, column_index)| {
            (region_idx, probes_passing_cutoff(expression, column_index, cutoff))
        })
        .collect();

    let names = annotation.region_names();
    let mut probe_set = RegionProbeSet::with_regions(&names[..]);
    for (region_idx, probe_ids) in outputs {
        probe_set.extend_region(names[region_idx], probe_ids);
    }

    for region in probe_set.regions() {
        log::info!(
            "  {}: {} passing hits, {} distinct probes",
            region.region,
            region.probe_ids.len(),
            region.probe_set().len()
        );
    }
    Ok(probe_set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ExpressionRow;
    use crate::io::TableRow;

    fn annotation(rows: &[&str], regions: &[&str]) -> SampleAnnotationIndex {
        let rows: Vec<TableRow> = rows
            .iter()
            .map(|region| {
                let mut row = TableRow::new();
                row.insert("structure_acronym".to_string(), region.to_string());
                row
            })
            .collect();
        SampleAnnotationIndex::from_rows(&rows, "structure_acronym", regions).unwrap()
    }

    fn expression(rows: Vec<(ProbeId, Vec<f64>)>) -> ReducedExpression {
        let mut reduced = ReducedExpression::new();
        for (id, values) in rows {
            reduced.insert(ExpressionRow::new(id, values).unwrap()).unwrap();
        }
        reduced
    }

    #[test]
    fn test_single_sample_cutoff() {
        // Region A's only sample sits at column index 1
        let expr = expression(vec![(10, vec![0.0, 20.0])]);
        let annot = annotation(&["A"], &["A"]);

        let passing = filter_by_cutoff(&expr, 15.0, &annot).unwrap();
        assert_eq!(passing.probe_ids("A"), Some(&[10][..]));

        let failing = filter_by_cutoff(&expr, 25.0, &annot).unwrap();
        assert_eq!(failing.probe_ids("A"), Some(&[][..]));
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let expr = expression(vec![(10, vec![0.0, 15.0]), (11, vec![0.0, 14.999])]);
        assert_eq!(probes_passing_cutoff(&expr, 1, 15.0), vec![10]);
    }

    #[test]
    fn test_out_of_range_column_never_passes() {
        let expr = expression(vec![(10, vec![100.0, 100.0])]);
        assert!(probes_passing_cutoff(&expr, 2, 0.0).is_empty());
        assert!(probes_passing_cutoff(&expr, 50, 0.0).is_empty());
    }

    #[test]
    fn test_duplicates_kept_per_sample() {
        let expr = expression(vec![
            (10, vec![0.0, 20.0, 20.0, 1.0]),
            (11, vec![0.0, 1.0, 20.0, 20.0]),
        ]);
        // Rows 0, 1 -> A at columns 1, 2; row 2 -> B at column 3
        let annot = annotation(&["A", "A", "B"], &["A", "B", "C"]);

        let result = filter_by_cutoff(&expr, 10.0, &annot).unwrap();
        assert_eq!(result.region_names(), vec!["A", "B", "C"]);
        assert_eq!(result.probe_ids("A"), Some(&[10, 10, 11][..]));
        assert_eq!(result.probe_ids("B"), Some(&[11][..]));
        assert_eq!(result.probe_ids("C"), Some(&[][..]));
        assert_eq!(result.all_probe_ids(), BTreeSet::from([10, 11]));
    }

    #[test]
    fn test_membership_matches_threshold() {
        let rows: Vec<(ProbeId, Vec<f64>)> = (0..40)
            .map(|id| (id, (0..6).map(|c| ((id * 7 + c * 5) % 13) as f64).collect()))
            .collect();
        let expr = expression(rows.clone());
        let annot = annotation(&["A", "B", "A", "B", "A"], &["A", "B"]);
        let cutoff = 6.0;

        let result = filter_by_cutoff(&expr, cutoff, &annot).unwrap();
        for region in annot.regions() {
            let got = result.probe_set(&region.name).unwrap();
            for (id, values) in &rows {
                let expected = region
                    .column_indices()
                    .any(|c| values.get(c).copied().unwrap_or(-1.0) >= cutoff);
                assert_eq!(got.contains(id), expected, "probe {} in {}", id, region.name);
            }
        }
    }

    #[test]
    fn test_rejects_non_finite_cutoff() {
        let expr = expression(vec![(10, vec![1.0])]);
        let annot = annotation(&["A"], &["A"]);
        assert!(filter_by_cutoff(&expr, f64::NAN, &annot).is_err());
    }
}
