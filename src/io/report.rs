//! Human-readable rendering of region comparisons

use std::fmt;

use crate::data::{ProbeAnnotation, ProbeId};
use crate::diff::DiffResult;
use crate::error::{RegionDiffError, Result};

const RULE: &str = "------------------------------";

/// One region pair with probe ids resolved to gene identifiers
#[derive(Debug, Clone, PartialEq)]
pub struct RegionDiffReport {
    pub name: String,
    /// (region, identifiers of its unique probes)
    pub unique: Vec<(String, Vec<String>)>,
    /// `identifier : probe_id` for each shared probe
    pub shared: Vec<String>,
}

impl RegionDiffReport {
    /// Resolve every probe of `diff` through `probes`.
    ///
    /// Fails with `MissingProbe` on the first probe absent from the probe
    /// table; shared probes report the pair name as their region.
    pub fn resolve(diff: &DiffResult, probes: &ProbeAnnotation, gene_field: &str) -> Result<Self> {
        let lookup = |probe_id: ProbeId, region: &str| -> Result<String> {
            probes
                .field(probe_id, gene_field)
                .map(str::to_string)
                .ok_or_else(|| RegionDiffError::MissingProbe {
                    probe_id,
                    region: region.to_string(),
                })
        };

        let unique = diff
            .unique_sets()
            .iter()
            .map(|(region, ids)| -> Result<(String, Vec<String>)> {
                let genes = ids
                    .iter()
                    .map(|&id| lookup(id, *region))
                    .collect::<Result<Vec<_>>>()?;
                Ok((region.to_string(), genes))
            })
            .collect::<Result<Vec<_>>>()?;

        let name = diff.name();
        let shared = diff
            .shared
            .iter()
            .map(|&id| lookup(id, name.as_str()).map(|gene| format!("{} : {}", gene, id)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name,
            unique,
            shared,
        })
    }
}

impl fmt::Display for RegionDiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        writeln!(f, "Regions: {}", self.name)?;
        writeln!(f, "{}", RULE)?;
        for (region, genes) in &self.unique {
            writeln!(f, "{} unique genes for {}: {:?}", genes.len(), region, genes)?;
        }
        write!(f, "{} shared genes: {:?}", self.shared.len(), self.shared)
    }
}

/// Render each region pair as a text block, in the order given
pub fn format_region_diffs(
    diffs: &[DiffResult],
    probes: &ProbeAnnotation,
    gene_field: &str,
) -> Result<Vec<String>> {
    diffs
        .iter()
        .map(|diff| RegionDiffReport::resolve(diff, probes, gene_field).map(|r| r.to_string()))
        .collect()
}
