//! Sample annotation grouped by anatomical region
//!
//! A sample annotation row at file position `i` (0-based, header excluded) is
//! registered under column index `i + 1`. That index is used verbatim to look
//! up the sample's value in `ExpressionRow::expression_at`, so the annotation
//! file order and the expression matrix column order must agree.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::error::{RegionDiffError, Result};
use crate::io::{read_table, TableRow};

/// Default sample annotation column holding the region code
pub const DEFAULT_REGION_FIELD: &str = "structure_acronym";

/// Upper-case, trim and de-duplicate region names, keeping first-seen order
pub fn normalize_regions<S: AsRef<str>>(regions: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(regions.len());
    for region in regions {
        let name = region.as_ref().trim().to_uppercase();
        if name.is_empty() {
            continue;
        }
        if seen.insert(name.clone()) {
            normalized.push(name);
        } else {
            log::warn!("Region '{}' requested more than once; ignoring duplicate", name);
        }
    }
    normalized
}

/// Samples of one region keyed by expression column index
#[derive(Debug, Clone, Default)]
pub struct RegionSamples {
    pub name: String,
    pub samples: BTreeMap<usize, TableRow>,
}

impl RegionSamples {
    pub fn column_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.samples.keys().copied()
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }
}

/// Requested regions, in request order, each with its samples
#[derive(Debug, Clone, Default)]
pub struct SampleAnnotationIndex {
    regions: Vec<RegionSamples>,
}

impl SampleAnnotationIndex {
    /// Build the index from annotation rows.
    ///
    /// Every requested region is present afterwards, with an empty sample map
    /// if no row matched it. Region matching ignores case.
    pub fn from_rows<S: AsRef<str>>(
        rows: &[TableRow],
        region_field: &str,
        regions: &[S],
    ) -> Result<Self> {
        let mut index = SampleAnnotationIndex {
            regions: normalize_regions(regions)
                .into_iter()
                .map(|name| RegionSamples {
                    name,
                    samples: BTreeMap::new(),
                })
                .collect(),
        };

        for (i, row) in rows.iter().enumerate() {
            let value = row.get(region_field).ok_or_else(|| RegionDiffError::InvalidInput {
                reason: format!("annotation row {} has no '{}' field", i + 1, region_field),
            })?;
            let region = value.trim().to_uppercase();
            if let Some(entry) = index.regions.iter_mut().find(|r| r.name == region) {
                entry.samples.insert(i + 1, row.clone());
            }
        }

        Ok(index)
    }

    /// Regions in request order
    pub fn regions(&self) -> &[RegionSamples] {
        &self.regions
    }

    pub fn region(&self, name: &str) -> Option<&RegionSamples> {
        let name = name.to_uppercase();
        self.regions.iter().find(|r| r.name == name)
    }

    pub fn region_names(&self) -> Vec<&str> {
        self.regions.iter().map(|r| r.name.as_str()).collect()
    }
}

/// Read the sample annotation file and partition it by requested region
pub fn read_sample_annotation<P: AsRef<Path>, S: AsRef<str>>(
    path: P,
    region_field: &str,
    regions: &[S],
) -> Result<SampleAnnotationIndex> {
    let path = path.as_ref();
    log::info!("Loading sample annotation from: {}", path.display());
    let table = read_table(path, true)?;
    table.require_columns(path, &[region_field])?;

    let index = SampleAnnotationIndex::from_rows(table.rows(), region_field, regions)?;
    for region in index.regions() {
        if region.n_samples() == 0 {
            log::warn!("  {}: no samples found", region.name);
        } else {
            log::info!("  {}: {} samples", region.name, region.n_samples());
        }
    }
    Ok(index)
}
