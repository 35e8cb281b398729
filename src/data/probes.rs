//! Probe annotation restricted to the probes that passed the cutoff

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use super::ProbeId;
use crate::error::{RegionDiffError, Result};
use crate::io::{read_table, strip_quotes, TableRow};

/// Probe table column holding the probe id
pub const PROBE_ID_FIELD: &str = "probe_id";

/// Default probe table column used to name probes in the report
pub const DEFAULT_GENE_FIELD: &str = "gene_symbol";

/// Probe id -> full probe table row
#[derive(Debug, Clone, Default)]
pub struct ProbeAnnotation {
    probes: HashMap<ProbeId, TableRow>,
}

impl ProbeAnnotation {
    /// Keep rows whose probe id is in `wanted`
    ///
    /// Every row's probe id must parse, wanted or not. `first_line` is the
    /// source line number of `rows[0]`, used in error messages.
    pub fn from_rows(rows: &[TableRow], wanted: &BTreeSet<ProbeId>, first_line: usize) -> Result<Self> {
        let mut probes = HashMap::with_capacity(wanted.len());
        for (i, row) in rows.iter().enumerate() {
            let line = first_line + i;
            let raw = row.get(PROBE_ID_FIELD).ok_or_else(|| RegionDiffError::MalformedRow {
                line,
                reason: format!("missing '{}' field", PROBE_ID_FIELD),
            })?;
            let probe_id: ProbeId = strip_quotes(raw).parse().map_err(|_| RegionDiffError::MalformedRow {
                line,
                reason: format!("probe id '{}' is not an integer", raw),
            })?;
            if wanted.contains(&probe_id) && probes.insert(probe_id, row.clone()).is_some() {
                log::warn!("Probe {} listed more than once in probe table; keeping line {}", probe_id, line);
            }
        }
        Ok(Self { probes })
    }

    pub fn get(&self, probe_id: ProbeId) -> Option<&TableRow> {
        self.probes.get(&probe_id)
    }

    /// Value of `field` for a probe, if both exist
    pub fn field(&self, probe_id: ProbeId, field: &str) -> Option<&str> {
        self.probes
            .get(&probe_id)
            .and_then(|row| row.get(field))
            .map(|v| v.as_str())
    }

    pub fn contains(&self, probe_id: ProbeId) -> bool {
        self.probes.contains_key(&probe_id)
    }

    pub fn n_probes(&self) -> usize {
        self.probes.len()
    }
}

/// Read the probe table, keeping only rows for `wanted` probe ids
pub fn read_probe_annotation<P: AsRef<Path>>(
    path: P,
    wanted: &BTreeSet<ProbeId>,
    gene_field: &str,
) -> Result<ProbeAnnotation> {
    let path = path.as_ref();
    log::info!("Loading probe table from: {}", path.display());
    let table = read_table(path, true)?;
    table.require_columns(path, &[PROBE_ID_FIELD, gene_field])?;

    let annotation = ProbeAnnotation::from_rows(table.rows(), wanted, table.source_line(0))?;
    log::info!(
        "  {} of {} referenced probes annotated",
        annotation.n_probes(),
        wanted.len()
    );
    Ok(annotation)
}
