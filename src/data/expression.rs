//! Expression rows and the reduced expression map

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use ndarray::Array1;

use super::ProbeId;
use crate::error::{RegionDiffError, Result};
use crate::io::strip_quotes;

/// Value reported for a column index past the end of a row
pub const MISSING_EXPRESSION: f64 = -1.0;

/// One probe's expression values, one per sample column
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionRow {
    probe_id: ProbeId,
    expressions: Array1<f64>,
}

impl ExpressionRow {
    /// Create a row. Values must be finite and there must be at least one.
    pub fn new(probe_id: ProbeId, expressions: Vec<f64>) -> Result<Self> {
        if expressions.is_empty() {
            return Err(RegionDiffError::InvalidInput {
                reason: format!("probe {} has no expression values", probe_id),
            });
        }
        if let Some(bad) = expressions.iter().find(|v| !v.is_finite()) {
            return Err(RegionDiffError::InvalidInput {
                reason: format!("expression value {} for probe {} is not finite", bad, probe_id),
            });
        }
        Ok(Self {
            probe_id,
            expressions: Array1::from_vec(expressions),
        })
    }

    /// Parse `probe_id<d>expr_1<d>...<d>expr_N`
    pub fn parse_line(text: &str, delimiter: char, line_no: usize) -> Result<Self> {
        let mut fields = text.trim_end_matches(['\r', '\n']).split(delimiter);

        let id_field = strip_quotes(fields.next().unwrap_or_default());
        let probe_id: ProbeId = id_field.parse().map_err(|_| RegionDiffError::MalformedRow {
            line: line_no,
            reason: format!("probe id '{}' is not an integer", id_field),
        })?;

        let expressions: Vec<f64> = fields
            .map(|field| {
                let val = strip_quotes(field);
                val.parse::<f64>().map_err(|_| RegionDiffError::MalformedRow {
                    line: line_no,
                    reason: format!("expression value '{}' for probe {} is not numeric", val, probe_id),
                })
            })
            .collect::<Result<_>>()?;

        Self::new(probe_id, expressions).map_err(|e| match e {
            RegionDiffError::InvalidInput { reason } => RegionDiffError::MalformedRow {
                line: line_no,
                reason,
            },
            other => other,
        })
    }

    pub fn probe_id(&self) -> ProbeId {
        self.probe_id
    }

    pub fn expressions(&self) -> &Array1<f64> {
        &self.expressions
    }

    pub fn n_columns(&self) -> usize {
        self.expressions.len()
    }

    /// Expression at `column_index`, or [`MISSING_EXPRESSION`] when out of range
    pub fn expression_at(&self, column_index: usize) -> f64 {
        self.expressions
            .get(column_index)
            .copied()
            .unwrap_or(MISSING_EXPRESSION)
    }

    /// Mean expression across all columns
    pub fn mean(&self) -> f64 {
        self.expressions.mean().unwrap_or(f64::NAN)
    }
}

/// One representative row per probe id, ordered by probe id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReducedExpression {
    rows: BTreeMap<ProbeId, ExpressionRow>,
}

impl ReducedExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a representative row; a probe id may only be inserted once
    pub fn insert(&mut self, row: ExpressionRow) -> Result<()> {
        match self.rows.entry(row.probe_id()) {
            Entry::Occupied(entry) => Err(duplicate_probe(*entry.key())),
            Entry::Vacant(entry) => {
                entry.insert(row);
                Ok(())
            }
        }
    }

    /// Merge another partial result into this one; the two must not share ids
    pub fn merge(&mut self, other: ReducedExpression) -> Result<()> {
        for row in other.rows.into_values() {
            self.insert(row)?;
        }
        Ok(())
    }

    pub fn get(&self, probe_id: ProbeId) -> Option<&ExpressionRow> {
        self.rows.get(&probe_id)
    }

    pub fn n_probes(&self) -> usize {
        self.rows.len()
    }

    /// Rows in ascending probe id order
    pub fn iter(&self) -> impl Iterator<Item = &ExpressionRow> {
        self.rows.values()
    }

    pub fn probe_ids(&self) -> impl Iterator<Item = ProbeId> + '_ {
        self.rows.keys().copied()
    }
}

fn duplicate_probe(probe_id: ProbeId) -> RegionDiffError {
    RegionDiffError::InvalidInput {
        reason: format!("probe {} was reduced more than once", probe_id),
    }
}
