//! Collapse duplicate probe rows to one representative per probe
//!
//! Several raw rows may carry the same probe id. The representative is the row
//! with the highest mean expression; among equal means the row met first in
//! the file wins. Values are finite by construction, so means always compare.

use std::ops::Range;
use std::path::Path;

use rayon::prelude::*;

use super::{ExpressionRow, ReducedExpression};
use crate::error::Result;
use crate::io::{read_expression_groups, ProbeGroup, RawExpression};

/// Read the expression file and reduce it to one row per probe id
pub fn read_reduced_expression<P: AsRef<Path>>(path: P) -> Result<ReducedExpression> {
    let path = path.as_ref();
    log::info!("Loading expression matrix from: {}", path.display());
    let raw = read_expression_groups(path)?;
    log::info!(
        "  {} raw rows, {} distinct probes",
        raw.n_lines(),
        raw.n_groups()
    );
    reduce_expression(&raw)
}

/// Reduce grouped raw lines, one chunk of probe groups per worker
pub fn reduce_expression(raw: &RawExpression) -> Result<ReducedExpression> {
    let delimiter = raw.delimiter as char;
    let chunks = chunk_ranges(raw.groups.len(), rayon::current_num_threads());
    log::debug!(
        "Reducing {} probe groups in {} chunks",
        raw.groups.len(),
        chunks.len()
    );

    let partials: Vec<ReducedExpression> = chunks
        .into_par_iter()
        .map(|range| reduce_chunk(&raw.groups[range], delimiter))
        .collect::<Result<_>>()?;

    let mut reduced = ReducedExpression::new();
    for partial in partials {
        reduced.merge(partial)?;
    }
    Ok(reduced)
}

fn reduce_chunk(groups: &[ProbeGroup], delimiter: char) -> Result<ReducedExpression> {
    let mut reduced = ReducedExpression::new();
    for group in groups {
        reduced.insert(select_representative(group, delimiter)?)?;
    }
    Ok(reduced)
}

/// Parse every line of a group and keep the one with the highest mean
pub fn select_representative(group: &ProbeGroup, delimiter: char) -> Result<ExpressionRow> {
    let first = group.first();
    let mut best = ExpressionRow::parse_line(&first.text, delimiter, first.line_no)?;
    let mut best_mean = best.mean();

    // Strictly greater, so equal means keep file order
    for line in group.lines().skip(1) {
        let row = ExpressionRow::parse_line(&line.text, delimiter, line.line_no)?;
        let mean = row.mean();
        if mean > best_mean {
            best = row;
            best_mean = mean;
        }
    }
    Ok(best)
}

/// Split `len` items into at most `n_chunks` contiguous ranges whose sizes
/// differ by at most one
pub fn chunk_ranges(len: usize, n_chunks: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }
    let n_chunks = n_chunks.clamp(1, len);
    let base = len / n_chunks;
    let extra = len % n_chunks;

    let mut ranges = Vec::with_capacity(n_chunks);
    let mut start = 0;
    for i in 0..n_chunks {
        let size = base + usize::from(i < extra);
        ranges.push(start..start + size);
        start += size;
    }
    ranges
}
