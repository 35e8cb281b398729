//! Raw expression matrix ingestion
//!
//! The expression matrix is the large input, so it bypasses generic table
//! parsing: lines are streamed, keyed by their numeric probe id, and grouped
//! while the values are still unparsed. Value parsing happens later, in
//! parallel, per group.
//!
//! Lines for one probe must be contiguous in the file. A probe id that shows
//! up again after another probe has started is rejected.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::iter;
use std::path::Path;

use super::table::{sniff_file_delimiter, strip_quotes};
use crate::data::ProbeId;
use crate::error::{RegionDiffError, Result};

/// An unparsed expression line with its 1-based source line number
#[derive(Debug, Clone)]
pub struct RawLine {
    pub line_no: usize,
    pub text: String,
}

/// Consecutive raw lines sharing one probe id; never empty
#[derive(Debug, Clone)]
pub struct ProbeGroup {
    probe_id: ProbeId,
    first: RawLine,
    rest: Vec<RawLine>,
}

impl ProbeGroup {
    pub fn new(probe_id: ProbeId, first: RawLine) -> Self {
        Self {
            probe_id,
            first,
            rest: Vec::new(),
        }
    }

    pub fn push(&mut self, line: RawLine) {
        self.rest.push(line);
    }

    pub fn probe_id(&self) -> ProbeId {
        self.probe_id
    }

    pub fn first(&self) -> &RawLine {
        &self.first
    }

    /// All lines in file order
    pub fn lines(&self) -> impl Iterator<Item = &RawLine> {
        iter::once(&self.first).chain(self.rest.iter())
    }

    pub fn n_lines(&self) -> usize {
        1 + self.rest.len()
    }
}

/// The expression file as delimiter plus probe groups in file order
#[derive(Debug, Clone)]
pub struct RawExpression {
    pub delimiter: u8,
    pub groups: Vec<ProbeGroup>,
}

impl RawExpression {
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn n_lines(&self) -> usize {
        self.groups.iter().map(|g| g.n_lines()).sum()
    }
}

/// Read the expression file and group its lines by leading probe id
pub fn read_expression_groups<P: AsRef<Path>>(path: P) -> Result<RawExpression> {
    let path = path.as_ref();
    let delimiter = sniff_file_delimiter(path)?;
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let groups = group_lines(reader, delimiter as char).map_err(|e| match e {
        RegionDiffError::MalformedTable { reason, .. } => RegionDiffError::MalformedTable {
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })?;

    Ok(RawExpression { delimiter, groups })
}

/// Group consecutive lines with the same numeric probe id.
///
/// Ids are compared after parsing, so `10`, `010` and `+10` are one probe.
pub(crate) fn group_lines<R: BufRead>(reader: R, delimiter: char) -> Result<Vec<ProbeGroup>> {
    let mut groups: Vec<ProbeGroup> = Vec::new();
    let mut closed: HashSet<ProbeId> = HashSet::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => RegionDiffError::MalformedRow {
                line: line_no,
                reason: "line is not valid UTF-8".to_string(),
            },
            _ => RegionDiffError::IoError(e),
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let probe_id = parse_probe_id(&line, delimiter, line_no)?;

        match groups.last_mut() {
            Some(current) if current.probe_id == probe_id => {
                current.push(RawLine { line_no, text: line });
                continue;
            }
            Some(current) => {
                closed.insert(current.probe_id);
            }
            None => {}
        }

        if closed.contains(&probe_id) {
            return Err(RegionDiffError::MalformedTable {
                path: String::new(),
                reason: format!(
                    "probe id {} at line {} reappears after other probes; rows for one probe must be contiguous",
                    probe_id, line_no
                ),
            });
        }

        groups.push(ProbeGroup::new(probe_id, RawLine { line_no, text: line }));
    }

    Ok(groups)
}

fn parse_probe_id(line: &str, delimiter: char, line_no: usize) -> Result<ProbeId> {
    let field = strip_quotes(line.split(delimiter).next().unwrap_or_default());
    field.parse().map_err(|_| RegionDiffError::MalformedRow {
        line: line_no,
        reason: format!("probe id '{}' is not an integer", field),
    })
}
