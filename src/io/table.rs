//! Delimiter-sniffed CSV tables
//!
//! Sample annotation and probe tables are small enough to be parsed through
//! the `csv` crate into per-row maps keyed by column name. The expression
//! matrix does not go through here; see [`crate::io::expression`].

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{RegionDiffError, Result};

/// Number of bytes inspected when sniffing the delimiter
pub const SNIFF_BYTES: usize = 4096;

/// Delimiters tried by the sniffer, in order of preference
const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b'\t', b';', b'|'];

/// One data row: column name -> raw string value
pub type TableRow = HashMap<String, String>;

/// A parsed table: header list plus rows in file order
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<TableRow>,
}

impl Table {
    /// Column names, empty when the file was read without a header
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Rows in file order
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Fail with `MalformedTable` unless every named column is present
    pub fn require_columns<P: AsRef<Path>>(&self, path: P, names: &[&str]) -> Result<()> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| !self.has_column(name))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(RegionDiffError::MalformedTable {
            path: path.as_ref().display().to_string(),
            reason: format!("missing required column(s): {}", missing.join(", ")),
        })
    }

    /// Line number of the row at `row_idx` in the source file (1-based)
    pub fn source_line(&self, row_idx: usize) -> usize {
        if self.headers.is_empty() {
            row_idx + 1
        } else {
            row_idx + 2
        }
    }
}

/// Strip surrounding quotes from a string
pub(crate) fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Occurrences of `delim` outside double-quoted sections
fn count_unquoted(line: &str, delim: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for b in line.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if b == delim && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Pick the delimiter from a text sample.
///
/// A candidate is accepted when it occurs (outside quotes) the same non-zero
/// number of times on every complete line of the sample. Among accepted
/// candidates the most frequent wins; ties go to the earlier entry of the
/// preference list.
/// `truncated` means the sample was cut short, so its last line is partial.
pub fn sniff_delimiter(sample: &str, truncated: bool) -> Option<u8> {
    let mut lines: Vec<&str> = sample
        .split('\n')
        .map(|l| l.trim_end_matches('\r'))
        .collect();
    if truncated && lines.len() > 1 {
        lines.pop();
    }
    lines.retain(|l| !l.trim().is_empty());
    if lines.is_empty() {
        return None;
    }

    let mut best: Option<(u8, usize)> = None;
    for &delim in &CANDIDATE_DELIMITERS {
        let first = count_unquoted(lines[0], delim);
        if first == 0 {
            continue;
        }
        let consistent = lines
            .iter()
            .all(|l| count_unquoted(l, delim) == first);
        if consistent && best.map_or(true, |(_, n)| first > n) {
            best = Some((delim, first));
        }
    }
    best.map(|(delim, _)| delim)
}

/// Sniff the delimiter of a file from its first [`SNIFF_BYTES`] bytes
pub fn sniff_file_delimiter<P: AsRef<Path>>(path: P) -> Result<u8> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let mut buf = Vec::with_capacity(SNIFF_BYTES);
    (&mut file).take(SNIFF_BYTES as u64 + 1).read_to_end(&mut buf)?;

    let truncated = buf.len() > SNIFF_BYTES;
    buf.truncate(SNIFF_BYTES);
    let sample = String::from_utf8_lossy(&buf);

    sniff_delimiter(&sample, truncated).ok_or_else(|| RegionDiffError::MalformedTable {
        path: path.display().to_string(),
        reason: "could not determine a consistent field delimiter".to_string(),
    })
}

/// Read a delimiter-sniffed table.
///
/// With `has_header` the first row names the columns; otherwise rows are keyed
/// by zero-based column position ("0", "1", ...) and the header list is empty.
pub fn read_table<P: AsRef<Path>>(path: P, has_header: bool) -> Result<Table> {
    let path = path.as_ref();
    let delimiter = sniff_file_delimiter(path)?;
    log::debug!(
        "Sniffed delimiter {:?} for {}",
        delimiter as char,
        path.display()
    );

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(has_header)
        .from_path(path)?;

    let malformed = |err: csv::Error| {
        if let csv::ErrorKind::UnequalLengths { pos, expected_len, len } = err.kind() {
            return RegionDiffError::MalformedTable {
                path: path.display().to_string(),
                reason: format!(
                    "row at line {} has {} fields, expected {}",
                    pos.as_ref().map_or(0, |p| p.line()),
                    len,
                    expected_len
                ),
            };
        }
        RegionDiffError::CsvError(err)
    };

    let headers: Vec<String> = if has_header {
        reader
            .headers()
            .map_err(malformed)?
            .iter()
            .map(|h| strip_quotes(h).to_string())
            .collect()
    } else {
        Vec::new()
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(malformed)?;
        let row: TableRow = if has_header {
            headers
                .iter()
                .cloned()
                .zip(record.iter().map(|v| v.to_string()))
                .collect()
        } else {
            record
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v.to_string()))
                .collect()
        };
        rows.push(row);
    }

    Ok(Table { headers, rows })
}
