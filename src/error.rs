//! Error types for rust_regiondiff

use thiserror::Error;

use crate::data::ProbeId;

/// Main error type for region differential analysis
#[derive(Error, Debug)]
pub enum RegionDiffError {
    #[error("Malformed table {path}: {reason}")]
    MalformedTable { path: String, reason: String },

    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("Probe {probe_id} active in {region} is missing from the probe table")]
    MissingProbe { probe_id: ProbeId, region: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for region differential analysis
pub type Result<T> = std::result::Result<T, RegionDiffError>;
