//! Command-line interface for rust_regiondiff

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::data::{DEFAULT_GENE_FIELD, DEFAULT_REGION_FIELD};
use crate::error::{RegionDiffError, Result};
use crate::PipelineConfig;

/// Accepted input file extensions (lower case)
const INPUT_EXTENSIONS: [&str; 2] = ["csv", "tsv"];

#[derive(Parser, Debug)]
#[command(name = "rust_regiondiff")]
#[command(version)]
#[command(about = "Region-selective gene activity from microarray expression data")]
#[command(
    long_about = "Region-selective gene activity from microarray expression data\n\n\
        Collapses duplicate probe rows to the row with the highest mean expression,\n\
        finds the probes reaching the cutoff in any sample of each requested region,\n\
        and reports, for every pair of regions, the probes active in only one of\n\
        them and the probes active in both.",
    after_long_help = "\
Examples:
  rust_regiondiff --probes Probes.csv --sampleannot SampleAnnot.csv \\
    --microarrayexpression MicroarrayExpression.csv --regions LHM,PHA --cutoff 17

  # Report Entrez ids instead of gene symbols, using 8 threads
  rust_regiondiff --probes Probes.csv --sampleannot SampleAnnot.csv \\
    --microarrayexpression MicroarrayExpression.csv --regions LHM,PHA,CB \\
    --cutoff 12.5 --field-name entrez_id -t 8"
)]
pub struct Cli {
    /// Path to probe table CSV file
    #[arg(long,
        long_help = "Path to probe table CSV file.\n\
            Needs a header with a `probe_id` column and the --field-name column.")]
    pub probes: PathBuf,

    /// Path to sample annotation CSV file
    #[arg(long, alias = "sample-annot",
        long_help = "Path to sample annotation CSV file.\n\
            Needs a header with the --region-field column. Row i (0-based, header\n\
            excluded) is matched to expression column i + 1.")]
    pub sampleannot: PathBuf,

    /// Path to microarray expression CSV file
    #[arg(long, alias = "microarray-expression",
        long_help = "Path to microarray expression CSV file.\n\
            No header; each row is probe_id followed by one value per sample.\n\
            Rows for the same probe must be adjacent.")]
    pub microarrayexpression: PathBuf,

    /// Comma-separated region codes (case-insensitive)
    #[arg(long, value_delimiter = ',', required = true)]
    pub regions: Vec<String>,

    /// Minimum expression (inclusive) for a probe to count as active
    #[arg(long, allow_negative_numbers = true)]
    pub cutoff: f64,

    /// Probe table column shown in the report
    #[arg(long, alias = "field_name", default_value = DEFAULT_GENE_FIELD)]
    pub field_name: String,

    /// Sample annotation column with the region code
    #[arg(long, default_value = DEFAULT_REGION_FIELD)]
    pub region_field: String,

    /// Number of threads (0 = auto)
    #[arg(short = 't', long, default_value = "0")]
    pub threads: usize,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Validate input paths and build the pipeline configuration
    pub fn to_config(&self) -> Result<PipelineConfig> {
        validate_input_file(&self.probes, "probes")?;
        validate_input_file(&self.sampleannot, "sampleannot")?;
        validate_input_file(&self.microarrayexpression, "microarrayexpression")?;

        Ok(PipelineConfig::new(
            self.probes.as_path(),
            self.sampleannot.as_path(),
            self.microarrayexpression.as_path(),
            &self.regions,
            self.cutoff,
        )
        .with_gene_field(&self.field_name)
        .with_region_field(&self.region_field))
    }
}

/// The file must exist and carry a `.csv` or `.tsv` extension
pub fn validate_input_file(path: &Path, argument: &str) -> Result<()> {
    if !path.is_file() {
        return Err(RegionDiffError::InvalidInput {
            reason: format!("--{}: file not found: {}", argument, path.display()),
        });
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if !INPUT_EXTENSIONS.contains(&ext.as_str()) {
        return Err(RegionDiffError::InvalidInput {
            reason: format!(
                "--{}: expected a .csv or .tsv file, got {}",
                argument,
                path.display()
            ),
        });
    }
    Ok(())
}
