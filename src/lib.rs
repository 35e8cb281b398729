//! rust_regiondiff: region-selective gene activity from microarray data
//!
//! Given a microarray expression matrix (probes x samples), a sample
//! annotation table mapping samples to anatomical regions, and a probe table,
//! this crate reports for every pair of requested regions which probes clear
//! an expression cutoff only in one region and which in both.
//!
//! # Example
//!
//! ```ignore
//! use rust_regiondiff::prelude::*;
//!
//! let config = PipelineConfig::new(
//!     "Probes.csv",
//!     "SampleAnnot.csv",
//!     "MicroarrayExpression.csv",
//!     &["LHM", "PHA"],
//!     17.0,
//! );
//! for block in run_pipeline(&config)? {
//!     println!("{}", block);
//! }
//! ```

pub mod cli;
pub mod data;
pub mod diff;
pub mod error;
pub mod filter;
pub mod io;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::data::{
        read_probe_annotation, read_reduced_expression, read_sample_annotation, ExpressionRow,
        ProbeAnnotation, ProbeId, ReducedExpression, SampleAnnotationIndex,
    };
    pub use crate::diff::{compute_region_diffs, DiffResult};
    pub use crate::error::{RegionDiffError, Result};
    pub use crate::filter::{filter_by_cutoff, RegionProbeSet};
    pub use crate::io::{format_region_diffs, read_table, RegionDiffReport};
    pub use crate::{run_pipeline, PipelineConfig};
}

use std::path::{Path, PathBuf};

use data::{normalize_regions, DEFAULT_GENE_FIELD, DEFAULT_REGION_FIELD};
use prelude::*;

/// Inputs and parameters of one analysis run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub probes_path: PathBuf,
    pub sample_annotation_path: PathBuf,
    pub expression_path: PathBuf,
    /// Upper-cased, de-duplicated, in request order
    pub regions: Vec<String>,
    /// Minimum expression (inclusive) for a probe to count as active
    pub cutoff: f64,
    /// Probe table column printed in the report
    pub gene_field: String,
    /// Sample annotation column holding the region code
    pub region_field: String,
}

impl PipelineConfig {
    pub fn new<P: AsRef<Path>, S: AsRef<str>>(
        probes_path: P,
        sample_annotation_path: P,
        expression_path: P,
        regions: &[S],
        cutoff: f64,
    ) -> Self {
        Self {
            probes_path: probes_path.as_ref().to_path_buf(),
            sample_annotation_path: sample_annotation_path.as_ref().to_path_buf(),
            expression_path: expression_path.as_ref().to_path_buf(),
            regions: normalize_regions(regions),
            cutoff,
            gene_field: DEFAULT_GENE_FIELD.to_string(),
            region_field: DEFAULT_REGION_FIELD.to_string(),
        }
    }

    pub fn with_gene_field(mut self, field: &str) -> Self {
        self.gene_field = field.to_string();
        self
    }

    pub fn with_region_field(mut self, field: &str) -> Self {
        self.region_field = field.to_string();
        self
    }

    /// Check parameters and that every input file exists
    pub fn validate(&self) -> Result<()> {
        if self.regions.is_empty() {
            return Err(RegionDiffError::InvalidInput {
                reason: "at least one region is required".to_string(),
            });
        }
        if !self.cutoff.is_finite() {
            return Err(RegionDiffError::InvalidInput {
                reason: format!("cutoff must be a finite number, got {}", self.cutoff),
            });
        }
        for path in [
            &self.probes_path,
            &self.sample_annotation_path,
            &self.expression_path,
        ] {
            if !path.is_file() {
                return Err(RegionDiffError::InvalidInput {
                    reason: format!("input file not found: {}", path.display()),
                });
            }
        }
        Ok(())
    }
}

/// Run the full analysis and return one formatted block per region pair
pub fn run_pipeline(config: &PipelineConfig) -> Result<Vec<String>> {
    config.validate()?;

    // Step 1: one representative row per probe
    let expression = read_reduced_expression(&config.expression_path)?;

    // Step 2: samples per requested region
    let annotation = read_sample_annotation(
        &config.sample_annotation_path,
        &config.region_field,
        &config.regions,
    )?;

    // Step 3: cutoff fan-out over (region, column) tasks
    let probe_set = filter_by_cutoff(&expression, config.cutoff, &annotation)?;
    if log::log_enabled!(log::Level::Debug) {
        for region in probe_set.regions() {
            log::debug!("{}", serde_json::to_string(region)?);
        }
    }

    // Step 4: probe table load alongside the pairwise comparison
    let wanted = probe_set.all_probe_ids();
    let (probes, diffs) = rayon::join(
        || read_probe_annotation(&config.probes_path, &wanted, &config.gene_field),
        || compute_region_diffs(&probe_set),
    );
    let probes = probes?;
    if log::log_enabled!(log::Level::Debug) {
        for diff in &diffs {
            log::debug!("{}", serde_json::to_string(diff)?);
        }
    }

    // Step 5: render
    format_region_diffs(&diffs, &probes, &config.gene_field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    struct Fixture {
        probes: NamedTempFile,
        annotation: NamedTempFile,
        expression: NamedTempFile,
    }

    impl Fixture {
        fn config(&self, regions: &[&str], cutoff: f64) -> PipelineConfig {
            PipelineConfig::new(
                self.probes.path(),
                self.annotation.path(),
                self.expression.path(),
                regions,
                cutoff,
            )
        }
    }

    fn write_lines(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    fn fixture(probe_lines: &[&str]) -> Fixture {
        // Annotation row i maps to expression column i + 1:
        // A -> 1, B -> 2, A -> 3, C -> 4
        let annotation = write_lines(&[
            "structure_id,structure_acronym,well_id",
            "4077,A,w0",
            "4323,b,w1",
            "4077,A,w2",
            "4012,C,w3",
        ]);
        let expression = write_lines(&[
            "10,5,20,1,1,1",
            "10,0,1,16,1,1",
            "15,0,18,19,0,0",
            "20,0,0,25,0,0",
            "25,0,0,0,0,40",
        ]);
        Fixture {
            probes: write_lines(probe_lines),
            annotation,
            expression,
        }
    }

    const PROBES: &[&str] = &[
        "probe_id,probe_name,gene_symbol,entrez_id",
        "10,A_23_P1,GENE_A,101",
        "15,A_23_P2,GENE_S,102",
        "20,A_23_P3,GENE_B,103",
        "25,A_23_P4,GENE_C,104",
        "99,A_23_P9,GENE_Z,109",
    ];

    #[test]
    fn test_full_pipeline() {
        let fx = fixture(PROBES);
        let blocks = run_pipeline(&fx.config(&["a", " b", "C"], 15.0)).unwrap();

        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[0],
            "------------------------------\n\
             Regions: A - B\n\
             ------------------------------\n\
             1 unique genes for A: [\"GENE_A\"]\n\
             1 unique genes for B: [\"GENE_B\"]\n\
             1 shared genes: [\"GENE_S : 15\"]"
        );
        assert!(blocks[1].contains("Regions: A - C"));
        assert!(blocks[1].contains("2 unique genes for A: [\"GENE_A\", \"GENE_S\"]"));
        assert!(blocks[1].contains("1 unique genes for C: [\"GENE_C\"]"));
        assert!(blocks[1].ends_with("0 shared genes: []"));
        assert!(blocks[2].contains("Regions: B - C"));
        assert!(blocks[2].contains("2 unique genes for B: [\"GENE_S\", \"GENE_B\"]"));
    }

    #[test]
    fn test_alternate_gene_field() {
        let fx = fixture(PROBES);
        let config = fx.config(&["A", "B"], 15.0).with_gene_field("entrez_id");
        let blocks = run_pipeline(&config).unwrap();

        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].contains("1 unique genes for A: [\"101\"]"));
        assert!(blocks[0].contains("1 shared genes: [\"102 : 15\"]"));
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let fx = fixture(PROBES);
        let config = fx.config(&["A", "B", "C"], 10.0);
        let first = run_pipeline(&config).unwrap();
        let second = run_pipeline(&config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_probe_fails_at_formatting() {
        let fx = fixture(&[
            "probe_id,gene_symbol",
            "10,GENE_A",
            "15,GENE_S",
            "25,GENE_C",
        ]);
        match run_pipeline(&fx.config(&["A", "B"], 15.0)) {
            Err(RegionDiffError::MissingProbe { probe_id, region }) => {
                assert_eq!(probe_id, 20);
                assert_eq!(region, "B");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_high_cutoff_leaves_nothing() {
        let fx = fixture(PROBES);
        let blocks = run_pipeline(&fx.config(&["A", "B"], 1000.0)).unwrap();
        assert_eq!(
            blocks[0],
            "------------------------------\n\
             Regions: A - B\n\
             ------------------------------\n\
             0 unique genes for A: []\n\
             0 unique genes for B: []\n\
             0 shared genes: []"
        );
    }

    #[test]
    fn test_config_validation() {
        let fx = fixture(PROBES);
        let no_regions: [&str; 0] = [];
        assert!(matches!(
            run_pipeline(&fx.config(&no_regions, 1.0)),
            Err(RegionDiffError::InvalidInput { .. })
        ));
        assert!(matches!(
            run_pipeline(&fx.config(&["A"], f64::INFINITY)),
            Err(RegionDiffError::InvalidInput { .. })
        ));

        let missing = PipelineConfig::new(
            Path::new("/nonexistent/Probes.csv"),
            fx.annotation.path(),
            fx.expression.path(),
            &["A"],
            1.0,
        );
        assert!(matches!(
            run_pipeline(&missing),
            Err(RegionDiffError::InvalidInput { .. })
        ));
    }
}
