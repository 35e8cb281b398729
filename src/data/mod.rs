//! Data structures for region differential analysis

mod annotation;
mod expression;
mod probes;
mod reduce;

pub use annotation::{
    normalize_regions, read_sample_annotation, RegionSamples, SampleAnnotationIndex,
    DEFAULT_REGION_FIELD,
};
pub use expression::{ExpressionRow, ReducedExpression, MISSING_EXPRESSION};
pub use probes::{read_probe_annotation, ProbeAnnotation, DEFAULT_GENE_FIELD, PROBE_ID_FIELD};
pub use reduce::{chunk_ranges, read_reduced_expression, reduce_expression, select_representative};

/// Numeric probe identifier from the expression matrix and probe table
pub type ProbeId = i64;
