//! Expression cutoff filtering

mod cutoff;

pub use cutoff::{filter_by_cutoff, probes_passing_cutoff, RegionProbeSet, RegionProbes};
