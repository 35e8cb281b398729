//! Input/Output operations for region differential analysis

mod expression;
mod report;
mod table;

pub use expression::{read_expression_groups, ProbeGroup, RawExpression, RawLine};
pub use report::{format_region_diffs, RegionDiffReport};
pub use table::{read_table, sniff_delimiter, sniff_file_delimiter, Table, TableRow, SNIFF_BYTES};

pub(crate) use table::strip_quotes;
