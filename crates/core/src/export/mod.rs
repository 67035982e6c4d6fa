//! Output formats for finished section trees.
//!
//! - `rows`: the flat table written as CSV (or JSON rows).
//! - `nested`: the `{label, sections}` tree and dotted-index conversion.
//! - `training`: slide-relative entries for training-set compilation.

mod nested;
mod rows;
mod training;

pub use nested::{FlatEntry, TreeNode, flatten_tree, parents_from_indices, tree_from_rows};
pub use rows::{COLUMNS, CsvExporter, ExportRow, export_rows, read_rows, to_csv_string};
pub use training::{TrainingEntry, training_entries};

use crate::error::Result;
use crate::hierarchy::TreeIndex;

/// Flat `(index, label)` entries of exported rows; fails on an unparsable index.
pub fn entries_from_rows(rows: &[ExportRow]) -> Result<Vec<FlatEntry>> {
    rows.iter()
        .map(|r| Ok(FlatEntry::new(TreeIndex::parse(&r.index)?, r.label.clone())))
        .collect()
}
