//! Training-set entries: exported rows with slide-relative coordinates.

use serde::{Deserialize, Serialize};

use super::rows::ExportRow;
use crate::utils::round_to;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingEntry {
    pub index: String,
    pub label: String,
    pub top: Option<f64>,
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
}

impl TrainingEntry {
    /// Divides vertical coordinates by the slide height and horizontal ones
    /// by the slide width, rounded to three decimals. A zero slide dimension
    /// leaves the affected coordinates unset.
    pub fn from_row(row: &ExportRow) -> Self {
        let scale = |v: Option<f64>, extent: f64| {
            v.filter(|_| extent > 0.0).map(|v| round_to(v / extent, 3))
        };
        Self {
            index: row.index.clone(),
            label: row.label.clone(),
            top: scale(row.top, row.slide_height),
            left: scale(row.left, row.slide_width),
            right: scale(row.right, row.slide_width),
            bottom: scale(row.bottom, row.slide_height),
        }
    }
}

/// Training entries of every row, in row order.
pub fn training_entries(rows: &[ExportRow]) -> Vec<TrainingEntry> {
    rows.iter().map(TrainingEntry::from_row).collect()
}
