//! Table grids and generation of row, column and range sections.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::session::{TableSectionKind, TableSectionRecord};
use crate::error::{Result, SectionError};
use crate::section::{CellCoord, ElementId};
use crate::utils::Bounds;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Row,
    Col,
}

/// One cell of a table as reported by the shape source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub row: u32,
    pub col: u32,
    #[serde(default)]
    pub bounds: Option<Bounds>,
    #[serde(default)]
    pub text: String,
}

/// Geometry and text of a table, cells addressed by 0-based `(row, col)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableGrid {
    pub table_id: ElementId,
    pub rows: u32,
    pub cols: u32,
    #[serde(default)]
    pub cells: Vec<GridCell>,
}

impl TableGrid {
    pub fn new(table_id: impl Into<ElementId>, rows: u32, cols: u32) -> Self {
        Self {
            table_id: table_id.into(),
            rows,
            cols,
            cells: Vec::new(),
        }
    }

    /// Adds (or replaces) the cell at `(row, col)`.
    pub fn set_cell(&mut self, row: u32, col: u32, bounds: Option<Bounds>, text: impl Into<String>) {
        let cell = GridCell {
            row,
            col,
            bounds,
            text: text.into(),
        };
        match self.cells.iter_mut().find(|c| c.row == row && c.col == col) {
            Some(existing) => *existing = cell,
            None => self.cells.push(cell),
        }
    }

    pub fn in_grid(&self, coord: CellCoord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    pub fn cell(&self, coord: CellCoord) -> Option<&GridCell> {
        self.cells
            .iter()
            .find(|c| c.row == coord.row && c.col == coord.col)
    }

    /// Trimmed text of every cell, in the given order.
    ///
    /// Coordinates outside the grid fail; cells inside the grid the source
    /// did not report read as empty.
    pub fn cell_texts(&self, cells: &[CellCoord]) -> Result<Vec<String>> {
        cells
            .iter()
            .map(|&coord| {
                if !self.in_grid(coord) {
                    return Err(SectionError::InvalidCell(format!(
                        "{coord} outside {}x{} table {}",
                        self.rows, self.cols, self.table_id
                    )));
                }
                Ok(self
                    .cell(coord)
                    .map(|c| c.text.trim().to_string())
                    .unwrap_or_default())
            })
            .collect()
    }

    /// Non-empty cell texts joined by single spaces.
    pub fn joined_text(&self, cells: &[CellCoord]) -> Result<String> {
        Ok(self
            .cell_texts(cells)?
            .into_iter()
            .filter(|t| !t.is_empty())
            .join(" "))
    }

    /// Union of the bounds of the given cells, if any of them has bounds.
    pub fn bounds_of(&self, cells: &[CellCoord]) -> Option<Bounds> {
        let rects: Vec<Bounds> = cells
            .iter()
            .filter_map(|&c| self.cell(c).and_then(|cell| cell.bounds))
            .collect();
        Bounds::union_all(rects.iter())
    }

    pub fn row_section(&self, row: u32, label: impl Into<String>) -> Option<TableSectionRecord> {
        self.range_section(Axis::Row, row, row, TableSectionKind::Row, label.into())
    }

    pub fn col_section(&self, col: u32, label: impl Into<String>) -> Option<TableSectionRecord> {
        self.range_section(Axis::Col, col, col, TableSectionKind::Col, label.into())
    }

    /// Section covering rows (or columns) `start..=end`, clipped to the grid.
    pub fn group_section(
        &self,
        axis: Axis,
        start: u32,
        end: u32,
        label: impl Into<String>,
    ) -> Option<TableSectionRecord> {
        let kind = match axis {
            Axis::Row => TableSectionKind::GroupOfRows,
            Axis::Col => TableSectionKind::GroupOfCols,
        };
        self.range_section(axis, start, end, kind, label.into())
    }

    fn range_section(
        &self,
        axis: Axis,
        start: u32,
        end: u32,
        kind: TableSectionKind,
        label: String,
    ) -> Option<TableSectionRecord> {
        let (lo, hi) = (start.min(end), start.max(end));
        let cells: Vec<CellCoord> = match axis {
            Axis::Row => {
                let rows = lo..hi.saturating_add(1).min(self.rows);
                rows.cartesian_product(0..self.cols)
                    .map(|(r, c)| CellCoord::new(r, c))
                    .collect()
            }
            Axis::Col => {
                let cols = lo..hi.saturating_add(1).min(self.cols);
                cols.cartesian_product(0..self.rows)
                    .map(|(c, r)| CellCoord::new(r, c))
                    .collect()
            }
        };
        if cells.is_empty() {
            return None;
        }
        let text = self.joined_text(&cells).ok()?;
        Some(TableSectionRecord {
            table: self.table_id.clone(),
            bounds: self.bounds_of(&cells),
            cells,
            label,
            kind,
            text: Some(text),
            overlaid: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> TableGrid {
        let mut g = TableGrid::new("9", 2, 3);
        for r in 0..2 {
            for c in 0..3 {
                let top = 100.0 + 20.0 * r as f64;
                let left = 50.0 + 40.0 * c as f64;
                g.set_cell(
                    r,
                    c,
                    Some(Bounds::new(top, left, left + 40.0, top + 20.0)),
                    format!(" r{r}c{c} "),
                );
            }
        }
        g
    }

    #[test]
    fn row_section_reads_row_major() {
        let row = grid().row_section(1, "second").unwrap();
        assert_eq!(row.kind, TableSectionKind::Row);
        assert_eq!(row.cells.len(), 3);
        assert_eq!(row.text.as_deref(), Some("r1c0 r1c1 r1c2"));
        assert_eq!(row.bounds, Some(Bounds::new(120.0, 50.0, 170.0, 140.0)));
    }

    #[test]
    fn column_group_reads_column_major() {
        let g = grid().group_section(Axis::Col, 1, 2, "right").unwrap();
        assert_eq!(g.kind, TableSectionKind::GroupOfCols);
        assert_eq!(g.text.as_deref(), Some("r0c1 r1c1 r0c2 r1c2"));
    }

    #[test]
    fn ranges_are_clipped_to_the_grid() {
        let g = grid().group_section(Axis::Row, 1, 7, "tail").unwrap();
        assert_eq!(g.cells.len(), 3);
        assert!(grid().row_section(5, "none").is_none());
    }

    #[test]
    fn ranges_ending_at_u32_max_are_clipped() {
        let g = TableGrid::new("T", 2, 2);
        let rows = g.group_section(Axis::Row, 1, u32::MAX, "tail").unwrap();
        assert_eq!(rows.cells, vec![CellCoord::new(1, 0), CellCoord::new(1, 1)]);
        let cols = g.group_section(Axis::Col, u32::MAX, 0, "all").unwrap();
        assert_eq!(cols.cells.len(), 4);
        assert!(g.col_section(u32::MAX, "none").is_none());
    }

    #[test]
    fn joined_text_skips_empty_cells() {
        let mut g = TableGrid::new("T", 1, 3);
        g.set_cell(0, 0, None, "a");
        g.set_cell(0, 1, None, "  ");
        g.set_cell(0, 2, None, "b");
        let cells = [CellCoord::new(0, 0), CellCoord::new(0, 1), CellCoord::new(0, 2)];
        assert_eq!(g.joined_text(&cells).unwrap(), "a b");
        assert_eq!(g.row_section(0, "r").unwrap().text.as_deref(), Some("a b"));
        assert!(g.joined_text(&[CellCoord::new(1, 0)]).is_err());
    }

    #[test]
    fn cell_texts_rejects_outside_coordinates() {
        let g = grid();
        assert_eq!(
            g.cell_texts(&[CellCoord::new(0, 2)]).unwrap(),
            vec!["r0c2".to_string()]
        );
        assert!(matches!(
            g.cell_texts(&[CellCoord::new(2, 0)]),
            Err(SectionError::InvalidCell(_))
        ));
    }
}
