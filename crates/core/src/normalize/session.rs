//! Records collected during one labeling pass over a slide.

use std::io::Read;

use serde::{Deserialize, Serialize};

use super::table::TableGrid;
use crate::error::Result;
use crate::section::{CellCoord, ElementId, SectionKind};
use crate::utils::Bounds;

/// Slide being labeled: its number in the deck and its size in slide units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideInfo {
    pub test_index: u32,
    pub width: f64,
    pub height: f64,
}

impl SlideInfo {
    pub fn new(test_index: u32, width: f64, height: f64) -> Self {
        Self {
            test_index,
            width,
            height,
        }
    }
}

/// A shape as reported by the shape source, in absolute slide units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    pub id: ElementId,
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_table: bool,
}

impl ShapeRecord {
    pub fn new(id: impl Into<ElementId>, left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top,
            left,
            width,
            height,
            text: String::new(),
            is_table: false,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn table(mut self) -> Self {
        self.is_table = true;
        self
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_origin_size(self.left, self.top, self.width, self.height)
    }
}

/// A manually selected group of shapes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    #[serde(default)]
    pub label: String,
    pub members: Vec<ElementId>,
    #[serde(default)]
    pub bounds: Option<Bounds>,
}

/// A label given to a single shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeLabel {
    pub shape_id: ElementId,
    pub label: String,
}

/// A labeled character range inside one shape's text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextSectionRecord {
    pub owner: ElementId,
    pub start_char: usize,
    pub end_char: usize,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Kind of a labeled table section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSectionKind {
    Row,
    Col,
    GroupOfRows,
    GroupOfCols,
}

impl TableSectionKind {
    pub fn section_kind(self) -> SectionKind {
        match self {
            TableSectionKind::Row => SectionKind::Row,
            TableSectionKind::Col => SectionKind::Col,
            TableSectionKind::GroupOfRows => SectionKind::GroupOfRows,
            TableSectionKind::GroupOfCols => SectionKind::GroupOfCols,
        }
    }
}

/// A labeled row, column or custom row/column range of a table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableSectionRecord {
    pub table: ElementId,
    pub cells: Vec<CellCoord>,
    #[serde(default)]
    pub label: String,
    #[serde(alias = "section_type")]
    pub kind: TableSectionKind,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub bounds: Option<Bounds>,
    /// Shapes the labeler marked as lying over this section.
    #[serde(default)]
    pub overlaid: Vec<ElementId>,
}

/// Everything one labeling pass collected for a slide.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub slide: SlideInfo,
    pub shapes: Vec<ShapeRecord>,
    pub groups: Vec<GroupRecord>,
    pub shape_labels: Vec<ShapeLabel>,
    pub text_sections: Vec<TextSectionRecord>,
    pub table_sections: Vec<TableSectionRecord>,
    pub tables: Vec<TableGrid>,
}

impl Session {
    pub fn new(slide: SlideInfo) -> Self {
        Self {
            slide,
            ..Self::default()
        }
    }

    /// Reads a session from its JSON form.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn push_shape(&mut self, shape: ShapeRecord) -> &mut Self {
        self.shapes.push(shape);
        self
    }

    pub fn push_group<I, S>(&mut self, label: impl Into<String>, members: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ElementId>,
    {
        self.groups.push(GroupRecord {
            label: label.into(),
            members: members.into_iter().map(Into::into).collect(),
            bounds: None,
        });
        self
    }

    pub fn push_shape_label(
        &mut self,
        shape_id: impl Into<ElementId>,
        label: impl Into<String>,
    ) -> &mut Self {
        self.shape_labels.push(ShapeLabel {
            shape_id: shape_id.into(),
            label: label.into(),
        });
        self
    }

    pub fn push_text_section(
        &mut self,
        owner: impl Into<ElementId>,
        start_char: usize,
        end_char: usize,
        label: impl Into<String>,
    ) -> &mut Self {
        self.text_sections.push(TextSectionRecord {
            owner: owner.into(),
            start_char,
            end_char,
            label: label.into(),
            text: None,
        });
        self
    }

    pub fn push_table_section(&mut self, record: TableSectionRecord) -> &mut Self {
        self.table_sections.push(record);
        self
    }

    pub fn push_table(&mut self, grid: TableGrid) -> &mut Self {
        self.tables.push(grid);
        self
    }

    pub fn shape(&self, id: &str) -> Option<&ShapeRecord> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn grid(&self, table: &str) -> Option<&TableGrid> {
        self.tables.iter().find(|t| t.table_id == table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_reads_minimal_json() {
        let json = r#"{
            "slide": {"test_index": 3, "width": 960.0, "height": 540.0},
            "shapes": [{"id": "4", "top": 10, "left": 20, "width": 100, "height": 50}],
            "table_sections": [
                {"table": "9", "cells": ["0.0", "0.1"], "section_type": "row"}
            ]
        }"#;
        let session = Session::from_reader(json.as_bytes()).unwrap();
        assert_eq!(session.slide.test_index, 3);
        assert_eq!(session.shapes[0].bounds(), Bounds::new(10.0, 20.0, 120.0, 60.0));
        assert!(session.groups.is_empty());
        let row = &session.table_sections[0];
        assert_eq!(row.kind, TableSectionKind::Row);
        assert_eq!(row.cells, vec![CellCoord::new(0, 0), CellCoord::new(0, 1)]);
    }

    #[test]
    fn bad_cell_coordinate_fails_to_load() {
        let json = r#"{"table_sections": [{"table": "9", "cells": ["x"], "kind": "col"}]}"#;
        assert!(Session::from_reader(json.as_bytes()).is_err());
    }
}
