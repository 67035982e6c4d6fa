//! Flat table export of a section tree.
//!
//! One row per reachable section, sorted by tree index. Text-valued columns
//! (`label`, `shape_id`, `cells`, `text`) are written quoted with inner quotes
//! doubled; list columns hold a JSON array; geometry is rounded to two
//! decimals. The output is plain RFC 4180 CSV and reads back with
//! [`read_rows`].

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SectionError};
use crate::hierarchy::{SectionNode, SectionTree};
use crate::section::{CellCoord, ElementId, SectionKind};
use crate::utils::round_to;

/// Export columns, in order.
pub const COLUMNS: [&str; 17] = [
    "test_index",
    "index",
    "label",
    "shape_id",
    "section_type",
    "start_char",
    "end_char",
    "cells",
    "text",
    "top",
    "left",
    "right",
    "bottom",
    "width",
    "height",
    "slide_height",
    "slide_width",
];

/// One exported section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub test_index: u32,
    pub index: String,
    pub label: String,
    pub shape_id: Vec<ElementId>,
    pub section_type: SectionKind,
    pub start_char: Option<usize>,
    pub end_char: Option<usize>,
    pub cells: Option<Vec<CellCoord>>,
    pub text: Option<String>,
    pub top: Option<f64>,
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub slide_height: f64,
    pub slide_width: f64,
}

impl ExportRow {
    /// Row for an indexed node; `None` for nodes not reachable from a root.
    pub fn from_node(node: &SectionNode, tree: &SectionTree) -> Option<Self> {
        let index = node.index()?;
        let section = &node.section;
        let span = section.span();
        let bounds = section.bounds;
        Some(ExportRow {
            test_index: tree.slide.test_index,
            index: index.to_string(),
            label: section.label.clone(),
            shape_id: section.identity.element_ids(),
            section_type: section.kind,
            start_char: span.map(|s| s.start),
            end_char: span.map(|s| s.end),
            cells: section.cells().map(|c| c.iter().copied().collect()),
            text: section.text.clone(),
            top: bounds.map(|b| round_to(b.top, 2)),
            left: bounds.map(|b| round_to(b.left, 2)),
            right: bounds.map(|b| round_to(b.right, 2)),
            bottom: bounds.map(|b| round_to(b.bottom, 2)),
            width: bounds.map(|b| round_to(b.width(), 2)),
            height: bounds.map(|b| round_to(b.height(), 2)),
            slide_height: tree.slide.height,
            slide_width: tree.slide.width,
        })
    }

    /// The row as written to CSV, one string per column.
    pub fn to_record(&self) -> Vec<String> {
        let ids: Vec<&str> = self.shape_id.iter().map(|s| s.as_str()).collect();
        vec![
            self.test_index.to_string(),
            self.index.clone(),
            quote(&self.label),
            quote(&json_list(&ids)),
            self.section_type.to_string(),
            opt_to_string(self.start_char),
            opt_to_string(self.end_char),
            self.cells
                .as_ref()
                .map(|cells| {
                    let cells: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
                    let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
                    quote(&json_list(&cells))
                })
                .unwrap_or_default(),
            self.text.as_deref().map(quote).unwrap_or_default(),
            opt_number(self.top),
            opt_number(self.left),
            opt_number(self.right),
            opt_number(self.bottom),
            opt_number(self.width),
            opt_number(self.height),
            number(self.slide_height),
            number(self.slide_width),
        ]
    }

    fn from_record(record: &csv::StringRecord, columns: &[usize; 17]) -> Result<Self> {
        let field = |i: usize| record.get(columns[i]).unwrap_or("").trim();
        let parse_err = |column: &str, value: &str| {
            SectionError::malformed("export_row", format!("bad {column} value {value:?}"))
        };
        let opt_f64 = |i: usize| -> Result<Option<f64>> {
            let v = field(i);
            if v.is_empty() {
                return Ok(None);
            }
            v.parse().map(Some).map_err(|_| parse_err(COLUMNS[i], v))
        };
        let opt_usize = |i: usize| -> Result<Option<usize>> {
            let v = field(i);
            if v.is_empty() {
                return Ok(None);
            }
            v.parse().map(Some).map_err(|_| parse_err(COLUMNS[i], v))
        };

        let kind = field(4);
        let section_type = kind
            .parse::<SectionKind>()
            .map_err(|_| parse_err("section_type", kind))?;
        let shape_id: Vec<ElementId> = match field(3) {
            "" => Vec::new(),
            v => serde_json::from_str(v)?,
        };
        let cells: Option<Vec<CellCoord>> = match field(7) {
            "" => None,
            v => Some(serde_json::from_str(v)?),
        };
        let text = match record.get(columns[8]) {
            Some("") | None => None,
            Some(t) => Some(t.to_string()),
        };

        Ok(ExportRow {
            test_index: field(0).parse().map_err(|_| parse_err("test_index", field(0)))?,
            index: field(1).to_string(),
            label: record.get(columns[2]).unwrap_or("").to_string(),
            shape_id,
            section_type,
            start_char: opt_usize(5)?,
            end_char: opt_usize(6)?,
            cells,
            text,
            top: opt_f64(9)?,
            left: opt_f64(10)?,
            right: opt_f64(11)?,
            bottom: opt_f64(12)?,
            width: opt_f64(13)?,
            height: opt_f64(14)?,
            slide_height: opt_f64(15)?.unwrap_or(0.0),
            slide_width: opt_f64(16)?.unwrap_or(0.0),
        })
    }
}

/// Rows of every reachable section, sorted by index string.
pub fn export_rows(tree: &SectionTree) -> Vec<ExportRow> {
    let mut rows: Vec<ExportRow> = tree
        .iter()
        .filter_map(|node| ExportRow::from_node(node, tree))
        .collect();
    rows.sort_by(|a, b| a.index.cmp(&b.index));
    rows
}

/// Writes export rows as CSV.
pub struct CsvExporter<W: Write> {
    writer: csv::Writer<W>,
    header_written: bool,
}

impl<W: Write> CsvExporter<W> {
    pub fn new(out: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(out);
        Self {
            writer,
            header_written: false,
        }
    }

    pub fn write_row(&mut self, row: &ExportRow) -> Result<()> {
        if !self.header_written {
            self.writer.write_record(COLUMNS)?;
            self.header_written = true;
        }
        self.writer.write_record(row.to_record())?;
        Ok(())
    }

    pub fn write_tree(&mut self, tree: &SectionTree) -> Result<()> {
        for row in export_rows(tree) {
            self.write_row(&row)?;
        }
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        if !self.header_written {
            self.writer.write_record(COLUMNS)?;
        }
        self.writer
            .into_inner()
            .map_err(|e| {
                let err = e.error();
                SectionError::Io(std::io::Error::new(err.kind(), err.to_string()))
            })
    }
}

/// The CSV export of `tree` as a string.
pub fn to_csv_string(tree: &SectionTree) -> Result<String> {
    let mut exporter = CsvExporter::new(Vec::new());
    exporter.write_tree(tree)?;
    let bytes = exporter.finish()?;
    String::from_utf8(bytes).map_err(|e| SectionError::Io(std::io::Error::other(e)))
}

/// Reads rows written by [`CsvExporter`]. Columns are matched by header name;
/// missing columns read as empty.
pub fn read_rows<R: Read>(input: R) -> Result<Vec<ExportRow>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader.headers()?.clone();
    let mut columns = [usize::MAX; 17];
    for (i, name) in COLUMNS.iter().enumerate() {
        if let Some(pos) = headers.iter().position(|h| h.trim() == *name) {
            columns[i] = pos;
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(ExportRow::from_record(&record?, &columns)?);
    }
    Ok(rows)
}

/// Wraps `s` in quotes, doubling inner quotes.
fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// JSON array of strings with `", "` separators.
fn json_list(items: &[&str]) -> String {
    let parts: Vec<String> = items
        .iter()
        .map(|s| serde_json::Value::from(*s).to_string())
        .collect();
    format!("[{}]", parts.join(", "))
}

/// Decimal form that always carries a fractional part (`100.0`, `12.35`).
fn number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

fn opt_number(v: Option<f64>) -> String {
    v.map(number).unwrap_or_default()
}

fn opt_to_string<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}
