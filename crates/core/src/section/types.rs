//! Section data model: identities, kinds and the `Section` record itself.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::{Result, SectionError};
use crate::utils::{Bounds, HasBounds};

/// Opaque identifier of a slide element (shape, table, cell, ...).
pub type ElementId = SmolStr;

/// Closed set of section types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    ShapeGroup,
    TextSection,
    Row,
    Col,
    GroupOfRows,
    GroupOfCols,
    IndividualShape,
    Table,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::ShapeGroup => "shape_group",
            SectionKind::TextSection => "text_section",
            SectionKind::Row => "row",
            SectionKind::Col => "col",
            SectionKind::GroupOfRows => "group_of_rows",
            SectionKind::GroupOfCols => "group_of_cols",
            SectionKind::IndividualShape => "individual_shape",
            SectionKind::Table => "table",
        }
    }

    /// Row, column or custom row/column group of a table.
    pub fn is_table_section(&self) -> bool {
        matches!(
            self,
            SectionKind::Row | SectionKind::Col | SectionKind::GroupOfRows | SectionKind::GroupOfCols
        )
    }

    /// A custom range of rows or columns.
    pub fn is_custom_group(&self) -> bool {
        matches!(self, SectionKind::GroupOfRows | SectionKind::GroupOfCols)
    }

    fn identity_name(&self) -> &'static str {
        match self {
            SectionKind::TextSection => "span",
            k if k.is_table_section() => "cells",
            _ => "members",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zero-based `(row, col)` coordinate of a table cell, written `"row.col"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl FromStr for SectionKind {
    type Err = SectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "shape_group" => Ok(SectionKind::ShapeGroup),
            "text_section" => Ok(SectionKind::TextSection),
            "row" => Ok(SectionKind::Row),
            "col" => Ok(SectionKind::Col),
            "group_of_rows" => Ok(SectionKind::GroupOfRows),
            "group_of_cols" => Ok(SectionKind::GroupOfCols),
            "individual_shape" => Ok(SectionKind::IndividualShape),
            "table" => Ok(SectionKind::Table),
            _ => Err(SectionError::malformed(
                "section",
                format!("unknown section type {s:?}"),
            )),
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.row, self.col)
    }
}

impl FromStr for CellCoord {
    type Err = SectionError;

    fn from_str(s: &str) -> Result<Self> {
        let (row, col) = s
            .trim()
            .split_once('.')
            .ok_or_else(|| SectionError::InvalidCell(s.to_string()))?;
        let row = row
            .parse::<u32>()
            .map_err(|_| SectionError::InvalidCell(s.to_string()))?;
        let col = col
            .parse::<u32>()
            .map_err(|_| SectionError::InvalidCell(s.to_string()))?;
        Ok(CellCoord { row, col })
    }
}

impl TryFrom<String> for CellCoord {
    type Error = SectionError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<CellCoord> for String {
    fn from(c: CellCoord) -> String {
        c.to_string()
    }
}

/// Element id of a table cell: `"<table_id>.<row>.<col>"`.
pub fn cell_element_id(table: &str, cell: CellCoord) -> ElementId {
    SmolStr::new(format!("{table}.{cell}"))
}

/// Non-empty, insertion-ordered set of member element ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberSet(IndexSet<ElementId>);

impl MemberSet {
    pub fn new<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<ElementId>,
    {
        let set: IndexSet<ElementId> = ids.into_iter().map(Into::into).collect();
        if set.is_empty() {
            return Err(SectionError::malformed("member", "empty member set"));
        }
        Ok(MemberSet(set))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn is_subset(&self, other: &MemberSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementId> {
        self.0.iter()
    }

    /// The only member, when the set has exactly one.
    pub fn as_singleton(&self) -> Option<&ElementId> {
        if self.0.len() == 1 { self.0.first() } else { None }
    }

    /// Order-independent key, equal for equal sets.
    pub fn canonical_key(&self) -> Vec<ElementId> {
        let mut key: Vec<ElementId> = self.0.iter().cloned().collect();
        key.sort();
        key
    }
}

/// Non-empty half-open character range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if end <= start {
            return Err(SectionError::malformed(
                "text_section",
                format!("empty character range [{start}, {end})"),
            ));
        }
        Ok(TextSpan { start, end })
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Non-empty, insertion-ordered set of table cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellSet(IndexSet<CellCoord>);

impl CellSet {
    pub fn new<I: IntoIterator<Item = CellCoord>>(cells: I) -> Result<Self> {
        let set: IndexSet<CellCoord> = cells.into_iter().collect();
        if set.is_empty() {
            return Err(SectionError::malformed("table", "empty cell list"));
        }
        Ok(CellSet(set))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_subset(&self, other: &CellSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CellCoord> {
        self.0.iter()
    }
}

/// What a section covers. The variant is fixed by the section kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Identity {
    /// Shapes, groups and tables: a set of member element ids.
    Members(MemberSet),
    /// Text sections: a character range inside one owning shape.
    Span { owner: ElementId, span: TextSpan },
    /// Table sections: a set of cells inside one owning table.
    Cells {
        table: ElementId,
        cells: CellSet,
        /// Shapes lying over the cells, counted as members of the section.
        overlaid: Vec<ElementId>,
    },
}

impl Identity {
    /// Cardinality used to pick the smallest enclosing section.
    pub fn cardinality(&self) -> usize {
        match self {
            Identity::Members(m) => m.len(),
            Identity::Span { span, .. } => span.len(),
            Identity::Cells {
                cells, overlaid, ..
            } => cells.len() + overlaid.len(),
        }
    }

    /// Element ids as exported in the `shape_id` column.
    pub fn element_ids(&self) -> Vec<ElementId> {
        match self {
            Identity::Members(m) => m.iter().cloned().collect(),
            Identity::Span { owner, .. } => vec![owner.clone()],
            Identity::Cells {
                table,
                cells,
                overlaid,
            } => cells
                .iter()
                .map(|c| cell_element_id(table, *c))
                .chain(overlaid.iter().cloned())
                .collect(),
        }
    }
}

/// A labeled region of a slide.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub identity: Identity,
    pub label: String,
    pub text: Option<String>,
    pub bounds: Option<Bounds>,
}

impl Section {
    /// Creates a member-set section (`shape_group`, `individual_shape`, `table`).
    pub fn with_members<I, S>(kind: SectionKind, members: I, label: impl Into<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<ElementId>,
    {
        check_kind(kind, "members")?;
        let members = MemberSet::new(members).map_err(|_| {
            SectionError::malformed(kind.as_str(), "empty member set")
        })?;
        Ok(Section {
            kind,
            identity: Identity::Members(members),
            label: label.into(),
            text: None,
            bounds: None,
        })
    }

    /// Creates a text section covering `[start, end)` of `owner`'s text.
    pub fn with_span(
        owner: impl Into<ElementId>,
        start: usize,
        end: usize,
        label: impl Into<String>,
    ) -> Result<Self> {
        let owner = owner.into();
        if owner.is_empty() {
            return Err(SectionError::malformed("text_section", "missing owner id"));
        }
        Ok(Section {
            kind: SectionKind::TextSection,
            identity: Identity::Span {
                owner,
                span: TextSpan::new(start, end)?,
            },
            label: label.into(),
            text: None,
            bounds: None,
        })
    }

    /// Creates a row, column or custom group section of `table`.
    pub fn with_cells<I>(
        kind: SectionKind,
        table: impl Into<ElementId>,
        cells: I,
        label: impl Into<String>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = CellCoord>,
    {
        check_kind(kind, "cells")?;
        let table = table.into();
        if table.is_empty() {
            return Err(SectionError::malformed(kind.as_str(), "missing table id"));
        }
        let cells = CellSet::new(cells)
            .map_err(|_| SectionError::malformed(kind.as_str(), "empty cell list"))?;
        Ok(Section {
            kind,
            identity: Identity::Cells {
                table,
                cells,
                overlaid: Vec::new(),
            },
            label: label.into(),
            text: None,
            bounds: None,
        })
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn maybe_bounds(mut self, bounds: Option<Bounds>) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn members(&self) -> Option<&MemberSet> {
        match &self.identity {
            Identity::Members(m) => Some(m),
            _ => None,
        }
    }

    pub fn span(&self) -> Option<TextSpan> {
        match &self.identity {
            Identity::Span { span, .. } => Some(*span),
            _ => None,
        }
    }

    pub fn cells(&self) -> Option<&CellSet> {
        match &self.identity {
            Identity::Cells { cells, .. } => Some(cells),
            _ => None,
        }
    }

    /// Shapes recorded as lying over this table section.
    pub fn overlaid(&self) -> &[ElementId] {
        match &self.identity {
            Identity::Cells { overlaid, .. } => overlaid,
            _ => &[],
        }
    }

    /// Adds an overlaid shape id to a table section; ignored for other kinds.
    pub fn add_overlaid(&mut self, id: ElementId) {
        if let Identity::Cells { overlaid, .. } = &mut self.identity {
            if !overlaid.contains(&id) {
                overlaid.push(id);
            }
        }
    }

    /// Owning shape (text sections) or table (table sections).
    pub fn owner(&self) -> Option<&ElementId> {
        match &self.identity {
            Identity::Members(_) => None,
            Identity::Span { owner, .. } => Some(owner),
            Identity::Cells { table, .. } => Some(table),
        }
    }

    pub fn cardinality(&self) -> usize {
        self.identity.cardinality()
    }

    /// The single member id of a shape or group covering exactly one element.
    pub fn singleton_id(&self) -> Option<&ElementId> {
        self.members().and_then(MemberSet::as_singleton)
    }

    /// A single shape that may lie over table rows and columns.
    pub fn is_overlay_candidate(&self) -> bool {
        matches!(
            self.kind,
            SectionKind::IndividualShape | SectionKind::ShapeGroup
        ) && self.singleton_id().is_some()
    }
}

impl HasBounds for Section {
    fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }
}

fn check_kind(kind: SectionKind, identity: &'static str) -> Result<()> {
    if kind.identity_name() == identity {
        Ok(())
    } else {
        Err(SectionError::malformed(
            kind.as_str(),
            format!("{kind} sections are identified by {}", kind.identity_name()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_coord_round_trips_through_string() {
        let c: CellCoord = "3.12".parse().unwrap();
        assert_eq!(c, CellCoord::new(3, 12));
        assert_eq!(c.to_string(), "3.12");
        assert!("3".parse::<CellCoord>().is_err());
        assert!("a.b".parse::<CellCoord>().is_err());
    }

    #[test]
    fn section_kind_parses_its_own_names() {
        for kind in [SectionKind::ShapeGroup, SectionKind::GroupOfCols, SectionKind::Table] {
            assert_eq!(kind.as_str().parse::<SectionKind>().unwrap(), kind);
        }
        assert!(matches!(
            "column".parse::<SectionKind>(),
            Err(SectionError::MalformedSection { .. })
        ));
    }

    #[test]
    fn empty_identities_are_rejected() {
        let empty: Vec<&str> = Vec::new();
        assert!(Section::with_members(SectionKind::ShapeGroup, empty, "g").is_err());
        assert!(Section::with_span("7", 4, 4, "t").is_err());
        assert!(Section::with_span("7", 5, 4, "t").is_err());
        assert!(Section::with_span("", 0, 4, "t").is_err());
        assert!(Section::with_cells(SectionKind::Row, "9", Vec::new(), "r").is_err());
    }

    #[test]
    fn kind_must_match_identity() {
        assert!(Section::with_members(SectionKind::Row, ["1"], "x").is_err());
        assert!(
            Section::with_cells(SectionKind::ShapeGroup, "9", [CellCoord::new(0, 0)], "x")
                .is_err()
        );
    }

    #[test]
    fn member_sets_compare_as_sets() {
        let a = MemberSet::new(["1", "2"]).unwrap();
        let b = MemberSet::new(["2", "1"]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.canonical_key(), b.canonical_key());
    }

    #[test]
    fn table_section_element_ids_include_overlaid() {
        let mut s = Section::with_cells(
            SectionKind::Row,
            "9",
            [CellCoord::new(1, 0), CellCoord::new(1, 1)],
            "r",
        )
        .unwrap();
        s.add_overlaid("42".into());
        s.add_overlaid("42".into());
        assert_eq!(s.cardinality(), 3);
        let ids: Vec<String> = s.identity.element_ids().iter().map(|i| i.to_string()).collect();
        assert_eq!(ids, vec!["9.1.0", "9.1.1", "42"]);
    }
}
