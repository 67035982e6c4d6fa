//! Sections and the containment predicates that relate them.
//!
//! A section is identified by exactly one of:
//! - a set of member element ids (shapes, groups, tables)
//! - a character range inside an owning shape (text sections)
//! - a set of cells inside an owning table (rows, columns, custom groups)

mod containment;
mod types;

pub use containment::{cells_contain, members_contain, section_contains, spans_contain};
pub use types::{
    CellCoord, CellSet, ElementId, Identity, MemberSet, Section, SectionKind, TextSpan,
    cell_element_id,
};
