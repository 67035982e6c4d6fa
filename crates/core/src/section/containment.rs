//! Strict containment predicates for the three identity domains.
//!
//! Every predicate is irreflexive: two sections with the same identity never
//! contain each other. Empty identities cannot be constructed, so no predicate
//! ever treats an empty set or range as "contains everything".

use super::types::{CellSet, Identity, MemberSet, Section, TextSpan};

/// `child ⊂ parent` for member-id sets.
pub fn members_contain(parent: &MemberSet, child: &MemberSet) -> bool {
    child.len() < parent.len() && child.is_subset(parent)
}

/// `parent` covers `child` and the two ranges differ.
pub fn spans_contain(parent: &TextSpan, child: &TextSpan) -> bool {
    parent.start <= child.start
        && parent.end >= child.end
        && !(parent.start == child.start && parent.end == child.end)
}

/// `child ⊂ parent` for cell sets.
pub fn cells_contain(parent: &CellSet, child: &CellSet) -> bool {
    child.len() < parent.len() && child.is_subset(parent)
}

/// Containment between two sections of the same identity kind and scope.
///
/// Sections of different identity kinds, text sections of different owning
/// shapes and table sections of different tables are never comparable.
pub fn section_contains(parent: &Section, child: &Section) -> bool {
    match (&parent.identity, &child.identity) {
        (Identity::Members(p), Identity::Members(c)) => members_contain(p, c),
        (
            Identity::Span {
                owner: po,
                span: ps,
            },
            Identity::Span {
                owner: co,
                span: cs,
            },
        ) => po == co && spans_contain(ps, cs),
        (
            Identity::Cells {
                table: pt,
                cells: pc,
                ..
            },
            Identity::Cells {
                table: ct,
                cells: cc,
                ..
            },
        ) => pt == ct && cells_contain(pc, cc),
        _ => false,
    }
}
