//! Containment rules plugged into the generic hierarchy builder.
//!
//! Each rule set decides three things for a pair of items: whether one
//! strictly contains the other, how big an item is (the smallest container
//! wins), and in which order siblings are numbered.

use std::cmp::Ordering;
use std::fmt::Debug;

use ordered_float::OrderedFloat;

use crate::section::{Identity, Section, section_contains};
use crate::utils::{HasBounds, reading_order};

/// Strategy consumed by [`build_hierarchy`](super::build_hierarchy).
pub trait HierarchyRules<T> {
    /// Size measure used to pick the smallest enclosing candidate.
    type Size: Ord + Copy + Debug;

    /// Strict containment: never true for equal identities.
    fn contains(&self, parent: &T, child: &T) -> bool;

    fn size(&self, item: &T) -> Self::Size;

    /// Numbering order of two siblings. Ties fall back to input order.
    fn sibling_order(&self, a: &T, b: &T) -> Ordering;
}

/// Shapes and groups: member-set containment, siblings in reading order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpatialRules;

impl HierarchyRules<Section> for SpatialRules {
    type Size = usize;

    fn contains(&self, parent: &Section, child: &Section) -> bool {
        matches!(parent.identity, Identity::Members(_)) && section_contains(parent, child)
    }

    fn size(&self, item: &Section) -> usize {
        item.cardinality()
    }

    fn sibling_order(&self, a: &Section, b: &Section) -> Ordering {
        reading_order(a, b)
    }
}

/// Text sections of one shape: range containment, siblings by start then
/// longest first so an outer range precedes the ranges it encloses.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRules;

impl HierarchyRules<Section> for TextRules {
    type Size = usize;

    fn contains(&self, parent: &Section, child: &Section) -> bool {
        matches!(parent.identity, Identity::Span { .. }) && section_contains(parent, child)
    }

    fn size(&self, item: &Section) -> usize {
        item.cardinality()
    }

    fn sibling_order(&self, a: &Section, b: &Section) -> Ordering {
        match (a.span(), b.span()) {
            (Some(sa), Some(sb)) => sa
                .start
                .cmp(&sb.start)
                .then_with(|| sb.end.cmp(&sa.end)),
            _ => Ordering::Equal,
        }
    }
}

/// Rows, columns and custom groups of one table: cell-set containment,
/// siblings in insertion order (largest sections first, then creation order).
#[derive(Debug, Clone, Copy, Default)]
pub struct TableRules;

impl HierarchyRules<Section> for TableRules {
    type Size = usize;

    fn contains(&self, parent: &Section, child: &Section) -> bool {
        matches!(parent.identity, Identity::Cells { .. }) && section_contains(parent, child)
    }

    fn size(&self, item: &Section) -> usize {
        item.cells().map_or(0, |c| c.len())
    }

    fn sibling_order(&self, a: &Section, b: &Section) -> Ordering {
        self.size(b).cmp(&self.size(a))
    }
}

/// Free-standing rectangles (detector output): strict geometric enclosure,
/// size by area, siblings in reading order. Items without bounds stay roots.
#[derive(Debug, Clone, Copy, Default)]
pub struct RectRules;

impl<T: HasBounds> HierarchyRules<T> for RectRules {
    type Size = OrderedFloat<f64>;

    fn contains(&self, parent: &T, child: &T) -> bool {
        match (parent.bounds(), child.bounds()) {
            (Some(p), Some(c)) => p.strictly_encloses(&c),
            _ => false,
        }
    }

    fn size(&self, item: &T) -> OrderedFloat<f64> {
        OrderedFloat(item.bounds().map_or(0.0, |b| b.area()))
    }

    fn sibling_order(&self, a: &T, b: &T) -> Ordering {
        reading_order(a, b)
    }
}
