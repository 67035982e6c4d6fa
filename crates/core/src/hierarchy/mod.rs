//! Containment hierarchy: the generic builder, its rule sets, tree indices and
//! the arena tree holding a finished slide.

mod builder;
mod index;
mod rules;
mod tree;

pub use builder::{Hierarchy, build_hierarchy, resolve_parents};
pub use index::{TreeIndex, pad_index, segment_width};
pub use rules::{HierarchyRules, RectRules, SpatialRules, TableRules, TextRules};
pub use tree::{NodeId, SectionNode, SectionTree};
