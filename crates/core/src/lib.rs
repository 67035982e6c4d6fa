//! sectree - containment hierarchies for labeled presentation-slide sections.
//!
//! Sections (textboxes, tables, pictures, groups, table rows/columns and text
//! spans) arrive as a flat collection from a shape source and a label
//! collector. This crate normalizes them into one list, rebuilds the strict
//! containment tree, assigns dotted tree indices and exports the result as a
//! flat table or a nested tree for training-set compilation.

pub mod error;
pub mod export;
pub mod hierarchy;
pub mod normalize;
pub mod params;
pub mod section;
pub mod source;
pub mod utils;

pub use error::{Result, SectionError};
pub use export::{CsvExporter, ExportRow, TreeNode, export_rows, to_csv_string};
pub use hierarchy::{Hierarchy, SectionTree, TreeIndex, build_hierarchy};
pub use normalize::{Normalizer, Session, SlideInfo};
pub use params::NormalizeParams;
pub use section::{CellCoord, ElementId, Identity, Section, SectionKind};
pub use source::{LabelCollector, SectionDetector, ShapeSource, label_slide};
pub use utils::Bounds;
