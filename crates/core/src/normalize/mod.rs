//! Normalization of heterogeneous label records into one section tree.

mod merge;
mod session;
mod table;

pub use merge::{Normalizer, dedupe_by_identity};
pub use session::{
    GroupRecord, Session, ShapeLabel, ShapeRecord, SlideInfo, TableSectionKind,
    TableSectionRecord, TextSectionRecord,
};
pub use table::{Axis, GridCell, TableGrid};
