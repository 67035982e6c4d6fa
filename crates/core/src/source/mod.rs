//! Boundaries to the outside world: where shapes, labels and detected
//! sections come from, and the workflow tying them to the normalizer.

mod detector;

pub use detector::{
    ArrangedSection, CoordinateSpace, DetectedSection, arrange_detected, parse_detector_response,
};

use tracing::info;

use crate::error::Result;
use crate::hierarchy::SectionTree;
use crate::normalize::{
    GroupRecord, Normalizer, Session, ShapeLabel, ShapeRecord, SlideInfo, TableGrid,
    TableSectionRecord, TextSectionRecord,
};
use crate::params::NormalizeParams;

/// Reports the shapes of one slide.
pub trait ShapeSource {
    fn slide(&self) -> SlideInfo;

    fn shapes(&self) -> Result<Vec<ShapeRecord>>;

    /// Cell geometry and text of the slide's tables.
    fn tables(&self) -> Result<Vec<TableGrid>> {
        Ok(Vec::new())
    }
}

/// Labels gathered for one slide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedLabels {
    pub groups: Vec<GroupRecord>,
    pub shape_labels: Vec<ShapeLabel>,
    pub text_sections: Vec<TextSectionRecord>,
    pub table_sections: Vec<TableSectionRecord>,
}

/// Produces labels for the shapes of a slide, e.g. from a person.
pub trait LabelCollector {
    fn collect(
        &mut self,
        slide: &SlideInfo,
        shapes: &[ShapeRecord],
        tables: &[TableGrid],
    ) -> Result<CollectedLabels>;
}

/// Layout-detection service proposing sections for a slide.
pub trait SectionDetector {
    fn detect(&mut self, slide: &SlideInfo) -> Result<Vec<DetectedSection>>;
}

/// Reads a slide, collects its labels and normalizes them into a tree.
pub fn label_slide<S, C>(
    source: &S,
    collector: &mut C,
    params: &NormalizeParams,
) -> Result<SectionTree>
where
    S: ShapeSource + ?Sized,
    C: LabelCollector + ?Sized,
{
    let slide = source.slide();
    let shapes = source.shapes()?;
    let tables = source.tables()?;
    let labels = collector.collect(&slide, &shapes, &tables)?;
    info!(
        test_index = slide.test_index,
        shapes = shapes.len(),
        groups = labels.groups.len(),
        text_sections = labels.text_sections.len(),
        table_sections = labels.table_sections.len(),
        "labeling slide"
    );

    let session = Session {
        slide,
        shapes,
        groups: labels.groups,
        shape_labels: labels.shape_labels,
        text_sections: labels.text_sections,
        table_sections: labels.table_sections,
        tables,
    };
    Ok(Normalizer::new(params.clone()).run(&session))
}

impl ShapeSource for Session {
    fn slide(&self) -> SlideInfo {
        self.slide
    }

    fn shapes(&self) -> Result<Vec<ShapeRecord>> {
        Ok(self.shapes.clone())
    }

    fn tables(&self) -> Result<Vec<TableGrid>> {
        Ok(self.tables.clone())
    }
}

/// A recorded session replays its stored labels.
impl LabelCollector for Session {
    fn collect(
        &mut self,
        _slide: &SlideInfo,
        _shapes: &[ShapeRecord],
        _tables: &[TableGrid],
    ) -> Result<CollectedLabels> {
        Ok(CollectedLabels {
            groups: self.groups.clone(),
            shape_labels: self.shape_labels.clone(),
            text_sections: self.text_sections.clone(),
            table_sections: self.table_sections.clone(),
        })
    }
}
