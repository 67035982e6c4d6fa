//! Candidate sections returned by a layout-detection model.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SectionError};
use crate::hierarchy::{RectRules, TreeIndex, build_hierarchy};
use crate::normalize::SlideInfo;
use crate::utils::{Bounds, HasBounds};

/// One detected section. Coordinates are in the space the model was asked
/// to answer in, see [`CoordinateSpace`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedSection {
    #[serde(default)]
    pub label: String,
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateSpace {
    /// Fractions of the slide, 0 to 1.
    Relative,
    /// Pixels of a slide image of the given size.
    Pixels { width: f64, height: f64 },
}

impl DetectedSection {
    /// Bounds in slide units.
    pub fn bounds(&self, space: CoordinateSpace, slide: &SlideInfo) -> Bounds {
        let (sx, sy) = match space {
            CoordinateSpace::Relative => (slide.width, slide.height),
            CoordinateSpace::Pixels { width, height } => (
                if width > 0.0 { slide.width / width } else { 1.0 },
                if height > 0.0 { slide.height / height } else { 1.0 },
            ),
        };
        Bounds::new(
            self.y_min * sy,
            self.x_min * sx,
            self.x_max * sx,
            self.y_max * sy,
        )
    }
}

/// Parses raw model output into detected sections.
///
/// The payload is a JSON array of sections, optionally wrapped in a fenced
/// code block or in an object under a `"sections"` key.
pub fn parse_detector_response(text: &str) -> Result<Vec<DetectedSection>> {
    let body = strip_code_fence(text);
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| SectionError::DetectorResponse(format!("not JSON: {e}")))?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("sections") {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(SectionError::DetectorResponse(
                    "object without a \"sections\" array".to_string(),
                ));
            }
        },
        other => {
            return Err(SectionError::DetectorResponse(format!(
                "expected an array, found {other}"
            )));
        }
    };
    let sections: Vec<DetectedSection> =
        serde_json::from_value(serde_json::Value::Array(items))?;
    debug!(count = sections.len(), "parsed detector response");
    Ok(sections)
}

fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(start) = text.find("```") else {
        return text;
    };
    let after = &text[start + 3..];
    // Skip the info string ("json") up to the end of the fence line.
    let body = match after.find('\n') {
        Some(nl) => &after[nl + 1..],
        None => after,
    };
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// A detected section placed in the containment tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrangedSection {
    pub index: TreeIndex,
    pub bounds: Bounds,
    pub section: DetectedSection,
}

impl HasBounds for ArrangedSection {
    fn bounds(&self) -> Option<Bounds> {
        Some(self.bounds)
    }
}

/// Nests detected sections by geometric enclosure and numbers them in
/// depth-first order.
pub fn arrange_detected(
    sections: Vec<DetectedSection>,
    space: CoordinateSpace,
    slide: &SlideInfo,
    min_width: usize,
) -> Vec<ArrangedSection> {
    let rects: Vec<Bounds> = sections.iter().map(|s| s.bounds(space, slide)).collect();
    let hierarchy = build_hierarchy(&rects, &RectRules);
    let indices = hierarchy.indices(min_width);
    let mut slots: Vec<Option<DetectedSection>> = sections.into_iter().map(Some).collect();
    hierarchy
        .preorder()
        .into_iter()
        .filter_map(|i| {
            let section = slots[i].take()?;
            Some(ArrangedSection {
                index: indices[i].clone(),
                bounds: rects[i],
                section,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_payload_is_unwrapped() {
        let text = "Here you go:\n```json\n[{\"label\": \"Title\", \"x_min\": 0.1, \"y_min\": 0.05, \"x_max\": 0.9, \"y_max\": 0.2, \"confidence\": 0.93}]\n```\n";
        let sections = parse_detector_response(text).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].label, "Title");
        assert_eq!(sections[0].confidence, Some(0.93));
    }

    #[test]
    fn non_array_payload_is_rejected() {
        assert!(matches!(
            parse_detector_response("42"),
            Err(SectionError::DetectorResponse(_))
        ));
        assert!(matches!(
            parse_detector_response("no json here"),
            Err(SectionError::DetectorResponse(_))
        ));
    }

    #[test]
    fn pixel_space_scales_to_slide() {
        let slide = SlideInfo::new(1, 960.0, 540.0);
        let s = DetectedSection {
            label: String::new(),
            x_min: 100.0,
            y_min: 50.0,
            x_max: 300.0,
            y_max: 150.0,
            confidence: None,
        };
        let b = s.bounds(
            CoordinateSpace::Pixels {
                width: 1920.0,
                height: 1080.0,
            },
            &slide,
        );
        assert_eq!(b, Bounds::new(25.0, 50.0, 150.0, 75.0));
    }
}
