//! Geometry helpers shared by sections, table grids and detector output.
//!
//! Slide coordinates use a top-left origin with y growing downwards, which is
//! how presentation applications report shape positions. A shape reported as
//! `(left, top, width, height)` covers `(left, top, left + width, top + height)`.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Rounds `v` to `places` decimal places.
#[inline]
pub fn round_to(v: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (v * factor).round() / factor
}

/// An axis-aligned rectangle in slide units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Bounds {
    pub fn new(top: f64, left: f64, right: f64, bottom: f64) -> Self {
        Self {
            top,
            left,
            right,
            bottom,
        }
    }

    /// Builds bounds from an origin plus size, as reported by a shape source.
    pub fn from_origin_size(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            right: left + width,
            bottom: top + height,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            top: self.top.min(other.top),
            left: self.left.min(other.left),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Union of every rectangle in `iter`, or `None` when it is empty.
    pub fn union_all<'a, I>(iter: I) -> Option<Bounds>
    where
        I: IntoIterator<Item = &'a Bounds>,
    {
        iter.into_iter()
            .fold(None, |acc: Option<Bounds>, b| match acc {
                Some(a) => Some(a.union(b)),
                None => Some(*b),
            })
    }

    /// Grows the rectangle by `amount` on every side.
    pub fn expand(&self, amount: f64) -> Bounds {
        Bounds {
            top: self.top - amount,
            left: self.left - amount,
            right: self.right + amount,
            bottom: self.bottom + amount,
        }
    }

    /// True when `other` lies entirely inside `self` (edges may touch).
    pub fn encloses(&self, other: &Bounds) -> bool {
        other.top >= self.top
            && other.left >= self.left
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// True when `self` encloses `other` and the two rectangles differ.
    pub fn strictly_encloses(&self, other: &Bounds) -> bool {
        self.encloses(other) && self != other
    }
}

/// Trait for records that may carry a bounding rectangle.
pub trait HasBounds {
    fn bounds(&self) -> Option<Bounds>;

    /// Reading position `(top, left)`; records without bounds sort first.
    fn position(&self) -> (OrderedFloat<f64>, OrderedFloat<f64>) {
        match self.bounds() {
            Some(b) => (OrderedFloat(b.top), OrderedFloat(b.left)),
            None => (OrderedFloat(0.0), OrderedFloat(0.0)),
        }
    }
}

impl HasBounds for Bounds {
    fn bounds(&self) -> Option<Bounds> {
        Some(*self)
    }
}

/// Orders two records top-to-bottom, then left-to-right.
pub fn reading_order<A: HasBounds, B: HasBounds>(a: &A, b: &B) -> Ordering {
    a.position().cmp(&b.position())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_all_covers_every_rect() {
        let rects = [
            Bounds::new(10.0, 10.0, 20.0, 20.0),
            Bounds::new(5.0, 15.0, 40.0, 12.0),
        ];
        let u = Bounds::union_all(rects.iter()).unwrap();
        assert_eq!(u, Bounds::new(5.0, 10.0, 40.0, 20.0));
        assert!(Bounds::union_all(std::iter::empty()).is_none());
    }

    #[test]
    fn strict_enclosure_rejects_equal_rects() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.encloses(&a));
        assert!(!a.strictly_encloses(&a));
        assert!(a.strictly_encloses(&Bounds::new(1.0, 1.0, 9.0, 9.0)));
        assert!(!Bounds::new(1.0, 1.0, 9.0, 9.0).strictly_encloses(&a));
    }

    #[test]
    fn expand_grows_every_side() {
        let a = Bounds::new(10.0, 10.0, 20.0, 20.0).expand(5.0);
        assert_eq!(a, Bounds::new(5.0, 5.0, 25.0, 25.0));
    }

    #[test]
    fn round_to_two_places() {
        assert_eq!(round_to(12.3456, 2), 12.35);
        assert_eq!(round_to(-0.004, 2), -0.0);
    }
}
