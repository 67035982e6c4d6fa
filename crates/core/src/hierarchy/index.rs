//! Dotted, zero-padded tree indices such as `"01.03.02"`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, SectionError};
use crate::params::DEFAULT_INDEX_WIDTH;

/// Position of a node in a section tree.
///
/// Equality, hashing and ordering use the numeric segments, so `"1.2"` and
/// `"01.02"` are the same index. The rendered string keeps the padding the
/// index was created with.
#[derive(Clone, Debug)]
pub struct TreeIndex {
    segments: Vec<u32>,
    rendered: String,
}

impl TreeIndex {
    /// Index of the `ordinal`-th (1-based) root.
    pub fn root(ordinal: u32, width: usize) -> Self {
        Self {
            segments: vec![ordinal],
            rendered: format!("{ordinal:0width$}"),
        }
    }

    /// Index of the `ordinal`-th (1-based) child of `self`.
    pub fn child(&self, ordinal: u32, width: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(ordinal);
        Self {
            segments,
            rendered: format!("{}.{ordinal:0width$}", self.rendered),
        }
    }

    /// Parses a dotted index, padding each segment to two digits.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SectionError::InvalidIndex(s.to_string()));
        }
        let mut segments = Vec::new();
        for part in s.split('.') {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(SectionError::InvalidIndex(s.to_string()));
            }
            let value: u32 = part
                .parse()
                .map_err(|_| SectionError::InvalidIndex(s.to_string()))?;
            if value == 0 {
                return Err(SectionError::InvalidIndex(s.to_string()));
            }
            segments.push(value);
        }
        Ok(Self {
            segments,
            rendered: pad_index(s, DEFAULT_INDEX_WIDTH),
        })
    }

    pub fn segments(&self) -> &[u32] {
        &self.segments
    }

    /// Number of segments; roots have depth 1.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// The index with its last segment removed, `None` for roots.
    pub fn parent(&self) -> Option<TreeIndex> {
        if self.segments.len() < 2 {
            return None;
        }
        let cut = self.rendered.rfind('.')?;
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
            rendered: self.rendered[..cut].to_string(),
        })
    }

    pub fn is_child_of(&self, other: &TreeIndex) -> bool {
        self.segments.len() == other.segments.len() + 1
            && self.segments.starts_with(&other.segments)
    }

    /// Unpadded form of the first `depth` segments, e.g. `"1.2"`.
    pub fn numeric_path(&self, depth: usize) -> String {
        let depth = depth.min(self.segments.len());
        let parts: Vec<String> = self.segments[..depth].iter().map(|s| s.to_string()).collect();
        parts.join(".")
    }
}

/// Digits needed for a sibling group of `count` members, at least `min_width`.
pub fn segment_width(count: usize, min_width: usize) -> usize {
    let digits = count.max(1).to_string().len();
    digits.max(min_width)
}

/// Zero-pads every run of digits in `s` to at least `width` characters.
pub fn pad_index(s: &str, width: usize) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut run = String::new();
    for ch in s.chars() {
        if ch.is_ascii_digit() {
            run.push(ch);
            continue;
        }
        if !run.is_empty() {
            out.push_str(&format!("{run:0>width$}"));
            run.clear();
        }
        out.push(ch);
    }
    if !run.is_empty() {
        out.push_str(&format!("{run:0>width$}"));
    }
    out
}

impl PartialEq for TreeIndex {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for TreeIndex {}

impl Hash for TreeIndex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.segments.hash(state);
    }
}

impl PartialOrd for TreeIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments.cmp(&other.segments)
    }
}

impl fmt::Display for TreeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl FromStr for TreeIndex {
    type Err = SectionError;

    fn from_str(s: &str) -> Result<Self> {
        TreeIndex::parse(s)
    }
}

impl Serialize for TreeIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.rendered)
    }
}

impl<'de> Deserialize<'de> for TreeIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TreeIndex::parse(&s).map_err(serde::de::Error::custom)
    }
}
