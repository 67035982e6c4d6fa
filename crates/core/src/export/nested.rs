//! Conversion between dotted flat indices and the nested `{label, sections}` tree.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::hierarchy::{TreeIndex, segment_width};

/// A node of the nested tree representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub label: String,
    #[serde(default)]
    pub sections: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sections: Vec::new(),
        }
    }
}

/// A flat `(index, label)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatEntry {
    pub index: TreeIndex,
    pub label: String,
}

impl FlatEntry {
    pub fn new(index: TreeIndex, label: impl Into<String>) -> Self {
        Self {
            index,
            label: label.into(),
        }
    }
}

/// Builds the nested tree from indexed entries.
///
/// Entries are ordered numerically segment by segment. An index whose
/// ancestors are missing gets placeholder ancestors labeled
/// `"Section <path>"`; a repeated index keeps its first entry.
pub fn tree_from_rows(entries: &[FlatEntry]) -> Vec<TreeNode> {
    let mut sorted: Vec<&FlatEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.index.cmp(&b.index));

    // path -> (label, children paths)
    let mut nodes: IndexMap<Vec<u32>, (String, Vec<Vec<u32>>)> = IndexMap::new();
    let mut roots: Vec<Vec<u32>> = Vec::new();
    for entry in sorted {
        let segments = entry.index.segments();
        for depth in 1..=segments.len() {
            let path = segments[..depth].to_vec();
            if nodes.contains_key(&path) {
                continue;
            }
            let label = if depth == segments.len() {
                entry.label.clone()
            } else {
                format!("Section {}", entry.index.numeric_path(depth))
            };
            if depth == 1 {
                roots.push(path.clone());
            } else if let Some(parent) = nodes.get_mut(&segments[..depth - 1]) {
                parent.1.push(path.clone());
            }
            nodes.insert(path, (label, Vec::new()));
        }
    }

    fn assemble(path: &[u32], nodes: &IndexMap<Vec<u32>, (String, Vec<Vec<u32>>)>) -> TreeNode {
        let Some((label, children)) = nodes.get(path) else {
            return TreeNode::new(String::new());
        };
        TreeNode {
            label: label.clone(),
            sections: children.iter().map(|c| assemble(c, nodes)).collect(),
        }
    }
    roots.iter().map(|r| assemble(r, &nodes)).collect()
}

/// Flattens a nested tree into depth-first entries with padded indices.
pub fn flatten_tree(tree: &[TreeNode], min_width: usize) -> Vec<FlatEntry> {
    fn walk(
        nodes: &[TreeNode],
        parent: Option<&TreeIndex>,
        min_width: usize,
        out: &mut Vec<FlatEntry>,
    ) {
        let width = segment_width(nodes.len(), min_width);
        for (k, node) in nodes.iter().enumerate() {
            let ordinal = k as u32 + 1;
            let index = match parent {
                Some(p) => p.child(ordinal, width),
                None => TreeIndex::root(ordinal, width),
            };
            out.push(FlatEntry::new(index.clone(), node.label.clone()));
            walk(&node.sections, Some(&index), min_width, out);
        }
    }

    let mut out = Vec::new();
    walk(tree, None, min_width, &mut out);
    out
}

/// Parent position of every index, by position in `indices`.
///
/// The parent is the nearest listed ancestor; indices with no listed
/// ancestor are roots.
pub fn parents_from_indices(indices: &[TreeIndex]) -> Vec<Option<usize>> {
    let positions: FxHashMap<&[u32], usize> = indices
        .iter()
        .enumerate()
        .map(|(i, idx)| (idx.segments(), i))
        .collect();
    indices
        .iter()
        .map(|idx| {
            let segments = idx.segments();
            (1..segments.len())
                .rev()
                .find_map(|depth| positions.get(&segments[..depth]).copied())
        })
        .collect()
}
