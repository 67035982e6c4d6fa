//! Arena-backed section tree.
//!
//! Nodes are only ever appended. Moving a node re-links it, removing a node
//! unlinks it from its parent (or the root list) so it is no longer reachable;
//! every traversal starts from the roots, so unreachable nodes never surface.

use std::cmp::Ordering;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use super::builder::Hierarchy;
use super::index::{TreeIndex, segment_width};
use crate::normalize::SlideInfo;
use crate::section::{ElementId, Identity, Section};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub struct SectionNode {
    pub section: Section,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) index: Option<TreeIndex>,
}

impl SectionNode {
    fn new(section: Section) -> Self {
        Self {
            section,
            parent: None,
            children: Vec::new(),
            index: None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Tree index, set by [`SectionTree::reindex`].
    pub fn index(&self) -> Option<&TreeIndex> {
        self.index.as_ref()
    }
}

/// The finished section hierarchy of one slide.
#[derive(Debug, Clone, Default)]
pub struct SectionTree {
    pub slide: SlideInfo,
    nodes: Vec<SectionNode>,
    roots: Vec<NodeId>,
}

impl SectionTree {
    pub fn new(slide: SlideInfo) -> Self {
        Self {
            slide,
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Builds a tree from sections and their hierarchy, indexed with `min_width`.
    pub fn from_hierarchy(
        slide: SlideInfo,
        sections: Vec<Section>,
        hierarchy: &Hierarchy,
        min_width: usize,
    ) -> Self {
        let mut tree = Self::new(slide);
        tree.graft(None, sections, hierarchy);
        tree.reindex(min_width);
        tree
    }

    pub fn get_node(&self, id: NodeId) -> &SectionNode {
        &self.nodes[id.0]
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Appends a node as the last child of `parent` (or the last root).
    pub fn push_node(&mut self, parent: Option<NodeId>, section: Section) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SectionNode::new(section));
        self.link(id, parent);
        id
    }

    /// Appends `sections` below `parent`, keeping the shape of `hierarchy`.
    ///
    /// The hierarchy roots become the last children of `parent` in their
    /// sibling order. Returns the new node of every section, by input position.
    pub fn graft(
        &mut self,
        parent: Option<NodeId>,
        sections: Vec<Section>,
        hierarchy: &Hierarchy,
    ) -> Vec<NodeId> {
        let base = self.nodes.len();
        let ids: Vec<NodeId> = (0..sections.len()).map(|i| NodeId(base + i)).collect();
        self.nodes.extend(sections.into_iter().map(SectionNode::new));

        for (i, &id) in ids.iter().enumerate() {
            self.nodes[id.0].children = hierarchy.children(i).iter().map(|&c| ids[c]).collect();
            self.nodes[id.0].parent = hierarchy.parent(i).map(|p| ids[p]);
        }
        for &r in hierarchy.roots() {
            self.link(ids[r], parent);
        }
        ids
    }

    /// Unlinks `id` (and with it its subtree) from the tree.
    pub fn detach(&mut self, id: NodeId) {
        match self.nodes[id.0].parent.take() {
            Some(p) => self.nodes[p.0].children.retain(|&c| c != id),
            None => self.roots.retain(|&r| r != id),
        }
    }

    fn link(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.nodes[id.0].parent = parent;
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.roots.push(id),
        }
    }

    /// Moves `id` to be the last child of `parent` (or the last root).
    pub fn move_node(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.detach(id);
        self.link(id, parent);
    }

    /// Copies the subtree rooted at `id` below `parent`, returning the copy.
    pub fn copy_subtree(&mut self, id: NodeId, parent: Option<NodeId>) -> NodeId {
        let copy = self.push_node(parent, self.nodes[id.0].section.clone());
        let children = self.nodes[id.0].children.clone();
        for child in children {
            self.copy_subtree(child, Some(copy));
        }
        copy
    }

    /// Stable-sorts the children of `id` by their sections.
    pub fn sort_children_by<F>(&mut self, id: NodeId, mut compare: F)
    where
        F: FnMut(&Section, &Section) -> Ordering,
    {
        let mut children = std::mem::take(&mut self.nodes[id.0].children);
        children.sort_by(|a, b| compare(&self.nodes[a.0].section, &self.nodes[b.0].section));
        self.nodes[id.0].children = children;
    }

    /// Reachable nodes in depth-first order, parents before children.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    /// Reachable nodes in depth-first order.
    pub fn iter(&self) -> impl Iterator<Item = &SectionNode> + '_ {
        self.preorder().into_iter().map(move |id| &self.nodes[id.0])
    }

    /// Number of reachable nodes.
    pub fn len(&self) -> usize {
        self.preorder().len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// First reachable section covering exactly the element `id`.
    pub fn find_singleton(&self, id: &str) -> Option<NodeId> {
        self.preorder().into_iter().find(|n| {
            self.nodes[n.0]
                .section
                .singleton_id()
                .is_some_and(|s| s.as_str() == id)
        })
    }

    /// Depth of a node; roots have depth 1.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 1;
        let mut cur = self.nodes[id.0].parent;
        while let Some(p) = cur {
            depth += 1;
            cur = self.nodes[p.0].parent;
        }
        depth
    }

    /// Assigns tree indices to every reachable node, clearing the rest.
    pub fn reindex(&mut self, min_width: usize) {
        for node in &mut self.nodes {
            node.index = None;
        }
        let width = segment_width(self.roots.len(), min_width);
        let mut stack = Vec::with_capacity(self.nodes.len());
        for (k, &r) in self.roots.iter().enumerate() {
            self.nodes[r.0].index = Some(TreeIndex::root(k as u32 + 1, width));
            stack.push(r);
        }
        while let Some(id) = stack.pop() {
            let Some(parent_index) = self.nodes[id.0].index.clone() else {
                continue;
            };
            let children = self.nodes[id.0].children.clone();
            let width = segment_width(children.len(), min_width);
            for (k, &c) in children.iter().enumerate() {
                self.nodes[c.0].index = Some(parent_index.child(k as u32 + 1, width));
                stack.push(c);
            }
        }
    }

    /// Drops root-level member sections whose every member already appears
    /// nested in another root's subtree, then reindexes with `min_width`.
    /// Returns how many roots were removed.
    pub fn trim_redundant_roots(&mut self, min_width: usize) -> usize {
        // member id -> roots under which it appears below the root level
        let mut nested: FxHashMap<ElementId, FxHashSet<NodeId>> = FxHashMap::default();
        for &root in &self.roots {
            let mut stack = self.nodes[root.0].children.clone();
            while let Some(id) = stack.pop() {
                if let Identity::Members(m) = &self.nodes[id.0].section.identity {
                    for member in m.iter() {
                        nested.entry(member.clone()).or_default().insert(root);
                    }
                }
                stack.extend(self.nodes[id.0].children.iter().copied());
            }
        }

        let redundant: Vec<NodeId> = self
            .roots
            .iter()
            .copied()
            .filter(|&root| match &self.nodes[root.0].section.identity {
                Identity::Members(m) => m.iter().all(|member| {
                    nested
                        .get(member)
                        .is_some_and(|owners| owners.iter().any(|&o| o != root))
                }),
                _ => false,
            })
            .collect();

        for &root in &redundant {
            debug!(label = %self.nodes[root.0].section.label, "trimming redundant root");
            self.detach(root);
        }
        if !redundant.is_empty() {
            self.reindex(min_width);
        }
        redundant.len()
    }
}
