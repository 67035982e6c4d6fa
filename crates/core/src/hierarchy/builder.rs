//! Generic containment hierarchy builder.
//!
//! Given a flat list of comparable items and a rule set, the builder finds for
//! every item its smallest strict container, groups items under their parents,
//! orders each sibling group and numbers the tree depth-first.

use tracing::{trace, warn};

use super::index::{TreeIndex, segment_width};
use super::rules::HierarchyRules;

/// Parent/child structure over a flat item list, addressed by input position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl Hierarchy {
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Parent position of item `i`, `None` for roots.
    pub fn parent(&self, i: usize) -> Option<usize> {
        self.parents.get(i).copied().flatten()
    }

    pub fn parents(&self) -> &[Option<usize>] {
        &self.parents
    }

    /// Ordered children of item `i`.
    pub fn children(&self, i: usize) -> &[usize] {
        self.children.get(i).map_or(&[], Vec::as_slice)
    }

    /// Ordered root items.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Items in depth-first order (parents before children).
    pub fn preorder(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(i) = stack.pop() {
            out.push(i);
            stack.extend(self.children[i].iter().rev().copied());
        }
        out
    }

    /// Dotted index of every item, by input position.
    ///
    /// Each sibling group is padded to at least `min_width` digits, more when
    /// the group has too many members to fit.
    pub fn indices(&self, min_width: usize) -> Vec<TreeIndex> {
        let mut out: Vec<Option<TreeIndex>> = vec![None; self.len()];
        let width = segment_width(self.roots.len(), min_width);
        let mut stack = Vec::with_capacity(self.len());
        for (k, &r) in self.roots.iter().enumerate() {
            out[r] = Some(TreeIndex::root(k as u32 + 1, width));
            stack.push(r);
        }
        while let Some(i) = stack.pop() {
            let Some(parent_index) = out[i].clone() else {
                continue;
            };
            let kids = &self.children[i];
            let width = segment_width(kids.len(), min_width);
            for (k, &c) in kids.iter().enumerate() {
                out[c] = Some(parent_index.child(k as u32 + 1, width));
                stack.push(c);
            }
        }
        // Strict containment is acyclic, so every item is reachable from a root.
        out.into_iter()
            .map(|idx| idx.unwrap_or_else(|| TreeIndex::root(0, min_width)))
            .collect()
    }
}

/// Finds the smallest strict container of every item.
///
/// Equal-sized candidates are resolved in favour of the earliest input
/// position; the tie is logged since the choice is arbitrary.
pub fn resolve_parents<T, R>(items: &[T], rules: &R) -> Vec<Option<usize>>
where
    R: HierarchyRules<T>,
{
    let mut parents = Vec::with_capacity(items.len());
    for (i, child) in items.iter().enumerate() {
        let mut best: Option<(R::Size, usize)> = None;
        let mut tied: Vec<usize> = Vec::new();
        for (j, candidate) in items.iter().enumerate() {
            if i == j || !rules.contains(candidate, child) {
                continue;
            }
            let size = rules.size(candidate);
            trace!(child = i, candidate = j, ?size, "containment candidate");
            match best {
                Some((best_size, _)) if size > best_size => {}
                Some((best_size, _)) if size == best_size => tied.push(j),
                _ => {
                    best = Some((size, j));
                    tied.clear();
                }
            }
        }
        if let Some((size, chosen)) = best {
            if !tied.is_empty() {
                warn!(
                    child = i,
                    chosen,
                    ?tied,
                    ?size,
                    "ambiguous parent: several equally small containers, keeping the earliest"
                );
            }
        }
        parents.push(best.map(|(_, j)| j));
    }
    parents
}

/// Builds the containment hierarchy of `items` under `rules`.
pub fn build_hierarchy<T, R>(items: &[T], rules: &R) -> Hierarchy
where
    R: HierarchyRules<T>,
{
    let parents = resolve_parents(items, rules);
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
    let mut roots = Vec::new();
    for (i, parent) in parents.iter().enumerate() {
        match parent {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    let order = |a: &usize, b: &usize| {
        rules
            .sibling_order(&items[*a], &items[*b])
            .then_with(|| a.cmp(b))
    };
    roots.sort_by(order);
    for kids in &mut children {
        kids.sort_by(order);
    }

    Hierarchy {
        parents,
        children,
        roots,
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use super::*;

    /// Integer intervals, contained when strictly nested.
    struct Intervals;

    impl HierarchyRules<(u32, u32)> for Intervals {
        type Size = u32;

        fn contains(&self, p: &(u32, u32), c: &(u32, u32)) -> bool {
            p.0 <= c.0 && p.1 >= c.1 && p != c
        }

        fn size(&self, item: &(u32, u32)) -> u32 {
            item.1 - item.0
        }

        fn sibling_order(&self, a: &(u32, u32), b: &(u32, u32)) -> Ordering {
            a.0.cmp(&b.0)
        }
    }

    #[test]
    fn smallest_container_wins() {
        let items = [(0, 100), (10, 20), (0, 50), (12, 15)];
        let h = build_hierarchy(&items, &Intervals);
        assert_eq!(h.parents(), &[None, Some(2), Some(0), Some(1)]);
        assert_eq!(h.roots(), &[0]);
        assert_eq!(h.preorder(), vec![0, 2, 1, 3]);
    }

    #[test]
    fn ties_keep_earliest_candidate() {
        // (0,10) and (5,15) both contain (5,10) and have the same size.
        let items = [(5, 15), (0, 10), (5, 10)];
        let h = build_hierarchy(&items, &Intervals);
        assert_eq!(h.parent(2), Some(0));
    }

    #[test]
    fn indices_follow_sibling_order() {
        let items = [(50, 60), (0, 100), (10, 20)];
        let h = build_hierarchy(&items, &Intervals);
        let idx: Vec<String> = h.indices(2).iter().map(|i| i.to_string()).collect();
        assert_eq!(idx, vec!["01.02", "01", "01.01"]);
    }

    #[test]
    fn empty_input_builds_empty_hierarchy() {
        let items: [(u32, u32); 0] = [];
        let h = build_hierarchy(&items, &Intervals);
        assert!(h.is_empty());
        assert!(h.roots().is_empty());
        assert!(h.indices(2).is_empty());
    }
}
