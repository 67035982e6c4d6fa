//! Merges the records of a labeling session into one section tree.
//!
//! The main list holds groups, promoted orphan shapes and tables. Its
//! containment tree is built first; text sections and table sections are then
//! built into their own sub-trees and grafted below their owning shape or
//! table. Shapes lying over table rows and columns are finally moved or
//! cloned below those rows and columns.

use std::cmp::Ordering;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use super::session::{Session, TableSectionRecord, TextSectionRecord};
use crate::error::{Result, SectionError};
use crate::hierarchy::{
    NodeId, SectionTree, SpatialRules, TableRules, TextRules, build_hierarchy,
};
use crate::params::NormalizeParams;
use crate::section::{ElementId, Identity, Section, SectionKind};
use crate::utils::{Bounds, reading_order};

/// Turns a [`Session`] into a [`SectionTree`].
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    params: NormalizeParams,
}

impl Normalizer {
    pub fn new(params: NormalizeParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &NormalizeParams {
        &self.params
    }

    /// Runs every normalization step. Malformed records are logged and
    /// skipped; the result may be empty but is never an error.
    pub fn run(&self, session: &Session) -> SectionTree {
        let mut sections = main_sections(session);
        if self.params.dedupe {
            sections = dedupe_by_identity(sections);
        }

        let hierarchy = build_hierarchy(&sections, &SpatialRules);
        let mut tree = SectionTree::new(session.slide);
        tree.graft(None, sections, &hierarchy);

        let table_nodes = self.graft_tables(&mut tree, session);
        graft_text_sections(&mut tree, session);
        self.place_overlaid_shapes(&mut tree, &table_nodes);

        if self.params.trim_redundant_roots {
            let trimmed = tree.trim_redundant_roots(self.params.index_width);
            debug!(trimmed, "trimmed redundant roots");
        }
        tree.reindex(self.params.index_width);
        tree
    }

    /// Grafts every table's sections below the table, returning the grafted nodes.
    fn graft_tables(&self, tree: &mut SectionTree, session: &Session) -> Vec<NodeId> {
        let mut by_table: IndexMap<ElementId, Vec<&TableSectionRecord>> = IndexMap::new();
        for record in &session.table_sections {
            by_table.entry(record.table.clone()).or_default().push(record);
        }

        let mut grafted = Vec::new();
        for (table, records) in by_table {
            let Some(owner) = tree.find_singleton(&table) else {
                let err = SectionError::OrphanReference {
                    kind: "table",
                    owner: table.to_string(),
                };
                warn!(sections = records.len(), "{err}, skipping");
                continue;
            };

            let sections: Vec<Section> = records
                .into_iter()
                .filter_map(|r| match self.table_section(session, r) {
                    Ok(s) => Some(s),
                    Err(err) => {
                        warn!(label = %r.label, "skipping table section: {err}");
                        None
                    }
                })
                .collect();
            if sections.is_empty() {
                continue;
            }
            let hierarchy = build_hierarchy(&sections, &TableRules);
            debug!(%table, sections = sections.len(), "grafting table sections");
            grafted.extend(tree.graft(Some(owner), sections, &hierarchy));
        }
        grafted
    }

    fn table_section(&self, session: &Session, record: &TableSectionRecord) -> Result<Section> {
        let kind = record.kind.section_kind();
        let grid = session.grid(&record.table);
        let bounds = record
            .bounds
            .or_else(|| grid.and_then(|g| g.bounds_of(&record.cells)));
        let grid_text = grid.map(|g| g.joined_text(&record.cells)).transpose()?;
        let text = record.text.clone().or(grid_text);

        let mut section = Section::with_cells(
            kind,
            record.table.clone(),
            record.cells.iter().copied(),
            record.label.clone(),
        )?
        .maybe_bounds(bounds);
        section.text = text;

        for id in &record.overlaid {
            section.add_overlaid(id.clone());
        }
        if let (Some(tolerance), Some(bounds)) = (self.params.overlay_tolerance, bounds) {
            if !kind.is_custom_group() || self.params.duplicate_into_groups {
                for id in shapes_within(session, &record.table, &bounds.expand(tolerance)) {
                    section.add_overlaid(id);
                }
            }
        }
        Ok(section)
    }

    /// Moves or clones overlaid shapes below the table sections they lie on.
    fn place_overlaid_shapes(&self, tree: &mut SectionTree, table_nodes: &[NodeId]) {
        let mut containers: IndexMap<ElementId, Vec<NodeId>> = IndexMap::new();
        for &node in table_nodes {
            let section = &tree.get_node(node).section;
            if section.kind.is_custom_group() && !self.params.duplicate_into_groups {
                continue;
            }
            for id in section.overlaid() {
                containers.entry(id.clone()).or_default().push(node);
            }
        }

        let mut touched: FxHashSet<NodeId> = FxHashSet::default();
        for (id, targets) in containers {
            let Some(shape) = tree
                .find_singleton(&id)
                .filter(|&n| tree.get_node(n).section.is_overlay_candidate())
            else {
                debug!(%id, "overlaid id has no shape section");
                continue;
            };

            if let [target] = targets.as_slice() {
                let should_move = match tree.get_node(shape).parent() {
                    None => true,
                    Some(parent) => {
                        tree.get_node(*target).section.cardinality()
                            < tree.get_node(parent).section.cardinality()
                    }
                };
                if should_move {
                    debug!(%id, "moving overlaid shape below its table section");
                    tree.move_node(shape, Some(*target));
                    touched.insert(*target);
                }
                continue;
            }

            debug!(%id, copies = targets.len(), "duplicating overlaid shape");
            for &target in &targets {
                tree.copy_subtree(shape, Some(target));
                touched.insert(target);
            }
            tree.detach(shape);
        }

        for node in touched {
            tree.sort_children_by(node, overlay_order);
        }
    }
}

/// Table sub-sections first, in their existing order, then shapes in
/// reading order.
fn overlay_order(a: &Section, b: &Section) -> Ordering {
    match (&a.identity, &b.identity) {
        (Identity::Members(_), Identity::Members(_)) => reading_order(a, b),
        (Identity::Members(_), _) => Ordering::Greater,
        (_, Identity::Members(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// Groups, singleton shape sections and tables, in input order.
fn main_sections(session: &Session) -> Vec<Section> {
    let shape_bounds: FxHashMap<&str, Bounds> = session
        .shapes
        .iter()
        .map(|s| (s.id.as_str(), s.bounds()))
        .collect();

    let mut labels: FxHashMap<&str, &str> = FxHashMap::default();
    for l in &session.shape_labels {
        if !shape_bounds.contains_key(l.shape_id.as_str()) {
            let err = SectionError::OrphanReference {
                kind: "individual_shape",
                owner: l.shape_id.to_string(),
            };
            warn!(label = %l.label, "{err}, skipping label");
            continue;
        }
        labels.insert(l.shape_id.as_str(), l.label.as_str());
    }

    let mut sections = Vec::with_capacity(session.groups.len() + session.shapes.len());
    let mut singletons: FxHashSet<ElementId> = FxHashSet::default();
    for group in &session.groups {
        let section = match Section::with_members(
            SectionKind::ShapeGroup,
            group.members.iter().cloned(),
            group.label.clone(),
        ) {
            Ok(s) => s,
            Err(err) => {
                warn!(label = %group.label, "skipping group: {err}");
                continue;
            }
        };
        let bounds = group.bounds.or_else(|| {
            let member_bounds: Vec<Bounds> = group
                .members
                .iter()
                .filter_map(|m| shape_bounds.get(m.as_str()).copied())
                .collect();
            Bounds::union_all(member_bounds.iter())
        });
        let mut section = section.maybe_bounds(bounds);
        if let Some(id) = section.singleton_id().cloned() {
            section.text = session
                .shape(&id)
                .map(|s| s.text.clone())
                .filter(|t| !t.is_empty());
            singletons.insert(id);
        }
        sections.push(section);
    }

    for shape in &session.shapes {
        let label = labels.get(shape.id.as_str()).copied();
        // A labeled shape already covered by a singleton group still gets its
        // own record; deduplication keeps the more informative label.
        if singletons.contains(&shape.id) && label.is_none() {
            continue;
        }
        let kind = if shape.is_table {
            SectionKind::Table
        } else {
            SectionKind::IndividualShape
        };
        match Section::with_members(kind, [shape.id.clone()], label.unwrap_or_default()) {
            Ok(section) => {
                let mut section = section.bounds(shape.bounds());
                if !shape.text.is_empty() {
                    section.text = Some(shape.text.clone());
                }
                sections.push(section);
            }
            Err(err) => warn!(id = %shape.id, "skipping shape: {err}"),
        }
    }
    sections
}

/// Collapses member sections with the same member set.
///
/// The first occurrence keeps its position; the survivor is the one with the
/// longer label, earlier on ties. Missing text and bounds are filled from the
/// dropped duplicate.
pub fn dedupe_by_identity(sections: Vec<Section>) -> Vec<Section> {
    let mut out: Vec<Section> = Vec::with_capacity(sections.len());
    let mut seen: FxHashMap<Vec<ElementId>, usize> = FxHashMap::default();
    for section in sections {
        let Some(key) = section.members().map(|m| m.canonical_key()) else {
            out.push(section);
            continue;
        };
        match seen.get(&key) {
            Some(&pos) => {
                let kept = &mut out[pos];
                let (mut winner, loser) = if section.label.chars().count()
                    > kept.label.chars().count()
                {
                    (section, kept.clone())
                } else {
                    (kept.clone(), section)
                };
                debug!(kept = %winner.label, dropped = %loser.label, "deduplicating section");
                if winner.text.is_none() {
                    winner.text = loser.text;
                }
                if winner.bounds.is_none() {
                    winner.bounds = loser.bounds;
                }
                *kept = winner;
            }
            None => {
                seen.insert(key, out.len());
                out.push(section);
            }
        }
    }
    out
}

/// Builds each shape's text sections into a sub-tree below that shape.
fn graft_text_sections(tree: &mut SectionTree, session: &Session) {
    let mut by_owner: IndexMap<ElementId, Vec<&TextSectionRecord>> = IndexMap::new();
    for record in &session.text_sections {
        by_owner.entry(record.owner.clone()).or_default().push(record);
    }

    for (owner, records) in by_owner {
        let Some(owner_node) = tree.find_singleton(&owner) else {
            let err = SectionError::OrphanReference {
                kind: "text_section",
                owner: owner.to_string(),
            };
            warn!(sections = records.len(), "{err}, skipping");
            continue;
        };
        let shape_text = session.shape(&owner).map(|s| s.text.as_str());

        let sections: Vec<Section> = records
            .into_iter()
            .filter_map(|r| {
                match Section::with_span(r.owner.clone(), r.start_char, r.end_char, r.label.clone())
                {
                    Ok(mut s) => {
                        s.text = r
                            .text
                            .clone()
                            .or_else(|| shape_text.map(|t| char_slice(t, r.start_char, r.end_char)));
                        Some(s)
                    }
                    Err(err) => {
                        warn!(%owner, label = %r.label, "skipping text section: {err}");
                        None
                    }
                }
            })
            .collect();
        if sections.is_empty() {
            continue;
        }
        let hierarchy = build_hierarchy(&sections, &TextRules);
        tree.graft(Some(owner_node), sections, &hierarchy);
    }
}

fn char_slice(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end.saturating_sub(start)).collect()
}

/// Shapes (and members of groups) lying inside `area`, excluding `table`.
fn shapes_within(session: &Session, table: &str, area: &Bounds) -> Vec<ElementId> {
    let mut ids: Vec<ElementId> = session
        .shapes
        .iter()
        .filter(|s| !s.is_table && s.id != table && area.encloses(&s.bounds()))
        .map(|s| s.id.clone())
        .collect();

    let shape_bounds: FxHashMap<&str, Bounds> = session
        .shapes
        .iter()
        .map(|s| (s.id.as_str(), s.bounds()))
        .collect();
    for group in session.groups.iter().filter(|g| g.members.len() > 1) {
        let bounds = group.bounds.or_else(|| {
            let member_bounds: Vec<Bounds> = group
                .members
                .iter()
                .filter_map(|m| shape_bounds.get(m.as_str()).copied())
                .collect();
            Bounds::union_all(member_bounds.iter())
        });
        if bounds.is_some_and(|b| area.encloses(&b)) {
            ids.extend(group.members.iter().filter(|m| m.as_str() != table).cloned());
        }
    }
    ids
}
