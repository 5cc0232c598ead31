//! Reconciliation of render trees into the live document.
//!
//! A [`Reconciler`] makes a region of the [`Document`] match a [`VNode`]
//! tree. [`DomReconciler`] patches in place wherever node kind and tag line
//! up, so focus and typed input on untouched controls survive a re-render.

use thiserror::Error;

use super::document::Document;
use super::node::{NodeData, NodeId};
use super::tree::{VElement, VNode};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("{0} cannot hold children")]
    NotAContainer(NodeId),
}

/// Strategy for rendering a tree into a container.
pub trait Reconciler {
    /// Render `tree` inside `container`.
    ///
    /// When `replace` names a current child of `container`, that child is
    /// patched (or swapped out) to match `tree`. Otherwise the tree is
    /// appended as a new last child. Returns the node now representing
    /// `tree`.
    fn render(
        &mut self,
        doc: &mut Document,
        tree: &VNode,
        container: NodeId,
        replace: Option<NodeId>,
    ) -> Result<NodeId, ReconcileError>;
}

/// Node-level change counts of a render.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
}

impl RenderStats {
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.removed == 0
    }
}

impl std::ops::AddAssign for RenderStats {
    fn add_assign(&mut self, rhs: Self) {
        self.created += rhs.created;
        self.updated += rhs.updated;
        self.removed += rhs.removed;
    }
}

/// Positional diffing reconciler.
#[derive(Debug, Default)]
pub struct DomReconciler {
    last: RenderStats,
    total: RenderStats,
}

impl DomReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Changes made by the most recent render.
    pub fn last_stats(&self) -> RenderStats {
        self.last
    }

    /// Changes made since construction.
    pub fn total_stats(&self) -> RenderStats {
        self.total
    }
}

impl Reconciler for DomReconciler {
    fn render(
        &mut self,
        doc: &mut Document,
        tree: &VNode,
        container: NodeId,
        replace: Option<NodeId>,
    ) -> Result<NodeId, ReconcileError> {
        if !matches!(
            doc.get(container),
            Some(NodeData::Root | NodeData::Element(_))
        ) {
            return Err(ReconcileError::NotAContainer(container));
        }

        let mut stats = RenderStats::default();
        let target = replace.filter(|&old| doc.parent(old) == Some(container));
        let node = match target {
            Some(old) => patch(doc, container, old, tree, &mut stats),
            None => {
                let node = create(doc, tree, &mut stats);
                doc.append_child(container, node);
                node
            }
        };

        self.last = stats;
        self.total += stats;
        Ok(node)
    }
}

fn create(doc: &mut Document, tree: &VNode, stats: &mut RenderStats) -> NodeId {
    stats.created += tree.node_count();
    doc.build(tree)
}

fn same_kind(doc: &Document, id: NodeId, tree: &VNode) -> bool {
    match (doc.data(id), tree) {
        (NodeData::Element(el), VNode::Element(v)) => el.tag == v.tag,
        (NodeData::Text(_), VNode::Text(_)) => true,
        (NodeData::Comment(_), VNode::Comment(_)) => true,
        _ => false,
    }
}

/// Make `old` (a child of `parent`) match `tree`.
fn patch(
    doc: &mut Document,
    parent: NodeId,
    old: NodeId,
    tree: &VNode,
    stats: &mut RenderStats,
) -> NodeId {
    if !same_kind(doc, old, tree) {
        let new = create(doc, tree, stats);
        doc.replace_child(parent, new, old);
        stats.removed += 1;
        return new;
    }

    match tree {
        VNode::Text(text) | VNode::Comment(text) => {
            if doc.set_text(old, text) {
                stats.updated += 1;
            }
        }
        VNode::Element(velement) => {
            if patch_attrs(doc, old, velement) {
                stats.updated += 1;
            }
            patch_children(doc, old, &velement.children, stats);
        }
    }
    old
}

/// Bring the attribute list in line, mirroring `value`/`checked` changes
/// onto the live form state. Returns whether anything changed.
fn patch_attrs(doc: &mut Document, id: NodeId, velement: &VElement) -> bool {
    let Some(el) = doc.element_mut(id) else {
        return false;
    };
    let mut changed = false;

    let stale: Vec<String> = el
        .attrs
        .iter()
        .filter(|(name, _)| velement.attr(name).is_none())
        .map(|(name, _)| name.clone())
        .collect();
    for name in stale {
        el.remove_attr(&name);
        match name.as_str() {
            "checked" => el.checked = false,
            "value" if el.tag == "input" => el.value = Some(String::new()),
            _ => {}
        }
        changed = true;
    }

    for (name, value) in &velement.attrs {
        let added = !el.has_attr(name);
        if !el.set_attr(name, value) {
            continue;
        }
        changed = true;
        match name.as_str() {
            "checked" if added => el.checked = true,
            "value" if el.is_form_control() => el.value = Some(value.clone()),
            _ => {}
        }
    }

    if changed {
        el.attrs.sort_by(|a, b| a.0.cmp(&b.0));
    }
    changed
}

fn patch_children(doc: &mut Document, parent: NodeId, trees: &[VNode], stats: &mut RenderStats) {
    let existing: Vec<NodeId> = doc.children(parent).to_vec();

    for (index, tree) in trees.iter().enumerate() {
        match existing.get(index) {
            Some(&old) => {
                patch(doc, parent, old, tree, stats);
            }
            None => {
                let node = create(doc, tree, stats);
                doc.append_child(parent, node);
            }
        }
    }

    for &extra in existing.iter().skip(trees.len()) {
        doc.remove_child(parent, extra);
        stats.removed += 1;
    }
}
