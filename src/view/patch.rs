//! Applying inbound renders to anchors.

use super::registry::{ViewRegistry, discover_anchors};
use super::ViewError;
use crate::dom::{Document, MarkupParser, NodeId, Reconciler};
use crate::protocol::RenderMessage;

/// Result of applying one render message.
#[derive(Debug, Default)]
pub struct PatchOutcome {
    /// Anchors re-rendered
    pub anchors: usize,
    /// Anchors bound by this render (not hydrated before)
    pub bound: usize,
    /// Per-anchor mount failures; other anchors were still updated
    pub errors: Vec<ViewError>,
}

impl PatchOutcome {
    /// No anchor carries the view: the message was dropped.
    pub fn is_dropped(&self) -> bool {
        self.anchors == 0 && self.errors.is_empty()
    }
}

/// Renders a fragment into every anchor of its view.
///
/// Targets come from the document, not the registry, so an anchor that was
/// never hydrated still receives renders.
#[derive(Debug, Clone)]
pub struct PatchApplier {
    attribute: String,
}

impl PatchApplier {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
        }
    }

    /// Wrap a fragment in a single root so it always parses to one tree.
    pub fn wrap(fragment: &str) -> String {
        format!("<div>{fragment}</div>")
    }

    /// Attached anchors declaring `view`, in document order.
    fn targets(&self, doc: &Document, view: &str) -> Vec<NodeId> {
        discover_anchors(doc, &self.attribute)
            .into_iter()
            .filter(|(_, id)| id == view)
            .map(|(anchor, _)| anchor)
            .collect()
    }

    pub fn apply<P, R>(
        &self,
        doc: &mut Document,
        registry: &mut ViewRegistry,
        parser: &P,
        reconciler: &mut R,
        message: &RenderMessage,
    ) -> Result<PatchOutcome, ViewError>
    where
        P: MarkupParser + ?Sized,
        R: Reconciler + ?Sized,
    {
        let anchors = self.targets(doc, &message.id);
        if anchors.is_empty() {
            crate::debug!("view"; "no anchor for `{}`, render dropped", message.id);
            return Ok(PatchOutcome::default());
        }

        let tree = parser
            .parse_root(&Self::wrap(&message.render))
            .map_err(|source| ViewError::Parse {
                view: message.id.clone(),
                source,
            })?;

        let mut outcome = PatchOutcome::default();
        for anchor in anchors {
            // an earlier anchor's render may have replaced this one
            if !doc.is_attached(anchor) {
                continue;
            }
            if !registry.is_bound(anchor) {
                registry.bind(&message.id, anchor);
                outcome.bound += 1;
                crate::debug!("view"; "bound `{}` at {} on render", message.id, anchor);
            }

            let replace = registry
                .binding(anchor)
                .and_then(|binding| binding.mount)
                .filter(|&mount| doc.parent(mount) == Some(anchor))
                .or_else(|| doc.first_content_child(anchor));

            match reconciler.render(doc, &tree, anchor, replace) {
                Ok(mount) => {
                    registry.set_mount(anchor, mount);
                    outcome.anchors += 1;
                }
                Err(source) => outcome.errors.push(ViewError::Mount {
                    view: message.id.clone(),
                    source,
                }),
            }
        }
        Ok(outcome)
    }
}
