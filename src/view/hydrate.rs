//! Hydration: binding server-rendered anchors to the live protocol.

use rustc_hash::FxHashSet;

use super::registry::{ViewRegistry, discover_anchors};
use super::ViewError;
use crate::dom::{Document, MarkupParser, NodeId, Reconciler};
use crate::protocol::OutboundMessage;

/// Result of one hydration pass.
#[derive(Debug, Default)]
pub struct HydrationReport {
    /// Anchors bound for the first time
    pub discovered: usize,
    /// Subscribe messages handed to the channel
    pub subscribed: usize,
    /// Bindings dropped because their anchor left the document
    pub pruned: usize,
    pub errors: Vec<ViewError>,
}

impl HydrationReport {
    pub fn is_empty(&self) -> bool {
        self.discovered == 0 && self.subscribed == 0 && self.pruned == 0 && self.errors.is_empty()
    }
}

/// Scans for anchors, mounts their existing markup and subscribes them.
///
/// Re-running is safe: bound anchors are never remounted, and an anchor is
/// subscribed at most once per connection (see
/// [`ViewRegistry::clear_subscriptions`]).
#[derive(Debug)]
pub struct Hydrator {
    attribute: String,
    /// Attached, unbound anchors whose markup failed to mount; not retried
    failed: FxHashSet<NodeId>,
}

impl Hydrator {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            failed: FxHashSet::default(),
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Run one pass in document order.
    ///
    /// `send` delivers a Subscribe and reports whether it went out; an
    /// anchor whose Subscribe was not delivered stays unsubscribed.
    pub fn hydrate<P, R>(
        &mut self,
        doc: &mut Document,
        registry: &mut ViewRegistry,
        parser: &P,
        reconciler: &mut R,
        mut send: impl FnMut(&OutboundMessage) -> bool,
    ) -> HydrationReport
    where
        P: MarkupParser + ?Sized,
        R: Reconciler + ?Sized,
    {
        let mut report = HydrationReport {
            pruned: registry.prune(doc, &self.attribute),
            ..HydrationReport::default()
        };
        // a render may have bound a failed anchor since
        self.failed
            .retain(|&anchor| doc.is_attached(anchor) && !registry.is_bound(anchor));

        for (anchor, view) in discover_anchors(doc, &self.attribute) {
            // an earlier mount in this pass may have replaced it
            if !doc.is_attached(anchor) || self.failed.contains(&anchor) {
                continue;
            }

            if !registry.is_bound(anchor) {
                if let Err(e) = self.mount(doc, registry, parser, reconciler, anchor, &view) {
                    self.failed.insert(anchor);
                    report.errors.push(e);
                    continue;
                }
                report.discovered += 1;
            }

            if registry.binding(anchor).is_some_and(|b| b.subscribed) {
                continue;
            }
            if send(&OutboundMessage::subscribe(view.as_str())) {
                registry.mark_subscribed(anchor);
                report.subscribed += 1;
            }
        }

        report
    }

    /// Mount the anchor's current markup through the reconciler and bind it.
    fn mount<P, R>(
        &self,
        doc: &mut Document,
        registry: &mut ViewRegistry,
        parser: &P,
        reconciler: &mut R,
        anchor: NodeId,
        view: &str,
    ) -> Result<(), ViewError>
    where
        P: MarkupParser + ?Sized,
        R: Reconciler + ?Sized,
    {
        let markup = doc.inner_html(anchor);
        if markup.trim().is_empty() {
            registry.bind(view, anchor);
            return Ok(());
        }

        let tree = parser.parse_root(&markup).map_err(|source| ViewError::Parse {
            view: view.to_string(),
            source,
        })?;
        let replace = doc.first_content_child(anchor);
        let mount = reconciler
            .render(doc, &tree, anchor, replace)
            .map_err(|source| ViewError::Mount {
                view: view.to_string(),
                source,
            })?;

        registry.bind(view, anchor);
        registry.set_mount(anchor, mount);
        crate::debug!("view"; "mounted `{}` at {}", view, anchor);
        Ok(())
    }
}
