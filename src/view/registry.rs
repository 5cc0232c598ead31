//! View identifier → anchors.

use rustc_hash::FxHashMap;

use crate::dom::{Document, NodeId};

/// One anchor bound to a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub anchor: NodeId,
    /// Node last rendered into the anchor (mount cache, not a source of truth)
    pub mount: Option<NodeId>,
    /// Whether a Subscribe went out for this anchor on the current connection
    pub subscribed: bool,
}

/// One-to-many relation between view identifiers and anchor elements.
///
/// Several anchors may share an identifier; every one of them receives the
/// view's renders.
#[derive(Debug, Default)]
pub struct ViewRegistry {
    views: FxHashMap<String, Vec<Binding>>,
    anchors: FxHashMap<NodeId, String>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `anchor` to `view`. Returns `false` if the anchor was already
    /// bound to that view.
    ///
    /// An anchor bound to a different view is moved over.
    pub fn bind(&mut self, view: &str, anchor: NodeId) -> bool {
        match self.anchors.get(&anchor) {
            Some(current) if current == view => return false,
            Some(_) => {
                self.unbind(anchor);
            }
            None => {}
        }
        self.anchors.insert(anchor, view.to_string());
        self.views.entry(view.to_string()).or_default().push(Binding {
            anchor,
            mount: None,
            subscribed: false,
        });
        true
    }

    /// Drop an anchor. Returns the view it was bound to.
    pub fn unbind(&mut self, anchor: NodeId) -> Option<String> {
        let view = self.anchors.remove(&anchor)?;
        if let Some(bindings) = self.views.get_mut(&view) {
            bindings.retain(|b| b.anchor != anchor);
            if bindings.is_empty() {
                self.views.remove(&view);
            }
        }
        Some(view)
    }

    pub fn is_bound(&self, anchor: NodeId) -> bool {
        self.anchors.contains_key(&anchor)
    }

    pub fn view_of(&self, anchor: NodeId) -> Option<&str> {
        self.anchors.get(&anchor).map(String::as_str)
    }

    /// Anchors bound to `view`, in binding order.
    pub fn bindings(&self, view: &str) -> &[Binding] {
        self.views.get(view).map(Vec::as_slice).unwrap_or_default()
    }

    fn binding_mut(&mut self, anchor: NodeId) -> Option<&mut Binding> {
        let view = self.anchors.get(&anchor)?;
        self.views
            .get_mut(view)?
            .iter_mut()
            .find(|b| b.anchor == anchor)
    }

    pub fn binding(&self, anchor: NodeId) -> Option<&Binding> {
        let view = self.anchors.get(&anchor)?;
        self.bindings(view).iter().find(|b| b.anchor == anchor)
    }

    pub fn set_mount(&mut self, anchor: NodeId, mount: NodeId) {
        if let Some(binding) = self.binding_mut(anchor) {
            binding.mount = Some(mount);
        }
    }

    pub fn mark_subscribed(&mut self, anchor: NodeId) {
        if let Some(binding) = self.binding_mut(anchor) {
            binding.subscribed = true;
        }
    }

    /// Forget every subscription (the connection they were sent on is gone).
    pub fn clear_subscriptions(&mut self) {
        for binding in self.views.values_mut().flatten() {
            binding.subscribed = false;
        }
    }

    /// Unbind anchors that left the document or lost their declaration.
    /// Returns how many were dropped.
    pub fn prune(&mut self, doc: &Document, attribute: &str) -> usize {
        let stale: Vec<NodeId> = self
            .anchors
            .iter()
            .filter(|&(&anchor, view)| {
                !doc.is_attached(anchor) || doc.attr(anchor, attribute) != Some(view.as_str())
            })
            .map(|(&anchor, _)| anchor)
            .collect();
        for &anchor in &stale {
            self.unbind(anchor);
        }
        stale.len()
    }

    /// Known view identifiers, sorted.
    pub fn view_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.views.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

/// Elements declaring a view, in document order, with their identifiers.
pub fn discover_anchors(doc: &Document, attribute: &str) -> Vec<(NodeId, String)> {
    doc.elements_with_attr(attribute)
        .into_iter()
        .filter_map(|id| doc.attr(id, attribute).map(|view| (id, view.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::TlParser;

    const ATTR: &str = "data-live-view";

    #[test]
    fn test_one_to_many() {
        let mut reg = ViewRegistry::new();
        assert!(reg.bind("clock", NodeId::new(1)));
        assert!(reg.bind("clock", NodeId::new(2)));
        assert!(reg.bind("cart", NodeId::new(3)));
        assert!(!reg.bind("clock", NodeId::new(1)));

        let anchors: Vec<_> = reg.bindings("clock").iter().map(|b| b.anchor).collect();
        assert_eq!(anchors, vec![NodeId::new(1), NodeId::new(2)]);
        assert_eq!(reg.view_ids(), vec!["cart", "clock"]);
        assert_eq!(reg.anchor_count(), 3);
        assert!(reg.bindings("nothing").is_empty());
    }

    #[test]
    fn test_rebind_moves_anchor() {
        let mut reg = ViewRegistry::new();
        reg.bind("a", NodeId::new(1));
        assert!(reg.bind("b", NodeId::new(1)));
        assert_eq!(reg.view_of(NodeId::new(1)), Some("b"));
        assert!(reg.bindings("a").is_empty());
        assert_eq!(reg.view_count(), 1);
    }

    #[test]
    fn test_subscription_flags() {
        let mut reg = ViewRegistry::new();
        reg.bind("a", NodeId::new(1));
        reg.set_mount(NodeId::new(1), NodeId::new(9));
        reg.mark_subscribed(NodeId::new(1));
        let binding = reg.binding(NodeId::new(1)).unwrap();
        assert!(binding.subscribed);
        assert_eq!(binding.mount, Some(NodeId::new(9)));

        reg.clear_subscriptions();
        assert!(!reg.binding(NodeId::new(1)).unwrap().subscribed);
    }

    #[test]
    fn test_discover_and_prune() {
        let mut doc = Document::parse(
            "<main id=\"m\"><div data-live-view=\"a\"></div><div data-live-view=\"b\"></div></main>",
            &TlParser,
        )
        .unwrap();
        let found = discover_anchors(&doc, ATTR);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].1, "a");

        let mut reg = ViewRegistry::new();
        for (anchor, view) in &found {
            reg.bind(view, *anchor);
        }

        let main = doc.element_by_id("m").unwrap();
        doc.remove_child(main, found[1].0);
        assert_eq!(reg.prune(&doc, ATTR), 1);
        assert_eq!(reg.view_ids(), vec!["a"]);
    }
}
