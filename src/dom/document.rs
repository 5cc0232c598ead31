//! Arena-backed live document.

use super::html;
use super::node::{ElementData, Node, NodeData, NodeId};
use super::parse::{MarkupParser, ParseError};
use super::tree::VNode;

/// The live page: a node arena with a synthetic root, live form state and
/// focus tracking.
///
/// Structural mutation is public so any [`super::Reconciler`] can drive it,
/// but the client itself only mutates structure through a reconciler.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    /// Freed slots, reused by the next allocation
    free: Vec<usize>,
    root: NodeId,
    focused: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Root)],
            free: Vec::new(),
            root: NodeId::new(0),
            focused: None,
        }
    }

    /// Build a document from page markup.
    pub fn parse<P: MarkupParser + ?Sized>(markup: &str, parser: &P) -> Result<Self, ParseError> {
        let mut doc = Self::new();
        for tree in parser.parse(markup)? {
            let id = doc.build(&tree);
            doc.append_child(doc.root, id);
        }
        Ok(doc)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Live nodes, attached or not. Removed subtrees are not counted.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Arena slots in use or waiting for reuse.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    fn slot(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.index)
            .filter(|node| node.generation == id.generation)
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.index)
            .filter(|node| node.generation == id.generation)
    }

    // =========================================================================
    // Reading
    // =========================================================================

    /// Node payload.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this document or was removed.
    pub fn data(&self, id: NodeId) -> &NodeData {
        match self.slot(id) {
            Some(node) => &node.data,
            None => panic!("{id} is not a live node of this document"),
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.slot(id).map(|node| &node.data)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(NodeData::as_element)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.element(child).is_some())
    }

    /// First child that carries content (skips whitespace-only text).
    pub fn first_content_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| !self.data(child).is_blank_text())
    }

    /// Whether the node is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Whether `ancestor` contains `id` (inclusive).
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Nearest element carrying `name`, starting at `id` itself.
    pub fn closest_with_attr(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.element(node).is_some_and(|el| el.has_attr(name)) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// All attached elements carrying `name`, in document order.
    pub fn elements_with_attr(&self, name: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .filter(|&id| self.element(id).is_some_and(|el| el.has_attr(name)))
            .collect()
    }

    /// First attached element whose `id` attribute equals `value`.
    pub fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .find(|&id| self.attr(id, "id") == Some(value))
    }

    /// Pre-order traversal of the subtree below `id` (exclusive).
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(self.children(next).iter().rev().copied());
            Some(next)
        })
    }

    /// Concatenated text of the subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(NodeData::Text(text)) = self.get(id) {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let Some(NodeData::Text(text)) = self.get(node) {
                out.push_str(text);
            }
        }
        out
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        html::serialize_children(self, id, &mut out);
        out
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        html::serialize_node(self, id, &mut out);
        out
    }

    // =========================================================================
    // Live state
    // =========================================================================

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Move focus. Detached nodes cannot take focus.
    pub fn set_focus(&mut self, id: Option<NodeId>) {
        self.focused = id.filter(|&node| self.is_attached(node));
    }

    /// Current value of the element, as a script would read `element.value`.
    ///
    /// Returns `None` for elements that have no value at all.
    pub fn value(&self, id: NodeId) -> Option<String> {
        let el = self.element(id)?;
        match el.tag.as_str() {
            "input" => Some(
                el.value
                    .clone()
                    .unwrap_or_else(|| el.attr("value").unwrap_or_default().to_string()),
            ),
            "textarea" => Some(el.value.clone().unwrap_or_else(|| self.text_content(id))),
            "select" => Some(match &el.value {
                Some(value) => value.clone(),
                None => self.selected_option_value(id).unwrap_or_default(),
            }),
            "button" => Some(el.attr("value").unwrap_or_default().to_string()),
            "option" => Some(self.option_value(id)),
            _ => None,
        }
    }

    pub fn checked(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|el| el.checked)
    }

    /// Set the live value of a form control. Returns `false` for other nodes.
    pub fn set_value(&mut self, id: NodeId, value: &str) -> bool {
        match self.element_mut(id) {
            Some(el) if el.is_form_control() => {
                el.value = Some(value.to_string());
                true
            }
            _ => false,
        }
    }

    /// Set the live checked state. Returns `false` for non-toggle elements.
    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> bool {
        match self.element_mut(id) {
            Some(el) if el.is_checkbox() || el.is_radio() => {
                el.checked = checked;
                true
            }
            _ => false,
        }
    }

    fn option_value(&self, option: NodeId) -> String {
        self.attr(option, "value")
            .map(str::to_string)
            .unwrap_or_else(|| self.text_content(option).trim().to_string())
    }

    fn selected_option_value(&self, select: NodeId) -> Option<String> {
        let options: Vec<NodeId> = self
            .descendants(select)
            .filter(|&id| self.element(id).is_some_and(|el| el.tag == "option"))
            .collect();
        let chosen = options
            .iter()
            .copied()
            .find(|&id| self.element(id).is_some_and(|el| el.has_attr("selected")))
            .or_else(|| options.first().copied())?;
        Some(self.option_value(chosen))
    }

    // =========================================================================
    // Structural mutation
    // =========================================================================

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.slot_mut(id).map(|node| &mut node.data) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// Allocate a detached subtree for `tree` and initialise its form state.
    pub fn build(&mut self, tree: &VNode) -> NodeId {
        let id = match tree {
            VNode::Text(text) => self.alloc(NodeData::Text(text.clone())),
            VNode::Comment(text) => self.alloc(NodeData::Comment(text.clone())),
            VNode::Element(velement) => {
                let mut el = ElementData::new(&velement.tag);
                el.attrs = velement.attrs.clone();
                el.checked = el.has_attr("checked");
                let id = self.alloc(NodeData::Element(el));
                for child in &velement.children {
                    let child_id = self.build(child);
                    self.append_child(id, child_id);
                }
                id
            }
        };
        self.init_form_state(id);
        id
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        if let Some(index) = self.free.pop() {
            let node = &mut self.nodes[index];
            node.data = data;
            return NodeId {
                index,
                generation: node.generation,
            };
        }
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    /// Return the slots of a detached subtree to the free list.
    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(node) = self.slot_mut(id) else {
                continue;
            };
            stack.append(&mut node.children);
            node.data = NodeData::Comment(String::new());
            node.parent = None;
            node.generation = node.generation.wrapping_add(1);
            self.free.push(id.index);
        }
    }

    fn init_form_state(&mut self, id: NodeId) {
        let initial = match self.element(id) {
            Some(el) if el.tag == "input" => Some(el.attr("value").unwrap_or_default().to_string()),
            Some(el) if el.tag == "textarea" => Some(self.text_content(id)),
            _ => None,
        };
        if let (Some(value), Some(el)) = (initial, self.element_mut(id)) {
            el.value = Some(value);
        }
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Insert `child` before `reference` (or at the end when `None`).
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if self.slot(child).is_none() {
            return;
        }
        self.detach(child);
        let Some(parent_node) = self.slot_mut(parent) else {
            return;
        };
        let children = &mut parent_node.children;
        let index = reference
            .and_then(|r| children.iter().position(|&c| c == r))
            .unwrap_or(children.len());
        children.insert(index, child);
        self.nodes[child.index].parent = Some(parent);
    }

    /// Put `new` at the position of `old` and detach `old`.
    pub fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) {
        self.insert_before(parent, new, Some(old));
        self.remove_child(parent, old);
    }

    /// Remove `child` from `parent` and free its subtree. Handles into the
    /// subtree go stale and focus inside it is lost.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.parent(child) != Some(parent) {
            return;
        }
        self.detach(child);
        if let Some(focused) = self.focused
            && self.contains(child, focused)
        {
            self.focused = None;
        }
        self.release(child);
    }

    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.slot_mut(child).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(parent_node) = self.slot_mut(parent) {
            parent_node.children.retain(|&c| c != child);
        }
    }

    /// Replace the content of a text or comment node.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> bool {
        match self.slot_mut(id).map(|node| &mut node.data) {
            Some(NodeData::Text(current) | NodeData::Comment(current)) if current.as_str() != text => {
                *current = text.to_string();
                true
            }
            _ => false,
        }
    }
}
