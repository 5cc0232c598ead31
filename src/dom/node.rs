//! Document node types.

use std::fmt;

use smallvec::SmallVec;

/// Ordered attribute list. Most elements carry only a handful of attributes.
pub type Attrs = SmallVec<[(String, String); 4]>;

/// Handle to a node inside a [`super::Document`] arena.
///
/// Removing a node frees its slot for reuse. The generation tells a stale
/// handle apart from the node now occupying the slot: stale handles read as
/// absent and detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl NodeId {
    pub(crate) const fn new(index: usize) -> Self {
        Self {
            index,
            generation: 0,
        }
    }

    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.generation {
            0 => write!(f, "node#{}", self.index),
            generation => write!(f, "node#{}.{}", self.index, generation),
        }
    }
}

/// Payload of a document node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// Synthetic document root (holds the top-level nodes)
    Root,
    Element(ElementData),
    Text(String),
    Comment(String),
}

impl NodeData {
    pub fn as_element(&self) -> Option<&ElementData> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Whitespace-only text carries no content for mounting purposes.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

/// Element payload: tag, attributes and live form state.
///
/// `value` and `checked` mirror DOM properties rather than attributes: they
/// start from the markup and then follow user input independently.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub tag: String,
    pub attrs: Attrs,
    /// Live `value` property (form controls only)
    pub value: Option<String>,
    /// Live `checked` property (checkbox and radio inputs)
    pub checked: bool,
}

impl ElementData {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Attrs::new(),
            value: None,
            checked: false,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(key, _)| key == name)
    }

    /// Set an attribute. Returns `true` if the element changed.
    pub fn set_attr(&mut self, name: &str, value: &str) -> bool {
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, current)) if current == value => false,
            Some((_, current)) => {
                *current = value.to_string();
                true
            }
            None => {
                self.attrs.push((name.to_string(), value.to_string()));
                true
            }
        }
    }

    /// Remove an attribute. Returns `true` if it was present.
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|(key, _)| key != name);
        self.attrs.len() != before
    }

    /// `type` attribute of an `<input>`, lowercased. Defaults to `text`.
    pub fn input_type(&self) -> Option<String> {
        (self.tag == "input").then(|| {
            self.attr("type")
                .map(str::to_ascii_lowercase)
                .unwrap_or_else(|| "text".to_string())
        })
    }

    pub fn is_checkbox(&self) -> bool {
        self.input_type().as_deref() == Some("checkbox")
    }

    pub fn is_radio(&self) -> bool {
        self.input_type().as_deref() == Some("radio")
    }

    /// Elements whose live `value` is tracked as state.
    pub fn is_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea" | "select")
    }
}

/// Arena slot.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Bumped each time the slot is freed
    pub generation: u32,
}

impl Node {
    pub fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
            generation: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_attr_reports_change() {
        let mut el = ElementData::new("DIV");
        assert_eq!(el.tag, "div");
        assert!(el.set_attr("class", "a"));
        assert!(!el.set_attr("class", "a"));
        assert!(el.set_attr("class", "b"));
        assert_eq!(el.attr("class"), Some("b"));
        assert!(el.remove_attr("class"));
        assert!(!el.remove_attr("class"));
    }

    #[test]
    fn test_input_type_defaults_to_text() {
        let mut el = ElementData::new("input");
        assert_eq!(el.input_type().as_deref(), Some("text"));
        el.set_attr("type", "CheckBox");
        assert!(el.is_checkbox());
        assert!(!el.is_radio());
        assert_eq!(ElementData::new("div").input_type(), None);
    }
}
