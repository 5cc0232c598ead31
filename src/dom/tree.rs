//! Render trees.
//!
//! A [`VNode`] is the parsed form of a fragment: the target shape a
//! [`super::Reconciler`] makes a document region match.

use super::node::Attrs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VNode {
    Element(VElement),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VElement {
    pub tag: String,
    pub attrs: Attrs,
    pub children: Vec<VNode>,
}

impl VNode {
    /// Build an element node.
    pub fn element<K, V>(
        tag: &str,
        attrs: impl IntoIterator<Item = (K, V)>,
        children: Vec<VNode>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Element(VElement {
            tag: tag.to_ascii_lowercase(),
            attrs: attrs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            children,
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Element(el) => Some(&el.tag),
            _ => None,
        }
    }

    /// Number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        match self {
            Self::Element(el) => 1 + el.children.iter().map(VNode::node_count).sum::<usize>(),
            _ => 1,
        }
    }
}

impl VElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}
