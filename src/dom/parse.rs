//! Markup parsing.
//!
//! The client never interprets fragment text itself: a [`MarkupParser`]
//! turns it into [`VNode`] trees. [`TlParser`] is the default, built on `tl`.

use thiserror::Error;

use super::html::{preserves_whitespace, unescape};
use super::node::Attrs;
use super::tree::{VElement, VNode};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("markup could not be parsed: {0}")]
    Syntax(String),

    #[error("markup contains no nodes")]
    Empty,
}

/// Converts markup text into render trees.
pub trait MarkupParser {
    /// Parse markup into its top-level nodes.
    fn parse(&self, markup: &str) -> Result<Vec<VNode>, ParseError>;

    /// Parse markup and keep only the first top-level node.
    fn parse_root(&self, markup: &str) -> Result<VNode, ParseError> {
        self.parse(markup)?
            .into_iter()
            .next()
            .ok_or(ParseError::Empty)
    }
}

/// `tl`-backed parser.
///
/// - Tag and attribute names are lowercased, attributes sorted by name
/// - Entities in text and attribute values are decoded
/// - Whitespace-only text is dropped, except inside `pre` and `textarea`
#[derive(Debug, Default, Clone, Copy)]
pub struct TlParser;

impl MarkupParser for TlParser {
    fn parse(&self, markup: &str) -> Result<Vec<VNode>, ParseError> {
        let dom = tl::parse(markup, tl::ParserOptions::default())
            .map_err(|e| ParseError::Syntax(format!("{e:?}")))?;
        let parser = dom.parser();

        Ok(dom
            .children()
            .iter()
            .filter_map(|handle| convert(*handle, parser, false))
            .collect())
    }
}

fn convert(handle: tl::NodeHandle, parser: &tl::Parser, keep_blank: bool) -> Option<VNode> {
    match handle.get(parser)? {
        tl::Node::Tag(tag) => {
            let name = tag.name().as_utf8_str().to_ascii_lowercase();

            let mut attrs: Attrs = tag
                .attributes()
                .iter()
                .map(|(key, value)| {
                    let key: &str = key.as_ref();
                    let value = value.map(|v| unescape(&v).into_owned()).unwrap_or_default();
                    (key.to_ascii_lowercase(), value)
                })
                .collect();
            attrs.sort_by(|a, b| a.0.cmp(&b.0));
            attrs.dedup_by(|a, b| a.0 == b.0);

            let keep = preserves_whitespace(&name);
            let children = tag
                .children()
                .top()
                .iter()
                .filter_map(|child| convert(*child, parser, keep))
                .collect();

            Some(VNode::Element(VElement {
                tag: name,
                attrs,
                children,
            }))
        }
        tl::Node::Raw(bytes) => {
            let text = bytes.as_utf8_str();
            if !keep_blank && text.trim().is_empty() {
                return None;
            }
            Some(VNode::Text(unescape(&text).into_owned()))
        }
        tl::Node::Comment(bytes) => {
            let raw = bytes.as_utf8_str();
            let body = raw
                .strip_prefix("<!--")
                .and_then(|s| s.strip_suffix("-->"))
                .unwrap_or(raw.as_ref());
            Some(VNode::Comment(body.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_root() {
        let tree = TlParser.parse_root("<div class=\"box\"><p>Hi</p></div>").unwrap();
        let VNode::Element(el) = tree else {
            panic!("expected element");
        };
        assert_eq!(el.tag, "div");
        assert_eq!(el.attr("class"), Some("box"));
        assert_eq!(el.children.len(), 1);
        assert_eq!(el.children[0].tag(), Some("p"));
    }

    #[test]
    fn test_parse_drops_blank_text() {
        let nodes = TlParser.parse("\n  <span>a</span>\n  <span>b</span>\n").unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| n.tag() == Some("span")));
    }

    #[test]
    fn test_parse_keeps_blank_text_in_pre() {
        let tree = TlParser.parse_root("<pre>  </pre>").unwrap();
        let VNode::Element(el) = tree else {
            panic!("expected element");
        };
        assert_eq!(el.children, vec![VNode::text("  ")]);
    }

    #[test]
    fn test_parse_decodes_entities() {
        let tree = TlParser
            .parse_root("<b title=\"a &amp; b\">1 &lt; 2</b>")
            .unwrap();
        let VNode::Element(el) = tree else {
            panic!("expected element");
        };
        assert_eq!(el.attr("title"), Some("a & b"));
        assert_eq!(el.children, vec![VNode::text("1 < 2")]);
    }

    #[test]
    fn test_parse_sorts_attributes() {
        let tree = TlParser
            .parse_root("<input type=\"text\" live-input=\"q\" id=\"search\">")
            .unwrap();
        let VNode::Element(el) = tree else {
            panic!("expected element");
        };
        let names: Vec<_> = el.attrs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["id", "live-input", "type"]);
    }

    #[test]
    fn test_parse_root_empty() {
        assert!(matches!(TlParser.parse_root("   "), Err(ParseError::Empty)));
    }
}
