//! Simulated user actions.
//!
//! Each action first updates live document state the way a browser would,
//! then yields the interactions the browser would deliver, in order.

use std::fmt;

use smallvec::{SmallVec, smallvec};

use super::{EventCategory, Interaction};
use crate::dom::{Document, NodeId};

/// Something a user does to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Pointer activation; toggles checkboxes and selects radios
    Click(NodeId),
    /// Replace the text of an input or textarea
    Type(NodeId, String),
    /// Commit an edited value (blur after typing)
    Commit(NodeId),
    /// Pick a value in a select (or set an input outright)
    Select(NodeId, String),
    /// Move focus without interacting
    Focus(NodeId),
}

impl UserAction {
    pub fn target(&self) -> NodeId {
        match self {
            Self::Click(t) | Self::Type(t, _) | Self::Commit(t) | Self::Select(t, _) | Self::Focus(t) => *t,
        }
    }
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click(t) => write!(f, "click {t}"),
            Self::Type(t, text) => write!(f, "type {t} {text:?}"),
            Self::Commit(t) => write!(f, "commit {t}"),
            Self::Select(t, value) => write!(f, "select {t} {value:?}"),
            Self::Focus(t) => write!(f, "focus {t}"),
        }
    }
}

type Interactions = SmallVec<[Interaction; 3]>;

/// Apply `action` to the document and return the resulting interactions.
///
/// Detached and disabled targets receive nothing.
pub fn perform(doc: &mut Document, action: &UserAction) -> Interactions {
    let target = action.target();
    let Some(el) = doc.element(target) else {
        return Interactions::new();
    };
    if !doc.is_attached(target) || el.has_attr("disabled") {
        return Interactions::new();
    }

    let focusable = el.is_form_control() || matches!(el.tag.as_str(), "button" | "a");
    let is_checkbox = el.is_checkbox();
    let is_radio = el.is_radio();
    let editable = el.is_form_control() && !is_checkbox && !is_radio;

    let at = |categories: &[EventCategory]| -> Interactions {
        categories
            .iter()
            .map(|&category| Interaction::new(category, target))
            .collect()
    };

    match action {
        UserAction::Click(_) => {
            if focusable {
                doc.set_focus(Some(target));
            }
            if is_checkbox {
                let checked = !doc.checked(target);
                doc.set_checked(target, checked);
                at(&EventCategory::ALL)
            } else if is_radio && !doc.checked(target) {
                select_radio(doc, target);
                at(&EventCategory::ALL)
            } else {
                smallvec![Interaction::new(EventCategory::Click, target)]
            }
        }
        UserAction::Type(_, text) if editable => {
            doc.set_focus(Some(target));
            doc.set_value(target, text);
            at(&[EventCategory::Input])
        }
        UserAction::Commit(_) if editable => {
            if doc.focused() == Some(target) {
                doc.set_focus(None);
            }
            at(&[EventCategory::Change])
        }
        UserAction::Select(_, value) if editable => {
            doc.set_value(target, value);
            at(&[EventCategory::Input, EventCategory::Change])
        }
        UserAction::Focus(_) => {
            doc.set_focus(Some(target));
            Interactions::new()
        }
        _ => Interactions::new(),
    }
}

/// Check `radio` and clear the other radios of its group.
fn select_radio(doc: &mut Document, radio: NodeId) {
    if let Some(name) = doc.attr(radio, "name").map(str::to_string) {
        let group: Vec<NodeId> = doc
            .elements_with_attr("name")
            .into_iter()
            .filter(|&id| id != radio)
            .filter(|&id| {
                doc.element(id)
                    .is_some_and(|el| el.is_radio() && el.attr("name") == Some(name.as_str()))
            })
            .collect();
        for id in group {
            doc.set_checked(id, false);
        }
    }
    doc.set_checked(radio, true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::TlParser;

    fn doc(markup: &str) -> Document {
        Document::parse(markup, &TlParser).unwrap()
    }

    fn categories(list: &[Interaction]) -> Vec<EventCategory> {
        list.iter().map(|i| i.category).collect()
    }

    #[test]
    fn test_click_checkbox_toggles() {
        let mut d = doc("<input id=\"c\" type=\"checkbox\">");
        let c = d.element_by_id("c").unwrap();

        let out = perform(&mut d, &UserAction::Click(c));
        assert!(d.checked(c));
        assert_eq!(categories(&out), EventCategory::ALL.to_vec());

        perform(&mut d, &UserAction::Click(c));
        assert!(!d.checked(c));
    }

    #[test]
    fn test_click_radio_selects_group() {
        let mut d = doc(
            "<input id=\"a\" type=\"radio\" name=\"size\" checked>\
             <input id=\"b\" type=\"radio\" name=\"size\">\
             <input id=\"x\" type=\"radio\" name=\"other\" checked>",
        );
        let a = d.element_by_id("a").unwrap();
        let b = d.element_by_id("b").unwrap();
        let x = d.element_by_id("x").unwrap();

        let out = perform(&mut d, &UserAction::Click(b));
        assert_eq!(out.len(), 3);
        assert!(d.checked(b));
        assert!(!d.checked(a));
        assert!(d.checked(x));

        let again = perform(&mut d, &UserAction::Click(b));
        assert_eq!(categories(&again), vec![EventCategory::Click]);
    }

    #[test]
    fn test_click_button() {
        let mut d = doc("<button id=\"b\">go</button>");
        let b = d.element_by_id("b").unwrap();
        let out = perform(&mut d, &UserAction::Click(b));
        assert_eq!(categories(&out), vec![EventCategory::Click]);
        assert_eq!(d.focused(), Some(b));
    }

    #[test]
    fn test_type_sets_value_and_focus() {
        let mut d = doc("<input id=\"i\">");
        let i = d.element_by_id("i").unwrap();
        let out = perform(&mut d, &UserAction::Type(i, "hello".into()));
        assert_eq!(categories(&out), vec![EventCategory::Input]);
        assert_eq!(d.value(i).as_deref(), Some("hello"));
        assert_eq!(d.focused(), Some(i));

        let out = perform(&mut d, &UserAction::Commit(i));
        assert_eq!(categories(&out), vec![EventCategory::Change]);
        assert_eq!(d.focused(), None);
    }

    #[test]
    fn test_type_into_non_control_does_nothing() {
        let mut d = doc("<div id=\"d\">x</div><input id=\"c\" type=\"checkbox\">");
        let div = d.element_by_id("d").unwrap();
        let c = d.element_by_id("c").unwrap();
        assert!(perform(&mut d, &UserAction::Type(div, "y".into())).is_empty());
        assert!(perform(&mut d, &UserAction::Type(c, "y".into())).is_empty());
    }

    #[test]
    fn test_select() {
        let mut d = doc("<select id=\"s\"><option>a</option><option>b</option></select>");
        let s = d.element_by_id("s").unwrap();
        let out = perform(&mut d, &UserAction::Select(s, "b".into()));
        assert_eq!(categories(&out), vec![EventCategory::Input, EventCategory::Change]);
        assert_eq!(d.value(s).as_deref(), Some("b"));
    }

    #[test]
    fn test_disabled_and_detached_targets() {
        let mut d = doc("<div id=\"p\"><button id=\"b\" disabled>x</button><button id=\"c\">y</button></div>");
        let b = d.element_by_id("b").unwrap();
        let c = d.element_by_id("c").unwrap();
        let p = d.element_by_id("p").unwrap();
        assert!(perform(&mut d, &UserAction::Click(b)).is_empty());

        d.remove_child(p, c);
        assert!(perform(&mut d, &UserAction::Click(c)).is_empty());
    }

    #[test]
    fn test_focus_only() {
        let mut d = doc("<input id=\"i\">");
        let i = d.element_by_id("i").unwrap();
        assert!(perform(&mut d, &UserAction::Focus(i)).is_empty());
        assert_eq!(d.focused(), Some(i));
    }
}
