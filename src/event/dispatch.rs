//! Event bus: interaction → outbound event.

use smallvec::SmallVec;
use thiserror::Error;

use super::{EventCategory, Interaction};
use crate::dom::{Document, NodeId};
use crate::protocol::{EventPayload, OutboundMessage, ProtocolError};

/// Attribute overriding the value sent with an event.
pub const VALUE_OVERRIDE_ATTRIBUTE: &str = "live-value";

#[derive(Debug, Error)]
pub enum EventError {
    #[error("`{event}` on {target} has no `{attribute}` ancestor")]
    NoView {
        event: String,
        target: NodeId,
        attribute: String,
    },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Document-level listener registry.
///
/// Owns which categories are observed; the mapping from an interaction to a
/// message is the pure [`resolve`].
#[derive(Debug, Clone)]
pub struct EventBus {
    categories: SmallVec<[EventCategory; 3]>,
    view_attribute: String,
}

impl EventBus {
    /// A bus with nothing installed.
    pub fn new(view_attribute: impl Into<String>) -> Self {
        Self {
            categories: SmallVec::new(),
            view_attribute: view_attribute.into(),
        }
    }

    /// A bus listening to `categories`.
    pub fn with_categories(
        view_attribute: impl Into<String>,
        categories: impl IntoIterator<Item = EventCategory>,
    ) -> Self {
        let mut bus = Self::new(view_attribute);
        for category in categories {
            bus.install(category);
        }
        bus
    }

    /// Start observing a category. Returns `false` if already installed.
    pub fn install(&mut self, category: EventCategory) -> bool {
        if self.is_installed(category) {
            return false;
        }
        self.categories.push(category);
        true
    }

    #[cfg(test)]
    pub fn uninstall(&mut self, category: EventCategory) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| *c != category);
        self.categories.len() != before
    }

    pub fn is_installed(&self, category: EventCategory) -> bool {
        self.categories.contains(&category)
    }

    pub fn categories(&self) -> &[EventCategory] {
        &self.categories
    }

    pub fn view_attribute(&self) -> &str {
        &self.view_attribute
    }

    /// Handle one observed interaction.
    ///
    /// Interactions of categories that are not installed are never seen.
    pub fn dispatch(
        &self,
        doc: &Document,
        interaction: Interaction,
    ) -> Result<Option<OutboundMessage>, EventError> {
        if !self.is_installed(interaction.category) {
            return Ok(None);
        }
        resolve(
            doc,
            interaction.category,
            interaction.target,
            &self.view_attribute,
        )
    }
}

/// Map an interaction on `target` to the event it declares, if any.
///
/// Only `target` itself is consulted for `live-<category>`; the owning view
/// is the nearest element (inclusive) carrying `view_attribute`.
pub fn resolve(
    doc: &Document,
    category: EventCategory,
    target: NodeId,
    view_attribute: &str,
) -> Result<Option<OutboundMessage>, EventError> {
    let Some(event) = doc
        .attr(target, category.attribute())
        .filter(|name| !name.is_empty())
    else {
        return Ok(None);
    };

    let channel = doc
        .closest_with_attr(target, view_attribute)
        .and_then(|view| doc.attr(view, view_attribute))
        .ok_or_else(|| EventError::NoView {
            event: event.to_string(),
            target,
            attribute: view_attribute.to_string(),
        })?;

    let payload = extract_payload(doc, target);
    Ok(Some(OutboundMessage::event(event, &payload, channel)?))
}

/// Read the value an event on `target` carries, from live state.
///
/// - checkbox: its checked state
/// - non-empty `live-value`: the override
/// - otherwise the element's current value, if it has one
pub fn extract_payload(doc: &Document, target: NodeId) -> EventPayload {
    let Some(el) = doc.element(target) else {
        return EventPayload::empty();
    };

    if el.is_checkbox() {
        return EventPayload::new(doc.checked(target));
    }
    if let Some(value) = el
        .attr(VALUE_OVERRIDE_ATTRIBUTE)
        .filter(|value| !value.is_empty())
    {
        return EventPayload::new(value);
    }
    doc.value(target)
        .map(EventPayload::new)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::TlParser;
    use crate::protocol::PayloadValue;

    const VIEW: &str = "data-live-view";

    fn doc(markup: &str) -> Document {
        Document::parse(markup, &TlParser).unwrap()
    }

    fn payload_of(msg: &OutboundMessage) -> EventPayload {
        match msg {
            OutboundMessage::Event { data, .. } => EventPayload::decode(data).unwrap(),
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn test_no_attribute_no_message() {
        let d = doc("<div data-live-view=\"v\"><button id=\"b\">x</button></div>");
        let b = d.element_by_id("b").unwrap();
        assert!(resolve(&d, EventCategory::Click, b, VIEW).unwrap().is_none());
    }

    #[test]
    fn test_attribute_of_other_category_ignored() {
        let d = doc("<div data-live-view=\"v\"><input id=\"i\" live-change=\"save\"></div>");
        let i = d.element_by_id("i").unwrap();
        assert!(resolve(&d, EventCategory::Input, i, VIEW).unwrap().is_none());
        assert!(resolve(&d, EventCategory::Change, i, VIEW).unwrap().is_some());
    }

    #[test]
    fn test_ancestor_attribute_not_inherited() {
        let d = doc(
            "<div data-live-view=\"v\"><div live-click=\"open\"><span id=\"s\">x</span></div></div>",
        );
        let s = d.element_by_id("s").unwrap();
        assert!(resolve(&d, EventCategory::Click, s, VIEW).unwrap().is_none());
    }

    #[test]
    fn test_channel_is_nearest_view() {
        let d = doc(
            "<div data-live-view=\"outer\"><div data-live-view=\"inner\">\
             <button id=\"b\" live-click=\"inc\">+</button></div></div>",
        );
        let b = d.element_by_id("b").unwrap();
        let msg = resolve(&d, EventCategory::Click, b, VIEW).unwrap().unwrap();
        assert_eq!(msg.view(), "inner");
        match &msg {
            OutboundMessage::Event { event, .. } => assert_eq!(event, "inc"),
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn test_anchor_itself_can_declare() {
        let d = doc("<div id=\"v\" data-live-view=\"v\" live-click=\"poke\"></div>");
        let v = d.element_by_id("v").unwrap();
        let msg = resolve(&d, EventCategory::Click, v, VIEW).unwrap().unwrap();
        assert_eq!(msg.view(), "v");
        assert_eq!(payload_of(&msg), EventPayload::empty());
    }

    #[test]
    fn test_missing_view_is_error() {
        let d = doc("<button id=\"b\" live-click=\"orphan\">x</button>");
        let b = d.element_by_id("b").unwrap();
        let err = resolve(&d, EventCategory::Click, b, VIEW).unwrap_err();
        assert!(matches!(err, EventError::NoView { ref event, .. } if event == "orphan"));
    }

    #[test]
    fn test_checkbox_payload_is_checked_state() {
        let mut d = doc(
            "<div data-live-view=\"v1\"><input id=\"c\" type=\"checkbox\" value=\"on\" live-change=\"toggle\"></div>",
        );
        let c = d.element_by_id("c").unwrap();
        assert_eq!(extract_payload(&d, c).value, Some(PayloadValue::Bool(false)));
        d.set_checked(c, true);
        assert_eq!(extract_payload(&d, c).value, Some(PayloadValue::Bool(true)));
    }

    #[test]
    fn test_override_wins_over_value() {
        let mut d = doc(
            "<div data-live-view=\"v\"><input id=\"i\" value=\"native\" live-value=\"custom\" live-input=\"q\"></div>",
        );
        let i = d.element_by_id("i").unwrap();
        d.set_value(i, "typed");
        let msg = resolve(&d, EventCategory::Input, i, VIEW).unwrap().unwrap();
        assert_eq!(payload_of(&msg).value, Some(PayloadValue::Text("custom".into())));
    }

    #[test]
    fn test_empty_override_falls_back() {
        let d = doc("<input id=\"i\" value=\"native\" live-value=\"\">");
        let i = d.element_by_id("i").unwrap();
        assert_eq!(
            extract_payload(&d, i).value,
            Some(PayloadValue::Text("native".into()))
        );
    }

    #[test]
    fn test_live_value_read_at_dispatch() {
        let mut d = doc("<div data-live-view=\"v\"><input id=\"i\" live-input=\"search\"></div>");
        let i = d.element_by_id("i").unwrap();
        for text in ["r", "ru", "rus"] {
            d.set_value(i, text);
            let msg = resolve(&d, EventCategory::Input, i, VIEW).unwrap().unwrap();
            assert_eq!(payload_of(&msg).value, Some(PayloadValue::Text(text.into())));
        }
    }

    #[test]
    fn test_bus_ignores_uninstalled() {
        let d = doc("<div data-live-view=\"v\"><button id=\"b\" live-click=\"go\">x</button></div>");
        let b = d.element_by_id("b").unwrap();
        let mut bus = EventBus::new(VIEW);
        let interaction = Interaction::new(EventCategory::Click, b);
        assert!(bus.dispatch(&d, interaction).unwrap().is_none());

        assert!(bus.install(EventCategory::Click));
        assert!(!bus.install(EventCategory::Click));
        assert!(bus.dispatch(&d, interaction).unwrap().is_some());

        assert!(bus.uninstall(EventCategory::Click));
        assert!(bus.categories().is_empty());
    }
}
