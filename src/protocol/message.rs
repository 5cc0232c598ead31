use serde::{Deserialize, Serialize};

use super::{EventPayload, ProtocolError};

/// Client → server message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    /// Announce interest in a view
    Subscribe { subscribe: String },

    /// Forward an interaction
    Event {
        /// Declared event name (`live-click="save"` → `save`)
        event: String,
        /// JSON-encoded [`EventPayload`]
        data: String,
        /// Owning view identifier
        channel: String,
    },
}

impl OutboundMessage {
    pub fn subscribe(view: impl Into<String>) -> Self {
        Self::Subscribe {
            subscribe: view.into(),
        }
    }

    pub fn event(
        name: impl Into<String>,
        payload: &EventPayload,
        channel: impl Into<String>,
    ) -> Result<Self, ProtocolError> {
        Ok(Self::Event {
            event: name.into(),
            data: payload.encode()?,
            channel: channel.into(),
        })
    }

    /// View this message concerns.
    pub fn view(&self) -> &str {
        match self {
            Self::Subscribe { subscribe } => subscribe,
            Self::Event { channel, .. } => channel,
        }
    }

    pub fn is_subscribe(&self) -> bool {
        matches!(self, Self::Subscribe { .. })
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}

/// New markup for every anchor bound to `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderMessage {
    pub id: String,
    pub render: String,
}

/// Server → client message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    Render(RenderMessage),
}

impl InboundMessage {
    pub fn render(id: impl Into<String>, render: impl Into<String>) -> Self {
        Self::Render(RenderMessage {
            id: id.into(),
            render: render.into(),
        })
    }

    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text)
            .map(Self::Render)
            .map_err(ProtocolError::Decode)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        match self {
            Self::Render(msg) => serde_json::to_string(msg).map_err(ProtocolError::Encode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_format() {
        let json = OutboundMessage::subscribe("counter").to_json().unwrap();
        assert_eq!(json, r#"{"subscribe":"counter"}"#);
    }

    #[test]
    fn test_event_format() {
        let msg = OutboundMessage::event("toggle", &EventPayload::new(true), "v1").unwrap();
        let json = msg.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"event":"toggle","data":"{\"value\":true}","channel":"v1"}"#
        );
        assert_eq!(msg.view(), "v1");
        assert!(!msg.is_subscribe());
    }

    #[test]
    fn test_outbound_parses_back() {
        let parsed: OutboundMessage =
            serde_json::from_str(r#"{"event":"save","data":"{}","channel":"form"}"#).unwrap();
        assert_eq!(
            parsed,
            OutboundMessage::Event {
                event: "save".into(),
                data: "{}".into(),
                channel: "form".into(),
            }
        );
    }

    #[test]
    fn test_render_from_json() {
        let msg = InboundMessage::from_json(r#"{"id":"clock","render":"<b>12:00</b>"}"#).unwrap();
        assert_eq!(msg, InboundMessage::render("clock", "<b>12:00</b>"));
    }

    #[test]
    fn test_render_ignores_extra_fields() {
        let msg = InboundMessage::from_json(r#"{"id":"a","render":"","seq":3}"#).unwrap();
        assert_eq!(msg, InboundMessage::render("a", ""));
    }

    #[test]
    fn test_undecodable_inbound() {
        assert!(matches!(
            InboundMessage::from_json("not json"),
            Err(ProtocolError::Decode(_))
        ));
        assert!(matches!(
            InboundMessage::from_json(r#"{"subscribe":"a"}"#),
            Err(ProtocolError::Decode(_))
        ));
    }
}
