use serde::{Deserialize, Serialize};

use super::ProtocolError;

/// Value carried by an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadValue {
    /// Checked state of a toggle control
    Bool(bool),
    /// Current value or `live-value` override
    Text(String),
}

impl From<bool> for PayloadValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for PayloadValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for PayloadValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Event data, sent JSON-encoded inside the `data` field.
///
/// Elements without a value (no form control, no override) encode as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<PayloadValue>,
}

impl EventPayload {
    pub fn new(value: impl Into<PayloadValue>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Encode as the JSON string placed in an event's `data` field.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    pub fn decode(data: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_bool() {
        assert_eq!(EventPayload::new(true).encode().unwrap(), r#"{"value":true}"#);
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(
            EventPayload::new("a \"b\"").encode().unwrap(),
            r#"{"value":"a \"b\""}"#
        );
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(EventPayload::empty().encode().unwrap(), "{}");
    }

    #[test]
    fn test_decode_keeps_value_type() {
        let payload = EventPayload::decode(r#"{"value":false}"#).unwrap();
        assert_eq!(payload.value, Some(PayloadValue::Bool(false)));
        let payload = EventPayload::decode(r#"{"value":"false"}"#).unwrap();
        assert_eq!(payload.value, Some(PayloadValue::Text("false".into())));
    }
}
