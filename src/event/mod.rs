//! Interaction capture.
//!
//! - [`EventBus`] - registered categories plus the resolution of an
//!   interaction to an outbound event
//! - [`simulate`] - user actions turned into the interactions a browser
//!   would deliver

mod dispatch;
pub mod simulate;

pub use dispatch::{EventBus, EventError, extract_payload, resolve};
pub use simulate::{UserAction, perform};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dom::NodeId;

/// Interaction category observed at document level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    /// Pointer activation
    Click,
    /// Committed value change
    Change,
    /// Every value edit
    Input,
}

impl EventCategory {
    pub const ALL: [Self; 3] = [Self::Click, Self::Change, Self::Input];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Change => "change",
            Self::Input => "input",
        }
    }

    /// Attribute declaring the event name for this category (`live-click`).
    pub const fn attribute(self) -> &'static str {
        match self {
            Self::Click => "live-click",
            Self::Change => "live-change",
            Self::Input => "live-input",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown event category `{s}`"))
    }
}

/// One interaction delivered to the bus: a category and its target element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interaction {
    pub category: EventCategory,
    pub target: NodeId,
}

impl Interaction {
    pub fn new(category: EventCategory, target: NodeId) -> Self {
        Self { category, target }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names() {
        assert_eq!(EventCategory::Click.attribute(), "live-click");
        assert_eq!(EventCategory::Input.to_string(), "input");
        assert_eq!("CHANGE".parse::<EventCategory>(), Ok(EventCategory::Change));
        assert!("hover".parse::<EventCategory>().is_err());
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&EventCategory::ALL).unwrap();
        assert_eq!(json, r#"["click","change","input"]"#);
    }
}
