//! `[events]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [events]
//! categories = ["click", "change", "input"]   # Interactions forwarded to the server
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::event::EventCategory;

/// Interaction capture settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Categories the event bus listens to.
    pub categories: Vec<EventCategory>,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            categories: EventCategory::ALL.to_vec(),
        }
    }
}

impl EventsConfig {
    const CATEGORIES: FieldPath = FieldPath::new("events.categories");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (i, category) in self.categories.iter().enumerate() {
            if self.categories[..i].contains(category) {
                diag.error(Self::CATEGORIES, format!("`{category}` listed more than once"));
            }
        }
        if self.categories.is_empty() {
            diag.hint(Self::CATEGORIES, "no categories: interactions will not be forwarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    use super::*;

    #[test]
    fn test_events_config() {
        let config = test_parse_config("[events]\ncategories = [\"click\"]");
        assert_eq!(config.events.categories, vec![EventCategory::Click]);
    }

    #[test]
    fn test_events_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(
            config.events.categories,
            vec![EventCategory::Click, EventCategory::Change, EventCategory::Input]
        );
    }

    #[test]
    fn test_duplicate_category() {
        let config = test_parse_config("[events]\ncategories = [\"input\", \"input\"]");
        let mut diag = ConfigDiagnostics::new();
        config.events.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
