//! `[views]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [views]
//! attribute = "data-live-view"   # Attribute marking view anchors
//! auto_rediscover = true         # Look for new anchors after every render
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Default anchor attribute.
pub const DEFAULT_VIEW_ATTRIBUTE: &str = "data-live-view";

/// View discovery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewsConfig {
    /// Attribute whose value is the view identifier.
    pub attribute: String,

    /// Rediscover anchors after each applied render.
    pub auto_rediscover: bool,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            attribute: DEFAULT_VIEW_ATTRIBUTE.to_string(),
            auto_rediscover: true,
        }
    }
}

impl ViewsConfig {
    const ATTRIBUTE: FieldPath = FieldPath::new("views.attribute");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let attr = &self.attribute;
        if attr.is_empty() {
            diag.error(Self::ATTRIBUTE, "attribute name is empty");
        } else if attr.contains(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '=' | '<' | '>' | '/')) {
            diag.error(Self::ATTRIBUTE, format!("`{attr}` is not a valid attribute name"));
        } else if attr.chars().any(|c| c.is_ascii_uppercase()) {
            diag.error_with_hint(
                Self::ATTRIBUTE,
                "attribute names are matched lowercase",
                format!("use \"{}\"", attr.to_ascii_lowercase()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    use super::*;

    #[test]
    fn test_views_config() {
        let config = test_parse_config("[views]\nattribute = \"data-view\"\nauto_rediscover = false");
        assert_eq!(config.views.attribute, "data-view");
        assert!(!config.views.auto_rediscover);
    }

    #[test]
    fn test_views_validation() {
        let mut diag = ConfigDiagnostics::new();
        ViewsConfig {
            attribute: "Data-View".into(),
            auto_rediscover: true,
        }
        .validate(&mut diag);
        assert_eq!(diag.len(), 1);
        assert!(diag.errors()[0].hint.is_some());

        let mut diag = ConfigDiagnostics::new();
        ViewsConfig::default().validate(&mut diag);
        assert!(diag.is_empty());
    }
}
