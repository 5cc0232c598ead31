//! Config field path used in diagnostics.

use std::fmt;

use owo_colors::OwoColorize;

/// Dotted path of a config field, e.g. `channel.backoff.max_ms`.
///
/// Sections declare their paths as associated constants:
///
/// ```ignore
/// impl ViewsConfig {
///     const ATTRIBUTE: FieldPath = FieldPath::new("views.attribute");
/// }
///
/// diag.error(Self::ATTRIBUTE, "attribute name is empty");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// Top-level section (`channel` for `channel.backoff.max_ms`).
    pub fn section(&self) -> &'static str {
        self.0.split('.').next().unwrap_or(self.0)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        self.0
    }
}
