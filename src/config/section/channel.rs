//! `[channel]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [channel]
//! route = "/live-view"        # Path of the socket endpoint on the page's host
//! reconnect = true            # Retry after the connection drops
//!
//! [channel.backoff]
//! initial_ms = 500            # First retry delay
//! max_ms = 8000               # Delay cap
//! multiplier = 2.0            # Growth per consecutive failure
//! max_attempts = 0            # 0 = retry forever
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::channel::{Backoff, DEFAULT_ROUTE};
use crate::config::{ConfigDiagnostics, FieldPath};

/// Live connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Socket route, replaces the page path.
    pub route: String,

    /// Reconnect after the connection is lost.
    pub reconnect: bool,

    pub backoff: BackoffConfig,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            route: DEFAULT_ROUTE.to_string(),
            reconnect: true,
            backoff: BackoffConfig::default(),
        }
    }
}

/// Reconnect delays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    pub initial_ms: u64,
    pub max_ms: u64,
    pub multiplier: f64,
    /// `0` means unlimited.
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        let policy = Backoff::default();
        Self {
            initial_ms: policy.initial.as_millis() as u64,
            max_ms: policy.max.as_millis() as u64,
            multiplier: policy.multiplier,
            max_attempts: policy.max_attempts,
        }
    }
}

impl BackoffConfig {
    pub fn policy(&self) -> Backoff {
        Backoff {
            initial: Duration::from_millis(self.initial_ms),
            max: Duration::from_millis(self.max_ms),
            multiplier: self.multiplier,
            max_attempts: self.max_attempts,
        }
    }
}

impl ChannelConfig {
    const ROUTE: FieldPath = FieldPath::new("channel.route");
    const INITIAL_MS: FieldPath = FieldPath::new("channel.backoff.initial_ms");
    const MAX_MS: FieldPath = FieldPath::new("channel.backoff.max_ms");
    const MULTIPLIER: FieldPath = FieldPath::new("channel.backoff.multiplier");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.route.trim().is_empty() {
            diag.error_with_hint(Self::ROUTE, "route is empty", format!("use \"{DEFAULT_ROUTE}\""));
        } else if self.route.contains(['?', '#']) {
            diag.error_with_hint(
                Self::ROUTE,
                "route must be a plain path",
                "the page's query string is forwarded automatically",
            );
        }

        let backoff = &self.backoff;
        if backoff.initial_ms == 0 {
            diag.error(Self::INITIAL_MS, "must be greater than 0");
        }
        if backoff.max_ms < backoff.initial_ms {
            diag.error(
                Self::MAX_MS,
                format!("must be at least initial_ms ({})", backoff.initial_ms),
            );
        }
        if !backoff.multiplier.is_finite() || backoff.multiplier < 1.0 {
            diag.error(Self::MULTIPLIER, "must be a number >= 1.0");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};

    use super::*;

    #[test]
    fn test_channel_config() {
        let config = test_parse_config(
            "[channel]\nroute = \"/ws\"\nreconnect = false\n\n[channel.backoff]\ninitial_ms = 100\nmax_attempts = 5",
        );
        assert_eq!(config.channel.route, "/ws");
        assert!(!config.channel.reconnect);

        let policy = config.channel.backoff.policy();
        assert_eq!(policy.initial, Duration::from_millis(100));
        assert_eq!(policy.max, Duration::from_millis(8000));
        assert_eq!(policy.max_attempts, 5);
    }

    #[test]
    fn test_channel_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.channel, ChannelConfig::default());
        assert_eq!(config.channel.route, "/live-view");
        assert_eq!(config.channel.backoff.policy(), Backoff::default());
    }

    #[test]
    fn test_channel_validation() {
        let config = test_parse_config(
            "[channel]\nroute = \"/live?x=1\"\n\n[channel.backoff]\ninitial_ms = 0\nmultiplier = 0.5",
        );
        let mut diag = ConfigDiagnostics::new();
        config.channel.validate(&mut diag);
        assert_eq!(diag.len(), 3);
    }
}
