//! Connection state machine and reconnect policy.

use std::fmt;
use std::time::Duration;

/// Lifecycle state of the live connection.
///
/// ```text
/// Connecting ──open──► Open ──close──► Reconnecting ──attach──► Connecting
///      │                 │                  │
///      └──── close ──────┴─► Closed ◄───────┘ (policy exhausted / shutdown)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    /// Waiting to retry; `attempt` counts consecutive failures
    Reconnecting { attempt: u32 },
    /// Terminal
    Closed,
}

impl ChannelState {
    pub fn is_open(self) -> bool {
        self == Self::Open
    }

    pub fn is_closed(self) -> bool {
        self == Self::Closed
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => f.write_str("connecting"),
            Self::Open => f.write_str("open"),
            Self::Reconnecting { attempt } => write!(f, "reconnecting (attempt {attempt})"),
            Self::Closed => f.write_str("closed"),
        }
    }
}

/// Exponential backoff between reconnect attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
    pub multiplier: f64,
    /// 0 means unlimited
    pub max_attempts: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            max: Duration::from_millis(8000),
            multiplier: 2.0,
            max_attempts: 0,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (1-based), capped at `max`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() || secs >= self.max.as_secs_f64() {
            return self.max;
        }
        Duration::from_secs_f64(secs)
    }

    /// Whether retry number `attempt` (1-based) is permitted.
    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts == 0 || attempt <= self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_grows_and_caps() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(1), Duration::from_millis(500));
        assert_eq!(backoff.delay(2), Duration::from_millis(1000));
        assert_eq!(backoff.delay(3), Duration::from_millis(2000));
        assert_eq!(backoff.delay(5), Duration::from_millis(8000));
        assert_eq!(backoff.delay(60), Duration::from_millis(8000));
        assert_eq!(backoff.delay(u32::MAX), Duration::from_millis(8000));
    }

    #[test]
    fn test_allows() {
        let unlimited = Backoff::default();
        assert!(unlimited.allows(1_000));

        let limited = Backoff {
            max_attempts: 3,
            ..Backoff::default()
        };
        assert!(limited.allows(3));
        assert!(!limited.allows(4));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ChannelState::Reconnecting { attempt: 2 }.to_string(), "reconnecting (attempt 2)");
        assert!(ChannelState::Open.is_open());
        assert!(ChannelState::Closed.is_closed());
    }
}
