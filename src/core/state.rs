//! Session state tracking.
//!
//! Two flags:
//! - `SESSION`: Is a live session running? (graceful shutdown possible)
//! - `SHUTDOWN`: Has shutdown been requested? (Ctrl+C received)

use std::sync::atomic::{AtomicBool, Ordering};

/// A session loop is running and polls `SHUTDOWN`
static SESSION: AtomicBool = AtomicBool::new(false);

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Before `register_session()`: exit immediately, nothing to close
/// - After `register_session()`: set SHUTDOWN, the loop closes the channel
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if is_session_active() {
            crate::log!("live"; "shutting down...");
        } else {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Mark the session loop as running
pub fn register_session() {
    SESSION.store(true, Ordering::SeqCst);
}

pub fn is_session_active() -> bool {
    SESSION.load(Ordering::SeqCst)
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_flag() {
        register_session();
        assert!(is_session_active());
    }

    #[test]
    fn test_shutdown_not_requested() {
        assert!(!is_shutdown());
    }
}
