//! Logging utilities with colored output and a connection status line.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` / `debug_do!` for output that only appears with `--verbose`
//! - `StatusLine` for the single-line connection status of a session
//!
//! # Example
//!
//! ```ignore
//! log!("live"; "hydrated {} views", count);
//! debug!("channel"; "sent {}", json);
//! status_connected("ws://localhost:4000/live-view");
//! ```

use std::{
    io::{Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::Duration,
};

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Lines printed by the last status update that a new status may overwrite.
/// Reset by `log()` so regular output is never erased.
static STATUS_LINES: AtomicUsize = AtomicUsize::new(0);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

/// Execute code only when --verbose is enabled
///
/// # Usage
/// ```ignore
/// debug_do! {
///     let markup = doc.outer_html(anchor);
///     debug!("view"; "mounted: {}", markup);
/// }
/// ```
#[macro_export]
macro_rules! debug_do {
    ($($body:tt)*) => {{
        if $crate::logger::is_verbose() {
            $($body)*
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();

    STATUS_LINES.store(0, Ordering::SeqCst);
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "live" => prefix.bright_blue().bold().to_string(),
        "channel" | "ws" => prefix.bright_green().bold().to_string(),
        "view" | "event" => prefix.bright_cyan().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Status Line (connection status with overwrite)
// ============================================================================

/// Current UTC time formatted as HH:MM:SS
fn now() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Single-line connection status
///
/// Each update overwrites the previous one as long as nothing else was
/// logged in between, so a flapping connection leaves one line behind.
///
/// # Example
///
/// ```ignore
/// let mut status = StatusLine::new();
/// status.connected("ws://localhost:4000/live-view");
/// status.reconnecting(2, Duration::from_secs(1));
/// status.closed(Some("server shutting down"));
/// ```
pub struct StatusLine;

/// Global status shared by the session loop and the Ctrl+C path.
static STATUS: LazyLock<Mutex<StatusLine>> = LazyLock::new(|| Mutex::new(StatusLine::new()));

impl StatusLine {
    pub const fn new() -> Self {
        Self
    }

    /// Display connected message (● prefix, green).
    pub fn connected(&mut self, endpoint: &str) {
        self.display(format!("{}", "●".green()), &format!("connected to {endpoint}"));
    }

    /// Display reconnect countdown (↻ prefix, yellow).
    pub fn reconnecting(&mut self, attempt: u32, delay: Duration) {
        self.display(
            format!("{}", "↻".yellow()),
            &format!(
                "connection lost, retry #{attempt} in {}ms",
                delay.as_millis()
            ),
        );
    }

    /// Display closed message (○ prefix, dimmed) with optional reason.
    pub fn closed(&mut self, reason: Option<&str>) {
        let message = match reason {
            Some(reason) => format!("disconnected: {reason}"),
            None => "disconnected".to_string(),
        };
        self.display(format!("{}", "○".dimmed()), &message);
    }

    /// Display error message (✗ prefix, red) with optional detail.
    pub fn error(&mut self, summary: &str, detail: &str) {
        let message = if detail.is_empty() {
            summary.to_string()
        } else {
            format!("{summary}\n{detail}")
        };
        self.display(format!("{}", "✗".red()), &message);
    }

    fn display(&mut self, symbol: String, message: &str) {
        let mut stdout = stdout().lock();

        let last_lines = STATUS_LINES.load(Ordering::SeqCst);
        if last_lines > 0 {
            #[allow(clippy::cast_possible_truncation)]
            let lines = last_lines as u16;
            execute!(stdout, cursor::MoveUp(lines)).ok();
            execute!(stdout, Clear(ClearType::FromCursorDown)).ok();
        }

        let timestamp = format!("[{}]", now()).dimmed().to_string();
        writeln!(stdout, "{timestamp} {symbol} {message}").ok();
        stdout.flush().ok();

        STATUS_LINES.store(line_count(message), Ordering::SeqCst);
    }
}

fn line_count(message: &str) -> usize {
    message.matches('\n').count() + 1
}

/// Global status: connected
pub fn status_connected(endpoint: &str) {
    STATUS.lock().connected(endpoint);
}

/// Global status: reconnecting
pub fn status_reconnecting(attempt: u32, delay: Duration) {
    STATUS.lock().reconnecting(attempt, delay);
}

/// Global status: closed
pub fn status_closed(reason: Option<&str>) {
    STATUS.lock().closed(reason);
}

/// Global status: error
pub fn status_error(summary: &str, detail: &str) {
    STATUS.lock().error(summary, detail);
}

// ============================================================================
// Tests
// ============================================================================
