//! Process-wide state shared by the session loop and the Ctrl+C handler.

mod state;

pub use state::{is_session_active, is_shutdown, register_session, setup_shutdown_handler};
