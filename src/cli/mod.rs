//! Command-line interface module.

mod args;
pub mod connect;
pub mod script;
pub mod views;

pub use args::{Cli, Commands, SessionArgs};
