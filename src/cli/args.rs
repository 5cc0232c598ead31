//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

/// Headless live-view client
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: live.toml)
    #[arg(short = 'C', long, default_value = "live.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Show channel traffic and view bookkeeping
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a live session for a page, reading actions from stdin
    #[command(visible_alias = "c")]
    Connect {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// List the live views a page declares, without connecting
    #[command(visible_alias = "v")]
    Views {
        /// Server-rendered page markup
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        page: PathBuf,
    },

    /// Print the WebSocket endpoint for a page URL
    #[command(visible_alias = "e")]
    Endpoint {
        /// Page location (http, https, ws or wss)
        url: Url,

        /// Socket route replacing the page path
        #[arg(short, long)]
        route: Option<String>,
    },
}

/// Arguments of a live session
#[derive(clap::Args, Debug, Clone)]
pub struct SessionArgs {
    /// Page location the endpoint is derived from
    pub url: Url,

    /// Server-rendered page markup
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub page: PathBuf,

    /// Socket route replacing the page path (default: /live-view)
    #[arg(short, long)]
    pub route: Option<String>,

    /// Stop at the first lost connection instead of retrying
    #[arg(long)]
    pub no_reconnect: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_args() {
        let cli = Cli::try_parse_from([
            "liveview",
            "-v",
            "connect",
            "http://localhost:4000/todo",
            "--page",
            "todo.html",
            "--no-reconnect",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("live.toml"));
        match cli.command {
            Commands::Connect { session } => {
                assert_eq!(session.url.path(), "/todo");
                assert_eq!(session.page, PathBuf::from("todo.html"));
                assert!(session.route.is_none());
                assert!(session.no_reconnect);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_page_is_required() {
        assert!(Cli::try_parse_from(["liveview", "connect", "http://localhost/"]).is_err());
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(Cli::try_parse_from(["liveview", "endpoint", "not a url"]).is_err());
    }

    #[test]
    fn test_endpoint_alias() {
        let cli = Cli::try_parse_from(["liveview", "e", "https://example.com/", "-r", "/ws"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Endpoint { route: Some(ref r), .. } if r == "/ws"
        ));
    }
}
