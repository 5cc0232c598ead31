//! `connect`: a live session against a real server.
//!
//! One loop owns the client. Each turn it (re)connects when due, drains
//! the socket, then runs at most one pending script line from stdin.
//!
//! ```text
//! stdin ──► reader thread ──► crossbeam channel ─┐
//!                                                ├──► session loop ──► LiveClient
//! WebSocket (non-blocking poll) ─────────────────┘
//! ```

use std::io::{self, BufRead};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam::channel::{self, Receiver, TryRecvError};

use super::args::SessionArgs;
use super::script::ScriptCommand;
use super::views::load_page;
use crate::channel::{ChannelEvent, ChannelState, WsTransport};
use crate::client::{ClientOptions, Handled, LiveClient};
use crate::config::ClientConfig;
use crate::core::{is_shutdown, register_session};
use crate::logger::{status_closed, status_connected, status_error, status_reconnecting};
use crate::{debug, log};

/// Pause between loop turns when nothing is pending.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

type Client = LiveClient<WsTransport>;

/// Whether the loop keeps going after a script line.
enum Flow {
    Continue,
    Quit,
}

pub fn run_session(config: &ClientConfig, session: &SessionArgs) -> Result<()> {
    let doc = load_page(&session.page)?;
    let options = ClientOptions::from_config(config, &session.url)
        .with_context(|| format!("cannot derive an endpoint from {}", session.url))?;
    let mut client: Client = LiveClient::with_document(doc, options);
    log!("live"; "session for {} via {}", session.page.display(), client.endpoint());

    register_session();
    let mut input = Some(spawn_stdin_reader());
    let mut retry_at = Some(Instant::now());

    while !is_shutdown() && !client.state().is_closed() {
        if client.needs_transport() && retry_at.is_some_and(|at| Instant::now() >= at) {
            retry_at = connect(&mut client);
        }

        while let Some(event) = client.transport_mut().and_then(WsTransport::poll) {
            if let Some(at) = on_channel_event(&mut client, event) {
                retry_at = Some(at);
            }
        }

        let mut idle = true;
        if let Some(rx) = &input {
            match rx.try_recv() {
                Ok(line) => {
                    idle = false;
                    if let Flow::Quit = run_line(&mut client, &line) {
                        break;
                    }
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    debug!("live"; "stdin closed, session keeps running until Ctrl+C");
                    input = None;
                }
            }
        }

        if idle {
            thread::sleep(POLL_INTERVAL);
        }
    }

    client.shutdown();
    let stats = client.stats();
    log!(
        "live";
        "session ended: {} subscription(s), {} render(s), {} event(s), {} error(s)",
        stats.subscriptions, stats.renders, stats.events_sent, stats.errors
    );
    Ok(())
}

/// Try to establish a transport. Returns when to try again on failure.
fn connect(client: &mut Client) -> Option<Instant> {
    let endpoint = client.endpoint().clone();
    debug!("ws"; "connecting to {}", endpoint);

    let event = match WsTransport::connect(&endpoint) {
        Ok(transport) => match client.attach(transport) {
            Ok(()) => ChannelEvent::Open,
            Err(e) => {
                log!("error"; "{}", e);
                return None;
            }
        },
        Err(e) => ChannelEvent::Close(Some(e.to_string())),
    };
    on_channel_event(client, event)
}

/// Feed one channel event to the client and report on it.
fn on_channel_event(client: &mut Client, event: ChannelEvent) -> Option<Instant> {
    let reason = match &event {
        ChannelEvent::Close(reason) => reason.clone(),
        _ => None,
    };

    match client.handle(event) {
        Ok(Handled::Opened { .. }) => {
            status_connected(client.endpoint().as_str());
            None
        }
        Ok(Handled::Rendered { view, .. }) => {
            for (i, markup) in client.view_markup(&view).iter().enumerate() {
                log!("view"; "{}[{}]: {}", view, i, markup);
            }
            None
        }
        Ok(Handled::Closed { reconnect_in }) => match (reconnect_in, client.state()) {
            (Some(delay), ChannelState::Reconnecting { attempt }) => {
                status_reconnecting(attempt, delay);
                Some(Instant::now() + delay)
            }
            _ => {
                status_closed(reason.as_deref());
                None
            }
        },
        Ok(Handled::Dropped { .. } | Handled::Ignored) => None,
        Err(e) => {
            log!("error"; "{}", e);
            None
        }
    }
}

fn run_line(client: &mut Client, line: &str) -> Flow {
    let command = match ScriptCommand::parse_line(line) {
        Ok(Some(command)) => command,
        Ok(None) => return Flow::Continue,
        Err(e) => {
            log!("error"; "{}", e);
            return Flow::Continue;
        }
    };

    let action = match command.action(client.document()) {
        Ok(action) => action,
        Err(e) => {
            log!("error"; "{}", e);
            return Flow::Continue;
        }
    };

    if let Some(action) = action {
        match client.interact(&action) {
            Ok(sent) => {
                debug!("event"; "{} → {} message(s)", action, sent.len());
            }
            Err(e) => status_error(&format!("{action} failed"), &e.to_string()),
        }
        return Flow::Continue;
    }

    match command {
        ScriptCommand::Views => print_views(client),
        ScriptCommand::Dump => println!("{}", client.document().outer_html(client.document().root())),
        ScriptCommand::Quit => return Flow::Quit,
        _ => {}
    }
    Flow::Continue
}

fn print_views(client: &Client) {
    let registry = client.registry();
    if registry.is_empty() {
        log!("view"; "no views bound");
        return;
    }
    for view in registry.view_ids() {
        let bindings = registry.bindings(view);
        let subscribed = bindings.iter().filter(|b| b.subscribed).count();
        log!(
            "view";
            "{}: {} anchor(s), {} subscribed",
            view, bindings.len(), subscribed
        );
    }
}

/// Read stdin line by line on a background thread.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = channel::unbounded();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
