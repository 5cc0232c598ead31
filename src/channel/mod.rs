//! Live connection management.
//!
//! A [`Channel`] owns the one live transport of a client and tracks the
//! connection lifecycle as an explicit [`ChannelState`] machine with a
//! [`Backoff`] reconnect policy. The transport itself is pluggable
//! ([`Transport`]): [`WsTransport`] for real sessions, an in-memory double
//! for tests.

mod endpoint;
#[cfg(test)]
pub mod memory;
mod state;
mod transport;
mod ws;

pub use endpoint::{DEFAULT_ROUTE, derive_endpoint};
pub use state::{Backoff, ChannelState};
pub use transport::{ChannelEvent, Transport, TransportError};
pub use ws::WsTransport;

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::protocol::{OutboundMessage, ProtocolError};

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel is not open ({0})")]
    NotOpen(ChannelState),

    #[error("unsupported page scheme `{0}` (expected http or https)")]
    UnsupportedScheme(String),

    #[error("channel has been shut down")]
    Shutdown,

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// The single live connection of a client.
pub struct Channel<T> {
    endpoint: Url,
    backoff: Backoff,
    reconnect: bool,
    state: ChannelState,
    transport: Option<T>,
    /// Consecutive failed connections since the last open
    failures: u32,
    /// Successful opens so far
    connections: u32,
    sent: u64,
    shut_down: bool,
}

impl<T: Transport> Channel<T> {
    pub fn new(endpoint: Url, backoff: Backoff, reconnect: bool) -> Self {
        Self {
            endpoint,
            backoff,
            reconnect,
            state: ChannelState::Connecting,
            transport: None,
            failures: 0,
            connections: 0,
            sent: 0,
            shut_down: false,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    #[cfg(test)]
    pub fn connections(&self) -> u32 {
        self.connections
    }

    #[cfg(test)]
    pub fn messages_sent(&self) -> u64 {
        self.sent
    }

    /// Whether the driver should establish a new transport.
    pub fn needs_transport(&self) -> bool {
        self.transport.is_none() && !self.state.is_closed()
    }

    pub fn transport_mut(&mut self) -> Option<&mut T> {
        self.transport.as_mut()
    }

    /// Install a freshly established transport. The channel becomes
    /// `Connecting` until [`Channel::opened`] is called.
    pub fn attach(&mut self, transport: T) -> Result<(), ChannelError> {
        if self.shut_down {
            return Err(ChannelError::Shutdown);
        }
        self.transport = Some(transport);
        self.state = ChannelState::Connecting;
        Ok(())
    }

    /// Mark the connection open. Returns `true` when this is a reconnect.
    pub fn opened(&mut self) -> bool {
        let reconnect = self.connections > 0;
        self.state = ChannelState::Open;
        self.failures = 0;
        self.connections += 1;
        crate::debug!("channel"; "open: {} (connection #{})", self.endpoint, self.connections);
        reconnect
    }

    /// Record a lost connection or a failed attempt.
    ///
    /// Returns the delay before the next attempt, or `None` if the channel
    /// is now closed for good.
    pub fn closed(&mut self) -> Option<Duration> {
        self.transport = None;
        if self.shut_down || !self.reconnect {
            self.state = ChannelState::Closed;
            return None;
        }

        self.failures += 1;
        if !self.backoff.allows(self.failures) {
            crate::debug!("channel"; "giving up after {} attempts", self.failures - 1);
            self.state = ChannelState::Closed;
            return None;
        }

        self.state = ChannelState::Reconnecting {
            attempt: self.failures,
        };
        Some(self.backoff.delay(self.failures))
    }

    /// Encode and send a message. Fails without queueing unless open.
    pub fn send(&mut self, message: &OutboundMessage) -> Result<(), ChannelError> {
        let transport = match (&self.state, self.transport.as_mut()) {
            (ChannelState::Open, Some(transport)) => transport,
            _ => return Err(ChannelError::NotOpen(self.state)),
        };
        let json = message.to_json()?;
        transport.send_text(&json)?;
        self.sent += 1;
        Ok(())
    }

    /// Close the transport and stop for good. Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        if let Some(mut transport) = self.transport.take()
            && let Err(e) = transport.close()
        {
            crate::debug!("channel"; "close failed: {}", e);
        }
        self.state = ChannelState::Closed;
    }
}
