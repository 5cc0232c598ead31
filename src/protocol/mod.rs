//! Live View Wire Protocol
//!
//! JSON text frames exchanged over the live connection.
//!
//! # Message Types
//!
//! - `{"subscribe": id}`: announce interest in a view (client → server)
//! - `{"event": name, "data": payload, "channel": id}`: forward an
//!   interaction (client → server)
//! - `{"id": id, "render": html}`: new markup for a view (server → client)

mod message;
mod payload;

pub use message::{InboundMessage, OutboundMessage, RenderMessage};
pub use payload::{EventPayload, PayloadValue};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("undecodable message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}
