use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
}

/// Something that was observed on the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Open,
    Message(String),
    /// Connection lost, with the peer's close reason if any
    Close(Option<String>),
}

/// Sending half of a live connection.
///
/// Receiving is left to the driver, which feeds [`ChannelEvent`]s into the
/// client one at a time.
pub trait Transport {
    /// Queue a text frame. Returns without waiting for delivery.
    fn send_text(&mut self, text: &str) -> Result<(), TransportError>;

    fn close(&mut self) -> Result<(), TransportError>;
}
