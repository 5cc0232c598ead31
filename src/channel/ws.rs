//! WebSocket transport on `tungstenite`.
//!
//! The handshake is blocking; afterwards the socket is switched to
//! non-blocking mode and polled by the session loop.

use std::io::ErrorKind;
use std::net::TcpStream;

use tungstenite::protocol::Message;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::WebSocket;
use url::Url;

use super::transport::{ChannelEvent, Transport, TransportError};

pub struct WsTransport {
    ws: WebSocket<MaybeTlsStream<TcpStream>>,
    closed: bool,
}

fn would_block(err: &tungstenite::Error) -> bool {
    matches!(err, tungstenite::Error::Io(e) if e.kind() == ErrorKind::WouldBlock)
}

impl WsTransport {
    /// Open a connection and complete the handshake.
    pub fn connect(endpoint: &Url) -> Result<Self, TransportError> {
        let (ws, response) = tungstenite::connect(endpoint.as_str())?;
        crate::debug!("ws"; "handshake complete ({})", response.status());

        if let MaybeTlsStream::Plain(stream) = ws.get_ref() {
            stream.set_nonblocking(true).map_err(tungstenite::Error::Io)?;
        }
        Ok(Self { ws, closed: false })
    }

    /// Non-blocking read. `None` when nothing is pending.
    pub fn poll(&mut self) -> Option<ChannelEvent> {
        if self.closed {
            return None;
        }

        if let Err(e) = self.ws.flush()
            && !would_block(&e)
        {
            return Some(self.lost(Some(e.to_string())));
        }

        match self.ws.read() {
            Ok(Message::Text(text)) => Some(ChannelEvent::Message(text.to_string())),
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes.to_vec()) {
                Ok(text) => Some(ChannelEvent::Message(text)),
                Err(_) => {
                    crate::debug!("ws"; "ignoring non-utf8 binary frame");
                    None
                }
            },
            Ok(Message::Close(frame)) => {
                let reason = frame
                    .map(|f| f.reason.as_str().to_string())
                    .filter(|reason| !reason.is_empty());
                Some(self.lost(reason))
            }
            Ok(_) => None,
            Err(ref e) if would_block(e) => None,
            Err(e) => Some(self.lost(Some(e.to_string()))),
        }
    }

    fn lost(&mut self, reason: Option<String>) -> ChannelEvent {
        self.closed = true;
        ChannelEvent::Close(reason)
    }
}

impl Transport for WsTransport {
    fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        match self.ws.send(Message::Text(text.to_owned().into())) {
            Ok(()) => Ok(()),
            // Frame is buffered; the next poll flushes it
            Err(ref e) if would_block(e) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.ws.close(None) {
            Ok(()) => Ok(()),
            Err(ref e) if would_block(e) => Ok(()),
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
