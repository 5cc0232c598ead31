//! In-memory transport recording every frame sent.

use std::cell::RefCell;
use std::rc::Rc;

use super::transport::{Transport, TransportError};
use crate::protocol::OutboundMessage;

#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    frames: Rc<RefCell<Vec<String>>>,
    closed: Rc<RefCell<bool>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw frames sent so far.
    pub fn frames(&self) -> Vec<String> {
        self.frames.borrow().clone()
    }

    /// Sent frames decoded back into messages.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.frames
            .borrow()
            .iter()
            .map(|frame| serde_json::from_str(frame).unwrap())
            .collect()
    }

    pub fn clear(&self) {
        self.frames.borrow_mut().clear();
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

impl Transport for MemoryTransport {
    fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        self.frames.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        *self.closed.borrow_mut() = true;
        Ok(())
    }
}
