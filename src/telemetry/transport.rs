//! Transport abstraction: any message-oriented link to the remote peer.
//!
//! Concrete implementations:
//! - [`LinkTransport`](super::io_task::LinkTransport): WebSocket client
//!   driven by a dedicated I/O thread
//! - [`NullTransport`]: discards everything (offline runs, tests)
//!
//! The [`TelemetryChannel`](super::channel::TelemetryChannel) is generic
//! over `Transport`, so adding a link requires zero changes to the
//! channel state machine.

use crate::error::LinkError;

/// Connection-level events delivered from the link into the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// The connection attempt succeeded.
    Opened,
    /// A text frame arrived.
    Text(String),
    /// A binary frame arrived.
    Binary(Vec<u8>),
    /// The remote peer closed the connection.
    Closed,
    /// Connecting failed or the connection broke.
    Failed(String),
}

/// Outbound side of a message-oriented link.
pub trait Transport {
    /// Queue one text frame for the remote peer.  `LinkError::QueueFull`
    /// means the frame was not queued but the link is healthy; any other
    /// error means the link is broken.
    fn send_text(&mut self, frame: String) -> Result<(), LinkError>;

    /// Close the link.  Idempotent.
    fn close(&mut self);
}

/// A null transport that accepts and discards every frame.
/// Useful when no telemetry endpoint is reachable.
#[derive(Debug, Default)]
pub struct NullTransport {
    sent: u64,
}

impl NullTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames discarded so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl Transport for NullTransport {
    fn send_text(&mut self, _frame: String) -> Result<(), LinkError> {
        self.sent += 1;
        Ok(())
    }

    fn close(&mut self) {}
}
