//! Telemetry channel state machine.
//!
//! ```text
//!              Opened                Closed
//!  Connecting ────────▶ Open ──────────────────▶ Closed
//!      │                 │
//!      │ Failed          │ Failed / write error
//!      ▼                 ▼
//!    Failed ◀────────────┘
//! ```
//!
//! `Closed` and `Failed` are terminal: the link makes exactly one
//! connection attempt and is never re-established, and the transport is
//! released on entry.  On entering `Open` one handshake envelope is sent.
//! A full outbound queue drops the frame and leaves the channel open.  Inbound frames are decoded
//! structurally; failures are counted and reported, never propagated,
//! and never change the state.

use heapless::Deque;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::envelope::{Envelope, InboundMessage, OutboundMessage};
use super::transport::{LinkEvent, Transport};
use crate::error::{DecodeError, LinkError};

/// Envelopes retained in the inbound log before the oldest is evicted.
pub const INBOUND_LOG_CAPACITY: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
    Failed,
}

impl ChannelState {
    /// No further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }
}

// ---------------------------------------------------------------------------
// Inbound log
// ---------------------------------------------------------------------------

/// Bounded FIFO of decoded inbound envelopes.
#[derive(Debug, Clone, Default)]
pub struct InboundLog {
    entries: Deque<InboundMessage, INBOUND_LOG_CAPACITY>,
    evicted: u64,
}

impl InboundLog {
    pub fn push(&mut self, msg: InboundMessage) {
        if self.entries.is_full() {
            let _ = self.entries.pop_front();
            self.evicted += 1;
        }
        let _ = self.entries.push_back(msg);
    }

    pub fn snapshot(&self) -> Vec<InboundMessage> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Envelopes dropped to make room.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// What a link event did to the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelOutcome {
    StateChanged { from: ChannelState, to: ChannelState },
    Received(InboundMessage),
    Rejected(DecodeError),
}

/// Result of [`TelemetryChannel::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// Channel not open; the message was dropped.
    NotOpen,
    /// Outbound queue full; the message was dropped, the channel stays open.
    Dropped,
    /// The transport rejected the write; the channel is now `Failed`.
    LinkFailed,
}

/// Channel counters, exposed through session snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub sent: u64,
    pub dropped: u64,
    pub received: u64,
    pub decode_failures: u64,
    pub inbound_evicted: u64,
}

pub struct TelemetryChannel<T: Transport> {
    transport: T,
    state: ChannelState,
    handshake: String,
    inbound: InboundLog,
    sent: u64,
    dropped: u64,
    received: u64,
    decode_failures: u64,
}

impl<T: Transport> TelemetryChannel<T> {
    pub fn new(transport: T, handshake: impl Into<String>) -> Self {
        Self {
            transport,
            state: ChannelState::Connecting,
            handshake: handshake.into(),
            inbound: InboundLog::default(),
            sent: 0,
            dropped: 0,
            received: 0,
            decode_failures: 0,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }

    /// Feed one link event.  Returns what changed, if anything.
    pub fn on_event(&mut self, event: LinkEvent) -> Option<ChannelOutcome> {
        match (self.state, event) {
            (ChannelState::Connecting, LinkEvent::Opened) => {
                self.state = ChannelState::Open;
                info!("Telemetry: link open");
                let handshake = Envelope::client_msg(self.handshake.clone());
                let to = match self.send(&handshake) {
                    SendOutcome::LinkFailed => ChannelState::Failed,
                    _ => ChannelState::Open,
                };
                Some(ChannelOutcome::StateChanged {
                    from: ChannelState::Connecting,
                    to,
                })
            }
            (ChannelState::Open, LinkEvent::Opened) => {
                debug!("Telemetry: duplicate open ignored");
                None
            }
            (ChannelState::Open, LinkEvent::Text(frame)) => Some(self.accept(Envelope::decode(&frame))),
            (ChannelState::Open, LinkEvent::Binary(frame)) => {
                Some(self.accept(Envelope::decode_bytes(&frame)))
            }
            (from @ (ChannelState::Connecting | ChannelState::Open), LinkEvent::Closed) => {
                self.state = ChannelState::Closed;
                self.transport.close();
                info!("Telemetry: closed by peer");
                Some(ChannelOutcome::StateChanged {
                    from,
                    to: ChannelState::Closed,
                })
            }
            (from @ (ChannelState::Connecting | ChannelState::Open), LinkEvent::Failed(reason)) => {
                self.state = ChannelState::Failed;
                self.transport.close();
                warn!("Telemetry: link failed: {}", reason);
                Some(ChannelOutcome::StateChanged {
                    from,
                    to: ChannelState::Failed,
                })
            }
            (state, event) => {
                debug!("Telemetry: {:?} ignored in {:?}", event, state);
                None
            }
        }
    }

    /// Send an envelope.  A no-op (logged, counted) unless the channel is open.
    pub fn send(&mut self, msg: &OutboundMessage) -> SendOutcome {
        if self.state != ChannelState::Open {
            self.dropped += 1;
            warn!("Telemetry: not open ({:?}), dropping '{}'", self.state, msg.kind);
            return SendOutcome::NotOpen;
        }
        match self.transport.send_text(msg.encode()) {
            Ok(()) => {
                self.sent += 1;
                SendOutcome::Sent
            }
            Err(LinkError::QueueFull) => {
                self.dropped += 1;
                warn!("Telemetry: outbound queue full, dropping '{}'", msg.kind);
                SendOutcome::Dropped
            }
            Err(e) => {
                self.dropped += 1;
                self.state = ChannelState::Failed;
                self.transport.close();
                warn!("Telemetry: send failed: {}", e);
                SendOutcome::LinkFailed
            }
        }
    }

    /// Close the link (process shutdown).  The transport is always told to
    /// close; the transition is returned only if the channel was still live.
    pub fn close(&mut self) -> Option<(ChannelState, ChannelState)> {
        self.transport.close();
        if self.state.is_terminal() {
            return None;
        }
        let from = self.state;
        self.state = ChannelState::Closed;
        info!("Telemetry: closed locally");
        Some((from, ChannelState::Closed))
    }

    pub fn inbound_snapshot(&self) -> Vec<InboundMessage> {
        self.inbound.snapshot()
    }

    pub fn stats(&self) -> ChannelStats {
        ChannelStats {
            sent: self.sent,
            dropped: self.dropped,
            received: self.received,
            decode_failures: self.decode_failures,
            inbound_evicted: self.inbound.evicted(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ── Internal ──────────────────────────────────────────────

    fn accept(&mut self, decoded: Result<InboundMessage, DecodeError>) -> ChannelOutcome {
        match decoded {
            Ok(msg) => {
                self.received += 1;
                debug!("Telemetry: received '{}'", msg.kind);
                self.inbound.push(msg.clone());
                ChannelOutcome::Received(msg)
            }
            Err(e) => {
                self.decode_failures += 1;
                warn!("Telemetry: discarding frame: {}", e);
                ChannelOutcome::Rejected(e)
            }
        }
    }
}
