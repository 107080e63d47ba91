//! Event queue feeding the single control loop.
//!
//! Events are produced by:
//! - the [`Ticker`](crate::timer::Ticker) thread (periodic control ticks)
//! - the telemetry I/O thread (link open / frames / close / failure)
//! - [`ControllerHandle`](crate::runtime::ControllerHandle)s (commands)
//!
//! and consumed one at a time, in FIFO order, by the runtime's event
//! loop, which alone owns the controller session.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Ticker      │────▶│              │     │              │
//! │ Link I/O    │────▶│  Event Queue │────▶│  Event Loop  │
//! │ Handles     │────▶│  (bounded)   │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use futures_lite::future::block_on;

use crate::app::commands::AppCommand;
use crate::telemetry::transport::LinkEvent;

/// Maximum number of pending events.
pub const EVENT_QUEUE_CAP: usize = 32;

#[derive(Debug, Clone)]
pub enum Event {
    /// Periodic tick from ticker generation `generation`.  Ticks from an
    /// older generation are stale and skipped.
    ControlTick { generation: u64 },
    /// Telemetry link activity.
    Link(LinkEvent),
    /// Control-surface request.
    Command(AppCommand),
    /// Stop ticking, close the link and end the loop.
    Shutdown,
}

/// Cloneable handle to the shared bounded queue.
#[derive(Clone)]
pub struct EventQueue {
    inner: Arc<Channel<CriticalSectionRawMutex, Event, EVENT_QUEUE_CAP>>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Channel::new()),
        }
    }

    /// Enqueue without waiting.  Hands the event back if the queue is full.
    pub fn try_push(&self, event: Event) -> Result<(), Event> {
        self.inner
            .try_send(event)
            .map_err(|TrySendError::Full(e)| e)
    }

    /// Enqueue, waiting for room.
    pub fn push(&self, event: Event) {
        block_on(self.inner.send(event));
    }

    /// Dequeue, waiting for an event.
    pub fn recv(&self) -> Event {
        block_on(self.inner.receive())
    }

    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
