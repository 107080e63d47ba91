//! Periodic control-tick producer.
//!
//! A [`Ticker`] owns one thread that pushes
//! [`Event::ControlTick`](crate::events::Event::ControlTick) into the event
//! queue every interval.  Ticks carry the ticker's generation so the
//! consumer can discard ticks queued before a cancellation.
//!
//! Cancellation is synchronous: [`Ticker::cancel`] returns only after the
//! thread has exited, so no new tick can be produced afterwards.  Ticks
//! are pushed with `try_push`; a full queue drops the tick (logged).

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};

use crate::events::{Event, EventQueue};

pub struct Ticker {
    generation: u64,
    cancel_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Start ticking every `interval` (first tick after one interval).
    pub fn spawn(interval: Duration, generation: u64, queue: EventQueue) -> io::Result<Self> {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name(format!("tick-{generation}"))
            .spawn(move || run(interval, generation, &queue, &cancel_rx))?;
        debug!("Ticker: generation {} every {:?}", generation, interval);
        Ok(Self {
            generation,
            cancel_tx: Some(cancel_tx),
            handle: Some(handle),
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stop the thread and wait for it to exit.
    pub fn cancel(&mut self) {
        // Dropping the sender wakes the thread with `Disconnected`.
        self.cancel_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Ticker: generation {} panicked", self.generation);
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn run(interval: Duration, generation: u64, queue: &EventQueue, cancel: &mpsc::Receiver<()>) {
    loop {
        match cancel.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                if queue.try_push(Event::ControlTick { generation }).is_err() {
                    warn!("Ticker: event queue full, tick dropped");
                }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}
