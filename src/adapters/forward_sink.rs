//! Channel-forwarding event sink.
//!
//! Pushes a clone of every [`AppEvent`] into a std `mpsc` channel so an
//! observer on another thread (dashboard bridge, test) can follow the
//! controller live.  A disconnected observer is ignored.

use std::sync::mpsc;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

pub struct ForwardingSink {
    tx: mpsc::Sender<AppEvent>,
}

impl ForwardingSink {
    /// Sink plus the receiving end for the observer.
    pub fn channel() -> (Self, mpsc::Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ForwardingSink {
    fn emit(&mut self, event: &AppEvent) {
        let _ = self.tx.send(event.clone());
    }
}
