//! Outbound application events.
//!
//! The [`ControllerSession`](super::service::ControllerSession) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them: log a line, forward to an
//! observer thread, push to a dashboard.

use crate::sensors::Reading;
use crate::status::ReadingStatus;
use crate::telemetry::channel::ChannelState;
use crate::telemetry::envelope::InboundMessage;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Ticking started (carries the reading in force).
    Started(Reading),

    /// Ticking stopped.
    Stopped { tick_count: u64 },

    /// One control tick completed.
    Telemetry(TelemetryData),

    /// The observed pump state flipped.
    PumpChanged {
        on: bool,
        humidity: f32,
        override_active: bool,
    },

    /// The telemetry channel moved between states.
    ChannelStateChanged { from: ChannelState, to: ChannelState },

    /// A well-formed envelope arrived from the remote peer.
    MessageReceived(InboundMessage),

    /// An inbound frame was discarded.
    DecodeFailed(String),
}

/// Per-tick snapshot suitable for logging or transmission.
#[derive(Debug, Clone)]
pub struct TelemetryData {
    pub tick: u64,
    pub reading: Reading,
    pub pump_duty: u8,
    pub threshold: f32,
    pub manual_override: bool,
    pub history_len: usize,
    pub status: ReadingStatus,
}
