//! Fuzz target: `TelemetryChannel::on_event`
//!
//! Interprets the input as a script of link events and checks that the
//! channel never leaves a terminal state, never sends more than one
//! handshake, and never panics on any frame content.
//!
//! cargo fuzz run fuzz_link_events

#![no_main]

use irrigation::telemetry::channel::{ChannelState, TelemetryChannel};
use irrigation::telemetry::transport::{LinkEvent, NullTransport};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut channel = TelemetryChannel::new(NullTransport::new(), "fuzz");
    let mut terminal: Option<ChannelState> = None;

    for chunk in data.chunks(8) {
        let event = match chunk[0] % 5 {
            0 => LinkEvent::Opened,
            1 => LinkEvent::Text(String::from_utf8_lossy(&chunk[1..]).into_owned()),
            2 => LinkEvent::Binary(chunk[1..].to_vec()),
            3 => LinkEvent::Closed,
            _ => LinkEvent::Failed("fuzz".into()),
        };
        channel.on_event(event);

        if let Some(state) = terminal {
            assert_eq!(channel.state(), state, "terminal state left");
        } else if channel.state().is_terminal() {
            terminal = Some(channel.state());
        }
    }
    assert!(channel.transport().sent() <= 1, "more than one handshake");
});
