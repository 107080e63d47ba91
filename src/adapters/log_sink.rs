//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (stderr via `env_logger` in the host binary).
//! An observer or dashboard adapter implements the same trait.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TICK {} | H={:.0}% T={:.1}\u{00b0}C L={:.0}lx W={:.2}L | \
                     pump={} duty={}% thr={:.0}% ovr={} | hist={} | {:?}",
                    t.tick,
                    t.reading.humidity,
                    t.reading.temperature_c,
                    t.reading.light_lux,
                    t.reading.water_consumption_l,
                    if t.reading.pump_on { "ON" } else { "OFF" },
                    t.pump_duty,
                    t.threshold,
                    t.manual_override,
                    t.history_len,
                    t.status.plant,
                );
            }
            AppEvent::PumpChanged {
                on,
                humidity,
                override_active,
            } => {
                info!(
                    "PUMP | {} at {:.0}% (override={})",
                    if *on { "ON" } else { "OFF" },
                    humidity,
                    override_active
                );
            }
            AppEvent::ChannelStateChanged { from, to } => {
                info!("LINK | {:?} -> {:?}", from, to);
            }
            AppEvent::MessageReceived(msg) => {
                debug!("RECV | type={} fields={}", msg.kind, msg.payload.len());
            }
            AppEvent::DecodeFailed(reason) => {
                warn!("RECV | discarded: {}", reason);
            }
            AppEvent::Started(reading) => {
                info!("START | humidity={:.0}%", reading.humidity);
            }
            AppEvent::Stopped { tick_count } => {
                info!("STOP | after {} ticks", tick_count);
            }
        }
    }
}
