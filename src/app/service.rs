//! Controller session: the hexagonal core.
//!
//! [`ControllerSession`] owns the control configuration, the latest
//! reading, the history window and the telemetry channel.  It exposes a
//! hardware-agnostic API; all I/O flows through port traits injected at
//! construction (sensors, clock, transport) or at call sites (actuator,
//! event sink), making the whole session testable with mock adapters.
//!
//! ```text
//!  SensorModel ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!  Clock ────────▶ │    ControllerSession     │
//! ActuatorPort ◀── │ Hysteresis · History     │ ◀─▶ TelemetryChannel
//!                  └──────────────────────────┘
//! ```
//!
//! The session is single-owner: the runtime's event loop is the only
//! caller, so a tick never interleaves with a command or link event.

use log::{debug, info};
use rand::Rng;
use serde::Serialize;

use crate::config::{Configuration, SystemConfig};
use crate::control::HysteresisController;
use crate::history::{HistoryBuffer, HistorySample};
use crate::sensors::Reading;
use crate::status::ReadingStatus;
use crate::telemetry::channel::{
    ChannelOutcome, ChannelState, ChannelStats, SendOutcome, TelemetryChannel,
};
use crate::telemetry::envelope::{Envelope, InboundMessage, OutboundMessage};
use crate::telemetry::transport::{LinkEvent, Transport};

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, Clock, EventSink, PumpCommand, SensorModel};

/// Consistent copy of the session state for control surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub reading: Reading,
    pub config: Configuration,
    pub history: Vec<HistorySample>,
    pub channel_state: ChannelState,
    pub channel_stats: ChannelStats,
    pub inbound: Vec<InboundMessage>,
    pub tick_count: u64,
    pub running: bool,
    pub status: ReadingStatus,
    pub pump_duty: u8,
}

// ───────────────────────────────────────────────────────────────
// ControllerSession
// ───────────────────────────────────────────────────────────────

pub struct ControllerSession<S, C, T: Transport> {
    config: Configuration,
    reading: Reading,
    history: HistoryBuffer,
    channel: TelemetryChannel<T>,
    sensors: S,
    clock: C,
    controller: HysteresisController,
    publish_readings: bool,
    running: bool,
    tick_count: u64,
}

impl<S, C, T> ControllerSession<S, C, T>
where
    S: SensorModel,
    C: Clock,
    T: Transport,
{
    /// Build a stopped session with the initial reading and an empty
    /// history.  Call [`backfill_history`](Self::backfill_history) to
    /// pre-fill the window.
    pub fn new(system: &SystemConfig, sensors: S, clock: C, transport: T) -> Self {
        let reading = Reading::initial(clock.now());
        Self {
            config: system.control,
            reading,
            history: HistoryBuffer::new(),
            channel: TelemetryChannel::new(transport, system.handshake_message.clone()),
            sensors,
            clock,
            controller: HysteresisController::new(),
            publish_readings: system.publish_readings,
            running: false,
            tick_count: 0,
        }
    }

    /// Replace the history with 24 synthetic hourly samples ending now.
    pub fn backfill_history(&mut self, rng: &mut impl Rng) {
        self.history = HistoryBuffer::backfilled(self.clock.now(), rng);
        info!("History backfilled with {} synthetic samples", self.history.len());
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Mark the session as ticking.  Returns `false` if already running.
    pub fn start(&mut self, sink: &mut impl EventSink) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        sink.emit(&AppEvent::Started(self.reading));
        info!("Controller started");
        true
    }

    /// Mark the session as stopped.  Reading, history and actuator state
    /// are left as they are.  Returns `false` if not running.
    pub fn stop(&mut self, sink: &mut impl EventSink) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        sink.emit(&AppEvent::Stopped {
            tick_count: self.tick_count,
        });
        info!("Controller stopped after {} ticks", self.tick_count);
        true
    }

    /// Stop, de-energise the pump and close the telemetry channel.
    pub fn shutdown(&mut self, actuator: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.stop(sink);
        actuator.stop_pump();
        self.close_channel(sink);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: sense → decide → actuate → record → notify.
    pub fn tick(&mut self, actuator: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.tick_count += 1;
        let previous = self.reading;
        let now = self.clock.now();

        // 1. New environmental reading, seeded by the previous one.  Humidity
        //    and water follow the pump state of the previous tick, so a pump
        //    switched on this tick shows up in the readings one tick later.
        let mut next = self.sensors.next(&previous, &self.config, now);
        next.humidity = next.humidity.clamp(0.0, 100.0);
        next.light_lux = next.light_lux.max(0.0);
        next.water_consumption_l = next.water_consumption_l.max(previous.water_consumption_l);

        // 2. Hysteresis decision on the new humidity
        let decision = self.controller.evaluate(
            next.humidity,
            previous.pump_on,
            self.config.humidity_threshold_percent,
            self.config.manual_override,
        );
        next.pump_on = decision.observed;
        self.reading = next;

        // 3. Actuate
        actuator.apply_pump(PumpCommand::new(decision.observed, self.config.pump_power_percent));

        // 4. Record
        self.history.append(HistorySample::from(&next));

        // 5. Notify
        if decision.observed != previous.pump_on {
            info!(
                "Pump {} at {:.0}% humidity{}",
                if decision.observed { "ON" } else { "OFF" },
                next.humidity,
                if decision.forced_by_override() { " (manual override)" } else { "" },
            );
            sink.emit(&AppEvent::PumpChanged {
                on: decision.observed,
                humidity: next.humidity,
                override_active: self.config.manual_override,
            });
        }
        if self.publish_readings && self.channel.is_open() {
            self.send_envelope(&Envelope::reading(&next), sink);
        }
        sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
    }

    // ── Command handling ──────────────────────────────────────

    /// Process a control-surface command.  Configuration changes take
    /// effect on the next tick.
    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) {
        match cmd {
            AppCommand::Start => {
                self.start(sink);
            }
            AppCommand::Stop => {
                self.stop(sink);
            }
            AppCommand::UpdateConfig(config) => {
                self.config = config;
                info!("Configuration updated: {:?}", self.config);
            }
            AppCommand::SetPumpPower(percent) => {
                self.config.pump_power_percent = percent;
                info!("Pump power set to {}%", percent);
            }
            AppCommand::SetHumidityThreshold(threshold) => {
                self.config.humidity_threshold_percent = threshold;
                info!("Humidity threshold set to {:.1}%", threshold);
            }
            AppCommand::SetManualOverride(on) => {
                self.config.manual_override = on;
                info!("Manual override {}", if on { "enabled" } else { "disabled" });
            }
            AppCommand::Send(msg) => {
                self.send_envelope(&msg, sink);
            }
            AppCommand::Snapshot(reply) => {
                if reply.send(self.snapshot()).is_err() {
                    debug!("Snapshot requester went away");
                }
            }
        }
    }

    // ── Telemetry ─────────────────────────────────────────────

    /// Feed a link event into the channel and report what changed.
    pub fn handle_link_event(&mut self, event: LinkEvent, sink: &mut impl EventSink) {
        match self.channel.on_event(event) {
            Some(ChannelOutcome::StateChanged { from, to }) => {
                sink.emit(&AppEvent::ChannelStateChanged { from, to });
            }
            Some(ChannelOutcome::Received(msg)) => sink.emit(&AppEvent::MessageReceived(msg)),
            Some(ChannelOutcome::Rejected(e)) => sink.emit(&AppEvent::DecodeFailed(e.to_string())),
            None => {}
        }
    }

    /// Send over the channel; a no-op unless it is open.
    pub fn send_envelope(&mut self, msg: &OutboundMessage, sink: &mut impl EventSink) -> SendOutcome {
        let from = self.channel.state();
        let outcome = self.channel.send(msg);
        if outcome == SendOutcome::LinkFailed {
            sink.emit(&AppEvent::ChannelStateChanged {
                from,
                to: ChannelState::Failed,
            });
        }
        outcome
    }

    pub fn close_channel(&mut self, sink: &mut impl EventSink) {
        if let Some((from, to)) = self.channel.close() {
            sink.emit(&AppEvent::ChannelStateChanged { from, to });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            reading: self.reading,
            config: self.config,
            history: self.history.snapshot(),
            channel_state: self.channel.state(),
            channel_stats: self.channel.stats(),
            inbound: self.channel.inbound_snapshot(),
            tick_count: self.tick_count,
            running: self.running,
            status: ReadingStatus::assess(&self.reading),
            pump_duty: self.pump_duty(),
        }
    }

    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            tick: self.tick_count,
            reading: self.reading,
            pump_duty: self.pump_duty(),
            threshold: self.config.humidity_threshold_percent,
            manual_override: self.config.manual_override,
            history_len: self.history.len(),
            status: ReadingStatus::assess(&self.reading),
        }
    }

    /// Effective PWM duty: pump power while on, 0 while off.
    pub fn pump_duty(&self) -> u8 {
        PumpCommand::new(self.reading.pump_on, self.config.pump_power_percent).duty_percent
    }

    pub fn reading(&self) -> &Reading {
        &self.reading
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn channel(&self) -> &TelemetryChannel<T> {
        &self.channel
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
