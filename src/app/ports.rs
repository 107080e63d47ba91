//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControllerSession (domain)
//! ```
//!
//! Driven adapters (sensor models, actuators, event sinks, clocks)
//! implement these traits.  The
//! [`ControllerSession`](super::service::ControllerSession) consumes them
//! via generics, so the domain core never touches hardware directly.

use chrono::{DateTime, Utc};

use crate::config::Configuration;
use crate::sensors::Reading;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: environment → domain)
// ───────────────────────────────────────────────────────────────

/// Produces the next environmental reading, seeded by the previous one.
///
/// Infallible: a producer that cannot sample must still return a
/// plausible reading.  The returned `pump_on` is overwritten by the
/// controller's decision.
pub trait SensorModel {
    fn next(&mut self, previous: &Reading, config: &Configuration, now: DateTime<Utc>) -> Reading;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → pump)
// ───────────────────────────────────────────────────────────────

/// One pump command per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpCommand {
    pub on: bool,
    /// PWM duty (0–100).  Pump power while on, always 0 while off.
    pub duty_percent: u8,
}

impl PumpCommand {
    pub fn new(on: bool, pump_power_percent: u8) -> Self {
        Self {
            on,
            duty_percent: if on { pump_power_percent.min(100) } else { 0 },
        }
    }

    pub const OFF: Self = Self {
        on: false,
        duty_percent: 0,
    };
}

/// Write-side port: the domain calls this to command the pump.
pub trait ActuatorPort {
    /// Apply the pump command computed this tick.
    fn apply_pump(&mut self, cmd: PumpCommand);

    /// Immediately stop the pump (stop / shutdown path).
    fn stop_pump(&mut self) {
        self.apply_pump(PumpCommand::OFF);
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / observers)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (log, observer
/// channel, dashboard push).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Wall-clock source for reading timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}
