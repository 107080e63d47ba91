//! Inbound commands to the controller session.
//!
//! These represent actions requested by the control surface (dashboard,
//! CLI, tests) that the
//! [`ControllerSession`](super::service::ControllerSession) interprets.

use std::sync::mpsc;

use crate::config::Configuration;
use crate::telemetry::envelope::OutboundMessage;

use super::service::SessionSnapshot;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Begin periodic ticking.
    Start,

    /// Stop periodic ticking.  No tick is processed after this one.
    Stop,

    /// Replace the whole control configuration.
    UpdateConfig(Configuration),

    /// Pump PWM duty applied while on (0–100).
    SetPumpPower(u8),

    /// Humidity (%) below which the pump switches on.
    SetHumidityThreshold(f32),

    /// Force the pump on regardless of the automatic decision.
    SetManualOverride(bool),

    /// Send an envelope over the telemetry channel (no-op unless open).
    Send(OutboundMessage),

    /// Reply with a consistent copy of the session state.
    Snapshot(mpsc::Sender<SessionSnapshot>),
}
