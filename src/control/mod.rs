//! Pump control law.

pub mod hysteresis;

pub use hysteresis::{HysteresisController, PumpDecision};
