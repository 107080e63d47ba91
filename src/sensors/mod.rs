//! Sensor subsystem: the [`Reading`] snapshot and its producers.
//!
//! A `Reading` is replaced wholesale every tick.  The only producer in
//! this crate is [`simulated::SimulatedSensors`]; a real sensor adapter
//! implements the same [`SensorModel`](crate::app::ports::SensorModel)
//! port with an identical output contract.

pub mod simulated;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point-in-time snapshot of every environmental input plus the pump
/// state that was in force when it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Soil moisture (0–100%).
    pub humidity: f32,
    /// Ambient temperature (°C).
    pub temperature_c: f32,
    /// Ambient light (lux).
    pub light_lux: f32,
    /// Cumulative water pumped this session (litres).  Never decreases.
    pub water_consumption_l: f32,
    /// Observed pump state (automatic decision OR manual override).
    pub pump_on: bool,
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    /// The reading a freshly started controller reports before its first tick.
    pub fn initial(timestamp: DateTime<Utc>) -> Self {
        Self {
            humidity: 65.0,
            temperature_c: 24.0,
            light_lux: 750.0,
            water_consumption_l: 2.5,
            pump_on: false,
            timestamp,
        }
    }
}
