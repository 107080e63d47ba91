//! Synthetic environmental sensors.
//!
//! Temperature and light are redrawn from fixed bands every tick (ambient
//! noise, no memory).  Soil humidity is a bounded random walk whose
//! direction follows the pump: rising while it runs, drying otherwise.
//! Water consumption accrues a fixed volume per tick of pumping.
//!
//! ## Dual use
//!
//! Production seeds the generator from the OS; tests and reproducible
//! simulations pass a fixed seed through [`SimulatedSensors::seeded`].

use core::ops::Range;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Reading;
use crate::app::ports::SensorModel;
use crate::config::{Configuration, SystemConfig};

/// Ambient temperature band (°C).
pub const TEMPERATURE_RANGE: Range<f32> = 20.0..30.0;
/// Ambient light band (lux).
pub const LIGHT_RANGE: Range<f32> = 300.0..1000.0;
/// Largest humidity gain per tick while the pump runs (%).
pub const HUMIDITY_RISE_MAX: f32 = 3.0;
/// Largest humidity loss per tick while the pump is off (%).
pub const HUMIDITY_FALL_MAX: f32 = 2.0;

/// Random-walk sensor simulator.
pub struct SimulatedSensors<R = StdRng> {
    rng: R,
    water_per_tick_l: f32,
}

impl SimulatedSensors<StdRng> {
    /// Build from startup configuration, honouring `sensor_seed`.
    pub fn from_config(config: &SystemConfig) -> Self {
        let rng = match config.sensor_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(rng, config.water_per_tick_liters)
    }

    /// Deterministic simulator for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), 0.1)
    }
}

impl<R: Rng> SimulatedSensors<R> {
    pub fn with_rng(rng: R, water_per_tick_l: f32) -> Self {
        Self {
            rng,
            water_per_tick_l,
        }
    }

    /// Next soil humidity given the previous value and pump state.
    /// Rounded to a whole percent and clamped to `[0, 100]`.
    fn next_humidity(&mut self, previous: f32, pump_on: bool) -> f32 {
        let next = if pump_on {
            (previous + self.rng.random_range(0.0..HUMIDITY_RISE_MAX)).min(100.0)
        } else {
            (previous - self.rng.random_range(0.0..HUMIDITY_FALL_MAX)).max(0.0)
        };
        next.round().clamp(0.0, 100.0)
    }
}

impl<R: Rng> SensorModel for SimulatedSensors<R> {
    fn next(
        &mut self,
        previous: &Reading,
        _config: &Configuration,
        now: DateTime<Utc>,
    ) -> Reading {
        let humidity = self.next_humidity(previous.humidity, previous.pump_on);
        let water_consumption_l = if previous.pump_on {
            previous.water_consumption_l + self.water_per_tick_l
        } else {
            previous.water_consumption_l
        };

        Reading {
            humidity,
            temperature_c: self.rng.random_range(TEMPERATURE_RANGE),
            light_lux: self.rng.random_range(LIGHT_RANGE),
            water_consumption_l,
            // The controller merges its decision in after this call.
            pump_on: previous.pump_on,
            timestamp: now,
        }
    }
}
