//! Reading status classification.
//!
//! Grades each environmental value against its optimal band:
//!
//! | Level      | Condition                                   |
//! |------------|---------------------------------------------|
//! | `Optimal`  | `low <= v <= high`                          |
//! | `Critical` | `v < 0.8 * low` or `v > 1.2 * high`         |
//! | `Warning`  | anything else (just outside the band)       |
//!
//! Plant health is a coarser humidity-only grade.

use serde::{Deserialize, Serialize};

use crate::sensors::Reading;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusLevel {
    Optimal,
    Warning,
    Critical,
}

/// Inclusive optimal range for one measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimalBand {
    pub low: f32,
    pub high: f32,
}

impl OptimalBand {
    pub const fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }

    pub fn classify(&self, value: f32) -> StatusLevel {
        if value >= self.low && value <= self.high {
            StatusLevel::Optimal
        } else if value < self.low * 0.8 || value > self.high * 1.2 {
            StatusLevel::Critical
        } else {
            StatusLevel::Warning
        }
    }
}

/// Soil humidity band (%).
pub const HUMIDITY_BAND: OptimalBand = OptimalBand::new(40.0, 80.0);
/// Ambient temperature band (°C).
pub const TEMPERATURE_BAND: OptimalBand = OptimalBand::new(18.0, 28.0);
/// Ambient light band (lux).
pub const LIGHT_BAND: OptimalBand = OptimalBand::new(300.0, 800.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlantHealth {
    Healthy,
    NeedsWater,
    Critical,
}

impl PlantHealth {
    pub fn from_humidity(humidity: f32) -> Self {
        if humidity > 60.0 {
            Self::Healthy
        } else if humidity > 30.0 {
            Self::NeedsWater
        } else {
            Self::Critical
        }
    }
}

/// Per-measurement grades for one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingStatus {
    pub humidity: StatusLevel,
    pub temperature: StatusLevel,
    pub light: StatusLevel,
    pub plant: PlantHealth,
}

impl ReadingStatus {
    pub fn assess(reading: &Reading) -> Self {
        Self {
            humidity: HUMIDITY_BAND.classify(reading.humidity),
            temperature: TEMPERATURE_BAND.classify(reading.temperature_c),
            light: LIGHT_BAND.classify(reading.light_lux),
            plant: PlantHealth::from_humidity(reading.humidity),
        }
    }

    /// Worst grade across the three measurements.
    pub fn worst(&self) -> StatusLevel {
        [self.humidity, self.temperature, self.light]
            .into_iter()
            .max_by_key(|level| match level {
                StatusLevel::Optimal => 0,
                StatusLevel::Warning => 1,
                StatusLevel::Critical => 2,
            })
            .unwrap_or(StatusLevel::Optimal)
    }
}
