//! Controller configuration.
//!
//! Two layers:
//! - [`Configuration`]: the three values the control surface writes at
//!   runtime (pump power, humidity threshold, manual override).  The
//!   controller reads it once per tick and never validates it.
//! - [`SystemConfig`]: startup parameters (timing, telemetry endpoint,
//!   simulation knobs).  Loaded from the environment and validated once.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of samples retained in the rolling history window.
pub const HISTORY_CAPACITY: usize = 24;

/// Default control tick period.
pub const DEFAULT_TICK_INTERVAL_MS: u32 = 2000;

/// Runtime-mutable control parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Pump PWM duty applied while the pump is on (0-100%).
    pub pump_power_percent: u8,
    /// Humidity (%) below which the pump switches on.
    pub humidity_threshold_percent: f32,
    /// Force the pump on regardless of the automatic decision.
    pub manual_override: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            pump_power_percent: 75,
            humidity_threshold_percent: 40.0,
            manual_override: false,
        }
    }
}

impl Configuration {
    /// Copy with both percentages forced into `[0, 100]`.
    ///
    /// The controller accepts whatever it is given; control surfaces call
    /// this before writing if they cannot guarantee the range themselves.
    pub fn clamped(self) -> Self {
        let threshold = if self.humidity_threshold_percent.is_nan() {
            0.0
        } else {
            self.humidity_threshold_percent.clamp(0.0, 100.0)
        };
        Self {
            pump_power_percent: self.pump_power_percent.min(100),
            humidity_threshold_percent: threshold,
            manual_override: self.manual_override,
        }
    }
}

/// Startup configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Initial control-surface values.
    pub control: Configuration,

    // --- Timing ---
    /// Control tick period (milliseconds).
    pub tick_interval_ms: u32,

    // --- Simulation ---
    /// Litres added to the consumption counter per tick while pumping.
    pub water_per_tick_liters: f32,
    /// Fixed RNG seed for reproducible runs; `None` seeds from the OS.
    pub sensor_seed: Option<u64>,
    /// Pre-fill history with 24 synthetic hourly samples at startup.
    pub backfill_history: bool,

    // --- Telemetry ---
    /// WebSocket endpoint (`ws://` or `wss://`).
    pub telemetry_endpoint: String,
    /// Text carried in the handshake message sent once the link opens.
    pub handshake_message: String,
    /// Publish every new reading over the telemetry link.
    pub publish_readings: bool,

    // --- Host binary ---
    /// Stop the simulation after this many seconds (`None` = run forever).
    pub run_for_secs: Option<u64>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            control: Configuration::default(),

            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,

            water_per_tick_liters: 0.1,
            sensor_seed: None,
            backfill_history: true,

            telemetry_endpoint: "wss://servidor-ws-conexionesp32.onrender.com".into(),
            handshake_message: "Connected from irrigation controller".into(),
            publish_readings: false,

            run_for_secs: None,
        }
    }
}

impl SystemConfig {
    /// Tick period as a [`Duration`](std::time::Duration).
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(u64::from(self.tick_interval_ms))
    }

    /// Load from the process environment, then validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup (the environment in production,
    /// a map in tests).
    ///
    /// `IRRIGATION_CONFIG` may carry a whole JSON document; individual
    /// `IRRIGATION_*` keys are applied on top of it.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = match lookup("IRRIGATION_CONFIG") {
            Some(json) => serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
                key: "IRRIGATION_CONFIG",
                reason: e.to_string(),
            })?,
            None => Self::default(),
        };

        if let Some(url) = lookup("IRRIGATION_WS_URL") {
            cfg.telemetry_endpoint = url;
        }
        if let Some(v) = lookup("IRRIGATION_TICK_MS") {
            cfg.tick_interval_ms = parse("IRRIGATION_TICK_MS", &v)?;
        }
        if let Some(v) = lookup("IRRIGATION_SEED") {
            cfg.sensor_seed = Some(parse("IRRIGATION_SEED", &v)?);
        }
        if let Some(v) = lookup("IRRIGATION_THRESHOLD") {
            cfg.control.humidity_threshold_percent = parse("IRRIGATION_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("IRRIGATION_PUMP_POWER") {
            cfg.control.pump_power_percent = parse("IRRIGATION_PUMP_POWER", &v)?;
        }
        if let Some(v) = lookup("IRRIGATION_PUBLISH_READINGS") {
            cfg.publish_readings = parse("IRRIGATION_PUBLISH_READINGS", &v)?;
        }
        if let Some(v) = lookup("IRRIGATION_RUN_SECS") {
            cfg.run_for_secs = Some(parse("IRRIGATION_RUN_SECS", &v)?);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Range-check startup parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_interval_ms must be > 0"));
        }
        if self.control.pump_power_percent > 100 {
            return Err(ConfigError::ValidationFailed("pump_power_percent must be <= 100"));
        }
        if !(0.0..=100.0).contains(&self.control.humidity_threshold_percent) {
            return Err(ConfigError::ValidationFailed(
                "humidity_threshold_percent must be within 0..=100",
            ));
        }
        if self.water_per_tick_liters.is_nan() || self.water_per_tick_liters < 0.0 {
            return Err(ConfigError::ValidationFailed("water_per_tick_liters must be >= 0"));
        }
        if !(self.telemetry_endpoint.starts_with("ws://")
            || self.telemetry_endpoint.starts_with("wss://"))
        {
            return Err(ConfigError::ValidationFailed(
                "telemetry_endpoint must be a ws:// or wss:// URL",
            ));
        }
        Ok(())
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Parse {
        key,
        reason: e.to_string(),
    })
}
