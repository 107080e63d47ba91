//! Rolling history window.
//!
//! Fixed-capacity, insertion-ordered FIFO of [`HistorySample`]s.  Backed by
//! a `heapless::Deque` so the capacity bound is enforced by the type: once
//! 24 samples are held, every append evicts exactly one (the oldest).
//!
//! At startup the window may be pre-filled with 24 synthetic hourly samples
//! ([`HistoryBuffer::backfilled`]) so that observers see data immediately.
//! Those samples have no causal link to the live simulation.

use chrono::{DateTime, Duration, Utc};
use heapless::Deque;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::HISTORY_CAPACITY;
use crate::sensors::Reading;

/// Denormalised projection of a [`Reading`] at the moment it was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    pub humidity: f32,
    pub temperature_c: f32,
    pub light_lux: f32,
    pub water_consumption_l: f32,
    /// Pump state as `0` / `1` for numeric consumers (charts).
    pub pump_status: u8,
    pub timestamp: DateTime<Utc>,
}

impl HistorySample {
    /// `HH:MM` label for chart axes.  Rendered in UTC; locale formatting
    /// is left to the presentation layer.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }

    pub fn pump_on(&self) -> bool {
        self.pump_status != 0
    }
}

impl From<&Reading> for HistorySample {
    fn from(r: &Reading) -> Self {
        Self {
            humidity: r.humidity,
            temperature_c: r.temperature_c,
            light_lux: r.light_lux,
            water_consumption_l: r.water_consumption_l,
            pump_status: u8::from(r.pump_on),
            timestamp: r.timestamp,
        }
    }
}

/// Bounded, chronologically ordered sample window.
#[derive(Debug, Clone, Default)]
pub struct HistoryBuffer {
    samples: Deque<HistorySample, HISTORY_CAPACITY>,
    total_appended: u64,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A full window of synthetic hourly samples ending at `now`.
    pub fn backfilled(now: DateTime<Utc>, rng: &mut impl Rng) -> Self {
        let mut buf = Self::new();
        for sample in synthetic_backfill(now, rng) {
            buf.append(sample);
        }
        buf
    }

    /// Append a sample.  Always succeeds; returns the evicted oldest sample
    /// when the window was already full.
    pub fn append(&mut self, sample: HistorySample) -> Option<HistorySample> {
        let evicted = if self.samples.is_full() {
            self.samples.pop_front()
        } else {
            None
        };
        // Room was made above, so the push cannot fail.
        let _ = self.samples.push_back(sample);
        self.total_appended += 1;
        evicted
    }

    /// Independent copy of the window, oldest first.
    pub fn snapshot(&self) -> Vec<HistorySample> {
        self.samples.iter().copied().collect()
    }

    /// The last `n` samples, newest first (table view).
    pub fn recent(&self, n: usize) -> Vec<HistorySample> {
        self.samples.iter().rev().take(n).copied().collect()
    }

    pub fn latest(&self) -> Option<&HistorySample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistorySample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        HISTORY_CAPACITY
    }

    /// Appends since construction, including evicted ones.
    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }
}

/// 24 synthetic samples, one per hour, the last stamped `now`.
pub fn synthetic_backfill(
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> impl Iterator<Item = HistorySample> + '_ {
    (0..HISTORY_CAPACITY as i64).rev().map(move |hours_ago| HistorySample {
        humidity: rng.random_range(40.0..80.0),
        temperature_c: rng.random_range(18.0..30.0),
        light_lux: rng.random_range(200.0..800.0),
        water_consumption_l: rng.random_range(0.0..5.0),
        pump_status: u8::from(rng.random_bool(0.3)),
        timestamp: now - Duration::hours(hours_ago),
    })
}
