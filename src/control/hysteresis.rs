//! Two-threshold hysteresis pump controller.
//!
//! The pump switches on when soil humidity drops below the configured
//! threshold and switches off only once humidity exceeds a fixed upper
//! safety bound.  Between the two the previous state is held, so the pump
//! never chatters around a single boundary.
//!
//! ```text
//!   humidity ─────────────────────────────────────────────▶
//!            │    ON if off     │     hold      │ OFF if on
//!            0 ─────────── threshold ────────── 80 ──── 100
//! ```
//!
//! Manual override is OR-ed onto the automatic decision: it can force
//! the pump on but never off.  A threshold above 80 means the automatic
//! OFF condition can no longer be met once running; that is accepted.

/// Fixed upper humidity bound (%) above which a running pump stops.
pub const UPPER_SAFETY_BOUND: f32 = 80.0;

/// Automatic decision only (no override).
pub fn decide_automatic(current_humidity: f32, pump_currently_on: bool, threshold: f32) -> bool {
    if !pump_currently_on && current_humidity < threshold {
        true
    } else if pump_currently_on && current_humidity > UPPER_SAFETY_BOUND {
        false
    } else {
        pump_currently_on
    }
}

/// Next observed pump state.
pub fn decide(
    current_humidity: f32,
    pump_currently_on: bool,
    threshold: f32,
    manual_override: bool,
) -> bool {
    decide_automatic(current_humidity, pump_currently_on, threshold) || manual_override
}

/// Result of one controller evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpDecision {
    /// What the hysteresis rule alone asked for.
    pub automatic: bool,
    /// What the pump actually does (`automatic || manual_override`).
    pub observed: bool,
}

impl PumpDecision {
    /// True when the pump runs only because of the manual override.
    pub fn forced_by_override(&self) -> bool {
        self.observed && !self.automatic
    }
}

/// Stateless controller wrapper used by the session each tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct HysteresisController;

impl HysteresisController {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(
        &self,
        current_humidity: f32,
        pump_currently_on: bool,
        threshold: f32,
        manual_override: bool,
    ) -> PumpDecision {
        let automatic = decide_automatic(current_humidity, pump_currently_on, threshold);
        PumpDecision {
            automatic,
            observed: automatic || manual_override,
        }
    }
}
