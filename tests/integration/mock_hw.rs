//! Mock adapters for integration tests.
//!
//! Records every actuator command, event and outbound frame so tests can
//! assert on the full history without real GPIO or a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use irrigation::app::events::AppEvent;
use irrigation::app::ports::{ActuatorPort, Clock, EventSink, PumpCommand, SensorModel};
use irrigation::config::Configuration;
use irrigation::error::LinkError;
use irrigation::sensors::Reading;
use irrigation::telemetry::transport::Transport;

// ── Actuator ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockActuator {
    pub calls: Vec<PumpCommand>,
}

#[allow(dead_code)]
impl MockActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<PumpCommand> {
        self.calls.last().copied()
    }

    pub fn pump_on(&self) -> bool {
        self.last().is_some_and(|c| c.on)
    }
}

impl ActuatorPort for MockActuator {
    fn apply_pump(&mut self, cmd: PumpCommand) {
        self.calls.push(cmd);
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Sensors ───────────────────────────────────────────────────

/// Plays back a fixed humidity script; repeats the last value once
/// exhausted.  Ambient values are constant, water accrues 0.1 L per
/// pumping tick.
pub struct ScriptedSensors {
    humidity: VecDeque<f32>,
    last: f32,
}

#[allow(dead_code)]
impl ScriptedSensors {
    pub fn new(script: &[f32]) -> Self {
        Self {
            humidity: script.iter().copied().collect(),
            last: script.last().copied().unwrap_or(50.0),
        }
    }
}

impl SensorModel for ScriptedSensors {
    fn next(&mut self, previous: &Reading, _config: &Configuration, now: DateTime<Utc>) -> Reading {
        let humidity = self.humidity.pop_front().unwrap_or(self.last);
        Reading {
            humidity,
            temperature_c: 22.0,
            light_lux: 500.0,
            water_consumption_l: previous.water_consumption_l
                + if previous.pump_on { 0.1 } else { 0.0 },
            pump_on: previous.pump_on,
            timestamp: now,
        }
    }
}

// ── Clock ─────────────────────────────────────────────────────

/// Advances two seconds every time it is read.
pub struct StepClock {
    next: Mutex<DateTime<Utc>>,
}

#[allow(dead_code)]
impl StepClock {
    pub fn new() -> Self {
        Self {
            next: Mutex::new(DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000)),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().unwrap();
        let now = *next;
        *next = now + Duration::seconds(2);
        now
    }
}

// ── Transport ─────────────────────────────────────────────────

#[derive(Default)]
pub struct LinkLog {
    pub frames: Vec<String>,
    pub closed: bool,
    pub fail_writes: bool,
}

/// Shares its log with the test so frames can be inspected after the
/// transport has been moved into a session or runtime.
#[derive(Clone, Default)]
pub struct MockTransport {
    pub log: Arc<Mutex<LinkLog>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<String> {
        self.log.lock().unwrap().frames.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.log.lock().unwrap().closed
    }

    pub fn fail_writes(&self) {
        self.log.lock().unwrap().fail_writes = true;
    }
}

impl Transport for MockTransport {
    fn send_text(&mut self, frame: String) -> Result<(), LinkError> {
        let mut log = self.log.lock().unwrap();
        if log.fail_writes {
            return Err(LinkError::Io("mock write failure".into()));
        }
        log.frames.push(frame);
        Ok(())
    }

    fn close(&mut self) {
        self.log.lock().unwrap().closed = true;
    }
}
