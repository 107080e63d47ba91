//! Integration tests for the ControllerSession → hysteresis → actuator
//! pipeline, driven tick by tick with scripted sensors.

use super::mock_hw::{MockActuator, MockTransport, RecordingSink, ScriptedSensors, StepClock};

use irrigation::app::commands::AppCommand;
use irrigation::app::events::AppEvent;
use irrigation::app::ports::PumpCommand;
use irrigation::app::service::ControllerSession;
use irrigation::config::{Configuration, HISTORY_CAPACITY, SystemConfig};
use irrigation::sensors::simulated::SimulatedSensors;
use irrigation::telemetry::channel::ChannelState;
use irrigation::telemetry::transport::LinkEvent;

type Session<S> = ControllerSession<S, StepClock, MockTransport>;

fn scripted(script: &[f32]) -> (Session<ScriptedSensors>, MockActuator, RecordingSink) {
    let session = ControllerSession::new(
        &SystemConfig::default(),
        ScriptedSensors::new(script),
        StepClock::new(),
        MockTransport::new(),
    );
    (session, MockActuator::new(), RecordingSink::new())
}

// ── Hysteresis through the full tick ──────────────────────────

#[test]
fn pump_cycles_between_threshold_and_upper_bound() {
    let (mut s, mut hw, mut sink) = scripted(&[50.0, 35.0, 45.0, 70.0, 81.0, 60.0]);
    let mut observed = Vec::new();
    for _ in 0..6 {
        s.tick(&mut hw, &mut sink);
        observed.push(s.reading().pump_on);
    }
    assert_eq!(observed, [false, true, true, true, false, false]);

    let duties: Vec<u8> = hw.calls.iter().map(|c| c.duty_percent).collect();
    assert_eq!(duties, [0, 75, 75, 75, 0, 0]);

    let changes = sink.count(|e| matches!(e, AppEvent::PumpChanged { .. }));
    assert_eq!(changes, 2, "one ON and one OFF transition");
}

#[test]
fn water_accrues_only_after_pumping_ticks() {
    let (mut s, mut hw, mut sink) = scripted(&[35.0, 50.0, 85.0, 60.0]);
    let start = s.reading().water_consumption_l;
    let mut water = Vec::new();
    for _ in 0..4 {
        s.tick(&mut hw, &mut sink);
        water.push(s.reading().water_consumption_l - start);
    }
    // tick 1 switches on, ticks 2 and 3 follow a pumping tick, tick 4
    // follows the OFF decision of tick 3.
    let expected = [0.0, 0.1, 0.2, 0.2];
    for (got, want) in water.iter().zip(expected) {
        assert!((got - want).abs() < 1e-4, "water {got} != {want}");
    }
}

#[test]
fn manual_override_forces_pump_and_applies_power() {
    let (mut s, mut hw, mut sink) = scripted(&[90.0, 90.0]);
    s.handle_command(AppCommand::SetPumpPower(40), &mut sink);
    s.handle_command(AppCommand::SetManualOverride(true), &mut sink);
    s.tick(&mut hw, &mut sink);
    assert!(s.reading().pump_on);
    assert_eq!(hw.last(), Some(PumpCommand { on: true, duty_percent: 40 }));
    assert_eq!(s.pump_duty(), 40);

    s.handle_command(AppCommand::SetManualOverride(false), &mut sink);
    s.tick(&mut hw, &mut sink);
    assert!(!s.reading().pump_on, "90% > 80% turns the pump off once released");
    assert_eq!(s.pump_duty(), 0);
}

#[test]
fn update_config_replaces_all_values() {
    let (mut s, mut hw, mut sink) = scripted(&[55.0]);
    let cfg = Configuration {
        pump_power_percent: 90,
        humidity_threshold_percent: 60.0,
        manual_override: false,
    };
    s.handle_command(AppCommand::UpdateConfig(cfg), &mut sink);
    assert_eq!(*s.config(), cfg);
    s.tick(&mut hw, &mut sink);
    assert_eq!(hw.last(), Some(PumpCommand { on: true, duty_percent: 90 }));
}

// ── History ───────────────────────────────────────────────────

#[test]
fn history_keeps_the_last_24_ticks() {
    let (mut s, mut hw, mut sink) = scripted(&[]);
    for _ in 0..30 {
        s.tick(&mut hw, &mut sink);
    }
    let snap = s.snapshot();
    assert_eq!(snap.history.len(), HISTORY_CAPACITY);
    assert_eq!(snap.history.last().map(|h| h.timestamp), Some(snap.reading.timestamp));
    assert_eq!(s.history().total_appended(), 30);
    for pair in snap.history.windows(2) {
        assert!(pair[0].timestamp < pair[1].timestamp);
    }
}

#[test]
fn backfill_then_live_ticks_roll_the_window() {
    use rand::SeedableRng;
    let (mut s, mut hw, mut sink) = scripted(&[]);
    s.backfill_history(&mut rand::rngs::StdRng::seed_from_u64(3));
    let first = s.snapshot().history[0];
    assert_eq!(s.history().len(), HISTORY_CAPACITY);

    s.tick(&mut hw, &mut sink);
    let snap = s.snapshot();
    assert_eq!(snap.history.len(), HISTORY_CAPACITY);
    assert_ne!(snap.history[0], first, "oldest synthetic sample evicted");
}

#[test]
fn snapshot_without_ticks_is_stable() {
    let (mut s, mut hw, mut sink) = scripted(&[45.0]);
    s.tick(&mut hw, &mut sink);
    let a = s.snapshot();
    let b = s.snapshot();
    assert_eq!(a.history, b.history);
    assert_eq!(a.reading, b.reading);
}

// ── Simulated sensors end to end ──────────────────────────────

#[test]
fn long_simulation_respects_physical_invariants() {
    let mut s = ControllerSession::new(
        &SystemConfig::default(),
        SimulatedSensors::seeded(11),
        StepClock::new(),
        MockTransport::new(),
    );
    let (mut hw, mut sink) = (MockActuator::new(), RecordingSink::new());
    let mut prev_water = s.reading().water_consumption_l;
    let mut was_on = false;
    for _ in 0..1_000 {
        s.tick(&mut hw, &mut sink);
        let r = *s.reading();
        assert!((0.0..=100.0).contains(&r.humidity));
        assert!(r.light_lux >= 0.0);
        assert!(r.water_consumption_l >= prev_water);
        was_on |= r.pump_on;
        prev_water = r.water_consumption_l;
    }
    assert!(was_on, "humidity drifts below 40% and the pump engages");
}

// ── Lifecycle ─────────────────────────────────────────────────

#[test]
fn shutdown_stops_pump_and_closes_link() {
    let transport = MockTransport::new();
    let mut s = ControllerSession::new(
        &SystemConfig::default(),
        ScriptedSensors::new(&[30.0]),
        StepClock::new(),
        transport.clone(),
    );
    let (mut hw, mut sink) = (MockActuator::new(), RecordingSink::new());
    s.start(&mut sink);
    s.handle_link_event(LinkEvent::Opened, &mut sink);
    s.tick(&mut hw, &mut sink);
    assert!(hw.pump_on());

    s.shutdown(&mut hw, &mut sink);
    assert!(!hw.pump_on());
    assert!(!s.is_running());
    assert!(transport.is_closed());
    assert_eq!(s.channel().state(), ChannelState::Closed);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Stopped { .. })), 1);
}
