//! Integration tests for the telemetry channel as seen through the
//! session: handshake, inbound decoding, outbound gating and failures.

use super::mock_hw::{MockActuator, MockTransport, RecordingSink, ScriptedSensors, StepClock};

use irrigation::app::commands::AppCommand;
use irrigation::app::events::AppEvent;
use irrigation::app::service::ControllerSession;
use irrigation::config::SystemConfig;
use irrigation::telemetry::channel::{ChannelState, SendOutcome};
use irrigation::telemetry::envelope::{Envelope, SENSOR_READING};
use irrigation::telemetry::transport::LinkEvent;

fn session_with(
    config: &SystemConfig,
) -> (
    ControllerSession<ScriptedSensors, StepClock, MockTransport>,
    MockTransport,
    RecordingSink,
) {
    let transport = MockTransport::new();
    let session = ControllerSession::new(
        config,
        ScriptedSensors::new(&[50.0]),
        StepClock::new(),
        transport.clone(),
    );
    (session, transport, RecordingSink::new())
}

#[test]
fn open_sends_exactly_one_handshake() {
    let mut config = SystemConfig::default();
    config.handshake_message = "hello from test".into();
    let (mut s, link, mut sink) = session_with(&config);

    s.handle_link_event(LinkEvent::Opened, &mut sink);
    s.handle_link_event(LinkEvent::Opened, &mut sink);

    let frames = link.frames();
    assert_eq!(frames.len(), 1);
    let hs = Envelope::decode(&frames[0]).unwrap();
    assert_eq!(hs.kind, "client-msg");
    assert_eq!(hs.text("msg"), Some("hello from test"));

    let transitions = sink.count(|e| {
        matches!(
            e,
            AppEvent::ChannelStateChanged {
                from: ChannelState::Connecting,
                to: ChannelState::Open
            }
        )
    });
    assert_eq!(transitions, 1);
}

#[test]
fn malformed_inbound_frames_are_reported_not_raised() {
    let (mut s, _link, mut sink) = session_with(&SystemConfig::default());
    s.handle_link_event(LinkEvent::Opened, &mut sink);

    s.handle_link_event(LinkEvent::Text("not json".into()), &mut sink);
    s.handle_link_event(LinkEvent::Binary(vec![0xff, 0x00]), &mut sink);
    s.handle_link_event(LinkEvent::Text(r#"{"type":"esp32","humidity":41}"#.into()), &mut sink);

    assert_eq!(s.channel().state(), ChannelState::Open);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::DecodeFailed(_))), 2);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::MessageReceived(_))), 1);

    let snap = s.snapshot();
    assert_eq!(snap.inbound.len(), 1);
    assert_eq!(snap.inbound[0].kind, "esp32");
    assert_eq!(snap.channel_stats.decode_failures, 2);
}

#[test]
fn send_before_open_is_dropped() {
    let (mut s, link, mut sink) = session_with(&SystemConfig::default());
    s.handle_command(AppCommand::Send(Envelope::client_msg("early")), &mut sink);
    assert!(link.frames().is_empty());
    assert_eq!(s.snapshot().channel_stats.dropped, 1);
    assert_eq!(s.channel().state(), ChannelState::Connecting);
}

#[test]
fn send_after_remote_close_is_dropped() {
    let (mut s, link, mut sink) = session_with(&SystemConfig::default());
    s.handle_link_event(LinkEvent::Opened, &mut sink);
    s.handle_link_event(LinkEvent::Closed, &mut sink);
    let outcome = s.send_envelope(&Envelope::client_msg("late"), &mut sink);
    assert_eq!(outcome, SendOutcome::NotOpen);
    assert_eq!(link.frames().len(), 1, "only the handshake went out");
    assert_eq!(s.channel().state(), ChannelState::Closed);
}

#[test]
fn connect_failure_is_terminal_and_does_not_affect_control() {
    let (mut s, _link, mut sink) = session_with(&SystemConfig::default());
    s.handle_link_event(LinkEvent::Failed("refused".into()), &mut sink);
    s.handle_link_event(LinkEvent::Opened, &mut sink);
    assert_eq!(s.channel().state(), ChannelState::Failed);

    let mut hw = MockActuator::new();
    s.tick(&mut hw, &mut sink);
    assert_eq!(s.tick_count(), 1);
    assert_eq!(hw.calls.len(), 1);
}

#[test]
fn write_failure_moves_channel_to_failed() {
    let (mut s, link, mut sink) = session_with(&SystemConfig::default());
    s.handle_link_event(LinkEvent::Opened, &mut sink);
    link.fail_writes();
    s.handle_command(AppCommand::Send(Envelope::client_msg("x")), &mut sink);
    assert_eq!(s.channel().state(), ChannelState::Failed);
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::ChannelStateChanged {
            from: ChannelState::Open,
            to: ChannelState::Failed
        }
    )));
}

#[test]
fn readings_are_published_only_when_enabled_and_open() {
    let mut config = SystemConfig::default();
    config.publish_readings = true;
    let (mut s, link, mut sink) = session_with(&config);
    let mut hw = MockActuator::new();

    s.tick(&mut hw, &mut sink);
    assert!(link.frames().is_empty(), "not open yet");

    s.handle_link_event(LinkEvent::Opened, &mut sink);
    s.tick(&mut hw, &mut sink);
    s.tick(&mut hw, &mut sink);

    let published: Vec<Envelope> = link
        .frames()
        .iter()
        .filter_map(|f| Envelope::decode(f).ok())
        .filter(|e| e.kind == SENSOR_READING)
        .collect();
    assert_eq!(published.len(), 2);
    assert!(published[0].payload.contains_key("humidity"));
}

#[test]
fn readings_are_not_published_by_default() {
    let (mut s, link, mut sink) = session_with(&SystemConfig::default());
    s.handle_link_event(LinkEvent::Opened, &mut sink);
    s.tick(&mut MockActuator::new(), &mut sink);
    assert_eq!(link.frames().len(), 1);
}
