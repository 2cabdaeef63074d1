//! End-to-end tests of the host byte protocol.
//!
//! Command bytes go in through a [`LoopbackTransport`], are decoded by the
//! service, and the PONG byte / report lines come back out through the
//! real [`SerialEventSink`], the same wiring `main` uses.

use wheeltest::adapters::log_sink::LogEventSink;
use wheeltest::adapters::serial_sink::SerialEventSink;
use wheeltest::app::service::AppService;
use wheeltest::config::RigConfig;
use wheeltest::fsm::StateId;
use wheeltest::protocol::transport::Transport;
use wheeltest::protocol::{PING, PONG, START, STOP};

use super::mock_hw::{LoopbackTransport, MockHw};

type Sinks = (SerialEventSink<LoopbackTransport>, LogEventSink);

fn rig(report_every_ticks: u32) -> (AppService, MockHw, Sinks) {
    let config = RigConfig {
        report_every_ticks,
        ..Default::default()
    };
    let mut app = AppService::new(config);
    let mut sinks = (
        SerialEventSink::new(LoopbackTransport::new()),
        LogEventSink::new(),
    );
    app.start(&mut sinks);
    (app, MockHw::new(), sinks)
}

/// Drain inbound bytes the way the firmware main loop does.
fn drain_rx(app: &mut AppService, hw: &mut MockHw, sinks: &mut Sinks, now_us: u64) {
    let mut buf = [0u8; 4];
    loop {
        let n = sinks.0.transport_mut().read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        for &b in &buf[..n] {
            app.handle_byte(b, now_us, hw, sinks);
        }
    }
}

#[test]
fn ping_is_answered_with_a_single_pong_byte() {
    let (mut app, mut hw, mut sinks) = rig(100);
    sinks.0.transport_mut().host_sends(&[PING]);
    drain_rx(&mut app, &mut hw, &mut sinks, 0);

    assert_eq!(sinks.0.transport_mut().tx, [PONG]);
    assert_eq!(app.state(), StateId::Idle);
}

#[test]
fn unknown_bytes_are_ignored_silently() {
    let (mut app, mut hw, mut sinks) = rig(100);
    sinks.0.transport_mut().host_sends(&[0x00, 0x41, 0xFF, 0x0B]);
    drain_rx(&mut app, &mut hw, &mut sinks, 0);

    assert!(sinks.0.transport_mut().tx.is_empty());
    assert_eq!(app.ignored_bytes(), 4);
    assert_eq!(app.state(), StateId::Idle);
    assert!(hw.calls.is_empty());
}

#[test]
fn session_streams_parseable_report_lines() {
    let (mut app, mut hw, mut sinks) = rig(100);
    hw.script_revolutions(500, 4);
    sinks.0.transport_mut().host_sends(&[START]);
    drain_rx(&mut app, &mut hw, &mut sinks, 0);

    for i in 1..=1_000u64 {
        app.tick(i * 1_000, &mut hw, &mut sinks);
    }

    let lines = sinks.0.transport_mut().lines();
    assert_eq!(lines.len(), 10);
    for line in &lines {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 6, "bad line {:?}", line);
        fields[0].parse::<u32>().unwrap();
        for f in &fields[1..5] {
            f.parse::<f64>().unwrap();
        }
        assert_eq!(u8::from_str_radix(fields[5], 16).unwrap(), 0);
    }
    // Two revolutions per second from the 600 ms report on.
    assert!(lines[5].starts_with("600,120.00,"), "{}", lines[5]);
}

#[test]
fn start_and_stop_in_one_chunk_are_handled_in_order() {
    let (mut app, mut hw, mut sinks) = rig(100);
    sinks.0.transport_mut().host_sends(&[START, PING, STOP]);
    drain_rx(&mut app, &mut hw, &mut sinks, 42);

    assert_eq!(app.state(), StateId::Idle);
    assert_eq!(sinks.0.transport_mut().tx, [PONG]);
    assert!(app.session().is_none());
}

#[test]
fn stop_ends_the_report_stream() {
    let (mut app, mut hw, mut sinks) = rig(10);
    sinks.0.transport_mut().host_sends(&[START]);
    drain_rx(&mut app, &mut hw, &mut sinks, 0);
    for i in 1..=50u64 {
        app.tick(i * 1_000, &mut hw, &mut sinks);
    }
    sinks.0.transport_mut().host_sends(&[STOP]);
    drain_rx(&mut app, &mut hw, &mut sinks, 50_000);
    for i in 51..=100u64 {
        app.tick(i * 1_000, &mut hw, &mut sinks);
    }

    assert_eq!(sinks.0.transport_mut().lines().len(), 5);
}

#[test]
fn short_writes_are_counted_not_fatal() {
    let (mut app, mut hw, mut sinks) = rig(10);
    sinks.0.transport_mut().write_limit = Some(8);
    sinks.0.transport_mut().host_sends(&[START]);
    drain_rx(&mut app, &mut hw, &mut sinks, 0);
    for i in 1..=30u64 {
        app.tick(i * 1_000, &mut hw, &mut sinks);
    }

    assert_eq!(sinks.0.write_errors(), 3);
    assert_eq!(app.state(), StateId::Recording);

    sinks.0.transport_mut().fail_writes = true;
    sinks.0.transport_mut().host_sends(&[PING]);
    drain_rx(&mut app, &mut hw, &mut sinks, 30_000);
    assert_eq!(sinks.0.write_errors(), 4);
}
