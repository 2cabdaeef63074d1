//! HardwareAdapter against modelled peripherals.
//!
//! The MLX90614 bus model speaks SMBus with PEC, so these tests run the
//! real infrared, thermistor and tachometer code under the adapter.

use wheeltest::adapters::hardware::{HardwareAdapter, TachInput};
use wheeltest::adapters::serial_sink::SerialEventSink;
use wheeltest::app::commands::AppCommand;
use wheeltest::app::ports::SensorPort;
use wheeltest::app::service::AppService;
use wheeltest::config::RigConfig;
use wheeltest::sensors::infrared::{BEARING_ADDRESS, WHEEL_ADDRESS};
use wheeltest::sensors::tachometer::{self, EdgePolarity};
use wheeltest::sensors::thermal::ThermalSensors;
use wheeltest::sensors::thermistor::{DEFAULT_CALIBRATION, Thermistor};
use wheeltest::sensors::{
    FLAG_AXLE_CLAMPED, FLAG_AXLE_STALE, FLAG_BEARING_INVALID, FLAG_WHEEL_STALE, SampleStatus,
    TachSample,
};

use super::mock_hw::{LoopbackTransport, MlxBus, ScriptedPin, SharedAdc};

type Adapter = HardwareAdapter<MlxBus, SharedAdc, ScriptedPin>;

/// 2048 of 4095 is the divider midpoint: 10 kOhm, 25 C.
const MIDPOINT: u16 = 2048;

fn bench() -> (Adapter, MlxBus, SharedAdc, ScriptedPin) {
    let bus = MlxBus::new();
    bus.set_celsius(WHEEL_ADDRESS, 41.27);
    bus.set_celsius(BEARING_ADDRESS, 35.02);
    let adc = SharedAdc::new(MIDPOINT);
    let pin = ScriptedPin::new();
    let thermistor = Thermistor::new(&DEFAULT_CALIBRATION, 10_000.0, 4095).unwrap();
    let thermal = ThermalSensors::new(
        bus.clone(),
        WHEEL_ADDRESS,
        BEARING_ADDRESS,
        thermistor,
        adc.clone(),
    );
    let hw = HardwareAdapter::new(thermal, TachInput::Polled(pin.clone()), EdgePolarity::Falling);
    (hw, bus, adc, pin)
}

#[test]
fn initialize_counts_answering_thermometers() {
    let (mut hw, bus, _, _) = bench();
    assert_eq!(hw.initialize(), 2);

    bus.set_nack(BEARING_ADDRESS, true);
    assert_eq!(hw.initialize(), 1);
    assert!(hw.thermal().wheel().is_online());
    assert!(!hw.thermal().bearing().is_online());
}

#[test]
fn healthy_rig_reads_fresh_on_every_channel() {
    let (mut hw, _, _, _) = bench();
    hw.initialize();
    let r = hw.read_thermal();

    assert_eq!(r.wheel.status, SampleStatus::Fresh);
    assert!((r.wheel.celsius - 41.27).abs() < 0.02);
    assert!((r.bearing.celsius - 35.02).abs() < 0.02);
    assert!((r.axle.celsius - 25.0).abs() < 0.1);
    assert_eq!(r.flags(), 0);
}

#[test]
fn absent_bearing_thermometer_is_invalid_and_not_polled() {
    let (mut hw, bus, _, _) = bench();
    bus.set_nack(BEARING_ADDRESS, true);
    hw.initialize();
    let before = bus.transactions();

    let r = hw.read_thermal();
    assert!(r.bearing.celsius.is_nan());
    assert_eq!(r.flags(), FLAG_BEARING_INVALID);
    // Only the wheel was addressed.
    assert_eq!(bus.transactions() - before, 1);
}

#[test]
fn wheel_dropout_after_start_holds_last_value() {
    let (mut hw, bus, _, _) = bench();
    hw.initialize();
    let first = hw.read_thermal();

    bus.set_nack(WHEEL_ADDRESS, true);
    let r = hw.read_thermal();
    assert_eq!(r.wheel.status, SampleStatus::Stale);
    assert_eq!(r.wheel.celsius, first.wheel.celsius);
    assert_eq!(r.flags(), FLAG_WHEEL_STALE);

    bus.set_nack(WHEEL_ADDRESS, false);
    assert_eq!(hw.read_thermal().flags(), 0);
}

#[test]
fn pec_mismatch_is_treated_as_a_failed_read() {
    let (mut hw, bus, _, _) = bench();
    hw.initialize();
    hw.read_thermal();
    bus.corrupt_pec(WHEEL_ADDRESS);

    assert_eq!(hw.read_thermal().wheel.status, SampleStatus::Stale);
}

#[test]
fn thermistor_rail_codes_are_clamped_and_adc_errors_stale() {
    let (mut hw, _, adc, _) = bench();
    hw.initialize();

    adc.set(Some(0));
    let r = hw.read_thermal();
    assert_eq!(r.axle.status, SampleStatus::Clamped);
    assert!(r.axle.celsius.is_finite());
    assert_eq!(r.flags(), FLAG_AXLE_CLAMPED);

    adc.set(None);
    let r = hw.read_thermal();
    assert_eq!(r.axle.status, SampleStatus::Stale);
    assert_eq!(r.flags(), FLAG_AXLE_STALE);
}

#[test]
fn pin_read_error_holds_the_last_level() {
    let (mut hw, _, _, pin) = bench();
    pin.push(Some(false));
    pin.push(None);
    pin.push(None);

    assert!(matches!(hw.poll_tachometer(), TachSample::Level(false)));
    assert!(matches!(hw.poll_tachometer(), TachSample::Level(false)));
    assert!(matches!(hw.poll_tachometer(), TachSample::Level(false)));
    assert_eq!(hw.pin_errors(), 2);
    assert!(matches!(hw.poll_tachometer(), TachSample::Level(true)));
}

fn interrupt_adapter() -> Adapter {
    let thermistor = Thermistor::new(&DEFAULT_CALIBRATION, 10_000.0, 4095).unwrap();
    let thermal = ThermalSensors::new(
        MlxBus::new(),
        WHEEL_ADDRESS,
        BEARING_ADDRESS,
        thermistor,
        SharedAdc::new(MIDPOINT),
    );
    HardwareAdapter::new(thermal, TachInput::Interrupt, EdgePolarity::Falling)
}

fn expect_edges(hw: &mut Adapter) -> Vec<u64> {
    match hw.poll_tachometer() {
        TachSample::Edges(edges) => edges.to_vec(),
        other => panic!("expected edges, got {:?}", other),
    }
}

// The edge latch is process-global, so its whole lifecycle lives in one test.
#[test]
fn interrupt_mode_latches_edges_only_during_a_session() {
    let mut hw = interrupt_adapter();

    // Nothing is captured before the first START.
    tachometer::tach_isr_handler(10);
    assert!(!tachometer::edge_latch_armed());
    assert_eq!(hw.initialize(), 0);
    assert!(tachometer::edge_latch_armed());

    tachometer::tach_isr_handler(1_000_000);
    tachometer::tach_isr_handler(1_500_000);
    assert_eq!(expect_edges(&mut hw), [1_000_000, 1_500_000]);
    assert!(expect_edges(&mut hw).is_empty());

    // Through the service: a wheel spinning after STOP never fills the
    // latch, so no edges are counted as lost.
    let mut app = AppService::new(RigConfig::default());
    let mut sink = SerialEventSink::new(LoopbackTransport::new());
    app.start(&mut sink);
    app.handle_command(AppCommand::Start, 2_000_000, &mut hw, &mut sink);
    tachometer::tach_isr_handler(2_100_000);
    app.tick(2_101_000, &mut hw, &mut sink);
    tachometer::tach_isr_handler(2_600_000);
    app.tick(2_601_000, &mut hw, &mut sink);
    assert_eq!(app.rpm(), Some(120.0));

    app.handle_command(AppCommand::Stop, 2_700_000, &mut hw, &mut sink);
    assert!(!tachometer::edge_latch_armed());
    let overflows = tachometer::edge_overflows();
    for tick in 0..4u64 {
        for edge in 0..10u64 {
            tachometer::tach_isr_handler(3_000_000 + tick * 10_000 + edge * 1_000);
        }
        app.tick(3_000_000 + (tick + 1) * 10_000, &mut hw, &mut sink);
    }
    assert_eq!(tachometer::edge_overflows(), overflows);

    // The next session starts from an empty latch.
    app.handle_command(AppCommand::Start, 4_000_000, &mut hw, &mut sink);
    assert!(expect_edges(&mut hw).is_empty());
    assert_eq!(app.last_revolution_us(), None);
    hw.release();
}

#[test]
fn full_pipeline_writes_report_lines_to_the_wire() {
    let (mut hw, _, _, pin) = bench();
    // 250 ms per revolution at a 1 ms tick: 240 RPM.
    pin.script_revolutions(250, 8);
    let config = RigConfig {
        report_every_ticks: 1_000,
        ..Default::default()
    };
    let mut app = AppService::new(config);
    let mut sink = SerialEventSink::new(LoopbackTransport::new());
    app.start(&mut sink);

    app.handle_command(AppCommand::Start, 0, &mut hw, &mut sink);
    for i in 1..=2_000u64 {
        app.tick(i * 1_000, &mut hw, &mut sink);
    }

    let lines = sink.transport_mut().lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("1000,240.00,41.2"), "{}", lines[0]);
    assert!(lines[1].starts_with("2000,240.00,"), "{}", lines[1]);
    assert!(lines[1].ends_with(",00"), "{}", lines[1]);
}
