//! Wheel Test Rig Firmware — Main Entry Point
//!
//! Hexagonal architecture with a fixed-rate sampling loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   SerialEventSink   LogEventSink   NvsAdapter │
//! │  (SensorPort)      (EventSink)       (EventSink)    (Config)   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  FSM · Tachometer · Report                             │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  UART host link · TWDT                                         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::time::Duration;

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{self, UartDriver};
use esp_idf_hal::units::Hertz;

use wheeltest::adapters::hardware::{HardwareAdapter, TachInput};
use wheeltest::adapters::log_sink::LogEventSink;
use wheeltest::adapters::nvs::NvsAdapter;
use wheeltest::adapters::serial_sink::SerialEventSink;
use wheeltest::adapters::time::Esp32TimeAdapter;
use wheeltest::app::ports::ConfigPort;
use wheeltest::app::service::AppService;
use wheeltest::config::RigConfig;
use wheeltest::drivers::adc::ThermistorAdc;
use wheeltest::drivers::tach_pin::TachPin;
use wheeltest::drivers::uart::UartTransport;
use wheeltest::drivers::{hw_init, watchdog::Watchdog};
use wheeltest::error::CommsError;
use wheeltest::pins;
use wheeltest::protocol::transport::Transport;
use wheeltest::sensors::tachometer;
use wheeltest::sensors::thermal::ThermalSensors;
use wheeltest::sensors::thermistor::Thermistor;

/// Bytes drained from the UART per loop iteration.
const RX_CHUNK: usize = 32;

/// Sleeps shorter than one FreeRTOS tick busy-wait instead.
const RTOS_TICK_US: u64 = 10_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Wheeltest v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let config = match NvsAdapter::new().and_then(|nvs| nvs.load()) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            RigConfig::default()
        }
    };

    // ── 3. Initialise hardware peripherals ────────────────────
    if let Err(e) = hw_init::init_peripherals(config.tach_edge, config.tach_interrupt) {
        // Without the ADC or tach input there is nothing to record.
        // The watchdog is not armed yet, so halt visibly.
        error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    let watchdog = Watchdog::default();
    let clock = Esp32TimeAdapter::new();

    let peripherals = Peripherals::take()?;

    let i2c_cfg = I2cConfig::new()
        .baudrate(Hertz(config.i2c_frequency_hz).into())
        .timeout(Duration::from_millis(u64::from(config.ir_bus_timeout_ms)).into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio14,
        peripherals.pins.gpio15,
        &i2c_cfg,
    )?;
    info!(
        "I2C0 up (SDA=GPIO{}, SCL=GPIO{}, {} Hz)",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        config.i2c_frequency_hz
    );

    let uart_cfg = uart::config::Config::default().baudrate(Hertz(config.baud_rate));
    let uart = UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio17,
        peripherals.pins.gpio18,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_cfg,
    )?;
    info!(
        "UART1 up (TX=GPIO{}, RX=GPIO{}, {} baud)",
        pins::UART_TX_GPIO,
        pins::UART_RX_GPIO,
        config.baud_rate
    );

    // ── 4. Construct adapters ─────────────────────────────────
    let thermistor = Thermistor::new(
        &config.thermistor_calibration,
        config.thermistor_pullup_ohms,
        config.adc_full_scale,
    )
    .map_err(wheeltest::error::Error::from)?;
    let thermal = ThermalSensors::new(
        i2c,
        config.wheel_address,
        config.bearing_address,
        thermistor,
        ThermistorAdc::new(pins::THERMISTOR_ADC_CHANNEL),
    );
    let tach = if config.tach_interrupt {
        TachInput::Interrupt
    } else {
        TachInput::Polled(TachPin::new(pins::TACH_GPIO))
    };
    let mut hw = HardwareAdapter::new(thermal, tach, config.tach_edge);
    let mut sinks = (
        SerialEventSink::new(UartTransport::new(uart)),
        LogEventSink::new(),
    );

    // ── 5. Construct app service ──────────────────────────────
    let tick_period_us = u64::from(config.tick_period_us);
    let mut app = AppService::new(config);
    app.start(&mut sinks);

    info!("System ready. Waiting for START (0x0F).");

    // ── 6. Sampling loop ──────────────────────────────────────
    let mut rx = [0u8; RX_CHUNK];
    let mut next_tick_us = clock.uptime_us() + tick_period_us;
    let mut overflow_seen: u32 = 0;

    loop {
        let now_us = clock.uptime_us();

        match sinks.0.transport_mut().read(&mut rx) {
            Ok(n) => {
                for &byte in &rx[..n] {
                    app.handle_byte(byte, now_us, &mut hw, &mut sinks);
                }
            }
            Err(e) => warn!("{} ({:?})", CommsError::ReadFailed, e),
        }

        if now_us >= next_tick_us {
            app.tick(now_us, &mut hw, &mut sinks);
            next_tick_us += tick_period_us;
            if next_tick_us <= now_us {
                // Fell behind (e.g. a slow I2C read); skip missed ticks
                // rather than bursting to catch up.
                next_tick_us = now_us + tick_period_us;
            }
        }

        let overflows = tachometer::edge_overflows();
        if overflows != overflow_seen {
            warn!("tach: {} edges dropped (latch full)", overflows.wrapping_sub(overflow_seen));
            overflow_seen = overflows;
        }

        watchdog.feed();

        let remaining = next_tick_us.saturating_sub(clock.uptime_us());
        if remaining >= RTOS_TICK_US {
            FreeRtos::delay_ms((remaining / 1_000) as u32);
        } else if remaining > 0 {
            Ets::delay_us(remaining as u32);
        }
    }
}
