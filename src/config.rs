//! Rig configuration parameters
//!
//! All tunable parameters for the wheel test rig firmware.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

use crate::sensors::infrared::{BEARING_ADDRESS, WHEEL_ADDRESS};
use crate::sensors::tachometer::EdgePolarity;
use crate::sensors::thermistor::{CalibrationPoint, DEFAULT_CALIBRATION};

/// Core rig configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigConfig {
    // --- Tachometer ---
    /// Pin transition that marks one revolution
    pub tach_edge: EdgePolarity,
    /// Minimum interval between accepted edges (µs)
    pub tach_debounce_us: u32,
    /// Capture edges in a GPIO ISR instead of polling the level each tick
    pub tach_interrupt: bool,

    // --- Infrared thermometers ---
    pub wheel_address: u8,
    pub bearing_address: u8,
    /// I2C bus clock (Hz)
    pub i2c_frequency_hz: u32,
    /// Upper bound on one SMBus transaction (ms)
    pub ir_bus_timeout_ms: u32,

    // --- Axle thermistor ---
    /// Divider pull-up resistor (Ω)
    pub thermistor_pullup_ohms: f32,
    /// Largest ADC code (4095 for 12-bit)
    pub adc_full_scale: u16,
    /// Three datasheet points the Steinhart-Hart curve is fitted through
    pub thermistor_calibration: [CalibrationPoint; 3],

    // --- Timing ---
    /// Sampling tick period (µs)
    pub tick_period_us: u32,
    /// A report is emitted every N sampling ticks
    pub report_every_ticks: u32,

    // --- Serial ---
    pub baud_rate: u32,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            // Tachometer
            tach_edge: EdgePolarity::Falling,
            tach_debounce_us: 2_000, // caps at 30 000 RPM
            tach_interrupt: false,

            // Infrared
            wheel_address: WHEEL_ADDRESS,
            bearing_address: BEARING_ADDRESS,
            i2c_frequency_hz: 100_000, // SMBus max
            ir_bus_timeout_ms: 10,

            // Thermistor
            thermistor_pullup_ohms: 10_000.0,
            adc_full_scale: 4095,
            thermistor_calibration: DEFAULT_CALIBRATION,

            // Timing
            tick_period_us: 1_000,  // 1 kHz
            report_every_ticks: 100, // 10 Hz

            // Serial
            baud_rate: 115_200,
        }
    }
}

impl RigConfig {
    /// Range-check every field. Returns the first violation.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(1..=1_000_000).contains(&self.tach_debounce_us) {
            return Err("tach_debounce_us must be 1–1000000");
        }
        if !is_seven_bit_address(self.wheel_address) {
            return Err("wheel_address must be a 7-bit address 0x08–0x77");
        }
        if !is_seven_bit_address(self.bearing_address) {
            return Err("bearing_address must be a 7-bit address 0x08–0x77");
        }
        if self.wheel_address == self.bearing_address {
            return Err("wheel_address and bearing_address must differ");
        }
        if !(10_000..=400_000).contains(&self.i2c_frequency_hz) {
            return Err("i2c_frequency_hz must be 10000–400000");
        }
        if !(1..=1_000).contains(&self.ir_bus_timeout_ms) {
            return Err("ir_bus_timeout_ms must be 1–1000");
        }
        if !(100.0..=1_000_000.0).contains(&self.thermistor_pullup_ohms) {
            return Err("thermistor_pullup_ohms must be 100–1000000");
        }
        if !(255..=65_535).contains(&self.adc_full_scale) {
            return Err("adc_full_scale must be 255–65535");
        }
        if crate::sensors::thermistor::Thermistor::new(
            &self.thermistor_calibration,
            self.thermistor_pullup_ohms,
            self.adc_full_scale,
        )
        .is_err()
        {
            return Err("thermistor_calibration does not define a valid curve");
        }
        if !(100..=1_000_000).contains(&self.tick_period_us) {
            return Err("tick_period_us must be 100–1000000");
        }
        if !(1..=100_000).contains(&self.report_every_ticks) {
            return Err("report_every_ticks must be 1–100000");
        }
        if !(9_600..=2_000_000).contains(&self.baud_rate) {
            return Err("baud_rate must be 9600–2000000");
        }
        Ok(())
    }

    /// Interval between reports (µs).
    pub fn report_period_us(&self) -> u64 {
        u64::from(self.tick_period_us) * u64::from(self.report_every_ticks)
    }
}

fn is_seven_bit_address(addr: u8) -> bool {
    (0x08..=0x77).contains(&addr)
}
