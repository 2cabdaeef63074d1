//! GPIO / peripheral pin assignments for the rig DAQ board (ESP32-S3).
//!
//! Single source of truth for raw GPIO numbers and ADC channels. `main`
//! takes the matching typed pins from `Peripherals`; keep the two in step.

// ---------------------------------------------------------------------------
// Tachometer
// ---------------------------------------------------------------------------

/// Wheel pulse input. Internal pull-up enabled; the sensor pulls LOW once
/// per revolution.
pub const TACH_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Axle thermistor — Analog (ADC1)
// ---------------------------------------------------------------------------

/// Divider midpoint (10 kOhm pull-up to 3V3, NTC to GND).
/// ADC1 channel 8 (GPIO 9 on ESP32-S3).
pub const THERMISTOR_ADC_GPIO: i32 = 9;
pub const THERMISTOR_ADC_CHANNEL: u32 = 8;

// ---------------------------------------------------------------------------
// I²C bus — wheel (0x5A) and bearing (0x5B) IR thermometers
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 14;
pub const I2C_SCL_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// UART — host link
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 17;
pub const UART_RX_GPIO: i32 = 18;
