//! MLX90614-family infrared thermometers on a shared I2C (SMBus) bus.
//!
//! The rig carries two of them — one aimed at the wheel surface, one at the
//! bearing housing — distinguished only by their bus address. Each is an
//! [`IrThermometer`] value; the bus itself is borrowed per call so both can
//! share one `embedded_hal::i2c::I2c` driver.
//!
//! Object temperature lives in RAM register `0x07` and is read as an SMBus
//! "read word" with packet error code:
//!
//! ```text
//!   S addr+W  cmd  Sr addr+R  LSB  MSB  PEC  P
//! ```
//!
//! The device converts continuously, so a read never waits on a
//! conversion; the worst case is bounded by the I2C driver timeout.

use crc::{CRC_8_SMBUS, Crc};
use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use log::{debug, warn};

use super::{SampleStatus, TemperatureSample};
use crate::error::SensorError;

/// Bus address of the wheel-surface thermometer.
pub const WHEEL_ADDRESS: u8 = 0x5A;
/// Bus address of the bearing thermometer.
pub const BEARING_ADDRESS: u8 = 0x5B;

/// Ambient (die) temperature — read to check the device is present.
const REG_T_AMBIENT: u8 = 0x06;
/// Object 1 temperature.
const REG_T_OBJECT1: u8 = 0x07;

/// Kelvin per LSB of the temperature registers.
const KELVIN_PER_LSB: f32 = 0.02;
const KELVIN_OFFSET: f32 = 273.15;
/// Set by the device when the returned word is not a valid reading.
const ERROR_FLAG: u16 = 0x8000;

/// Value returned for a thermometer that is offline or has never produced
/// a reading.
pub const INVALID_CELSIUS: f32 = f32::NAN;

/// One addressable infrared thermometer.
#[derive(Debug, Clone, Copy)]
pub struct IrThermometer {
    address: u8,
    last_value: Option<f32>,
    stale: bool,
    online: bool,
}

impl IrThermometer {
    pub const fn new(address: u8) -> Self {
        Self {
            address,
            last_value: None,
            stale: false,
            online: false,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn last_value(&self) -> Option<f32> {
        self.last_value
    }

    /// Check the device answers and reset per-session state.
    ///
    /// A thermometer that does not answer stays offline until the next
    /// call; that is not an error for the caller.
    pub fn initialize<I: I2c>(&mut self, bus: &mut I) -> bool {
        self.last_value = None;
        self.stale = false;
        match read_word(bus, self.address, REG_T_AMBIENT) {
            Ok(raw) => {
                self.online = true;
                debug!(
                    "IR 0x{:02X}: online, ambient {:.2} C",
                    self.address,
                    raw_to_celsius(raw)
                );
            }
            Err(e) => {
                self.online = false;
                warn!("IR 0x{:02X}: offline ({})", self.address, e);
            }
        }
        self.online
    }

    /// Read the object temperature.
    ///
    /// Offline: `INVALID_CELSIUS` / `Invalid` without touching the bus.
    /// Read failure: last known value (or `INVALID_CELSIUS`) / `Stale`.
    pub fn read<I: I2c>(&mut self, bus: &mut I) -> TemperatureSample {
        if !self.online {
            return TemperatureSample::invalid();
        }
        match read_word(bus, self.address, REG_T_OBJECT1) {
            Ok(raw) => {
                let celsius = raw_to_celsius(raw);
                self.last_value = Some(celsius);
                self.stale = false;
                TemperatureSample {
                    celsius,
                    status: SampleStatus::Fresh,
                }
            }
            Err(e) => {
                if !self.stale {
                    warn!("IR 0x{:02X}: read failed ({}), holding last value", self.address, e);
                }
                self.stale = true;
                TemperatureSample {
                    celsius: self.last_value.unwrap_or(INVALID_CELSIUS),
                    status: SampleStatus::Stale,
                }
            }
        }
    }
}

/// Convert a temperature register word to Celsius.
pub fn raw_to_celsius(raw: u16) -> f32 {
    f32::from(raw) * KELVIN_PER_LSB - KELVIN_OFFSET
}

/// SMBus read-word with PEC check.
fn read_word<I: I2c>(bus: &mut I, address: u8, command: u8) -> Result<u16, SensorError> {
    let mut buf = [0u8; 3];
    bus.write_read(address, &[command], &mut buf)
        .map_err(|e| match e.kind() {
            ErrorKind::NoAcknowledge(_) => SensorError::NoAcknowledge(address),
            _ => SensorError::Bus(address),
        })?;

    let expected = smbus_pec(&[address << 1, command, (address << 1) | 1, buf[0], buf[1]]);
    if expected != buf[2] {
        return Err(SensorError::PecMismatch(address));
    }

    let raw = u16::from_le_bytes([buf[0], buf[1]]);
    if raw & ERROR_FLAG != 0 {
        return Err(SensorError::ErrorFlag(address));
    }
    Ok(raw)
}

const SMBUS_PEC: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

/// SMBus packet error code: CRC-8, polynomial x^8 + x^2 + x + 1, init 0.
pub fn smbus_pec(bytes: &[u8]) -> u8 {
    SMBUS_PEC.checksum(bytes)
}
