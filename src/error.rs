//! Unified error types for the wheel test rig firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! boot path's error handling uniform. All variants are `Copy` so sensor
//! failures can be passed through the sampling path without allocation.
//!
//! None of these are fatal at runtime: sensor and comms errors degrade to
//! stale / dropped data, and only boot-time `Init` errors reach `main`.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned unusable data.
    Sensor(SensorError),
    /// The host serial link failed.
    Comms(CommsError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Device did not acknowledge its bus address.
    NoAcknowledge(u8),
    /// Any other bus failure (arbitration loss, timeout, overrun).
    Bus(u8),
    /// SMBus packet error code did not match the received bytes.
    PecMismatch(u8),
    /// The thermometer set its error flag (bit 15) in the returned word.
    ErrorFlag(u8),
    /// ADC read returned an error or timed out.
    AdcReadFailed,
    /// Calibration data cannot produce a valid curve.
    BadCalibration(&'static str),
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAcknowledge(addr) => write!(f, "no ACK from 0x{addr:02X}"),
            Self::Bus(addr) => write!(f, "bus error talking to 0x{addr:02X}"),
            Self::PecMismatch(addr) => write!(f, "PEC mismatch from 0x{addr:02X}"),
            Self::ErrorFlag(addr) => write!(f, "error flag set by 0x{addr:02X}"),
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::BadCalibration(msg) => write!(f, "bad calibration: {msg}"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// Reading from the host link failed; the byte is dropped.
    ReadFailed,
    /// Writing to the host link failed or wrote short.
    WriteFailed,
    /// A report line did not fit its fixed-capacity buffer.
    ReportOverflow,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "serial read failed"),
            Self::WriteFailed => write!(f, "serial write failed"),
            Self::ReportOverflow => write!(f, "report exceeds line buffer"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
