//! Sensor subsystem — individual drivers and the aggregating
//! [`ThermalSensors`](thermal::ThermalSensors).
//!
//! Every temperature channel produces a [`TemperatureSample`]; one pass over
//! all three is a [`ThermalReading`], which is what the report encoder and
//! the FSM context consume.

pub mod infrared;
pub mod tachometer;
pub mod thermal;
pub mod thermistor;

pub use tachometer::TachSample;

use serde::{Deserialize, Serialize};

/// Quality of one temperature value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SampleStatus {
    /// Read successfully this pass.
    Fresh,
    /// This pass failed; the value is the last good one (or NaN if none).
    Stale,
    /// Channel is offline; the value is NaN.
    #[default]
    Invalid,
    /// ADC code hit a rail and was clamped before conversion.
    Clamped,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSample {
    pub celsius: f32,
    pub status: SampleStatus,
}

impl TemperatureSample {
    pub const fn invalid() -> Self {
        Self {
            celsius: f32::NAN,
            status: SampleStatus::Invalid,
        }
    }
}

impl Default for TemperatureSample {
    fn default() -> Self {
        Self::invalid()
    }
}

// ── Report flag bits ──────────────────────────────────────────

pub const FLAG_WHEEL_STALE: u8 = 1 << 0;
pub const FLAG_WHEEL_INVALID: u8 = 1 << 1;
pub const FLAG_BEARING_STALE: u8 = 1 << 2;
pub const FLAG_BEARING_INVALID: u8 = 1 << 3;
pub const FLAG_AXLE_STALE: u8 = 1 << 4;
pub const FLAG_AXLE_CLAMPED: u8 = 1 << 5;

/// One pass over the three temperature channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThermalReading {
    pub wheel: TemperatureSample,
    pub bearing: TemperatureSample,
    pub axle: TemperatureSample,
}

impl ThermalReading {
    /// Data-quality bitmask carried in the report line.
    pub fn flags(&self) -> u8 {
        let ir = |s: &TemperatureSample, stale: u8, invalid: u8| match s.status {
            SampleStatus::Stale => stale,
            SampleStatus::Invalid => invalid,
            SampleStatus::Fresh | SampleStatus::Clamped => 0,
        };
        let axle = match self.axle.status {
            SampleStatus::Stale | SampleStatus::Invalid => FLAG_AXLE_STALE,
            SampleStatus::Clamped => FLAG_AXLE_CLAMPED,
            SampleStatus::Fresh => 0,
        };
        ir(&self.wheel, FLAG_WHEEL_STALE, FLAG_WHEEL_INVALID)
            | ir(&self.bearing, FLAG_BEARING_STALE, FLAG_BEARING_INVALID)
            | axle
    }
}

/// A single-channel ADC returning raw codes.
pub trait AnalogInput {
    type Error: core::fmt::Debug;

    fn read_raw(&mut self) -> Result<u16, Self::Error>;
}
