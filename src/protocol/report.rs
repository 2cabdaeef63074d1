//! Periodic report line.
//!
//! ```text
//!   <elapsed_ms>,<rpm>,<wheel_c>,<bearing_c>,<axle_c>,<flags>\n
//!   1500,60.00,41.27,35.02,29.88,00
//! ```
//!
//! Floats carry two decimals; an unknown RPM or an invalid temperature is
//! written as `NaN`. `flags` is the data-quality bitmask from
//! [`ThermalReading::flags`] as two uppercase hex digits.

use core::fmt::Write as _;

use heapless::String;

use crate::error::CommsError;
use crate::sensors::ThermalReading;

/// Longest line the encoder will produce.
pub const MAX_LINE_LEN: usize = 96;

pub type ReportLine = String<MAX_LINE_LEN>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    pub elapsed_ms: u32,
    /// `NaN` until the tachometer has timed a full revolution.
    pub rpm: f64,
    pub wheel_c: f32,
    pub bearing_c: f32,
    pub axle_c: f32,
    pub flags: u8,
}

impl Report {
    pub fn new(elapsed_ms: u32, rpm: Option<f64>, thermal: &ThermalReading) -> Self {
        Self {
            elapsed_ms,
            rpm: rpm.unwrap_or(f64::NAN),
            wheel_c: thermal.wheel.celsius,
            bearing_c: thermal.bearing.celsius,
            axle_c: thermal.axle.celsius,
            flags: thermal.flags(),
        }
    }

    /// Render the newline-terminated ASCII line.
    pub fn encode(&self) -> Result<ReportLine, CommsError> {
        let mut line = ReportLine::new();
        writeln!(
            line,
            "{},{:.2},{:.2},{:.2},{:.2},{:02X}",
            self.elapsed_ms, self.rpm, self.wheel_c, self.bearing_c, self.axle_c, self.flags
        )
        .map_err(|_| CommsError::ReportOverflow)?;
        Ok(line)
    }
}
