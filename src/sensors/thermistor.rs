//! Axle NTC thermistor on an ADC channel.
//!
//! Wired as the low side of a voltage divider: a fixed 10 kOhm pull-up
//! to the ADC reference, thermistor to ground, ADC on the midpoint.
//!
//! ```text
//!   Vref ── R_pullup ──┬── ADC
//!                      │
//!                    R_ntc
//!                      │
//!                     GND        R_ntc = R_pullup * raw / (full_scale - raw)
//! ```
//!
//! Resistance is converted to temperature with the Steinhart-Hart equation
//! `1/T = A + B ln R + C (ln R)^3`. The coefficients are solved from three
//! calibration points, so a different part only needs three table entries
//! from its datasheet.
//!
//! The maths runs in `f64`: `C` is ~1e-7 and loses most of its precision
//! in `f32` when solved from three points.

use serde::{Deserialize, Serialize};

use super::{SampleStatus, TemperatureSample};
use crate::error::SensorError;

const KELVIN_OFFSET: f64 = 273.15;

/// One (temperature, resistance) pair from the thermistor datasheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub celsius: f32,
    pub ohms: f32,
}

/// 10 kOhm @ 25 C, B = 3950 NTC — the part fitted to the rig axle.
pub const DEFAULT_CALIBRATION: [CalibrationPoint; 3] = [
    CalibrationPoint { celsius: 0.0, ohms: 32_650.0 },
    CalibrationPoint { celsius: 25.0, ohms: 10_000.0 },
    CalibrationPoint { celsius: 50.0, ohms: 3_602.0 },
];

/// Steinhart-Hart coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteinhartHart {
    a: f64,
    b: f64,
    c: f64,
}

impl SteinhartHart {
    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// Solve the three coefficients from three calibration points.
    pub fn from_calibration(points: &[CalibrationPoint; 3]) -> Result<Self, SensorError> {
        let mut l = [0.0_f64; 3];
        let mut y = [0.0_f64; 3];
        for (i, p) in points.iter().enumerate() {
            if !(p.ohms.is_finite() && p.ohms > 0.0) {
                return Err(SensorError::BadCalibration("resistance must be positive"));
            }
            let kelvin = f64::from(p.celsius) + KELVIN_OFFSET;
            if !(kelvin.is_finite() && kelvin > 0.0) {
                return Err(SensorError::BadCalibration("temperature below absolute zero"));
            }
            l[i] = f64::from(p.ohms).ln();
            y[i] = 1.0 / kelvin;
        }

        let (l1, l2, l3) = (l[0], l[1], l[2]);
        if (l2 - l1).abs() < 1e-9 || (l3 - l1).abs() < 1e-9 || (l3 - l2).abs() < 1e-9 {
            return Err(SensorError::BadCalibration("resistances must be distinct"));
        }

        let g2 = (y[1] - y[0]) / (l2 - l1);
        let g3 = (y[2] - y[0]) / (l3 - l1);
        let c = (g3 - g2) / (l3 - l2) / (l1 + l2 + l3);
        let b = g2 - c * (l1 * l1 + l1 * l2 + l2 * l2);
        let a = y[0] - (b + l1 * l1 * c) * l1;

        let curve = Self { a, b, c };
        if !(a.is_finite() && b.is_finite() && c.is_finite()) {
            return Err(SensorError::BadCalibration("curve is not finite"));
        }
        // NTC: 1/T must rise with ln R.
        if b <= 0.0 {
            return Err(SensorError::BadCalibration("curve is not NTC"));
        }
        Ok(curve)
    }

    /// Temperature (°C) at the given resistance.
    pub fn celsius(&self, ohms: f64) -> f64 {
        let ln_r = ohms.ln();
        let inv_t = self.a + self.b * ln_r + self.c * ln_r * ln_r * ln_r;
        1.0 / inv_t - KELVIN_OFFSET
    }
}

/// Divider + curve for the axle channel.
#[derive(Debug, Clone)]
pub struct Thermistor {
    curve: SteinhartHart,
    pullup_ohms: f64,
    full_scale: u16,
}

impl Thermistor {
    pub fn new(
        calibration: &[CalibrationPoint; 3],
        pullup_ohms: f32,
        full_scale: u16,
    ) -> Result<Self, SensorError> {
        if full_scale < 2 {
            return Err(SensorError::BadCalibration("ADC full scale too small"));
        }
        if !(pullup_ohms.is_finite() && pullup_ohms > 0.0) {
            return Err(SensorError::BadCalibration("pull-up must be positive"));
        }
        let thermistor = Self {
            curve: SteinhartHart::from_calibration(calibration)?,
            pullup_ohms: f64::from(pullup_ohms),
            full_scale,
        };

        // The curve must stay physical and ordered between the clamp rails.
        let hot = thermistor.convert(1).celsius;
        let cold = thermistor.convert(full_scale - 1).celsius;
        if !(hot.is_finite() && cold.is_finite() && cold > -KELVIN_OFFSET as f32 && cold <= hot) {
            return Err(SensorError::BadCalibration("curve invalid across the ADC range"));
        }
        Ok(thermistor)
    }

    /// Resistance seen at `raw`, with the code clamped to `1..full_scale`.
    /// Returns `(ohms, clamped)`.
    pub fn resistance(&self, raw: u16) -> (f64, bool) {
        let clamped_raw = raw.clamp(1, self.full_scale - 1);
        let r = self.pullup_ohms * f64::from(clamped_raw)
            / f64::from(self.full_scale - clamped_raw);
        (r, clamped_raw != raw)
    }

    /// Convert a raw ADC code to a temperature sample.
    pub fn convert(&self, raw: u16) -> TemperatureSample {
        let (ohms, clamped) = self.resistance(raw);
        let celsius = self.curve.celsius(ohms) as f32;
        let status = if clamped {
            SampleStatus::Clamped
        } else {
            SampleStatus::Fresh
        };
        TemperatureSample { celsius, status }
    }

    /// The ADC code a given resistance would produce (test / bench helper).
    pub fn code_for_resistance(&self, ohms: f64) -> u16 {
        let fs = f64::from(self.full_scale);
        (fs * ohms / (ohms + self.pullup_ohms)).round() as u16
    }

    pub fn full_scale(&self) -> u16 {
        self.full_scale
    }
}
