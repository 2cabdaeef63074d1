//! Thermal sensor interface: both IR thermometers plus the axle thermistor.
//!
//! Owns the shared I2C bus and the thermistor ADC channel. Every read
//! degrades instead of failing; see [`SampleStatus`] for what the caller
//! gets back.

use embedded_hal::i2c::I2c;
use log::{info, warn};

use super::infrared::IrThermometer;
use super::thermistor::Thermistor;
use super::{AnalogInput, SampleStatus, TemperatureSample, ThermalReading};

pub struct ThermalSensors<I2C, A> {
    bus: I2C,
    wheel: IrThermometer,
    bearing: IrThermometer,
    thermistor: Thermistor,
    adc: A,
    axle_last: Option<f32>,
    axle_stale: bool,
}

impl<I2C: I2c, A: AnalogInput> ThermalSensors<I2C, A> {
    pub fn new(
        bus: I2C,
        wheel_address: u8,
        bearing_address: u8,
        thermistor: Thermistor,
        adc: A,
    ) -> Self {
        Self {
            bus,
            wheel: IrThermometer::new(wheel_address),
            bearing: IrThermometer::new(bearing_address),
            thermistor,
            adc,
            axle_last: None,
            axle_stale: false,
        }
    }

    /// Check both thermometers answer and reset per-session staleness.
    /// Returns the number of thermometers that answered.
    pub fn initialize(&mut self) -> u8 {
        let wheel = self.wheel.initialize(&mut self.bus);
        let bearing = self.bearing.initialize(&mut self.bus);
        self.axle_last = None;
        self.axle_stale = false;
        info!(
            "Thermal sensors: wheel {}, bearing {}",
            if wheel { "online" } else { "OFFLINE" },
            if bearing { "online" } else { "OFFLINE" },
        );
        u8::from(wheel) + u8::from(bearing)
    }

    pub fn read_wheel_temperature(&mut self) -> TemperatureSample {
        self.wheel.read(&mut self.bus)
    }

    pub fn read_bearing_temperature(&mut self) -> TemperatureSample {
        self.bearing.read(&mut self.bus)
    }

    pub fn read_axle_temperature(&mut self) -> TemperatureSample {
        match self.adc.read_raw() {
            Ok(raw) => {
                let sample = self.thermistor.convert(raw);
                self.axle_last = Some(sample.celsius);
                self.axle_stale = false;
                sample
            }
            Err(e) => {
                if !self.axle_stale {
                    warn!("Axle ADC read failed ({:?}), holding last value", e);
                }
                self.axle_stale = true;
                TemperatureSample {
                    celsius: self.axle_last.unwrap_or(f32::NAN),
                    status: SampleStatus::Stale,
                }
            }
        }
    }

    pub fn read_all(&mut self) -> ThermalReading {
        ThermalReading {
            wheel: self.read_wheel_temperature(),
            bearing: self.read_bearing_temperature(),
            axle: self.read_axle_temperature(),
        }
    }

    pub fn wheel(&self) -> &IrThermometer {
        &self.wheel
    }

    pub fn bearing(&self) -> &IrThermometer {
        &self.bearing
    }
}
