//! Thermistor ADC channel.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from static atomics for injection, including a
//! forced-failure switch.

use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use crate::error::SensorError;
use crate::sensors::AnalogInput;

static SIM_THERMISTOR_ADC: AtomicU16 = AtomicU16::new(2048);
static SIM_THERMISTOR_FAIL: AtomicBool = AtomicBool::new(false);

/// Set the code the simulated ADC returns.
pub fn sim_set_thermistor_adc(raw: u16) {
    SIM_THERMISTOR_ADC.store(raw, Ordering::Relaxed);
}

/// Make every simulated read fail (`true`) or succeed (`false`).
pub fn sim_set_thermistor_fail(fail: bool) {
    SIM_THERMISTOR_FAIL.store(fail, Ordering::Relaxed);
}

pub struct ThermistorAdc {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    channel: u32,
}

impl ThermistorAdc {
    pub fn new(channel: u32) -> Self {
        Self { channel }
    }
}

impl AnalogInput for ThermistorAdc {
    type Error = SensorError;

    #[cfg(target_os = "espidf")]
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        super::hw_init::adc1_read(self.channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        if SIM_THERMISTOR_FAIL.load(Ordering::Relaxed) {
            return Err(SensorError::AdcReadFailed);
        }
        Ok(SIM_THERMISTOR_ADC.load(Ordering::Relaxed))
    }
}
