//! Peripheral drivers and one-shot hardware initialisation.

pub mod adc;
pub mod hw_init;
pub mod tach_pin;
#[cfg(target_os = "espidf")]
pub mod uart;
pub mod watchdog;
