//! Tachometer input pin (polled mode).
//!
//! On ESP-IDF the level comes from `gpio_get_level` on the pin configured
//! by `hw_init`. On host the level is a static atomic so tests and the
//! simulator can drive revolutions.

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::{ErrorType, InputPin};

static SIM_TACH_LEVEL: AtomicBool = AtomicBool::new(true);

/// Drive the simulated tach line.
pub fn sim_set_tach_level(high: bool) {
    SIM_TACH_LEVEL.store(high, Ordering::Relaxed);
}

pub struct TachPin {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    gpio: i32,
}

impl TachPin {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    #[cfg(target_os = "espidf")]
    fn level(&self) -> bool {
        super::hw_init::gpio_read(self.gpio)
    }

    #[cfg(not(target_os = "espidf"))]
    fn level(&self) -> bool {
        SIM_TACH_LEVEL.load(Ordering::Relaxed)
    }
}

impl ErrorType for TachPin {
    type Error = Infallible;
}

impl InputPin for TachPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.level())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.level())
    }
}
