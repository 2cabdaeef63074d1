//! Hardware adapter — bridges real peripherals to the [`SensorPort`].
//!
//! Owns the thermal sensors (I2C bus + thermistor ADC) and the tachometer
//! input. Generic over the `embedded-hal` bus and pin traits, so the same
//! adapter runs on the ESP-IDF drivers and on test doubles.

use embedded_hal::digital::InputPin;
use embedded_hal::i2c::I2c;
use log::{debug, warn};

use crate::app::ports::SensorPort;
use crate::drivers::hw_init;
use crate::sensors::tachometer::{self, EdgePolarity};
use crate::sensors::thermal::ThermalSensors;
use crate::sensors::{AnalogInput, TachSample, ThermalReading};

/// How the tachometer signal reaches the adapter.
pub enum TachInput<P> {
    /// Level read from the pin once per tick.
    Polled(P),
    /// Edges timestamped by the GPIO ISR into the shared latch.
    Interrupt,
}

pub struct HardwareAdapter<I2C, A, P> {
    thermal: ThermalSensors<I2C, A>,
    tach: TachInput<P>,
    last_level: bool,
    pin_errors: u32,
}

impl<I2C: I2c, A: AnalogInput, P: InputPin> HardwareAdapter<I2C, A, P> {
    pub fn new(thermal: ThermalSensors<I2C, A>, tach: TachInput<P>, polarity: EdgePolarity) -> Self {
        Self {
            thermal,
            tach,
            last_level: polarity.idle_level(),
            pin_errors: 0,
        }
    }

    /// Tach pin read failures since boot.
    pub fn pin_errors(&self) -> u32 {
        self.pin_errors
    }

    pub fn thermal(&self) -> &ThermalSensors<I2C, A> {
        &self.thermal
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<I2C: I2c, A: AnalogInput, P: InputPin> SensorPort for HardwareAdapter<I2C, A, P> {
    fn initialize(&mut self) -> u8 {
        if matches!(self.tach, TachInput::Interrupt) {
            // Edges latched before START belong to no session.
            tachometer::arm_edge_latch();
            hw_init::set_tach_interrupt(true);
            debug!("tach: edge latch armed");
        }
        self.thermal.initialize()
    }

    fn release(&mut self) {
        if matches!(self.tach, TachInput::Interrupt) {
            hw_init::set_tach_interrupt(false);
            tachometer::disarm_edge_latch();
            debug!("tach: edge latch disarmed");
        }
    }

    fn poll_tachometer(&mut self) -> TachSample {
        match &mut self.tach {
            TachInput::Polled(pin) => match pin.is_high() {
                Ok(level) => {
                    self.last_level = level;
                    TachSample::Level(level)
                }
                Err(e) => {
                    if self.pin_errors == 0 {
                        warn!("tach: pin read failed ({:?}), holding last level", e);
                    }
                    self.pin_errors = self.pin_errors.saturating_add(1);
                    TachSample::Level(self.last_level)
                }
            },
            TachInput::Interrupt => TachSample::Edges(tachometer::take_edges()),
        }
    }

    fn read_thermal(&mut self) -> ThermalReading {
        self.thermal.read_all()
    }
}
