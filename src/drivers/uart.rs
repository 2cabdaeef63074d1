//! UART host link.
//!
//! Wraps the `esp-idf-hal` UART driver as a [`Transport`]. Reads never
//! block so the control loop keeps its tick cadence; writes hand the bytes
//! to the driver's TX ring buffer.

use esp_idf_hal::delay::{BLOCK, NON_BLOCK};
use esp_idf_hal::uart::UartDriver;
use esp_idf_svc::sys::EspError;

use crate::protocol::transport::Transport;

pub struct UartTransport {
    driver: UartDriver<'static>,
}

impl UartTransport {
    pub fn new(driver: UartDriver<'static>) -> Self {
        Self { driver }
    }
}

impl Transport for UartTransport {
    type Error = EspError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, EspError> {
        self.driver.read(buf, NON_BLOCK)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, EspError> {
        self.driver.write(data)
    }

    fn flush(&mut self) -> Result<(), EspError> {
        self.driver.wait_tx_done(BLOCK)
    }
}
