//! Transport abstraction — any byte-oriented channel to the host.
//!
//! Concrete implementations:
//! - UART serial ([`drivers::uart::UartTransport`](crate::drivers::uart))
//! - in-memory loopback in the integration tests
//!
//! The serial sink is generic over `Transport`, so swapping the link
//! needs no changes to the protocol logic.

/// Byte-oriented transport channel.
pub trait Transport {
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns 0 if no data is available (non-blocking).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;
}
