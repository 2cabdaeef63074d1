//! Serial event sink — the host side of the command protocol.
//!
//! Implements [`EventSink`] by writing PONG bytes and report lines to a
//! byte [`Transport`]. Lifecycle events are not part of the wire protocol
//! and are ignored here (the log sink covers them).

use log::warn;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::error::CommsError;
use crate::protocol::PONG;
use crate::protocol::transport::Transport;

pub struct SerialEventSink<T> {
    transport: T,
    write_errors: u32,
}

impl<T: Transport> SerialEventSink<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            write_errors: 0,
        }
    }

    /// The underlying link, for draining inbound command bytes.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Failed or short writes since boot.
    pub fn write_errors(&self) -> u32 {
        self.write_errors
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), CommsError> {
        let written = self
            .transport
            .write(bytes)
            .map_err(|_| CommsError::WriteFailed)?;
        if written != bytes.len() {
            return Err(CommsError::WriteFailed);
        }
        self.transport.flush().map_err(|_| CommsError::WriteFailed)
    }

    fn record(&mut self, result: Result<(), CommsError>) {
        if let Err(e) = result {
            if self.write_errors == 0 {
                warn!("serial: {} (further errors counted silently)", e);
            }
            self.write_errors = self.write_errors.saturating_add(1);
        }
    }
}

impl<T: Transport> EventSink for SerialEventSink<T> {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Pong => {
                let r = self.send(&[PONG]);
                self.record(r);
            }
            AppEvent::Report(report) => {
                let r = report.encode().and_then(|line| self.send(line.as_bytes()));
                self.record(r);
            }
            AppEvent::Started(_)
            | AppEvent::StateChanged { .. }
            | AppEvent::SessionStarted { .. }
            | AppEvent::SessionStopped { .. } => {}
        }
    }
}
