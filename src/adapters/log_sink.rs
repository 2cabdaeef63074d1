//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (the ESP-IDF logger in production). Reports go out at
//! debug level so a 10 Hz session does not flood the console.

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Report(r) => {
                debug!(
                    "REPORT | t={}ms | rpm={:.2} | wheel={:.2}\u{00b0}C bearing={:.2}\u{00b0}C \
                     axle={:.2}\u{00b0}C | flags=0x{:02X}",
                    r.elapsed_ms, r.rpm, r.wheel_c, r.bearing_c, r.axle_c, r.flags,
                );
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::SessionStarted {
                started_at_us,
                thermometers_online,
            } => {
                info!(
                    "SESSION | started at {}us, {}/2 thermometers online",
                    started_at_us, thermometers_online
                );
            }
            AppEvent::SessionStopped { elapsed_ms } => {
                info!("SESSION | stopped after {}ms", elapsed_ms);
            }
            AppEvent::Pong => {
                debug!("PING | pong");
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
        }
    }
}
