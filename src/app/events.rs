//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them: the serial sink writes PONG bytes and
//! report lines to the host, the log sink writes structured log records.

use crate::fsm::StateId;
use crate::protocol::report::Report;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(StateId),

    /// The FSM moved between states.
    StateChanged { from: StateId, to: StateId },

    /// A session began. `thermometers_online` counts IR sensors that
    /// answered at START (0–2).
    SessionStarted {
        started_at_us: u64,
        thermometers_online: u8,
    },

    /// The session ended after `elapsed_ms`.
    SessionStopped { elapsed_ms: u32 },

    /// Answer to PING.
    Pong,

    /// Periodic measurement while recording.
    Report(Report),
}
