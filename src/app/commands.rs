//! Inbound commands to the application service.
//!
//! Decoded from host bytes by [`protocol::decode_command`](crate::protocol::decode_command)
//! and interpreted by the [`AppService`](super::service::AppService).

/// Commands the host can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Begin (or restart) a recording session.
    Start,
    /// End the recording session. No-op when idle.
    Stop,
    /// Liveness check; answered with PONG, state untouched.
    Ping,
}
