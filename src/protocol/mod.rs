//! Host command protocol.
//!
//! ```text
//!   host ──▶ [0x0F START | 0x01 STOP | 0x0A PING | other: ignored]
//!   host ◀── [0x0B PONG | report line "...\n"]
//! ```
//!
//! Inbound commands are single bytes with no framing. Outbound traffic is
//! either the one-byte PONG or an ASCII report line (see [`report`]). The
//! report alphabet excludes `0x0B`, so the host can pick PONGs out of the
//! stream without framing.

pub mod report;
pub mod transport;

use log::trace;

use crate::app::commands::AppCommand;

pub const START: u8 = 0x0F;
pub const STOP: u8 = 0x01;
pub const PING: u8 = 0x0A;
pub const PONG: u8 = 0x0B;

/// Map one inbound byte to a command. Unknown bytes yield `None`.
pub fn decode_command(byte: u8) -> Option<AppCommand> {
    match byte {
        START => Some(AppCommand::Start),
        STOP => Some(AppCommand::Stop),
        PING => Some(AppCommand::Ping),
        other => {
            trace!("protocol: ignoring byte 0x{:02X}", other);
            None
        }
    }
}
