//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, event sinks, config storage) implement these
//! traits. The [`AppService`](super::service::AppService) consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::config::RigConfig;
use crate::sensors::{TachSample, ThermalReading};

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Check which thermometers answer and reset sensor-side session state.
    /// Returns how many IR thermometers answered.
    fn initialize(&mut self) -> u8;

    /// Tachometer input for one sampling tick.
    fn poll_tachometer(&mut self) -> TachSample;

    /// One pass over all three temperature channels. Never fails; degraded
    /// channels are reported through [`SampleStatus`](crate::sensors::SampleStatus).
    fn read_thermal(&mut self) -> ThermalReading;

    /// The session ended; stop capturing tachometer input until the next
    /// [`initialize`](Self::initialize).
    fn release(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → host link / logging)
// ───────────────────────────────────────────────────────────────

pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

/// Fan one event out to two sinks, in order.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &AppEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists rig configuration.
///
/// Implementations MUST run [`RigConfig::validate`] before persisting and
/// reject invalid values with [`ConfigError::ValidationFailed`] rather than
/// clamping them.
pub trait ConfigPort {
    /// Load configuration. Returns [`RigConfig::default()`] if none is stored.
    fn load(&self) -> Result<RigConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &RigConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Corrupted => Self::Config("stored config corrupted"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::IoError => Self::Config("config storage I/O error"),
        }
    }
}
