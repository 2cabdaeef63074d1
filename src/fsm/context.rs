//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the current time, the recording session, the tachometer, the
//! latest thermal reading and the report cadence. Think of it as the
//! "blackboard" in a blackboard architecture. The application service
//! writes the per-tick inputs (`now_us`, `tach_sample`, `thermal`) before
//! driving the engine.

use crate::config::RigConfig;
use crate::sensors::tachometer::Tachometer;
use crate::sensors::{TachSample, ThermalReading};

/// One recording session. Exists only while the FSM is in `Recording`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// Monotonic time START was accepted.
    pub started_at_us: u64,
}

impl Session {
    /// Milliseconds since the session began, saturating at `u32::MAX`.
    pub fn elapsed_ms(&self, now_us: u64) -> u32 {
        let ms = now_us.saturating_sub(self.started_at_us) / 1_000;
        u32::try_from(ms).unwrap_or(u32::MAX)
    }
}

pub struct FsmContext {
    // -- Timing --
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,
    /// Monotonic time of the current tick or command (µs).
    pub now_us: u64,

    // -- Session --
    pub session: Option<Session>,
    pub tachometer: Tachometer,
    /// Tachometer input for the next tick; consumed by `on_update`.
    pub tach_sample: Option<TachSample>,
    /// Latest thermal reading. Cleared to all-invalid outside a session.
    pub thermal: ThermalReading,

    // -- Reporting --
    pub ticks_since_report: u32,
    report_due: bool,

    // -- Configuration --
    pub config: RigConfig,
}

impl FsmContext {
    pub fn new(config: RigConfig) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            now_us: 0,
            session: None,
            tachometer: Tachometer::new(config.tach_edge, config.tach_debounce_us),
            tach_sample: None,
            thermal: ThermalReading::default(),
            ticks_since_report: 0,
            report_due: false,
            config,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// Count one sampling tick towards the next report.
    pub(crate) fn count_report_tick(&mut self) {
        self.ticks_since_report = self.ticks_since_report.saturating_add(1);
        if self.ticks_since_report >= self.config.report_every_ticks {
            self.ticks_since_report = 0;
            self.report_due = true;
        }
    }

    /// True once per elapsed report interval; clears the flag.
    pub fn take_report_due(&mut self) -> bool {
        core::mem::take(&mut self.report_due)
    }

    /// Drop all per-session state.
    pub(crate) fn clear_session(&mut self) {
        self.session = None;
        self.tachometer.reset();
        self.tach_sample = None;
        self.thermal = ThermalReading::default();
        self.ticks_since_report = 0;
        self.report_due = false;
    }
}
