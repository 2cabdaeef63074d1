//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the FSM and its shared context and is the single
//! writer of session state. It exposes a hardware-agnostic API; all I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!  host byte ──▶ ┌────────────────────────┐ ──▶ EventSink (PONG, reports)
//!                │       AppService       │
//!  SensorPort ──▶│  FSM · Tach · Report   │
//!                └────────────────────────┘
//! ```

use log::{debug, info, trace};

use crate::config::RigConfig;
use crate::fsm::context::{FsmContext, Session};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::protocol::{self, report::Report};
use crate::sensors::ThermalReading;

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{EventSink, SensorPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    tick_count: u64,
    ignored_bytes: u32,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: RigConfig) -> Self {
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Idle);
        Self {
            fsm,
            ctx,
            tick_count: 0,
            ignored_bytes: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in Idle.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AppService started in {:?}", self.fsm.current_state());
    }

    // ── Command handling ──────────────────────────────────────

    /// Decode and dispatch one inbound byte. Unknown bytes are counted and
    /// otherwise ignored. Returns the command that was acted on.
    pub fn handle_byte(
        &mut self,
        byte: u8,
        now_us: u64,
        hw: &mut impl SensorPort,
        sink: &mut impl EventSink,
    ) -> Option<AppCommand> {
        let Some(cmd) = protocol::decode_command(byte) else {
            self.ignored_bytes = self.ignored_bytes.saturating_add(1);
            return None;
        };
        self.handle_command(cmd, now_us, hw, sink);
        Some(cmd)
    }

    /// Process a host command.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_us: u64,
        hw: &mut impl SensorPort,
        sink: &mut impl EventSink,
    ) {
        self.ctx.now_us = now_us;
        match cmd {
            AppCommand::Start => {
                let prev = self.fsm.current_state();
                let online = hw.initialize();
                if prev == StateId::Recording {
                    self.fsm.restart(&mut self.ctx);
                } else {
                    self.fsm.force_transition(StateId::Recording, &mut self.ctx);
                    sink.emit(&AppEvent::StateChanged {
                        from: prev,
                        to: StateId::Recording,
                    });
                }
                sink.emit(&AppEvent::SessionStarted {
                    started_at_us: now_us,
                    thermometers_online: online,
                });
            }
            AppCommand::Stop => {
                let Some(session) = self.ctx.session else {
                    trace!("STOP while idle ignored");
                    return;
                };
                let elapsed_ms = session.elapsed_ms(now_us);
                self.fsm.force_transition(StateId::Idle, &mut self.ctx);
                hw.release();
                sink.emit(&AppEvent::SessionStopped { elapsed_ms });
                sink.emit(&AppEvent::StateChanged {
                    from: StateId::Recording,
                    to: StateId::Idle,
                });
            }
            AppCommand::Ping => sink.emit(&AppEvent::Pong),
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one sampling tick at `now_us`.
    ///
    /// While recording: feed the tachometer, and when a report is due read
    /// the thermal sensors and emit a [`Report`]. While idle no hardware is
    /// touched.
    pub fn tick(&mut self, now_us: u64, hw: &mut impl SensorPort, sink: &mut impl EventSink) {
        self.tick_count += 1;
        self.ctx.now_us = now_us;

        if self.ctx.is_recording() {
            self.ctx.tach_sample = Some(hw.poll_tachometer());
        }
        self.fsm.tick(&mut self.ctx);

        if self.ctx.take_report_due() {
            self.ctx.thermal = hw.read_thermal();
            if let Some(report) = self.build_report() {
                debug!("report: {:?}", report);
                sink.emit(&AppEvent::Report(report));
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Snapshot of the current session for the host, `None` when idle.
    pub fn build_report(&self) -> Option<Report> {
        let session = self.ctx.session?;
        Some(Report::new(
            session.elapsed_ms(self.ctx.now_us),
            self.ctx.tachometer.rpm(),
            &self.ctx.thermal,
        ))
    }

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn is_recording(&self) -> bool {
        self.ctx.is_recording()
    }

    pub fn session(&self) -> Option<Session> {
        self.ctx.session
    }

    /// Latest RPM, `None` while unknown or idle.
    pub fn rpm(&self) -> Option<f64> {
        self.ctx.tachometer.rpm()
    }

    pub fn last_revolution_us(&self) -> Option<u64> {
        self.ctx.tachometer.last_revolution_us()
    }

    /// Thermal reading carried by the last report.
    pub fn thermal(&self) -> &ThermalReading {
        &self.ctx.thermal
    }

    /// Total sampling ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Unrecognized command bytes received since startup.
    pub fn ignored_bytes(&self) -> u32 {
        self.ignored_bytes
    }

    pub fn config(&self) -> &RigConfig {
        &self.ctx.config
    }
}
