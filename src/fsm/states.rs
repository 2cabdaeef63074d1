//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers — no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!           ┌──────[START]──────┐
//!           ▼                   │
//!  IDLE ──[START]──▶ RECORDING ─┘
//!    ▲                   │
//!    └──────[STOP]───────┘
//! ```
//!
//! Transitions are requested by the application service; neither state
//! leaves on its own.

use super::context::{FsmContext, Session};
use super::{StateDescriptor, StateId};
use log::{debug, info};

/// Build the static state table. Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1 — Recording
        StateDescriptor {
            id: StateId::Recording,
            name: "Recording",
            on_enter: Some(recording_enter),
            on_exit: Some(recording_exit),
            on_update: recording_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.clear_session();
    info!("IDLE: waiting for START");
}

fn idle_update(ctx: &mut FsmContext) -> Option<StateId> {
    // Nothing is sampled outside a session.
    ctx.tach_sample = None;
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  RECORDING state
// ═══════════════════════════════════════════════════════════════════════════

fn recording_enter(ctx: &mut FsmContext) {
    ctx.clear_session();
    ctx.session = Some(Session {
        started_at_us: ctx.now_us,
    });
    info!(
        "RECORDING: session started at {}us, report every {} ticks",
        ctx.now_us, ctx.config.report_every_ticks
    );
}

fn recording_exit(ctx: &mut FsmContext) {
    if let Some(session) = ctx.session {
        info!(
            "RECORDING: session ended after {} ms, {} revolutions, {} edges rejected",
            session.elapsed_ms(ctx.now_us),
            ctx.tachometer.revolutions(),
            ctx.tachometer.rejected_edges()
        );
    }
    ctx.clear_session();
}

fn recording_update(ctx: &mut FsmContext) -> Option<StateId> {
    if let Some(sample) = ctx.tach_sample.take() {
        ctx.tachometer.ingest(ctx.now_us, &sample);
    }
    ctx.count_report_tick();
    if ctx.ticks_in_state % 10_000 == 0 {
        debug!(
            "RECORDING: {} ticks, rpm {:?}",
            ctx.ticks_in_state,
            ctx.tachometer.rpm()
        );
    }
    None
}
