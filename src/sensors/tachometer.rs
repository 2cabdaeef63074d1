//! Wheel tachometer: one pulse edge per revolution.
//!
//! The input pin uses the internal pull-up (20–50 kOhm), so it idles HIGH
//! and the sensor pulls it LOW once per turn. The designated edge (falling
//! by default) marks a revolution; RPM is derived from the time between
//! the two most recent accepted edges:
//!
//! ```text
//!   rpm = 60_000_000 / Δt_us
//! ```
//!
//! Two ways to feed edges in:
//!
//! - **Polled** — [`Tachometer::sample_tick`] is called once per control
//!   tick with the current pin level and looks for the designated
//!   transition.
//! - **Interrupt** — [`tach_isr_handler`] timestamps edges into a
//!   critical-section guarded queue; the main loop drains it with
//!   [`take_edges`] and feeds each timestamp to [`Tachometer::record_edge`].
//!
//! Both paths share the same debounce and RPM logic.
//!
//! The line level at session start is unknown: a wheel parked with the
//! target over the sensor holds the pin LOW. The first polled sample after
//! a reset only establishes the baseline level and never counts as an edge.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use critical_section::Mutex;
use heapless::{Deque, Vec};
use log::trace;
use serde::{Deserialize, Serialize};

/// Capacity of the ISR edge queue. At 1 kHz drain rate this covers wheel
/// speeds far above anything the rig can spin.
pub const EDGE_QUEUE_CAP: usize = 16;

/// Which pin transition counts as one revolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgePolarity {
    /// HIGH → LOW (sensor pulls the pulled-up line down).
    Falling,
    /// LOW → HIGH.
    Rising,
}

impl EdgePolarity {
    /// Line level while no pulse is present.
    pub fn idle_level(self) -> bool {
        matches!(self, Self::Falling)
    }

    fn is_designated(self, from: bool, to: bool) -> bool {
        match self {
            Self::Falling => from && !to,
            Self::Rising => !from && to,
        }
    }
}

/// What one tick handed to the tachometer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TachSample {
    /// Current pin level (polled mode).
    Level(bool),
    /// Edge timestamps captured by the ISR since the last tick.
    Edges(Vec<u64, EDGE_QUEUE_CAP>),
}

/// Result of offering one edge to the tachometer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeOutcome {
    /// First edge of the session; timing starts here.
    First,
    /// A full revolution completed at this RPM.
    Revolution(f64),
    /// Inside the debounce window; ignored.
    Rejected,
}

/// RPM for one revolution lasting `interval_us`.
pub fn rpm_from_interval(interval_us: u64) -> f64 {
    60_000_000.0 / interval_us as f64
}

#[derive(Debug, Clone)]
pub struct Tachometer {
    polarity: EdgePolarity,
    debounce_us: u64,
    last_level: Option<bool>,
    last_revolution_us: Option<u64>,
    rpm: Option<f64>,
    revolutions: u32,
    rejected_edges: u32,
}

impl Tachometer {
    pub fn new(polarity: EdgePolarity, debounce_us: u32) -> Self {
        Self {
            polarity,
            // A zero interval would divide by zero.
            debounce_us: u64::from(debounce_us).max(1),
            last_level: None,
            last_revolution_us: None,
            rpm: None,
            revolutions: 0,
            rejected_edges: 0,
        }
    }

    /// Forget all timing; RPM becomes unknown and the next polled sample
    /// only sets the baseline level.
    pub fn reset(&mut self) {
        self.last_level = None;
        self.last_revolution_us = None;
        self.rpm = None;
        self.revolutions = 0;
        self.rejected_edges = 0;
    }

    /// Polled path: look at the current pin level.
    pub fn sample_tick(&mut self, now_us: u64, level: bool) -> Option<EdgeOutcome> {
        let Some(previous) = self.last_level.replace(level) else {
            trace!("tach: baseline level {} at {}us", level, now_us);
            return None;
        };
        if self.polarity.is_designated(previous, level) {
            Some(self.record_edge(now_us))
        } else {
            None
        }
    }

    /// Offer one designated edge at `now_us`.
    pub fn record_edge(&mut self, now_us: u64) -> EdgeOutcome {
        let Some(last) = self.last_revolution_us else {
            self.last_revolution_us = Some(now_us);
            trace!("tach: first edge at {}us", now_us);
            return EdgeOutcome::First;
        };

        let interval = now_us.saturating_sub(last);
        if interval < self.debounce_us {
            self.rejected_edges = self.rejected_edges.saturating_add(1);
            trace!("tach: edge rejected ({}us < {}us)", interval, self.debounce_us);
            return EdgeOutcome::Rejected;
        }

        let rpm = rpm_from_interval(interval);
        self.last_revolution_us = Some(now_us);
        self.rpm = Some(rpm);
        self.revolutions = self.revolutions.saturating_add(1);
        EdgeOutcome::Revolution(rpm)
    }

    /// Feed whatever the sensor port produced this tick.
    pub fn ingest(&mut self, now_us: u64, sample: &TachSample) {
        match sample {
            TachSample::Level(level) => {
                let _ = self.sample_tick(now_us, *level);
            }
            TachSample::Edges(edges) => {
                for &t in edges {
                    let _ = self.record_edge(t);
                }
            }
        }
    }

    /// Latest RPM, `None` until two edges have been seen this session.
    pub fn rpm(&self) -> Option<f64> {
        self.rpm
    }

    pub fn last_revolution_us(&self) -> Option<u64> {
        self.last_revolution_us
    }

    /// Last polled pin level, `None` until the first sample after a reset.
    pub fn last_level(&self) -> Option<bool> {
        self.last_level
    }

    /// Completed revolutions this session.
    pub fn revolutions(&self) -> u32 {
        self.revolutions
    }

    /// Edges dropped by the debounce filter this session.
    pub fn rejected_edges(&self) -> u32 {
        self.rejected_edges
    }
}

// ── ISR edge latch ────────────────────────────────────────────
//
// The GPIO ISR pushes timestamps; the main loop drains. Push and drain both
// run inside a critical section, so the drain is an atomic read-and-reset
// and no edge can land between copying and clearing the queue.
//
// The latch only accepts edges while armed. Nothing drains it outside a
// session, so it is disarmed on STOP and re-armed (empty) on START.

static EDGE_LATCH: Mutex<RefCell<Deque<u64, EDGE_QUEUE_CAP>>> =
    Mutex::new(RefCell::new(Deque::new()));

static EDGE_OVERFLOWS: AtomicU32 = AtomicU32::new(0);

static LATCH_ARMED: AtomicBool = AtomicBool::new(false);

/// Called from the tachometer GPIO ISR with the edge timestamp.
pub fn tach_isr_handler(now_us: u64) {
    if !LATCH_ARMED.load(Ordering::Acquire) {
        return;
    }
    critical_section::with(|cs| {
        if EDGE_LATCH.borrow_ref_mut(cs).push_back(now_us).is_err() {
            EDGE_OVERFLOWS.fetch_add(1, Ordering::Relaxed);
        }
    });
}

/// Drain every edge captured since the last call, oldest first.
pub fn take_edges() -> Vec<u64, EDGE_QUEUE_CAP> {
    critical_section::with(|cs| {
        let mut latch = EDGE_LATCH.borrow_ref_mut(cs);
        let mut out = Vec::new();
        while let Some(t) = latch.pop_front() {
            // Same capacity as the latch; cannot fail.
            let _ = out.push(t);
        }
        out
    })
}

/// Discard anything latched and start accepting edges.
pub fn arm_edge_latch() {
    critical_section::with(|cs| {
        EDGE_LATCH.borrow_ref_mut(cs).clear();
        LATCH_ARMED.store(true, Ordering::Release);
    });
}

/// Stop accepting edges and drop whatever is still latched.
pub fn disarm_edge_latch() {
    critical_section::with(|cs| {
        LATCH_ARMED.store(false, Ordering::Release);
        EDGE_LATCH.borrow_ref_mut(cs).clear();
    });
}

pub fn edge_latch_armed() -> bool {
    LATCH_ARMED.load(Ordering::Acquire)
}

/// Edges lost because the latch was full, since boot.
pub fn edge_overflows() -> u32 {
    EDGE_OVERFLOWS.load(Ordering::Relaxed)
}
