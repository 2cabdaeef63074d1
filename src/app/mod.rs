//! Application core — pure domain logic, zero I/O.
//!
//! Recording session orchestration for the wheel test rig: command
//! dispatch, the sampling tick and report cadence. All interaction with
//! hardware happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
