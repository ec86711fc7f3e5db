//! Alerting System
//!
//! Drives the audible drowsiness alarm:
//! - Idempotent start/stop, safe to call on every frame
//! - At most one background repeat loop per controller
//! - Bounded join on stop so a hung audio backend never stalls the caller

mod controller;
mod sink;

pub use controller::{AlarmConfig, AlarmController};
pub use sink::{AlarmSink, BellSink, LogSink};
