//! touchgrid - touch contact reconciliation
//!
//! Turns an unreliable stream of Down/Move/Up events into a per-frame set of
//! contacts with stable ids and caller-defined flags. See [`tracker`] for the
//! core; [`config`] and [`trace`] support the `touchgrid` binary.

pub mod config;
pub mod trace;
pub mod tracker;

pub use config::TrackerConfig;
pub use tracker::{
    ContactId, ContactRegistry, EventOutcome, FrameReport, GridPoint, Platform, Point,
    TouchEvent, TouchTracker, TrackerError,
};
