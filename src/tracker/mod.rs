//! Touch contact tracking
//!
//! Reconstructs which contacts are held down, frame to frame, from an input
//! source that provides no persistent touch identity. Two stages cooperate:
//!
//! 1. [`registry`] - grid-keyed store of live contacts with ids and flags
//! 2. [`reconcile`] - maps Down/Move/Up events onto registry mutations
//!
//! ```text
//! Input source ──► (EventInbox) ──► TouchTracker ──► ContactRegistry
//!                                                        │
//!                               consumer ◄── current_points / id_of / state_of
//! ```
//!
//! Identity is position-based and heuristic: two contacts that cross quickly
//! can swap ids. That is an accepted limitation of tracking without source ids.

mod error;
mod grid;
mod inbox;
mod reconcile;
mod registry;
mod types;


pub use error::TrackerError;
pub use grid::{snap_axis, GridPoint, Point};
pub use inbox::{EventInbox, InboxSender, DEFAULT_INBOX_CAPACITY};
pub use reconcile::{EventOutcome, FrameReport, Platform, TouchTracker};
pub use registry::{
    ContactRegistry, CurrentPoints, DownOutcome, MoveOutcome, DEFAULT_CAPACITY, MAX_CAPACITY,
};
pub use types::{Contact, ContactId, ContactSnapshot, TouchEvent};
