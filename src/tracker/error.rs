//! Error types for the contact registry

use thiserror::Error;

use super::grid::GridPoint;

/// Recoverable conditions reported by registry operations
///
/// None of these abort a frame: the reconciler logs them and drops the event.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    /// A Move or Up referenced a position with no registered contact
    #[error("no such previous point at {previous}")]
    UnmatchedEvent { previous: GridPoint },

    /// A Down would push the registry past its ceiling
    #[error("capacity of {capacity} contacts exceeded by down at {position}")]
    CapacityExceeded { capacity: usize, position: GridPoint },

    /// A coordinate was NaN or infinite and cannot be snapped to a cell
    #[error("non-finite coordinate ({x}, {y})")]
    NonFiniteCoordinate { x: f32, y: f32 },

    /// A coordinate rounds to a cell outside the `i32` grid
    #[error("coordinate ({x}, {y}) is outside the grid")]
    CoordinateOutOfRange { x: f32, y: f32 },
}
