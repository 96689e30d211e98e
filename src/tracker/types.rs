//! Core types shared by the registry and the reconciler

use serde::{Deserialize, Serialize};
use std::fmt;

use super::grid::{GridPoint, Point};

/// Identity assigned to a contact when it goes down
///
/// Ids increase monotonically for the lifetime of a registry and are never
/// reused, so a consumer can correlate a contact across frames even though the
/// registry itself is keyed by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub u64);

impl ContactId {
    /// Returned by lookups that find no contact
    pub const UNKNOWN: ContactId = ContactId(u64::MAX);

    pub fn is_known(self) -> bool {
        self != Self::UNKNOWN
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "#{}", self.0)
        } else {
            f.write_str("#?")
        }
    }
}

/// Payload carried by a registered contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub id: ContactId,
    /// Caller-defined state, `false` until set
    pub flag: bool,
}

/// One raw event from the input source
///
/// `previous` is the position the source claims the contact had before this
/// event. It is not always consistent with what was reported earlier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum TouchEvent {
    Down { position: Point },
    Move { position: Point, previous: Point },
    Up { position: Point, previous: Point },
}

impl TouchEvent {
    pub fn down(x: f32, y: f32) -> Self {
        Self::Down {
            position: Point::new(x, y),
        }
    }

    pub fn moved(x: f32, y: f32, prev_x: f32, prev_y: f32) -> Self {
        Self::Move {
            position: Point::new(x, y),
            previous: Point::new(prev_x, prev_y),
        }
    }

    pub fn up(x: f32, y: f32, prev_x: f32, prev_y: f32) -> Self {
        Self::Up {
            position: Point::new(x, y),
            previous: Point::new(prev_x, prev_y),
        }
    }

    /// Current position reported by the event
    pub fn position(&self) -> Point {
        match *self {
            Self::Down { position } | Self::Move { position, .. } | Self::Up { position, .. } => {
                position
            }
        }
    }

    pub fn phase_name(&self) -> &'static str {
        match self {
            Self::Down { .. } => "down",
            Self::Move { .. } => "move",
            Self::Up { .. } => "up",
        }
    }
}

impl fmt::Display for TouchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Down { position } => write!(f, "down {}", position),
            Self::Move { position, previous } => write!(f, "move {} <- {}", position, previous),
            Self::Up { position, previous } => write!(f, "up {} <- {}", position, previous),
        }
    }
}

/// Read-only copy of one registered contact, for display and JSON output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSnapshot {
    pub position: GridPoint,
    pub id: ContactId,
    pub flag: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_id() {
        assert!(!ContactId::UNKNOWN.is_known());
        assert!(ContactId(0).is_known());
        assert_eq!(ContactId(7).to_string(), "#7");
        assert_eq!(ContactId::UNKNOWN.to_string(), "#?");
    }

    #[test]
    fn test_event_json_shape() {
        let event: TouchEvent = serde_json::from_str(
            r#"{"phase":"move","position":{"x":1.5,"y":2.0},"previous":{"x":1.0,"y":2.0}}"#,
        )
        .unwrap();
        assert_eq!(event, TouchEvent::moved(1.5, 2.0, 1.0, 2.0));
        assert_eq!(event.phase_name(), "move");
        assert_eq!(event.position(), Point::new(1.5, 2.0));
    }
}
