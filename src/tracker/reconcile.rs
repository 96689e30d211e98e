//! TouchTracker - drives the contact registry from a raw event stream
//!
//! Reconciliation reasons in raw coordinate space and leaves all snapping to
//! the registry. Failures are logged and the offending event is dropped; nothing
//! here aborts a frame.
//!
//! ## Replayed releases
//!
//! Some mobile touch stacks replay a release as a Move whose current and
//! previous positions are identical. On platforms where that is known to
//! happen, such a Move is treated as a fresh Down at its position instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace, warn};

use super::error::TrackerError;
use super::grid::{GridPoint, Point};
use super::inbox::EventInbox;
use super::registry::{ContactRegistry, CurrentPoints, DownOutcome, MoveOutcome};
use super::types::{ContactId, ContactSnapshot, TouchEvent};
use crate::config::TrackerConfig;

/// Platform profile of the input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Desktop,
    Android,
    Ios,
}

impl Platform {
    /// Whether the platform's touch stack replays releases as no-op Moves
    pub fn replays_release_as_move(self) -> bool {
        matches!(self, Platform::Android)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Desktop => "desktop",
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" => Ok(Platform::Desktop),
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            other => Err(format!(
                "unknown platform '{}' (expected desktop, android or ios)",
                other
            )),
        }
    }
}

/// What applying one event did to the registry
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Registered(ContactId),
    /// Down on a cell that was already held
    Duplicate(ContactId),
    Relocated { id: ContactId, to: GridPoint },
    Stationary(ContactId),
    /// Move onto another contact's cell; `dropped` lost its identity
    Collided {
        dropped: ContactId,
        occupant: ContactId,
        at: GridPoint,
    },
    Released(ContactId),
    /// A replayed release was taken as a Down
    RecoveredAsDown(DownOutcome),
    /// The event could not be applied and was discarded
    Dropped(TrackerError),
}

impl EventOutcome {
    pub fn is_dropped(&self) -> bool {
        matches!(self, EventOutcome::Dropped(_))
    }
}

impl From<DownOutcome> for EventOutcome {
    fn from(outcome: DownOutcome) -> Self {
        match outcome {
            DownOutcome::Registered(id) => EventOutcome::Registered(id),
            DownOutcome::AlreadyPresent(id) => EventOutcome::Duplicate(id),
        }
    }
}

impl From<MoveOutcome> for EventOutcome {
    fn from(outcome: MoveOutcome) -> Self {
        match outcome {
            MoveOutcome::Relocated { id, to } => EventOutcome::Relocated { id, to },
            MoveOutcome::Stationary { id } => EventOutcome::Stationary(id),
            MoveOutcome::Collided {
                dropped,
                occupant,
                at,
            } => EventOutcome::Collided {
                dropped,
                occupant,
                at,
            },
        }
    }
}

/// Summary of one frame's worth of events
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub applied: usize,
    pub dropped: usize,
    pub outcomes: Vec<EventOutcome>,
}

impl FrameReport {
    fn record(&mut self, outcome: EventOutcome) {
        if outcome.is_dropped() {
            self.dropped += 1;
        } else {
            self.applied += 1;
        }
        self.outcomes.push(outcome);
    }
}

/// Reconciles raw touch events into stable contacts
///
/// Owns its registry exclusively; construct one per input session owner.
#[derive(Debug)]
pub struct TouchTracker {
    registry: ContactRegistry,
    replayed_release_as_move: bool,
}

impl TouchTracker {
    /// Tracker with the default ceiling and the given platform's quirks
    pub fn new(platform: Platform) -> Self {
        Self::with_registry(ContactRegistry::new(), platform.replays_release_as_move())
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::with_registry(
            ContactRegistry::with_capacity(config.capacity),
            config.replayed_release_as_move(),
        )
    }

    pub fn with_registry(registry: ContactRegistry, replayed_release_as_move: bool) -> Self {
        Self {
            registry,
            replayed_release_as_move,
        }
    }

    /// Apply a single raw event
    pub fn apply(&mut self, event: TouchEvent) -> EventOutcome {
        trace!("Applying {}", event);

        let result = match event {
            TouchEvent::Down { position } => self.registry.down(position).map(EventOutcome::from),
            TouchEvent::Move { position, previous } => {
                if self.replayed_release_as_move && same_cell(position, previous) {
                    debug!("Move {} repeats its previous position, treating as down", position);
                    self.registry
                        .down(position)
                        .map(EventOutcome::RecoveredAsDown)
                } else {
                    self.registry
                        .move_point(previous, position)
                        .map(EventOutcome::from)
                }
            }
            TouchEvent::Up { position, previous } => self
                .registry
                .up(position, previous)
                .map(|contact| EventOutcome::Released(contact.id)),
        };

        result.unwrap_or_else(|err| {
            warn!("Dropping {}: {}", event, err);
            EventOutcome::Dropped(err)
        })
    }

    /// Apply a frame of events in order
    pub fn apply_frame<I>(&mut self, events: I) -> FrameReport
    where
        I: IntoIterator<Item = TouchEvent>,
    {
        let mut report = FrameReport::default();
        for event in events {
            let outcome = self.apply(event);
            report.record(outcome);
        }

        if report.dropped > 0 {
            debug!(
                "Frame applied {} events, dropped {}",
                report.applied, report.dropped
            );
        }
        report
    }

    /// Apply everything queued in `inbox` as one frame
    pub fn drain_inbox(&mut self, inbox: &EventInbox) -> FrameReport {
        self.apply_frame(inbox.drain())
    }

    pub fn replays_release_as_move(&self) -> bool {
        self.replayed_release_as_move
    }

    pub fn registry(&self) -> &ContactRegistry {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn current_points(&self) -> CurrentPoints<'_> {
        self.registry.current_points()
    }

    pub fn state_of(&self, point: Point) -> bool {
        self.registry.state_of(point)
    }

    pub fn id_of(&self, point: Point) -> ContactId {
        self.registry.id_of(point)
    }

    pub fn set_state(&mut self, point: Point, flag: bool) -> bool {
        self.registry.set_state(point, flag)
    }

    pub fn snapshot(&self) -> Vec<ContactSnapshot> {
        self.registry.snapshot()
    }

    /// Forget every contact, e.g. between input sessions
    pub fn reset(&mut self) {
        self.registry.reset();
    }
}

impl Default for TouchTracker {
    fn default() -> Self {
        Self::new(Platform::default())
    }
}

fn same_cell(a: Point, b: Point) -> bool {
    matches!((a.snap(), b.snap()), (Ok(a), Ok(b)) if a == b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parse() {
        assert_eq!("Android".parse::<Platform>().unwrap(), Platform::Android);
        assert_eq!(" ios ".parse::<Platform>().unwrap(), Platform::Ios);
        assert!("windows".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_quirks() {
        assert!(Platform::Android.replays_release_as_move());
        assert!(!Platform::Desktop.replays_release_as_move());
        assert!(!Platform::Ios.replays_release_as_move());
    }

    #[test]
    fn test_same_cell() {
        assert!(same_cell(Point::new(1.2, 1.0), Point::new(0.8, 1.4)));
        assert!(!same_cell(Point::new(1.2, 1.0), Point::new(1.6, 1.0)));
        assert!(!same_cell(Point::new(f32::NAN, 1.0), Point::new(f32::NAN, 1.0)));
    }

    #[test]
    fn test_frame_report_counts() {
        let mut tracker = TouchTracker::default();
        let report = tracker.apply_frame([
            TouchEvent::down(1.0, 1.0),
            TouchEvent::moved(5.0, 5.0, 3.0, 3.0),
            TouchEvent::moved(2.0, 1.0, 1.0, 1.0),
        ]);

        assert_eq!(report.applied, 2);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.outcomes.len(), 3);
        assert!(report.outcomes[1].is_dropped());
    }
}
