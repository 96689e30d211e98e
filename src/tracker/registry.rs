//! ContactRegistry - grid-keyed store of the contacts currently held down
//!
//! Every contact is keyed by its rounded position. The registry owns all
//! storage, lookup, and capacity bounding, and never reaches outside itself.
//! Move collisions are logged here; failed operations are returned as errors
//! and logged by the reconciler.
//!
//! ## Invariants
//! - At most one contact per grid cell
//! - Never more than `capacity` contacts at once
//! - Ids are handed out on Down only, strictly increasing, and survive Move

use std::collections::hash_map::{self, HashMap};
use tracing::{debug, info, warn};

use super::error::TrackerError;
use super::grid::{GridPoint, Point};
use super::types::{Contact, ContactId, ContactSnapshot};

/// Ceiling used when none is configured, roughly one contact per finger
pub const DEFAULT_CAPACITY: usize = 10;

/// Largest ceiling a registry accepts
pub const MAX_CAPACITY: usize = 64;

/// Result of a successful Down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownOutcome {
    /// A new contact was created with this id
    Registered(ContactId),
    /// The cell was already occupied; nothing changed
    AlreadyPresent(ContactId),
}

/// Result of a successful Move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The contact now lives at `to` with its id and flag intact
    Relocated { id: ContactId, to: GridPoint },
    /// Source and destination snap to the same cell
    Stationary { id: ContactId },
    /// The destination belonged to another contact. The moving contact's key
    /// was removed and its id/flag were not carried onto `at`.
    Collided {
        dropped: ContactId,
        occupant: ContactId,
        at: GridPoint,
    },
}

/// Grid-keyed contact registry
#[derive(Debug)]
pub struct ContactRegistry {
    contacts: HashMap<GridPoint, Contact>,
    next_id: u64,
    capacity: usize,
}

impl ContactRegistry {
    /// Create a registry with [`DEFAULT_CAPACITY`]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a registry holding at most `capacity` contacts
    ///
    /// The ceiling is clamped to `1..=MAX_CAPACITY`, with a warning when the
    /// requested value is outside that range.
    pub fn with_capacity(capacity: usize) -> Self {
        let clamped = capacity.clamp(1, MAX_CAPACITY);
        if clamped != capacity {
            warn!(
                "Contact capacity {} out of range, using {}",
                capacity, clamped
            );
        }
        let capacity = clamped;
        Self {
            contacts: HashMap::with_capacity(capacity),
            next_id: 0,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Register a contact at `point`
    ///
    /// Idempotent per cell: a Down on an occupied cell returns the occupant's id
    /// and changes nothing. A Down that would exceed the ceiling is rejected and
    /// leaves the registry untouched; no existing contact is evicted.
    pub fn down(&mut self, point: Point) -> Result<DownOutcome, TrackerError> {
        let cell = point.snap()?;

        if let Some(existing) = self.contacts.get(&cell) {
            return Ok(DownOutcome::AlreadyPresent(existing.id));
        }

        if self.contacts.len() >= self.capacity {
            return Err(TrackerError::CapacityExceeded {
                capacity: self.capacity,
                position: cell,
            });
        }

        let id = ContactId(self.next_id);
        self.next_id += 1;
        self.contacts.insert(cell, Contact { id, flag: false });

        debug!("Contact {} down at {}", id, cell);
        Ok(DownOutcome::Registered(id))
    }

    /// Relocate the contact keyed at `from` to `to`
    ///
    /// Fails with [`TrackerError::UnmatchedEvent`] when nothing is registered at
    /// `from`. When `to` is held by a different contact, the occupant is left
    /// untouched, the mover's old key is still removed, and the mover's id and
    /// flag are dropped.
    pub fn move_point(&mut self, from: Point, to: Point) -> Result<MoveOutcome, TrackerError> {
        let from_cell = from.snap()?;
        let to_cell = to.snap()?;

        let Some(contact) = self.contacts.get(&from_cell).copied() else {
            return Err(TrackerError::UnmatchedEvent {
                previous: from_cell,
            });
        };

        if from_cell == to_cell {
            return Ok(MoveOutcome::Stationary { id: contact.id });
        }

        self.contacts.remove(&from_cell);

        if let Some(occupant) = self.contacts.get(&to_cell) {
            warn!(
                "Contact {} moved onto {} held by {}; dropping {}",
                contact.id, to_cell, occupant.id, contact.id
            );
            return Ok(MoveOutcome::Collided {
                dropped: contact.id,
                occupant: occupant.id,
                at: to_cell,
            });
        }

        self.contacts.insert(to_cell, contact);
        debug!("Contact {} moved {} -> {}", contact.id, from_cell, to_cell);
        Ok(MoveOutcome::Relocated {
            id: contact.id,
            to: to_cell,
        })
    }

    /// Remove the contact being released
    ///
    /// Looks at `previous` first, then falls back to `point` itself, since
    /// some sources report a previous position on release that was never seen.
    /// Returns the removed contact.
    pub fn up(&mut self, point: Point, previous: Point) -> Result<Contact, TrackerError> {
        let previous_cell = previous.snap();
        let fallback_cell = point.snap();

        let removed = previous_cell
            .as_ref()
            .ok()
            .and_then(|cell| self.contacts.remove_entry(cell))
            .or_else(|| {
                fallback_cell
                    .as_ref()
                    .ok()
                    .and_then(|cell| self.contacts.remove_entry(cell))
            });

        let Some((key, contact)) = removed else {
            return Err(match (previous_cell, fallback_cell) {
                (Ok(previous), _) | (Err(_), Ok(previous)) => {
                    TrackerError::UnmatchedEvent { previous }
                }
                (Err(e), Err(_)) => e,
            });
        };

        debug!("Contact {} up at {}", contact.id, key);
        Ok(contact)
    }

    /// Contact registered at the cell containing `point`, if any
    pub fn contact_at(&self, point: Point) -> Option<Contact> {
        let cell = point.snap().ok()?;
        self.contacts.get(&cell).copied()
    }

    /// Flag of the contact at `point`, `false` when none is registered
    pub fn state_of(&self, point: Point) -> bool {
        self.contact_at(point).map(|c| c.flag).unwrap_or(false)
    }

    /// Id of the contact at `point`, [`ContactId::UNKNOWN`] when none is registered
    pub fn id_of(&self, point: Point) -> ContactId {
        self.contact_at(point)
            .map(|c| c.id)
            .unwrap_or(ContactId::UNKNOWN)
    }

    /// Replace the flag of the contact at `point`
    ///
    /// No-op when nothing is registered there. Returns whether a flag was set.
    pub fn set_state(&mut self, point: Point, flag: bool) -> bool {
        let Ok(cell) = point.snap() else {
            return false;
        };
        match self.contacts.get_mut(&cell) {
            Some(contact) => {
                contact.flag = flag;
                true
            }
            None => false,
        }
    }

    /// Lazy view over the registered cells, in unspecified order
    ///
    /// The view borrows the registry, so it cannot be mutated while the view
    /// is alive. Clone the view (or call this again) to restart iteration.
    pub fn current_points(&self) -> CurrentPoints<'_> {
        CurrentPoints {
            inner: self.contacts.keys(),
        }
    }

    /// Copy of every registered contact, ordered by id
    pub fn snapshot(&self) -> Vec<ContactSnapshot> {
        let mut contacts: Vec<ContactSnapshot> = self
            .contacts
            .iter()
            .map(|(position, contact)| ContactSnapshot {
                position: *position,
                id: contact.id,
                flag: contact.flag,
            })
            .collect();
        contacts.sort_by_key(|c| c.id);
        contacts
    }

    /// Drop every contact
    ///
    /// The id counter keeps running, so ids stay unique across resets.
    pub fn reset(&mut self) {
        let cleared = self.contacts.len();
        self.contacts.clear();
        info!("Registry reset, {} contacts cleared", cleared);
    }
}

impl Default for ContactRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed, restartable iterator over registered grid cells
#[derive(Debug, Clone)]
pub struct CurrentPoints<'a> {
    inner: hash_map::Keys<'a, GridPoint, Contact>,
}

impl Iterator for CurrentPoints<'_> {
    type Item = GridPoint;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for CurrentPoints<'_> {}
