//! Event inbox for touch sources that deliver on another thread
//!
//! The tracker is owned by a single thread. Producers on other threads push
//! events through an [`InboxSender`]; the owning thread drains the inbox once per
//! frame via [`TouchTracker::drain_inbox`](super::TouchTracker::drain_inbox).

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use tracing::{debug, warn};

use super::types::TouchEvent;

/// Default number of events buffered between two frames
pub const DEFAULT_INBOX_CAPACITY: usize = 256;

/// Bounded queue of raw events, drained by the tracker's owning thread
pub struct EventInbox {
    tx: Sender<TouchEvent>,
    rx: Receiver<TouchEvent>,
}

impl EventInbox {
    /// Create an inbox buffering up to `capacity` events
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = channel::bounded(capacity.max(1));
        Self { tx, rx }
    }

    /// Handle for a producer thread
    pub fn sender(&self) -> InboxSender {
        InboxSender {
            tx: self.tx.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Take the events queued at the time of the call, oldest first
    ///
    /// Events pushed while draining wait for the next frame.
    pub fn drain(&self) -> impl Iterator<Item = TouchEvent> + '_ {
        let pending = self.rx.len();
        self.rx.try_iter().take(pending)
    }
}

impl Default for EventInbox {
    fn default() -> Self {
        Self::new(DEFAULT_INBOX_CAPACITY)
    }
}

/// Cloneable producer side of an [`EventInbox`]
#[derive(Clone)]
pub struct InboxSender {
    tx: Sender<TouchEvent>,
}

impl InboxSender {
    /// Queue an event without blocking
    ///
    /// A full inbox hands the event back instead of growing.
    pub fn try_send(&self, event: TouchEvent) -> Result<(), TouchEvent> {
        match self.tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(event)) => {
                warn!("Event inbox full, dropping {}", event);
                Err(event)
            }
            Err(TrySendError::Disconnected(event)) => {
                debug!("Event inbox closed, dropping {}", event);
                Err(event)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_drain_preserves_order() {
        let inbox = EventInbox::new(8);
        let sender = inbox.sender();

        sender.try_send(TouchEvent::down(1.0, 1.0)).unwrap();
        sender.try_send(TouchEvent::moved(2.0, 1.0, 1.0, 1.0)).unwrap();
        sender.try_send(TouchEvent::up(2.0, 1.0, 2.0, 1.0)).unwrap();

        let drained: Vec<TouchEvent> = inbox.drain().collect();
        assert_eq!(
            drained,
            vec![
                TouchEvent::down(1.0, 1.0),
                TouchEvent::moved(2.0, 1.0, 1.0, 1.0),
                TouchEvent::up(2.0, 1.0, 2.0, 1.0),
            ]
        );
        assert!(inbox.is_empty());
    }

    #[test]
    fn test_full_inbox_returns_event() {
        let inbox = EventInbox::new(1);
        let sender = inbox.sender();

        sender.try_send(TouchEvent::down(1.0, 1.0)).unwrap();
        let rejected = sender.try_send(TouchEvent::down(2.0, 2.0)).unwrap_err();
        assert_eq!(rejected, TouchEvent::down(2.0, 2.0));
        assert_eq!(inbox.len(), 1);
    }

    #[test]
    fn test_producer_thread() {
        let inbox = EventInbox::new(64);
        let sender = inbox.sender();

        let producer = thread::spawn(move || {
            for i in 0..10 {
                sender.try_send(TouchEvent::down(i as f32, 0.0)).unwrap();
            }
        });
        producer.join().unwrap();

        assert_eq!(inbox.drain().count(), 10);
    }
}
