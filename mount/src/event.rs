//! Mount event notifications.
//!
//! The adapter announces slew lifecycle transitions to any number of
//! subscribers over standard channels. Subscribers that drop their
//! receiver are pruned on the next emit.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use coords::Equatorial;

/// How a slew ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlewOutcome {
    /// The driver reported the slew complete.
    Complete,
    /// The slew was cancelled before the driver finished.
    Aborted,
    /// A driver failure interrupted the slew.
    Error,
}

/// Notifications emitted by the mount adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum MountEvent {
    /// A slew was issued toward the commanded position.
    SlewBegin {
        /// Final commanded position (after mount-specific corrections).
        target: Equatorial,
    },
    /// A slew finished, one way or another.
    SlewComplete {
        /// Position observed when the slew ended.
        position: Equatorial,
        /// How the slew ended.
        outcome: SlewOutcome,
    },
    /// The mount's coordinate model was synced to a position.
    SyncComplete {
        /// Position the model was aligned to.
        position: Equatorial,
    },
}

/// Fan-out of [`MountEvent`]s to subscribers.
#[derive(Debug, Default)]
pub struct EventBus {
    senders: Mutex<Vec<Sender<MountEvent>>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber and return its receiving end.
    pub fn subscribe(&self) -> Receiver<MountEvent> {
        let (tx, rx) = mpsc::channel();
        self.senders
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        rx
    }

    /// Deliver an event to all live subscribers, dropping dead ones.
    pub fn emit(&self, event: MountEvent) {
        let mut senders = self.senders.lock().unwrap_or_else(|e| e.into_inner());
        senders.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coords::Angle;

    fn target() -> Equatorial {
        Equatorial::from_ra_dec(Angle::from_hours(5.5), Angle::from_degrees(-5.39))
    }

    #[test]
    fn test_emit_reaches_all_subscribers() {
        let bus = EventBus::new();
        let rx1 = bus.subscribe();
        let rx2 = bus.subscribe();

        bus.emit(MountEvent::SlewBegin { target: target() });

        assert_eq!(rx1.try_recv().unwrap(), MountEvent::SlewBegin { target: target() });
        assert_eq!(rx2.try_recv().unwrap(), MountEvent::SlewBegin { target: target() });
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let bus = EventBus::new();
        let rx1 = bus.subscribe();
        let rx2 = bus.subscribe();
        drop(rx2);

        bus.emit(MountEvent::SyncComplete { position: target() });
        bus.emit(MountEvent::SyncComplete { position: target() });

        assert_eq!(rx1.iter().take(2).count(), 2);
        assert_eq!(bus.senders.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_emit_with_no_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.emit(MountEvent::SlewComplete {
            position: target(),
            outcome: SlewOutcome::Aborted,
        });
    }
}
