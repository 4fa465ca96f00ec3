//! # Session Observer Bridge
//!
//! Republishes the session's state transitions to whatever UI layer is
//! watching, without the session knowing its observers' identities and
//! without granting observers any mutation access.
//!
//! ## Contract
//!
//! - The snapshot is committed to the `watch` channel *before* the discrete
//!   event for the same transition is broadcast, and before the mutating
//!   operation returns. A synchronous caller that reads the snapshot after
//!   any control call therefore never observes a stale value.
//! - Broadcast delivery is fire-and-forget: a slow subscriber lags
//!   (`RecvError::Lagged`), it never blocks the session or its position
//!   ticker.
//! - After `AudioSession::close` no further notifications are delivered.

use crate::state::PlaybackSnapshot;
use core_runtime::events::{BriefingEvent, CoreEvent, EventBus, Receiver, SessionEvent};
use tokio::sync::watch;

/// Read-only notification surface of an [`crate::AudioSession`].
///
/// Cheap to share behind the session's `Arc`; every accessor hands out an
/// independent receiver.
pub struct SessionObservers {
    snapshot_tx: watch::Sender<PlaybackSnapshot>,
    bus: EventBus,
}

impl SessionObservers {
    pub(crate) fn new(event_capacity: usize) -> Self {
        let (snapshot_tx, _) = watch::channel(PlaybackSnapshot::cleared());
        Self {
            snapshot_tx,
            bus: EventBus::new(event_capacity),
        }
    }

    /// Current snapshot, read synchronously.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        *self.snapshot_tx.borrow()
    }

    /// Subscribe to snapshot updates. The receiver always holds the latest
    /// value; intermediate values may be skipped (watch semantics), which is
    /// exactly what a polling display wants.
    pub fn watch_snapshot(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Subscribe to discrete session/pipeline events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.bus.subscribe()
    }

    /// Number of active event subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }

    pub(crate) fn publish_snapshot(&self, snapshot: PlaybackSnapshot) {
        self.snapshot_tx.send_replace(snapshot);
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine; the session never depends on delivery.
        self.bus.emit(CoreEvent::Session(event)).ok();
    }

    pub(crate) fn emit_briefing(&self, event: BriefingEvent) {
        self.bus.emit(CoreEvent::Briefing(event)).ok();
    }
}

impl std::fmt::Debug for SessionObservers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionObservers")
            .field("snapshot", &self.snapshot())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snapshot_visible_before_event() {
        let observers = SessionObservers::new(16);
        let mut events = observers.subscribe();
        let watcher = observers.watch_snapshot();

        let snapshot = PlaybackSnapshot {
            is_playing: true,
            position_secs: 3.0,
            duration_secs: 60.0,
        };
        observers.publish_snapshot(snapshot);
        observers.emit(SessionEvent::Started { position_secs: 3.0 });

        // By the time the event is observable, the snapshot already is.
        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            CoreEvent::Session(SessionEvent::Started { position_secs: 3.0 })
        );
        assert_eq!(*watcher.borrow(), snapshot);
    }

    #[tokio::test]
    async fn multiple_watchers_see_latest() {
        let observers = SessionObservers::new(16);
        let a = observers.watch_snapshot();
        let b = observers.watch_snapshot();

        observers.publish_snapshot(PlaybackSnapshot {
            is_playing: false,
            position_secs: 0.0,
            duration_secs: 90.0,
        });

        assert_eq!(a.borrow().duration_secs, 90.0);
        assert_eq!(b.borrow().duration_secs, 90.0);
    }

    #[tokio::test]
    async fn emit_without_subscribers_is_harmless() {
        let observers = SessionObservers::new(16);
        observers.emit(SessionEvent::Stopped);
        assert_eq!(observers.subscriber_count(), 0);
    }
}
