//! # Event Bus System
//!
//! Provides the notification backbone for the briefing core using
//! `tokio::sync::broadcast`. The audio session republishes its state
//! transitions through this bus; UI layers subscribe without gaining any
//! mutation access.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐     emit      ┌───────────┐
//! │ Audio Session ├──────────────>│           │
//! └───────────────┘               │ EventBus  │     subscribe    ┌────────────┐
//!                                 │ (broadcast├─────────────────>│ Subscriber │
//! ┌───────────────┐     emit      │  channel) │                  └────────────┘
//! │ Briefing Pipe ├──────────────>│           │     subscribe    ┌────────────┐
//! └───────────────┘               │           ├─────────────────>│ Subscriber │
//!                                 └───────────┘                  └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, SessionEvent};
//!
//! let bus = EventBus::new(100);
//! let mut subscriber = bus.subscribe();
//!
//! bus.emit(CoreEvent::Session(SessionEvent::Completed)).ok();
//! ```
//!
//! ## Error Handling
//!
//! The bus uses `tokio::sync::broadcast`, which can produce two receive
//! errors:
//!
//! - **`RecvError::Lagged(n)`**: the subscriber was too slow and missed `n`
//!   events. Non-fatal; the subscriber keeps receiving new events. Position
//!   ticks are the high-frequency case this protects the session from: a
//!   slow observer lags, it never blocks the ticker.
//! - **`RecvError::Closed`**: all senders were dropped; treat as shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Sized for bursts of position ticks plus discrete transitions; subscribers
/// that cannot keep up receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Audio session transitions
    Session(SessionEvent),
    /// Briefing pipeline progress
    Briefing(BriefingEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Session(e) => e.description(),
            CoreEvent::Briefing(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Session(SessionEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Briefing(BriefingEvent::Failed { .. }) => EventSeverity::Error,
            CoreEvent::Session(SessionEvent::PositionChanged { .. }) => EventSeverity::Debug,
            _ => EventSeverity::Info,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Session Events
// ============================================================================

/// Events emitted by the audio session as its state machine advances.
///
/// Positions and durations are fractional seconds, matching the snapshot the
/// observer bridge publishes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    /// A load began; any previous narration was already torn down.
    LoadStarted {
        /// Resource locator being retrieved.
        url: String,
    },
    /// Retrieval and decode succeeded; the narration is ready, paused at 0.
    Ready {
        /// Total stream duration.
        duration_secs: f64,
    },
    /// Playback started or resumed.
    Started {
        /// Position playback resumed from.
        position_secs: f64,
    },
    /// Playback paused.
    Paused {
        /// Position captured at pause time.
        position_secs: f64,
    },
    /// A seek was applied (clamped to the stream bounds).
    SeekApplied {
        /// The position after clamping.
        position_secs: f64,
    },
    /// Periodic position update while playing.
    PositionChanged {
        /// Current position.
        position_secs: f64,
        /// Total stream duration.
        duration_secs: f64,
    },
    /// Playback reached the end of the stream naturally.
    Completed,
    /// The session was stopped explicitly (or disposed).
    Stopped,
    /// A load or playback attempt failed.
    Error {
        /// Human-readable error message.
        message: String,
        /// Whether the failure is worth retrying (network, device busy).
        recoverable: bool,
    },
}

impl SessionEvent {
    fn description(&self) -> &str {
        match self {
            SessionEvent::LoadStarted { .. } => "Narration load started",
            SessionEvent::Ready { .. } => "Narration ready",
            SessionEvent::Started { .. } => "Playback started",
            SessionEvent::Paused { .. } => "Playback paused",
            SessionEvent::SeekApplied { .. } => "Seek applied",
            SessionEvent::PositionChanged { .. } => "Playback position changed",
            SessionEvent::Completed => "Narration completed",
            SessionEvent::Stopped => "Playback stopped",
            SessionEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Briefing Events
// ============================================================================

/// Events emitted by the briefing pipeline while resolving narrations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum BriefingEvent {
    /// A briefing or deep dive was requested from the narration source.
    Requested {
        /// What was asked for (e.g. "daily-briefing", "deep-dive").
        kind: String,
    },
    /// The narration descriptor arrived and playback was handed off.
    Resolved {
        /// Number of article summaries attached to the narration.
        article_count: usize,
    },
    /// The pipeline failed before playback could start.
    Failed {
        /// Human-readable error message.
        message: String,
    },
}

impl BriefingEvent {
    fn description(&self) -> &str {
        match self {
            BriefingEvent::Requested { .. } => "Briefing requested",
            BriefingEvent::Resolved { .. } => "Briefing resolved",
            BriefingEvent::Failed { .. } => "Briefing failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer per subscriber.
    ///   When a subscriber falls behind by more than this amount, it will
    ///   receive a `RecvError::Lagged` error.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are no active subscribers. Publishers that don't care whether
    /// anyone is listening (the session is one) call `.ok()` on the result.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all future
    /// events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with filtering.
///
/// UI layers often want only the discrete transitions and not the
/// high-frequency position ticks; a filter keeps the skipping logic out of
/// every consumer loop.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream, SessionEvent};
///
/// let bus = EventBus::new(100);
/// let mut stream = EventStream::new(bus.subscribe()).filter(|event| {
///     !matches!(
///         event,
///         CoreEvent::Session(SessionEvent::PositionChanged { .. })
///     )
/// });
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function to this stream. Only events that match the
    /// filter will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n`
    /// events, `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            let Some(filter) = &self.filter else {
                return Ok(event);
            };
            if filter(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    let Some(filter) = &self.filter else {
                        return Some(Ok(event));
                    };
                    if filter(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Some(Err(RecvError::Closed))
                }
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
