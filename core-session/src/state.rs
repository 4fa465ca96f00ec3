//! Session phases and the externally visible playback snapshot.

use serde::{Deserialize, Serialize};

/// Lifecycle phase of the audio session.
///
/// `Paused` and `Playing` are the two ready states: a narration is loaded
/// and the transport controls operate on it. Every other operation leaves
/// the session in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No narration loaded.
    Idle,
    /// Retrieval/decode in flight.
    Loading,
    /// Narration ready, not rendering.
    Paused,
    /// Narration rendering.
    Playing,
}

impl SessionPhase {
    /// True when a narration is loaded and controllable.
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionPhase::Paused | SessionPhase::Playing)
    }
}

/// Read-only view of the current playback state.
///
/// Published through the observer bridge; external layers can never mutate
/// it. Invariants maintained by the session:
/// `0 <= position_secs <= duration_secs` whenever `duration_secs > 0`, and
/// both are `0.0` whenever nothing is loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// Whether audio is currently rendering.
    pub is_playing: bool,
    /// Current position in fractional seconds.
    pub position_secs: f64,
    /// Total narration duration in fractional seconds.
    pub duration_secs: f64,
}

impl PlaybackSnapshot {
    /// The all-zero snapshot of an idle session.
    pub fn cleared() -> Self {
        Self::default()
    }

    /// True when the snapshot is the idle all-zero state.
    pub fn is_cleared(&self) -> bool {
        !self.is_playing && self.position_secs == 0.0 && self.duration_secs == 0.0
    }

    /// True when the position/duration invariants hold.
    pub fn in_bounds(&self) -> bool {
        if self.duration_secs > 0.0 {
            (0.0..=self.duration_secs).contains(&self.position_secs)
        } else {
            self.position_secs == 0.0 && self.duration_secs == 0.0
        }
    }
}
