//! # Session Error Types
//!
//! Error taxonomy for the audio session and the briefing pipeline. Every
//! failure is caught at the session boundary and converted into either a
//! revert-to-previous-state or a reset-to-idle; nothing panics across it.

use thiserror::Error;

/// Errors surfaced by session and pipeline operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The remote narration could not be fetched. The session resets to
    /// idle; retrying the load is reasonable.
    #[error("Failed to retrieve narration from {url}: {message}")]
    Retrieval { url: String, message: String },

    /// Bytes were retrieved but are not a playable format. The session
    /// resets to idle.
    #[error("Narration is not decodable: {0}")]
    Decode(String),

    /// The audio device rejected a request. After a rejected start the
    /// narration handle remains valid, so a retry needs no re-fetch.
    #[error("Playback could not start: {0}")]
    PlaybackStart(String),

    /// The briefing source failed to produce a narration descriptor.
    #[error("Briefing source failed: {0}")]
    Source(String),

    /// A deep dive was requested without an article title.
    #[error("No article selected")]
    NoArticleSelected,

    /// The session was disposed; only `load`/`play` report this, the
    /// remaining controls degrade to no-ops.
    #[error("Session is closed")]
    Closed,
}

impl SessionError {
    /// Returns `true` if this error is transient and the operation can be
    /// retried without changing inputs.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SessionError::Retrieval { .. }
                | SessionError::PlaybackStart(_)
                | SessionError::Source(_)
        )
    }

    /// Returns `true` if this error is due to network issues.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            SessionError::Retrieval { .. } | SessionError::Source(_)
        )
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
