//! Playback bridge traits and supporting audio types.
//!
//! These abstractions let the session core interact with platform-specific
//! audio engines and decoder backends while preserving a consistent API
//! surface. Host applications are expected to provide concrete
//! implementations that satisfy their platform constraints (desktop, mobile).
//!
//! The decoder is async: validating and probing a fetched payload is the
//! tail end of the only suspending operation the session performs. The sink
//! is synchronous: its methods are invoked from the session's control
//! surface and position ticker and must return without blocking.

use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use uuid::Uuid;

/// Stream metadata describing a validated narration payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NarrationFormat {
    /// Codec identifier when the decoder reports one (e.g. "mp3").
    pub codec: Option<String>,
    /// Sample rate in hertz.
    pub sample_rate: Option<u32>,
    /// Number of audio channels.
    pub channels: Option<u16>,
}

/// A decoded, ready-to-play narration resource.
///
/// Produced by [`NarrationDecoder::decode`], which consumes the staged bytes
/// of exactly one load cycle. The session core holds at most one of these at
/// a time and releases it deterministically on stop, supersession, or natural
/// completion.
#[derive(Debug, Clone)]
pub struct DecodedNarration {
    /// Validated container bytes, retained for the sink to render from.
    pub data: Bytes,
    /// Total stream duration derived from the decoded metadata.
    pub duration: Duration,
    /// Format details, for diagnostics.
    pub format: NarrationFormat,
}

impl DecodedNarration {
    pub fn new(data: Bytes, duration: Duration) -> Self {
        Self {
            data,
            duration,
            format: NarrationFormat::default(),
        }
    }

    pub fn with_format(mut self, format: NarrationFormat) -> Self {
        self.format = format;
        self
    }

    /// Duration in fractional seconds, the unit the snapshot layer exposes.
    pub fn duration_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

/// Trait for decoder implementations that validate fetched bytes as playable
/// audio and extract the stream duration.
///
/// `decode` takes the staged bytes by value: the buffer belongs to exactly
/// one load cycle, and ownership either moves into the returned
/// [`DecodedNarration`] or is dropped on failure. Either way it is released
/// exactly once.
#[async_trait]
pub trait NarrationDecoder: Send + Sync {
    /// Validate the payload and derive its duration.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Undecodable`] if the bytes are not a playable
    /// container or the duration cannot be determined.
    async fn decode(&self, data: Bytes) -> Result<DecodedNarration>;
}

/// Unique identifier for playback sessions managed by a host sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackSessionId(Uuid);

impl PlaybackSessionId {
    /// Generate a new session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PlaybackSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlaybackSessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Device-side lifecycle state of a prepared narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    /// Prepared but not yet started, or paused mid-stream.
    Paused,
    /// Actively rendering audio.
    Playing,
    /// Rendering reached the end of the stream.
    Completed,
}

/// Trait for platform audio devices.
///
/// A sink hands out one ticket per prepared narration and renders from the
/// narration's validated bytes. All methods are synchronous and must return
/// promptly: `start` may fail (device busy, route unavailable, permission
/// denied) and the session recovers by reverting to its paused state, but it
/// must never block the caller while deciding.
///
/// A released ticket is dead; subsequent calls with it return
/// [`BridgeError::UnknownSession`].
pub trait PlaybackSink: Send + Sync {
    /// Allocate device resources for a narration and return its ticket.
    fn prepare(&self, narration: &DecodedNarration) -> Result<PlaybackSessionId>;

    /// Begin or resume rendering from the given position.
    fn start(&self, session: PlaybackSessionId, position: Duration) -> Result<()>;

    /// Pause rendering, retaining the session and its position.
    fn pause(&self, session: PlaybackSessionId) -> Result<()>;

    /// Move the render position. Valid whether playing or paused.
    fn set_position(&self, session: PlaybackSessionId, position: Duration) -> Result<()>;

    /// Query the current render position.
    fn position(&self, session: PlaybackSessionId) -> Result<Duration>;

    /// Query the device-side lifecycle state.
    fn state(&self, session: PlaybackSessionId) -> Result<SinkState>;

    /// Release all device resources held for the session.
    fn release(&self, session: PlaybackSessionId) -> Result<()>;
}

/// Convenience result type alias for playback operations.
pub type PlaybackResult<T> = std::result::Result<T, BridgeError>;
