//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the audio session core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that must be provided differently per platform (desktop,
//! iOS, Android):
//!
//! - [`HttpClient`](http::HttpClient) - async retrieval of remote narration
//!   bytes, with retry policy support
//! - [`NarrationDecoder`](playback::NarrationDecoder) - validation of fetched
//!   bytes as playable audio and extraction of the stream duration
//! - [`PlaybackSink`](playback::PlaybackSink) - the platform audio device;
//!   a synchronous, non-blocking control surface addressed by
//!   [`PlaybackSessionId`](playback::PlaybackSessionId) tickets
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is
//! missing; see `core_runtime::config` for the wiring. A host that cannot
//! provide a capability should not silently stub it out.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent
//! usage across async tasks. Implementations must ensure thread safety, and
//! `PlaybackSink` methods must additionally return without blocking: they are
//! called from the session's position ticker.

pub mod error;
pub mod http;
pub mod playback;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use playback::{
    DecodedNarration, NarrationDecoder, NarrationFormat, PlaybackSessionId, PlaybackSink,
    SinkState,
};
