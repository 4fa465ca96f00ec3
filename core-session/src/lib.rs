//! # Audio Session Core
//!
//! The playback heart of the news briefing client: one [`AudioSession`]
//! owns at most one remotely-fetched narration at a time, tracks its
//! position and duration, exposes transport controls, and guarantees that
//! device resources and staged byte buffers are released deterministically
//! no matter how playback ends (natural completion, explicit stop, a
//! superseding load, or disposal).
//!
//! ## Overview
//!
//! - [`session::AudioSession`] - the state machine
//!   (`Idle → Loading → Paused ↔ Playing`), with `load` as the only
//!   suspending operation and a generation token discarding superseded
//!   loads
//! - [`observer::SessionObservers`] - read-only republication of state:
//!   a `watch` snapshot for polling UIs plus broadcast events
//! - [`pipeline::BriefingPipeline`] - resolves briefing / deep-dive
//!   narrations from a host-provided source and hands them to the session
//!
//! Bridges (HTTP retrieval, decoding, the platform audio device) are
//! injected through `core_runtime::CoreConfig`; see `bridge-traits` for the
//! contracts and `bridge-desktop` for the desktop reference adapters.

pub mod error;
pub mod observer;
pub mod pipeline;
pub mod session;
pub mod state;

pub use error::{Result, SessionError};
pub use observer::SessionObservers;
pub use pipeline::{
    ArticleSummary, BriefingPipeline, Narration, NarrationSource, PipelineStatus,
};
pub use session::AudioSession;
pub use state::{PlaybackSnapshot, SessionPhase};
