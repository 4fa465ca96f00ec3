//! # Desktop Bridge Implementations
//!
//! Reference adapters for desktop hosts:
//! - [`ReqwestHttpClient`] - narration retrieval over reqwest with retry
//! - [`SymphoniaNarrationDecoder`] - payload validation and duration probing
//!   via symphonia
//!
//! The platform audio device (`PlaybackSink`) is not provided here: audio
//! output is always wired by the host shell, which owns the output route and
//! its lifecycle. Mobile hosts replace this whole crate with their native
//! adapters.

pub mod decoder;
pub mod http;

pub use decoder::SymphoniaNarrationDecoder;
pub use http::ReqwestHttpClient;
