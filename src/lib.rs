//! Workspace facade crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates. Host applications can depend on `newsbrief-workspace` and
//! enable the documented features without needing to wire each crate
//! individually: `core` pulls in the session core and runtime, while
//! `desktop-shims` additionally provides the reqwest/symphonia reference
//! adapters for desktop hosts.

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;
#[cfg(feature = "core")]
pub use core_runtime;
#[cfg(feature = "core")]
pub use core_session;
