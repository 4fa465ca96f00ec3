//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the news briefing core:
//! - Logging and tracing infrastructure
//! - Configuration management and bridge wiring
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the session core depends on. It
//! establishes the logging conventions, the event broadcasting mechanism
//! observers consume, and the fail-fast configuration builder through which
//! hosts inject their bridge implementations.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::CoreConfig;
pub use error::{Error, Result};
pub use events::{BriefingEvent, CoreEvent, EventBus, EventStream, SessionEvent};
pub use logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
