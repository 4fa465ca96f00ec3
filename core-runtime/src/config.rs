//! # Core Configuration Module
//!
//! Provides configuration management for the briefing client core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`CoreConfig`] holding the bridge implementations and tuning knobs the
//! audio session needs. It enforces fail-fast validation so a missing
//! capability surfaces at construction time with an actionable message, not
//! at first use.
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - retrieval of narration bytes (desktop default: reqwest)
//! - `NarrationDecoder` - validation/probing of fetched bytes (desktop
//!   default: symphonia)
//! - `PlaybackSink` - the platform audio device; always host-injected
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .http_client(Arc::new(MyHttpClient))
//!     .decoder(Arc::new(MyDecoder))
//!     .sink(Arc::new(MySink))
//!     .tick_interval(Duration::from_millis(250))
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{HttpClient, NarrationDecoder, PlaybackSink};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default cadence of position updates while playing.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Default timeout for a single narration retrieval.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Core configuration for the briefing client core.
///
/// Use [`CoreConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// HTTP client used to retrieve narration bytes
    pub http_client: Arc<dyn HttpClient>,

    /// Decoder used to validate payloads and derive durations
    pub decoder: Arc<dyn NarrationDecoder>,

    /// Platform audio device
    pub sink: Arc<dyn PlaybackSink>,

    /// Cadence of position updates while playing (sub-second)
    pub tick_interval: Duration,

    /// Timeout applied to each narration retrieval
    pub fetch_timeout: Duration,

    /// Buffer size of the observer event bus
    pub event_capacity: usize,
}

impl CoreConfig {
    /// Start building a configuration.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    decoder: Option<Arc<dyn NarrationDecoder>>,
    sink: Option<Arc<dyn PlaybackSink>>,
    tick_interval: Option<Duration>,
    fetch_timeout: Option<Duration>,
    event_capacity: Option<usize>,
}

impl CoreConfigBuilder {
    /// Set the HTTP client bridge.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set the narration decoder bridge.
    pub fn decoder(mut self, decoder: Arc<dyn NarrationDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Set the platform audio sink bridge.
    pub fn sink(mut self, sink: Arc<dyn PlaybackSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Set the position update cadence.
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = Some(interval);
        self
    }

    /// Set the retrieval timeout.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Set the observer event bus capacity.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = Some(capacity);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] when a bridge is absent and
    /// [`Error::Config`] when a tuning knob is out of range.
    pub fn build(self) -> Result<CoreConfig> {
        let http_client = self.http_client.ok_or_else(|| Error::CapabilityMissing {
            capability: "HttpClient".to_string(),
            message: "No HTTP client implementation provided. \
                      Desktop: use bridge_desktop::ReqwestHttpClient. \
                      Mobile: inject the platform-native adapter."
                .to_string(),
        })?;

        let decoder = self.decoder.ok_or_else(|| Error::CapabilityMissing {
            capability: "NarrationDecoder".to_string(),
            message: "No narration decoder provided. \
                      Desktop: use bridge_desktop::SymphoniaNarrationDecoder. \
                      Mobile: inject the platform-native adapter."
                .to_string(),
        })?;

        let sink = self.sink.ok_or_else(|| Error::CapabilityMissing {
            capability: "PlaybackSink".to_string(),
            message: "No playback sink provided. The audio device is always \
                      host-injected; there is no portable default."
                .to_string(),
        })?;

        let tick_interval = self.tick_interval.unwrap_or(DEFAULT_TICK_INTERVAL);
        if tick_interval < Duration::from_millis(50) || tick_interval > Duration::from_secs(1) {
            return Err(Error::Config(format!(
                "tick_interval must be between 50ms and 1s (got {:?}); observers \
                 expect a bounded sub-second cadence",
                tick_interval
            )));
        }

        let fetch_timeout = self.fetch_timeout.unwrap_or(DEFAULT_FETCH_TIMEOUT);
        if fetch_timeout.is_zero() {
            return Err(Error::Config(
                "fetch_timeout must be non-zero".to_string(),
            ));
        }

        let event_capacity = self.event_capacity.unwrap_or(
            crate::events::DEFAULT_EVENT_BUFFER_SIZE,
        );
        if event_capacity < 8 {
            return Err(Error::Config(format!(
                "event_capacity must be at least 8 (got {})",
                event_capacity
            )));
        }

        debug!(
            ?tick_interval,
            ?fetch_timeout,
            event_capacity,
            "core configuration assembled"
        );
        Ok(CoreConfig {
            http_client,
            decoder,
            sink,
            tick_interval,
            fetch_timeout,
            event_capacity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{
        DecodedNarration, HttpRequest, HttpResponse, PlaybackSessionId, SinkState,
    };
    use bytes::Bytes;

    struct StubHttp;

    #[async_trait]
    impl HttpClient for StubHttp {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Ok(HttpResponse {
                status: 200,
                headers: Default::default(),
                body: Bytes::new(),
            })
        }
    }

    struct StubDecoder;

    #[async_trait]
    impl NarrationDecoder for StubDecoder {
        async fn decode(&self, data: Bytes) -> BridgeResult<DecodedNarration> {
            Ok(DecodedNarration::new(data, Duration::from_secs(1)))
        }
    }

    struct StubSink;

    impl PlaybackSink for StubSink {
        fn prepare(&self, _narration: &DecodedNarration) -> BridgeResult<PlaybackSessionId> {
            Ok(PlaybackSessionId::new())
        }
        fn start(&self, _session: PlaybackSessionId, _position: Duration) -> BridgeResult<()> {
            Ok(())
        }
        fn pause(&self, _session: PlaybackSessionId) -> BridgeResult<()> {
            Ok(())
        }
        fn set_position(
            &self,
            _session: PlaybackSessionId,
            _position: Duration,
        ) -> BridgeResult<()> {
            Ok(())
        }
        fn position(&self, _session: PlaybackSessionId) -> BridgeResult<Duration> {
            Ok(Duration::ZERO)
        }
        fn state(&self, _session: PlaybackSessionId) -> BridgeResult<SinkState> {
            Ok(SinkState::Paused)
        }
        fn release(&self, _session: PlaybackSessionId) -> BridgeResult<()> {
            Ok(())
        }
    }

    fn full_builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .http_client(Arc::new(StubHttp))
            .decoder(Arc::new(StubDecoder))
            .sink(Arc::new(StubSink))
    }

    #[test]
    fn test_build_with_defaults() {
        let config = full_builder().build().unwrap();
        assert_eq!(config.tick_interval, DEFAULT_TICK_INTERVAL);
        assert_eq!(config.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
        assert_eq!(
            config.event_capacity,
            crate::events::DEFAULT_EVENT_BUFFER_SIZE
        );
    }

    #[test]
    fn test_missing_sink_fails_fast() {
        let result = CoreConfig::builder()
            .http_client(Arc::new(StubHttp))
            .decoder(Arc::new(StubDecoder))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "PlaybackSink");
            }
            other => panic!("expected CapabilityMissing, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_missing_http_client_fails_fast() {
        let result = CoreConfig::builder()
            .decoder(Arc::new(StubDecoder))
            .sink(Arc::new(StubSink))
            .build();

        assert!(matches!(
            result,
            Err(Error::CapabilityMissing { ref capability, .. }) if capability == "HttpClient"
        ));
    }

    #[test]
    fn test_tick_interval_bounds() {
        let too_fast = full_builder()
            .tick_interval(Duration::from_millis(10))
            .build();
        assert!(matches!(too_fast, Err(Error::Config(_))));

        let too_slow = full_builder()
            .tick_interval(Duration::from_secs(5))
            .build();
        assert!(matches!(too_slow, Err(Error::Config(_))));

        let ok = full_builder()
            .tick_interval(Duration::from_millis(100))
            .build();
        assert!(ok.is_ok());
    }

    #[test]
    fn test_event_capacity_minimum() {
        let too_small = full_builder().event_capacity(2).build();
        assert!(matches!(too_small, Err(Error::Config(_))));
    }
}
