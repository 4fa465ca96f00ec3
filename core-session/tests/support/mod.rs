//! Shared mock bridges for the integration tests.
//!
//! The HTTP client serves canned payloads (with optional per-URL gates so
//! tests can control resolution order), the decoder reads an ASCII duration
//! out of the payload, and the sink tracks live tickets so ownership
//! properties are observable.

// Each test binary uses a different subset of the helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{
    DecodedNarration, HttpClient, HttpRequest, HttpResponse, NarrationDecoder, PlaybackSessionId,
    PlaybackSink, SinkState,
};
use bytes::Bytes;
use core_runtime::CoreConfig;
use core_session::AudioSession;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

// ============================================================================
// Scripted HTTP Client
// ============================================================================

struct ScriptedResponse {
    status: u16,
    body: Bytes,
    gate: Option<Arc<Notify>>,
}

/// HTTP client serving canned payloads.
#[derive(Default)]
pub struct ScriptedHttpClient {
    scripts: Mutex<HashMap<String, ScriptedResponse>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with status 200 for `url`.
    pub fn serve(&self, url: &str, body: Bytes) {
        self.scripts.lock().insert(
            url.to_string(),
            ScriptedResponse {
                status: 200,
                body,
                gate: None,
            },
        );
    }

    /// Serve an empty body with the given status for `url`.
    pub fn serve_status(&self, url: &str, status: u16) {
        self.scripts.lock().insert(
            url.to_string(),
            ScriptedResponse {
                status,
                body: Bytes::new(),
                gate: None,
            },
        );
    }

    /// Serve `body` for `url`, but hold the response until the returned
    /// gate is notified. Lets tests decide resolution order.
    pub fn serve_gated(&self, url: &str, body: Bytes) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.scripts.lock().insert(
            url.to_string(),
            ScriptedResponse {
                status: 200,
                body,
                gate: Some(gate.clone()),
            },
        );
        gate
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let (status, body, gate) = {
            let scripts = self.scripts.lock();
            match scripts.get(&request.url) {
                Some(response) => (response.status, response.body.clone(), response.gate.clone()),
                None => {
                    return Err(BridgeError::Network(format!(
                        "connection refused: {}",
                        request.url
                    )))
                }
            }
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body,
        })
    }
}

// ============================================================================
// Scripted Decoder
// ============================================================================

/// Decoder that parses an ASCII duration out of the payload, e.g.
/// `b"narration:120"` decodes to a 120-second narration. Anything else is
/// rejected as undecodable.
pub struct ScriptedDecoder;

#[async_trait]
impl NarrationDecoder for ScriptedDecoder {
    async fn decode(&self, data: Bytes) -> BridgeResult<DecodedNarration> {
        let text = std::str::from_utf8(&data)
            .map_err(|_| BridgeError::Undecodable("payload is not audio".to_string()))?;
        let secs: f64 = text
            .strip_prefix("narration:")
            .and_then(|rest| rest.trim().parse().ok())
            .ok_or_else(|| BridgeError::Undecodable("unrecognized container".to_string()))?;
        Ok(DecodedNarration::new(
            data.clone(),
            Duration::from_secs_f64(secs),
        ))
    }
}

/// Payload the [`ScriptedDecoder`] decodes into a narration of `secs`.
pub fn narration_payload(secs: f64) -> Bytes {
    Bytes::from(format!("narration:{secs}"))
}

// ============================================================================
// Fake Sink
// ============================================================================

struct FakeVoice {
    duration: Duration,
    base_position: Duration,
    started_at: Option<Instant>,
}

impl FakeVoice {
    fn current_position(&self) -> Duration {
        let elapsed = self
            .started_at
            .map(|at| at.elapsed())
            .unwrap_or(Duration::ZERO);
        (self.base_position + elapsed).min(self.duration)
    }
}

#[derive(Default)]
struct FakeSinkInner {
    voices: HashMap<PlaybackSessionId, FakeVoice>,
    max_live: usize,
    total_prepared: usize,
    total_released: usize,
    fail_start: bool,
}

/// Sink whose voices advance with (virtual) time, tracking ticket
/// ownership so single-owner properties are observable.
#[derive(Default)]
pub struct FakeSink {
    inner: Mutex<FakeSinkInner>,
}

impl FakeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `start` calls fail, as a busy device would.
    pub fn set_fail_start(&self, fail: bool) {
        self.inner.lock().fail_start = fail;
    }

    /// Number of currently live (prepared, unreleased) tickets.
    pub fn live(&self) -> usize {
        self.inner.lock().voices.len()
    }

    /// Highest number of simultaneously live tickets ever observed.
    pub fn max_live(&self) -> usize {
        self.inner.lock().max_live
    }

    pub fn total_prepared(&self) -> usize {
        self.inner.lock().total_prepared
    }

    pub fn total_released(&self) -> usize {
        self.inner.lock().total_released
    }
}

impl PlaybackSink for FakeSink {
    fn prepare(&self, narration: &DecodedNarration) -> BridgeResult<PlaybackSessionId> {
        let mut inner = self.inner.lock();
        let ticket = PlaybackSessionId::new();
        inner.voices.insert(
            ticket,
            FakeVoice {
                duration: narration.duration,
                base_position: Duration::ZERO,
                started_at: None,
            },
        );
        inner.total_prepared += 1;
        inner.max_live = inner.max_live.max(inner.voices.len());
        Ok(ticket)
    }

    fn start(&self, session: PlaybackSessionId, position: Duration) -> BridgeResult<()> {
        let mut inner = self.inner.lock();
        if inner.fail_start {
            return Err(BridgeError::Device("output route unavailable".to_string()));
        }
        let voice = inner
            .voices
            .get_mut(&session)
            .ok_or_else(|| BridgeError::UnknownSession(session.to_string()))?;
        voice.base_position = position.min(voice.duration);
        voice.started_at = Some(Instant::now());
        Ok(())
    }

    fn pause(&self, session: PlaybackSessionId) -> BridgeResult<()> {
        let mut inner = self.inner.lock();
        let voice = inner
            .voices
            .get_mut(&session)
            .ok_or_else(|| BridgeError::UnknownSession(session.to_string()))?;
        voice.base_position = voice.current_position();
        voice.started_at = None;
        Ok(())
    }

    fn set_position(&self, session: PlaybackSessionId, position: Duration) -> BridgeResult<()> {
        let mut inner = self.inner.lock();
        let voice = inner
            .voices
            .get_mut(&session)
            .ok_or_else(|| BridgeError::UnknownSession(session.to_string()))?;
        voice.base_position = position.min(voice.duration);
        if voice.started_at.is_some() {
            voice.started_at = Some(Instant::now());
        }
        Ok(())
    }

    fn position(&self, session: PlaybackSessionId) -> BridgeResult<Duration> {
        let inner = self.inner.lock();
        let voice = inner
            .voices
            .get(&session)
            .ok_or_else(|| BridgeError::UnknownSession(session.to_string()))?;
        Ok(voice.current_position())
    }

    fn state(&self, session: PlaybackSessionId) -> BridgeResult<SinkState> {
        let inner = self.inner.lock();
        let voice = inner
            .voices
            .get(&session)
            .ok_or_else(|| BridgeError::UnknownSession(session.to_string()))?;
        if voice.current_position() >= voice.duration {
            Ok(SinkState::Completed)
        } else if voice.started_at.is_some() {
            Ok(SinkState::Playing)
        } else {
            Ok(SinkState::Paused)
        }
    }

    fn release(&self, session: PlaybackSessionId) -> BridgeResult<()> {
        let mut inner = self.inner.lock();
        inner
            .voices
            .remove(&session)
            .ok_or_else(|| BridgeError::UnknownSession(session.to_string()))?;
        inner.total_released += 1;
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct TestHarness {
    pub http: Arc<ScriptedHttpClient>,
    pub sink: Arc<FakeSink>,
    pub session: Arc<AudioSession>,
}

/// Build a session over the scripted bridges with a 250ms tick.
pub fn harness() -> TestHarness {
    let http = Arc::new(ScriptedHttpClient::new());
    let sink = Arc::new(FakeSink::new());
    let config = CoreConfig::builder()
        .http_client(http.clone())
        .decoder(Arc::new(ScriptedDecoder))
        .sink(sink.clone())
        .tick_interval(Duration::from_millis(250))
        .build()
        .expect("test config must build");
    TestHarness {
        http,
        sink,
        session: Arc::new(AudioSession::new(config)),
    }
}

/// Let spawned tasks (the position ticker, gated loads) reach their next
/// await point on the current-thread runtime.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

/// Float comparison for positions derived from virtual time.
pub fn approx(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-6
}
