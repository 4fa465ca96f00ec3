//! # Briefing Session Walkthrough
//!
//! Demonstrates the audio session lifecycle against in-memory bridges: load
//! a narration, watch position updates stream in, pause, seek, and let a
//! superseding load take over.
//!
//! Run with: `cargo run --example briefing_demo --package core-session`

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{
    DecodedNarration, HttpClient, HttpRequest, HttpResponse, NarrationDecoder, PlaybackSessionId,
    PlaybackSink, SinkState,
};
use bytes::Bytes;
use core_runtime::{init_logging, CoreConfig, LoggingConfig};
use core_session::AudioSession;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// In-Memory Bridges (for demonstration)
// ============================================================================

/// Serves a fixed payload for every URL; the payload encodes the duration.
struct CannedHttpClient;

#[async_trait]
impl HttpClient for CannedHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        // Pretend the URL path encodes the narration length.
        let secs = if request.url.contains("deep-dive") {
            240.0
        } else {
            90.0
        };
        Ok(HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from(format!("narration:{secs}")),
        })
    }
}

/// Reads the duration back out of the canned payload.
struct CannedDecoder;

#[async_trait]
impl NarrationDecoder for CannedDecoder {
    async fn decode(&self, data: Bytes) -> BridgeResult<DecodedNarration> {
        let text = std::str::from_utf8(&data)
            .map_err(|_| BridgeError::Undecodable("not audio".to_string()))?;
        let secs: f64 = text
            .strip_prefix("narration:")
            .and_then(|rest| rest.parse().ok())
            .ok_or_else(|| BridgeError::Undecodable("unrecognized container".to_string()))?;
        Ok(DecodedNarration::new(data.clone(), Duration::from_secs_f64(secs)))
    }
}

/// A sink that renders to stdout instead of an audio device.
#[derive(Default)]
struct PrintlnSink {
    voices: parking_lot::Mutex<HashMap<PlaybackSessionId, (Duration, Duration, bool)>>,
}

impl PlaybackSink for PrintlnSink {
    fn prepare(&self, narration: &DecodedNarration) -> BridgeResult<PlaybackSessionId> {
        let ticket = PlaybackSessionId::new();
        self.voices
            .lock()
            .insert(ticket, (narration.duration, Duration::ZERO, false));
        println!("[sink] prepared {:?} narration", narration.duration);
        Ok(ticket)
    }

    fn start(&self, session: PlaybackSessionId, position: Duration) -> BridgeResult<()> {
        let mut voices = self.voices.lock();
        let voice = voices
            .get_mut(&session)
            .ok_or_else(|| BridgeError::UnknownSession(session.to_string()))?;
        voice.1 = position;
        voice.2 = true;
        println!("[sink] rendering from {position:?}");
        Ok(())
    }

    fn pause(&self, session: PlaybackSessionId) -> BridgeResult<()> {
        let mut voices = self.voices.lock();
        let voice = voices
            .get_mut(&session)
            .ok_or_else(|| BridgeError::UnknownSession(session.to_string()))?;
        voice.2 = false;
        Ok(())
    }

    fn set_position(&self, session: PlaybackSessionId, position: Duration) -> BridgeResult<()> {
        let mut voices = self.voices.lock();
        let voice = voices
            .get_mut(&session)
            .ok_or_else(|| BridgeError::UnknownSession(session.to_string()))?;
        voice.1 = position;
        Ok(())
    }

    fn position(&self, session: PlaybackSessionId) -> BridgeResult<Duration> {
        let mut voices = self.voices.lock();
        let voice = voices
            .get_mut(&session)
            .ok_or_else(|| BridgeError::UnknownSession(session.to_string()))?;
        if voice.2 {
            // Advance a quarter second per poll, standing in for real time.
            voice.1 = (voice.1 + Duration::from_millis(250)).min(voice.0);
        }
        Ok(voice.1)
    }

    fn state(&self, session: PlaybackSessionId) -> BridgeResult<SinkState> {
        let voices = self.voices.lock();
        let voice = voices
            .get(&session)
            .ok_or_else(|| BridgeError::UnknownSession(session.to_string()))?;
        if voice.1 >= voice.0 {
            Ok(SinkState::Completed)
        } else if voice.2 {
            Ok(SinkState::Playing)
        } else {
            Ok(SinkState::Paused)
        }
    }

    fn release(&self, session: PlaybackSessionId) -> BridgeResult<()> {
        self.voices.lock().remove(&session);
        println!("[sink] released {session}");
        Ok(())
    }
}

// ============================================================================
// Walkthrough
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default()).ok();

    let config = CoreConfig::builder()
        .http_client(Arc::new(CannedHttpClient))
        .decoder(Arc::new(CannedDecoder))
        .sink(Arc::new(PrintlnSink::default()))
        .build()?;
    let session = Arc::new(AudioSession::new(config));

    // Print every discrete event as it happens.
    let mut events = session.observers().subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            println!("[event] {}", event.description());
        }
    });

    println!("--- load and play the morning briefing ---");
    session.load("https://backend.example/news/briefing.mp3").await?;
    session.play()?;
    tokio::time::sleep(Duration::from_secs(1)).await;
    println!("snapshot: {:?}", session.snapshot());

    println!("--- pause, seek, resume ---");
    session.pause();
    session.seek(30.0);
    session.toggle()?;
    tokio::time::sleep(Duration::from_millis(600)).await;
    println!("snapshot: {:?}", session.snapshot());

    println!("--- a deep dive supersedes the briefing ---");
    session
        .load("https://backend.example/news/deep-dive.mp3")
        .await?;
    session.play()?;
    tokio::time::sleep(Duration::from_millis(600)).await;
    println!("snapshot: {:?}", session.snapshot());

    println!("--- dispose ---");
    session.close();
    println!("snapshot: {:?}", session.snapshot());

    Ok(())
}
