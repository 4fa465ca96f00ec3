//! # Audio Session
//!
//! Owns exactly one "current" narration at a time: its device ticket, its
//! decoded duration, its position, and its play/pause state. `load` is the
//! only suspending operation; every other control is synchronous with
//! respect to session state.
//!
//! ## Supersession
//!
//! Any `load` (and any `stop`) invalidates whatever came before it by
//! bumping a generation counter. An in-flight load re-checks its captured
//! generation at every resumption point and, once stale, releases anything
//! it acquired and discards itself silently. This is what guarantees that
//! racing `load(A); load(B)` always settles with B's narration as the only
//! live resource, never A's.
//!
//! ## Resource release
//!
//! The device ticket and the staged bytes behind it are released by exactly
//! one of: `stop`, a superseding `load`, natural end of media, or `close`
//! (which `Drop` also runs). End of media performs the same release sequence
//! as `stop` and fires at most once per narration; a racing explicit `stop`
//! simply wins and the tick that would have completed becomes a no-op.

use crate::error::SessionError;
use crate::observer::SessionObservers;
use crate::state::{PlaybackSnapshot, SessionPhase};
use bridge_traits::{
    DecodedNarration, HttpClient, HttpRequest, NarrationDecoder, PlaybackSessionId, PlaybackSink,
    SinkState,
};
use bytes::Bytes;
use core_runtime::{CoreConfig, SessionEvent};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Fetched narration bytes staged between retrieval and decode.
///
/// The buffer belongs to exactly one load cycle: ownership either moves into
/// the decoder on the success path or the buffer is dropped on the
/// failure/supersession paths. Either way it is released exactly once, and
/// the release is logged so lifetimes stay observable.
struct StagedAudio {
    bytes: Option<Bytes>,
    url: String,
}

impl StagedAudio {
    fn new(url: &str, bytes: Bytes) -> Self {
        debug!(url, len = bytes.len(), "staged narration bytes");
        Self {
            bytes: Some(bytes),
            url: url.to_string(),
        }
    }

    fn into_bytes(mut self) -> Bytes {
        self.bytes.take().unwrap_or_default()
    }
}

impl Drop for StagedAudio {
    fn drop(&mut self) {
        if let Some(bytes) = self.bytes.take() {
            debug!(
                url = %self.url,
                len = bytes.len(),
                "staged narration bytes released without decode"
            );
        }
    }
}

/// The one live narration: device ticket plus decoded handle.
struct LoadedNarration {
    ticket: PlaybackSessionId,
    narration: DecodedNarration,
}

struct SessionInner {
    phase: SessionPhase,
    /// Bumped by every teardown; in-flight work compares its captured value
    /// and discards itself on mismatch.
    generation: u64,
    loaded: Option<LoadedNarration>,
    ticker: Option<CancellationToken>,
    closed: bool,
}

/// The audio session state machine.
///
/// Construct one per active screen via [`AudioSession::new`] and dispose of
/// it with [`AudioSession::close`] (also run by `Drop`). All bridges come in
/// through [`CoreConfig`]; the session is the sole owner of the narration
/// handle and the sole mutator of the published snapshot.
pub struct AudioSession {
    http: Arc<dyn HttpClient>,
    decoder: Arc<dyn NarrationDecoder>,
    sink: Arc<dyn PlaybackSink>,
    tick_interval: Duration,
    fetch_timeout: Duration,
    observers: Arc<SessionObservers>,
    inner: Arc<Mutex<SessionInner>>,
}

impl AudioSession {
    /// Create an idle session from a validated configuration.
    pub fn new(config: CoreConfig) -> Self {
        Self {
            http: config.http_client,
            decoder: config.decoder,
            sink: config.sink,
            tick_interval: config.tick_interval,
            fetch_timeout: config.fetch_timeout,
            observers: Arc::new(SessionObservers::new(config.event_capacity)),
            inner: Arc::new(Mutex::new(SessionInner {
                phase: SessionPhase::Idle,
                generation: 0,
                loaded: None,
                ticker: None,
                closed: false,
            })),
        }
    }

    /// The read-only notification surface.
    pub fn observers(&self) -> &SessionObservers {
        &self.observers
    }

    /// Current snapshot, read synchronously.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.observers.snapshot()
    }

    /// Load a narration from a resolved resource locator.
    ///
    /// Tears down any current narration first, then retrieves and decodes
    /// the new one. Resolves once the narration is ready to play (paused at
    /// position 0). A load that is superseded mid-flight resolves `Ok(())`
    /// without touching state; a failed load resets the session to idle and
    /// returns the failure.
    pub async fn load(&self, url: &str) -> Result<(), SessionError> {
        let generation = {
            let mut inner = self.inner.lock();
            if inner.closed {
                return Err(SessionError::Closed);
            }
            teardown(&mut inner, self.sink.as_ref(), &self.observers);
            inner.phase = SessionPhase::Loading;
            inner.generation
        };
        info!(url, "loading narration");
        self.observers.emit(SessionEvent::LoadStarted {
            url: url.to_string(),
        });

        let staged = match self.retrieve(url).await {
            Ok(staged) => staged,
            Err(err) => return self.fail_load(generation, url, err),
        };
        if self.inner.lock().generation != generation {
            debug!(url, "load superseded during retrieval; discarding");
            return Ok(());
        }

        let narration = match self.decoder.decode(staged.into_bytes()).await {
            Ok(narration) => narration,
            Err(err) => {
                return self.fail_load(generation, url, SessionError::Decode(err.to_string()))
            }
        };

        let mut inner = self.inner.lock();
        if inner.generation != generation || inner.closed {
            debug!(url, "load superseded during decode; discarding");
            return Ok(());
        }
        let ticket = match self.sink.prepare(&narration) {
            Ok(ticket) => ticket,
            Err(err) => {
                drop(inner);
                return self.fail_load(
                    generation,
                    url,
                    SessionError::PlaybackStart(err.to_string()),
                );
            }
        };
        let duration_secs = narration.duration_secs();
        inner.loaded = Some(LoadedNarration { ticket, narration });
        inner.phase = SessionPhase::Paused;
        let token = CancellationToken::new();
        inner.ticker = Some(token.clone());
        drop(inner);

        self.observers.publish_snapshot(PlaybackSnapshot {
            is_playing: false,
            position_secs: 0.0,
            duration_secs,
        });
        self.observers.emit(SessionEvent::Ready { duration_secs });
        self.spawn_ticker(generation, token);
        info!(url, duration_secs, "narration ready");
        Ok(())
    }

    /// Start or resume playback from the current position.
    ///
    /// No-op while idle or loading; from paused, starts the device and
    /// transitions to playing. A device rejection leaves the session paused
    /// with the narration handle intact, so a retry needs no re-fetch.
    pub fn play(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(SessionError::Closed);
        }
        match inner.phase {
            SessionPhase::Idle | SessionPhase::Loading => {
                debug!("play ignored: no narration ready");
                return Ok(());
            }
            SessionPhase::Playing => return Ok(()),
            SessionPhase::Paused => {}
        }
        let Some(loaded) = inner.loaded.as_ref() else {
            return Ok(());
        };
        let ticket = loaded.ticket;
        let duration_secs = loaded.narration.duration_secs();
        let position_secs = self.observers.snapshot().position_secs;

        match self
            .sink
            .start(ticket, Duration::from_secs_f64(position_secs))
        {
            Ok(()) => {
                inner.phase = SessionPhase::Playing;
                drop(inner);
                self.observers.publish_snapshot(PlaybackSnapshot {
                    is_playing: true,
                    position_secs,
                    duration_secs,
                });
                self.observers
                    .emit(SessionEvent::Started { position_secs });
                Ok(())
            }
            Err(err) => {
                // Phase never left Paused; the handle stays valid for retry.
                drop(inner);
                let err = SessionError::PlaybackStart(err.to_string());
                warn!(error = %err, "device rejected playback start");
                self.observers.emit(SessionEvent::Error {
                    message: err.to_string(),
                    recoverable: true,
                });
                Err(err)
            }
        }
    }

    /// Pause playback, capturing the current position. No-op unless playing.
    pub fn pause(&self) {
        let mut inner = self.inner.lock();
        if inner.phase != SessionPhase::Playing {
            return;
        }
        let Some(loaded) = inner.loaded.as_ref() else {
            return;
        };
        let ticket = loaded.ticket;
        let duration_secs = loaded.narration.duration_secs();
        let position_secs = match self.sink.position(ticket) {
            Ok(position) => position.as_secs_f64().min(duration_secs),
            Err(_) => self.observers.snapshot().position_secs,
        };
        if let Err(err) = self.sink.pause(ticket) {
            warn!(error = %err, "device pause failed");
        }
        inner.phase = SessionPhase::Paused;
        drop(inner);
        self.observers.publish_snapshot(PlaybackSnapshot {
            is_playing: false,
            position_secs,
            duration_secs,
        });
        self.observers.emit(SessionEvent::Paused { position_secs });
    }

    /// Dispatch to [`Self::play`] or [`Self::pause`] based on the current
    /// playing state.
    pub fn toggle(&self) -> Result<(), SessionError> {
        let playing = self.inner.lock().phase == SessionPhase::Playing;
        if playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Move the playback position.
    ///
    /// Targets are clamped to `[0, duration]`; the play/pause state is never
    /// changed. No-op while idle or loading.
    pub fn seek(&self, target_secs: f64) {
        let inner = self.inner.lock();
        let Some(loaded) = inner.loaded.as_ref() else {
            debug!("seek ignored: no narration loaded");
            return;
        };
        let ticket = loaded.ticket;
        let duration_secs = loaded.narration.duration_secs();
        let is_playing = inner.phase == SessionPhase::Playing;
        // max-then-min also maps a NaN target to 0.
        let position_secs = target_secs.max(0.0).min(duration_secs);
        if let Err(err) = self
            .sink
            .set_position(ticket, Duration::from_secs_f64(position_secs))
        {
            warn!(error = %err, "device seek failed");
        }
        drop(inner);
        self.observers.publish_snapshot(PlaybackSnapshot {
            is_playing,
            position_secs,
            duration_secs,
        });
        self.observers
            .emit(SessionEvent::SeekApplied { position_secs });
    }

    /// Release the current narration and reset to idle.
    ///
    /// Cancels any in-flight load and the position ticker. Idempotent:
    /// stopping an already-idle session does nothing.
    pub fn stop(&self) {
        let mut inner = self.inner.lock();
        if inner.phase == SessionPhase::Idle && inner.loaded.is_none() {
            return;
        }
        teardown(&mut inner, self.sink.as_ref(), &self.observers);
        drop(inner);
        self.observers.emit(SessionEvent::Stopped);
    }

    /// Dispose of the session: stop playback, release everything, and refuse
    /// further `load`/`play` calls. Run automatically on `Drop`.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        if inner.closed {
            return;
        }
        inner.closed = true;
        let had_resource = inner.loaded.is_some() || inner.phase != SessionPhase::Idle;
        teardown(&mut inner, self.sink.as_ref(), &self.observers);
        drop(inner);
        if had_resource {
            self.observers.emit(SessionEvent::Stopped);
        }
        debug!("session closed");
    }

    async fn retrieve(&self, url: &str) -> Result<StagedAudio, SessionError> {
        let request = HttpRequest::get(url).timeout(self.fetch_timeout);
        let bytes =
            self.http
                .get_bytes(request)
                .await
                .map_err(|err| SessionError::Retrieval {
                    url: url.to_string(),
                    message: err.to_string(),
                })?;
        Ok(StagedAudio::new(url, bytes))
    }

    /// Resolve a failed load: superseded failures are swallowed, current
    /// ones reset the session to idle and propagate.
    fn fail_load(
        &self,
        generation: u64,
        url: &str,
        err: SessionError,
    ) -> Result<(), SessionError> {
        {
            let mut inner = self.inner.lock();
            if inner.generation != generation || inner.closed {
                debug!(url, error = %err, "superseded load failed after the fact; ignoring");
                return Ok(());
            }
            inner.phase = SessionPhase::Idle;
        }
        self.observers.publish_snapshot(PlaybackSnapshot::cleared());
        warn!(url, error = %err, "narration load failed");
        self.observers.emit(SessionEvent::Error {
            message: err.to_string(),
            recoverable: err.is_transient(),
        });
        Err(err)
    }

    /// Spawn the position ticker for a freshly loaded narration.
    ///
    /// The task emits position updates on the configured cadence while
    /// playing and detects natural end of media. It exits when cancelled,
    /// when its generation goes stale, or after completing the narration.
    fn spawn_ticker(&self, generation: u64, token: CancellationToken) {
        let inner = Arc::clone(&self.inner);
        let sink = Arc::clone(&self.sink);
        let observers = Arc::clone(&self.observers);
        let interval = self.tick_interval;
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of an interval resolves immediately.
            ticks.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = ticks.tick() => {}
                }
                let mut guard = inner.lock();
                if guard.generation != generation {
                    return;
                }
                let Some(loaded) = guard.loaded.as_ref() else {
                    return;
                };
                if guard.phase != SessionPhase::Playing {
                    continue;
                }
                let ticket = loaded.ticket;
                let duration = loaded.narration.duration;
                let duration_secs = duration.as_secs_f64();
                let completed = matches!(sink.state(ticket), Ok(SinkState::Completed));
                let position = sink.position(ticket).unwrap_or(duration);
                if completed || position >= duration {
                    finish_playback(&mut guard, sink.as_ref(), &observers);
                    return;
                }
                // Publish while still holding the lock so a racing stop()
                // cannot interleave a cleared snapshot before this one.
                let position_secs = position.as_secs_f64().min(duration_secs);
                observers.publish_snapshot(PlaybackSnapshot {
                    is_playing: true,
                    position_secs,
                    duration_secs,
                });
                observers.emit(SessionEvent::PositionChanged {
                    position_secs,
                    duration_secs,
                });
            }
        });
    }
}

impl Drop for AudioSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for AudioSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("AudioSession")
            .field("phase", &inner.phase)
            .field("generation", &inner.generation)
            .field("loaded", &inner.loaded.is_some())
            .field("closed", &inner.closed)
            .finish()
    }
}

/// Release whatever the session currently holds and reset to idle.
///
/// Bumping the generation is what cancels in-flight loads: their next
/// resumption-point check sees the mismatch and they discard themselves.
fn teardown(inner: &mut SessionInner, sink: &dyn PlaybackSink, observers: &SessionObservers) {
    inner.generation = inner.generation.wrapping_add(1);
    if let Some(token) = inner.ticker.take() {
        token.cancel();
    }
    if let Some(loaded) = inner.loaded.take() {
        if let Err(err) = sink.release(loaded.ticket) {
            warn!(error = %err, "device release failed");
        }
        debug!(ticket = %loaded.ticket, "narration handle released");
        // loaded.narration, and the bytes staged into it, drop here
    }
    inner.phase = SessionPhase::Idle;
    observers.publish_snapshot(PlaybackSnapshot::cleared());
}

/// Natural end of media: the same release sequence as `stop`, plus the
/// completion event. The caller already holds the lock and verified the
/// generation, so this fires exactly once per narration.
fn finish_playback(
    inner: &mut SessionInner,
    sink: &dyn PlaybackSink,
    observers: &SessionObservers,
) {
    teardown(inner, sink, observers);
    observers.emit(SessionEvent::Completed);
    info!("narration playback completed");
}
