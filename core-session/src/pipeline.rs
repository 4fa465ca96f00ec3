//! # Briefing Pipeline
//!
//! Drives the audio session from the two flows the client offers: "play
//! today's briefing" and "play a deep dive for an article". Both reduce to
//! the same shape: resolve a narration descriptor from the backend source,
//! load its speech URL into the session, start playback, and on any failure
//! stop the session and record the error.
//!
//! The backend itself (request construction, JSON decoding) stays behind
//! the [`NarrationSource`] seam; this module only orchestrates.

use crate::error::SessionError;
use crate::session::AudioSession;
use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use core_runtime::events::BriefingEvent;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// One article covered by a briefing narration.
#[derive(Debug, Clone)]
pub struct ArticleSummary {
    pub title: String,
    pub description: String,
    pub url: Option<String>,
    pub source_name: Option<String>,
}

/// A resolved narration descriptor.
///
/// `speech_url` may be absent: a briefing without generated audio still
/// carries its script and article summaries, and the pipeline then leaves
/// the session untouched.
#[derive(Debug, Clone, Default)]
pub struct Narration {
    pub speech_url: Option<String>,
    pub script: Option<String>,
    pub articles: Vec<ArticleSummary>,
}

/// Backend seam resolving narration descriptors.
///
/// Implementations own the news API mechanics; the pipeline only consumes
/// the resolved descriptor.
#[async_trait]
pub trait NarrationSource: Send + Sync {
    /// Resolve today's briefing narration covering `article_count` articles.
    async fn daily_briefing(&self, article_count: usize) -> BridgeResult<Narration>;

    /// Resolve a deep-dive narration for one article.
    async fn deep_dive(&self, article_title: &str) -> BridgeResult<Narration>;
}

/// Pipeline progress visible to the UI layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStatus {
    /// A resolution is in flight.
    pub busy: bool,
    /// Message of the most recent failure, cleared on the next request.
    pub last_error: Option<String>,
}

/// Orchestrates narration resolution and playback hand-off.
pub struct BriefingPipeline {
    source: Arc<dyn NarrationSource>,
    session: Arc<AudioSession>,
    status_tx: watch::Sender<PipelineStatus>,
}

impl BriefingPipeline {
    pub fn new(source: Arc<dyn NarrationSource>, session: Arc<AudioSession>) -> Self {
        let (status_tx, _) = watch::channel(PipelineStatus::default());
        Self {
            source,
            session,
            status_tx,
        }
    }

    /// Current pipeline status, read synchronously.
    pub fn status(&self) -> PipelineStatus {
        self.status_tx.borrow().clone()
    }

    /// Subscribe to status updates.
    pub fn watch_status(&self) -> watch::Receiver<PipelineStatus> {
        self.status_tx.subscribe()
    }

    /// Resolve and play today's briefing.
    ///
    /// Returns the narration descriptor (script and article summaries) once
    /// playback has started, or once it is clear there is no audio to play.
    pub async fn play_briefing(&self, article_count: usize) -> Result<Narration, SessionError> {
        self.begin("daily-briefing");
        info!(article_count, "resolving daily briefing");
        let narration = match self.source.daily_briefing(article_count).await {
            Ok(narration) => narration,
            Err(err) => return self.fail(SessionError::Source(err.to_string())),
        };
        self.hand_off(narration).await
    }

    /// Resolve and play a deep dive for the given article.
    pub async fn play_deep_dive(&self, article_title: &str) -> Result<Narration, SessionError> {
        if article_title.trim().is_empty() {
            // A deep dive needs a selected article; don't bother the backend.
            return self.fail(SessionError::NoArticleSelected);
        }
        self.begin("deep-dive");
        info!(article_title, "resolving deep dive");
        let narration = match self.source.deep_dive(article_title).await {
            Ok(narration) => narration,
            Err(err) => return self.fail(SessionError::Source(err.to_string())),
        };
        self.hand_off(narration).await
    }

    fn begin(&self, kind: &str) {
        self.status_tx.send_replace(PipelineStatus {
            busy: true,
            last_error: None,
        });
        self.session.observers().emit_briefing(BriefingEvent::Requested {
            kind: kind.to_string(),
        });
    }

    async fn hand_off(&self, narration: Narration) -> Result<Narration, SessionError> {
        if let Some(url) = narration.speech_url.as_deref() {
            if let Err(err) = self.load_and_play(url).await {
                return self.fail(err);
            }
        }
        self.session
            .observers()
            .emit_briefing(BriefingEvent::Resolved {
                article_count: narration.articles.len(),
            });
        self.status_tx.send_replace(PipelineStatus::default());
        Ok(narration)
    }

    async fn load_and_play(&self, url: &str) -> Result<(), SessionError> {
        self.session.load(url).await?;
        self.session.play()
    }

    /// Record a failure and make sure no half-loaded narration lingers.
    fn fail(&self, err: SessionError) -> Result<Narration, SessionError> {
        self.session.stop();
        warn!(error = %err, "briefing pipeline failed");
        self.session.observers().emit_briefing(BriefingEvent::Failed {
            message: err.to_string(),
        });
        self.status_tx.send_replace(PipelineStatus {
            busy: false,
            last_error: Some(err.to_string()),
        });
        Err(err)
    }
}

impl std::fmt::Debug for BriefingPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BriefingPipeline")
            .field("status", &self.status())
            .finish()
    }
}
