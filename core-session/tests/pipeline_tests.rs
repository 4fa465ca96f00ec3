//! Tests for the briefing pipeline orchestration.

mod support;

use bridge_traits::error::BridgeError;
use core_session::{
    ArticleSummary, BriefingPipeline, Narration, NarrationSource, SessionError,
};
use mockall::mock;
use mockall::predicate::eq;
use std::sync::Arc;
use support::{harness, narration_payload};

mock! {
    pub Source {}

    #[async_trait::async_trait]
    impl NarrationSource for Source {
        async fn daily_briefing(
            &self,
            article_count: usize,
        ) -> bridge_traits::error::Result<Narration>;
        async fn deep_dive(
            &self,
            article_title: &str,
        ) -> bridge_traits::error::Result<Narration>;
    }
}

fn sample_articles(count: usize) -> Vec<ArticleSummary> {
    (0..count)
        .map(|i| ArticleSummary {
            title: format!("Article {i}"),
            description: format!("Summary of article {i}"),
            url: Some(format!("https://news.example/{i}")),
            source_name: Some("Example Wire".to_string()),
        })
        .collect()
}

#[tokio::test]
async fn briefing_resolves_loads_and_plays() {
    let h = harness();
    let speech = "https://x/briefing.mp3";
    h.http.serve(speech, narration_payload(180.0));

    let mut source = MockSource::new();
    source
        .expect_daily_briefing()
        .with(eq(5))
        .times(1)
        .returning(move |_| {
            Ok(Narration {
                speech_url: Some(speech.to_string()),
                script: Some("Good morning.".to_string()),
                articles: sample_articles(5),
            })
        });

    let pipeline = BriefingPipeline::new(Arc::new(source), h.session.clone());
    let narration = pipeline.play_briefing(5).await.unwrap();

    assert_eq!(narration.articles.len(), 5);
    let snapshot = h.session.snapshot();
    assert!(snapshot.is_playing);
    assert_eq!(snapshot.duration_secs, 180.0);

    let status = pipeline.status();
    assert!(!status.busy);
    assert!(status.last_error.is_none());
}

#[tokio::test]
async fn source_failure_is_recorded_and_session_stays_idle() {
    let h = harness();

    let mut source = MockSource::new();
    source
        .expect_daily_briefing()
        .times(1)
        .returning(|_| Err(BridgeError::Network("backend unreachable".to_string())));

    let pipeline = BriefingPipeline::new(Arc::new(source), h.session.clone());
    let err = pipeline.play_briefing(5).await.unwrap_err();

    assert!(matches!(err, SessionError::Source(_)));
    assert!(h.session.snapshot().is_cleared());
    let status = pipeline.status();
    assert!(!status.busy);
    assert!(status.last_error.unwrap().contains("backend unreachable"));
}

#[tokio::test]
async fn deep_dive_requires_a_title() {
    let h = harness();
    let source = MockSource::new(); // no expectations: the backend is never hit

    let pipeline = BriefingPipeline::new(Arc::new(source), h.session.clone());
    let err = pipeline.play_deep_dive("   ").await.unwrap_err();

    assert!(matches!(err, SessionError::NoArticleSelected));
    assert!(h.session.snapshot().is_cleared());
}

#[tokio::test]
async fn deep_dive_load_failure_stops_the_session() {
    let h = harness();
    let speech = "https://x/dive.mp3";
    h.http.serve_status(speech, 404);

    let mut source = MockSource::new();
    source
        .expect_deep_dive()
        .withf(|title| title == "Quantum batteries")
        .times(1)
        .returning(move |_| {
            Ok(Narration {
                speech_url: Some(speech.to_string()),
                script: Some("Today we dig into...".to_string()),
                articles: Vec::new(),
            })
        });

    let pipeline = BriefingPipeline::new(Arc::new(source), h.session.clone());
    let err = pipeline.play_deep_dive("Quantum batteries").await.unwrap_err();

    assert!(matches!(err, SessionError::Retrieval { .. }));
    assert!(h.session.snapshot().is_cleared());
    assert_eq!(h.sink.live(), 0);
    assert!(pipeline.status().last_error.is_some());
}

#[tokio::test]
async fn narration_without_speech_leaves_session_untouched() {
    let h = harness();

    let mut source = MockSource::new();
    source.expect_deep_dive().times(1).returning(|_| {
        Ok(Narration {
            speech_url: None,
            script: Some("Text-only deep dive.".to_string()),
            articles: Vec::new(),
        })
    });

    let pipeline = BriefingPipeline::new(Arc::new(source), h.session.clone());
    let narration = pipeline.play_deep_dive("Budget talks").await.unwrap();

    assert_eq!(narration.script.as_deref(), Some("Text-only deep dive."));
    assert!(h.session.snapshot().is_cleared());
    assert!(pipeline.status().last_error.is_none());
}
