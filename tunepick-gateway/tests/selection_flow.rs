//! End-to-end selection flow: real HTTP catalog and fetcher, manual clock.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use tunepick_gateway::deterministic_messages::selection as messages;
use tunepick_gateway::selection::ManualClock;
use tunepick_gateway::{
    EngineOptions, HttpMediaFetcher, NeteaseCatalogClient, Outcome, ScopeKey, SelectionEngine,
    SelectionError, SessionStore,
};

use common::RecordingOutbound;

const TTL: Duration = Duration::from_secs(60);

struct Flow {
    engine: SelectionEngine,
    clock: Arc<ManualClock>,
    dir: tempfile::TempDir,
    _server: tokio::task::JoinHandle<()>,
}

async fn flow(fetch_timeout: Duration) -> Flow {
    let (base, server) = common::start_server().await;
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(Utc::now()));

    let catalog =
        NeteaseCatalogClient::new(&base, None, Duration::from_secs(5), Duration::from_secs(5))
            .unwrap();
    let fetcher = HttpMediaFetcher::new(fetch_timeout, 1 << 20, dir.path().to_path_buf()).unwrap();
    let store = SessionStore::new(TTL, clock.clone());
    let options = EngineOptions {
        image_list: false,
        ..EngineOptions::default()
    };

    Flow {
        engine: SelectionEngine::new(Arc::new(catalog), Arc::new(fetcher), Arc::new(store), options),
        clock,
        dir,
        _server: server,
    }
}

fn scope() -> ScopeKey {
    ScopeKey::new("guild-1/alice")
}

#[tokio::test]
async fn test_search_then_pick_delivers_once() {
    let f = flow(Duration::from_secs(5)).await;
    let out = RecordingOutbound::default();

    let listed = f.engine.handle(&scope(), "alice", "/song Sunny Day", &out).await;
    assert_eq!(listed, Outcome::Listed { count: 3 });
    let list = &out.texts()[0];
    assert!(list.starts_with("Results for \"Sunny Day\":"));
    assert!(list.contains("1. Sunny Day - Jay Chou [Yeh Hui-Mei] (4:29)"));
    assert!(list.ends_with("Reply with a number from 1 to 3 within 60 seconds."));

    let picked = f.engine.handle(&scope(), "alice", "2", &out).await;
    match picked {
        Outcome::Delivered { track } => assert_eq!(track.id, "102"),
        other => panic!("unexpected outcome: {other:?}"),
    }

    let voices = out.voices();
    assert_eq!(voices.len(), 1);
    assert!(voices[0].existed);
    assert_eq!(voices[0].len, common::AUDIO_SIZE as u64);
    assert_eq!(common::dir_entries(f.dir.path()), 0);
    assert!(f.engine.store().is_empty().await);

    let again = f.engine.handle(&scope(), "alice", "2", &out).await;
    assert_eq!(again, Outcome::Rejected(SelectionError::NoSession));
    assert_eq!(out.voices().len(), 1);
}

#[tokio::test]
async fn test_out_of_range_then_valid_pick() {
    let f = flow(Duration::from_secs(5)).await;
    let out = RecordingOutbound::default();
    f.engine.handle(&scope(), "alice", "/song Sunny Day", &out).await;

    let bad = f.engine.handle(&scope(), "alice", "5", &out).await;
    assert_eq!(bad, Outcome::Rejected(SelectionError::IndexOutOfRange { len: 3 }));
    assert_eq!(out.texts().last().unwrap(), &messages::index_out_of_range(3));

    let good = f.engine.handle(&scope(), "alice", "3", &out).await;
    assert!(matches!(good, Outcome::Delivered { .. }));
}

#[tokio::test]
async fn test_pick_after_ttl_is_expired() {
    let f = flow(Duration::from_secs(5)).await;
    let out = RecordingOutbound::default();
    f.engine.handle(&scope(), "alice", "/song Sunny Day", &out).await;

    f.clock.advance(TTL + Duration::from_secs(1));
    let outcome = f.engine.handle(&scope(), "alice", "1", &out).await;

    assert_eq!(outcome, Outcome::Rejected(SelectionError::SessionExpired));
    assert_eq!(out.texts().last().unwrap(), messages::SESSION_EXPIRED);
    assert!(f.engine.store().is_empty().await);
    assert!(out.voices().is_empty());
}

#[tokio::test]
async fn test_empty_keyword_creates_no_session() {
    let f = flow(Duration::from_secs(5)).await;
    let out = RecordingOutbound::default();

    let outcome = f.engine.handle(&scope(), "alice", "/song", &out).await;

    assert_eq!(outcome, Outcome::Rejected(SelectionError::EmptyKeyword));
    assert!(f.engine.store().is_empty().await);
}

#[tokio::test]
async fn test_fetch_timeout_purges_and_cleans_up() {
    let f = flow(Duration::from_millis(200)).await;
    let out = RecordingOutbound::default();
    f.engine.handle(&scope(), "alice", "/song slow", &out).await;

    let outcome = f.engine.handle(&scope(), "alice", "1", &out).await;

    assert_eq!(outcome, Outcome::Rejected(SelectionError::FetchFailed));
    assert_eq!(out.texts().last().unwrap(), messages::FETCH_FAILED);
    assert!(f.engine.store().is_empty().await);
    assert_eq!(common::dir_entries(f.dir.path()), 0);
}

#[tokio::test]
async fn test_resolve_failure_purges_session() {
    let f = flow(Duration::from_secs(5)).await;
    let out = RecordingOutbound::default();
    f.engine.handle(&scope(), "alice", "/song missing", &out).await;

    let outcome = f.engine.handle(&scope(), "alice", "1", &out).await;

    assert_eq!(outcome, Outcome::Rejected(SelectionError::ResolveFailed));
    assert!(f.engine.store().is_empty().await);
    assert_eq!(common::dir_entries(f.dir.path()), 0);
}

#[tokio::test]
async fn test_failed_delivery_still_cleans_up() {
    let f = flow(Duration::from_secs(5)).await;
    let out = RecordingOutbound {
        fail_voice: true,
        ..RecordingOutbound::default()
    };
    f.engine.handle(&scope(), "alice", "/song Sunny Day", &out).await;

    let outcome = f.engine.handle(&scope(), "alice", "1", &out).await;

    assert_eq!(outcome, Outcome::Rejected(SelectionError::DeliveryFailed));
    assert!(out.voices()[0].existed);
    assert!(f.engine.store().is_empty().await);
    assert_eq!(common::dir_entries(f.dir.path()), 0);
}

#[tokio::test]
async fn test_catalog_outage_is_reported() {
    let f = flow(Duration::from_secs(5)).await;
    let out = RecordingOutbound::default();

    let outcome = f.engine.handle(&scope(), "alice", "/song boom", &out).await;

    assert_eq!(outcome, Outcome::Rejected(SelectionError::SearchFailed));
    assert_eq!(out.texts(), vec![messages::SEARCH_FAILED.to_string()]);
}

#[tokio::test]
async fn test_no_results_reply() {
    let f = flow(Duration::from_secs(5)).await;
    let out = RecordingOutbound::default();

    let outcome = f.engine.handle(&scope(), "alice", "song nothing", &out).await;

    assert_eq!(outcome, Outcome::Rejected(SelectionError::NoResults));
    assert_eq!(out.texts(), vec![messages::no_results("nothing")]);
    assert!(f.engine.store().is_empty().await);
}
