use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use mockall::mock;
use quickpick_engine::{
    BatchRequest, EngineConfig, EngineEvent, EngineHandle, FavoriteStore, FixtureProvider,
    MemoryFavoriteStore, ProgressSink, ProviderError, RecommendationProvider, StoreError,
    SuggestionRecord,
};
use tokio_util::sync::CancellationToken;

mock! {
    pub Store {}

    #[async_trait::async_trait]
    impl FavoriteStore for Store {
        async fn set_favorite(
            &self,
            user_id: &str,
            item_id: &str,
            favorited: bool,
        ) -> Result<(), StoreError>;
    }
}

/// Dessert requests are slow, everything else is fast.
struct SplitLatencyProvider;

#[async_trait::async_trait]
impl RecommendationProvider for SplitLatencyProvider {
    async fn fetch_batch(
        &self,
        request: &BatchRequest,
        cancel: &CancellationToken,
        _progress: &dyn ProgressSink,
    ) -> Result<Vec<SuggestionRecord>, ProviderError> {
        let delay = if request.meal_type == "dessert" {
            Duration::from_millis(400)
        } else {
            Duration::from_millis(20)
        };
        tokio::select! {
            _ = cancel.cancelled() => Err(ProviderError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(vec![record(&request.meal_type)]),
        }
    }
}

fn record(id: &str) -> SuggestionRecord {
    SuggestionRecord {
        id: id.to_string(),
        name: id.to_string(),
        description: None,
        image_url: None,
        prep_time: None,
        servings: None,
        difficulty: None,
        cuisine: None,
        meal_type: None,
        mood_tags: Vec::new(),
        dietary_tags: Vec::new(),
        is_favorited: false,
    }
}

fn request(meal_type: &str) -> BatchRequest {
    BatchRequest {
        meal_type: meal_type.to_string(),
        user_id: None,
        limit: 10,
    }
}

fn drain_for(engine: &EngineHandle, window: Duration) -> Vec<EngineEvent> {
    let deadline = Instant::now() + window;
    let mut events = Vec::new();
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        match engine.recv_timeout(remaining) {
            Some(event) => events.push(event),
            None => break,
        }
    }
    events
}

#[test]
fn superseded_fetch_never_reports() {
    quickpick_logging::initialize_for_tests();
    let engine = EngineHandle::new(
        EngineConfig::default(),
        Arc::new(SplitLatencyProvider),
        Arc::new(MemoryFavoriteStore::new()),
    )
    .unwrap();

    engine.start_fetch(1, request("dessert")).unwrap();
    engine.start_fetch(2, request("breakfast")).unwrap();

    let events = drain_for(&engine, Duration::from_millis(800));
    let ready: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::BatchReady { fetch_id, records } => Some((*fetch_id, records.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(ready, vec![(2, vec![record("breakfast")])]);
    assert!(events.iter().all(|event| !matches!(
        event,
        EngineEvent::FetchFailed { fetch_id: 1, .. } | EngineEvent::FetchTimedOut { fetch_id: 1 }
    )));
    assert_eq!(engine.live_fetches(), 0);
}

#[test]
fn explicit_cancel_silences_fetch() {
    let engine = EngineHandle::new(
        EngineConfig::default(),
        Arc::new(SplitLatencyProvider),
        Arc::new(MemoryFavoriteStore::new()),
    )
    .unwrap();

    engine.start_fetch(5, request("dessert")).unwrap();
    engine.cancel_fetch(5).unwrap();

    let events = drain_for(&engine, Duration::from_millis(600));
    assert!(events.iter().all(|event| !matches!(
        event,
        EngineEvent::BatchReady { .. } | EngineEvent::FetchTimedOut { .. }
    )));
}

#[test]
fn timeout_is_reported_as_event() {
    let config = EngineConfig {
        fetch_timeout: Duration::from_millis(50),
    };
    let engine = EngineHandle::new(
        config,
        Arc::new(SplitLatencyProvider),
        Arc::new(MemoryFavoriteStore::new()),
    )
    .unwrap();

    engine.start_fetch(3, request("dessert")).unwrap();
    let events = drain_for(&engine, Duration::from_millis(700));
    assert!(events.contains(&EngineEvent::FetchTimedOut { fetch_id: 3 }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, EngineEvent::BatchReady { .. })));
}

#[test]
fn advance_timer_fires_after_delay() {
    let engine = EngineHandle::new(
        EngineConfig::default(),
        Arc::new(FixtureProvider::default()),
        Arc::new(MemoryFavoriteStore::new()),
    )
    .unwrap();

    let started = Instant::now();
    engine
        .schedule_advance("dish-1", Duration::from_millis(100))
        .unwrap();
    let event = engine.recv_timeout(Duration::from_secs(2));
    assert_eq!(
        event,
        Some(EngineEvent::AdvanceDue {
            item_id: "dish-1".to_string()
        })
    );
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[test]
fn favorite_failure_is_reported_not_retried() {
    let mut store = MockStore::new();
    store
        .expect_set_favorite()
        .withf(|user, item, favorited| user == "u1" && item == "dish-1" && *favorited)
        .times(1)
        .returning(|_, _, _| Err(StoreError::HttpStatus(500)));

    let engine = EngineHandle::new(
        EngineConfig::default(),
        Arc::new(FixtureProvider::default()),
        Arc::new(store),
    )
    .unwrap();

    engine.set_favorite("u1", "dish-1", true).unwrap();
    let event = engine.recv_timeout(Duration::from_secs(2));
    assert_eq!(
        event,
        Some(EngineEvent::FavoriteFailed {
            item_id: "dish-1".to_string(),
            favorited: true,
            error: StoreError::HttpStatus(500),
        })
    );
    assert_eq!(engine.recv_timeout(Duration::from_millis(100)), None);
}

#[test]
fn fixture_provider_loads_records_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"id": "a", "name": "Pancakes", "meal_type": "breakfast"}},
            {{"id": "b", "name": "Brownie", "meal_type": "dessert"}}]"#
    )
    .unwrap();

    let provider = FixtureProvider::from_path(file.path()).unwrap();
    let engine = EngineHandle::new(
        EngineConfig::default(),
        Arc::new(provider),
        Arc::new(MemoryFavoriteStore::new()),
    )
    .unwrap();

    engine.start_fetch(1, request("dessert")).unwrap();
    let ready = drain_for(&engine, Duration::from_millis(500))
        .into_iter()
        .find_map(|event| match event {
            EngineEvent::BatchReady { records, .. } => Some(records),
            _ => None,
        })
        .expect("batch ready");
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].name, "Brownie");
}
