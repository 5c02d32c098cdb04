use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use quickpick_engine::{
    BatchRequest, Checkpoint, HttpRecommendationProvider, ProgressSink, ProviderError,
    RecommendationProvider, SuggestionRecord,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    checkpoints: Arc<Mutex<Vec<Checkpoint>>>,
}

impl TestSink {
    fn take(&self) -> Vec<Checkpoint> {
        self.checkpoints.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn checkpoint(&self, checkpoint: Checkpoint) {
        self.checkpoints.lock().unwrap().push(checkpoint);
    }
}

fn request(meal_type: &str) -> BatchRequest {
    BatchRequest {
        meal_type: meal_type.to_string(),
        user_id: Some("user-1".to_string()),
        limit: 2,
    }
}

fn provider(server: &MockServer) -> HttpRecommendationProvider {
    HttpRecommendationProvider::new(&format!("{}/api", server.uri()), Duration::from_secs(2))
        .expect("valid base url")
}

#[tokio::test]
async fn fetches_batch_with_filter_and_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/suggestions"))
        .and(query_param("meal_type", "dinner"))
        .and(query_param("limit", "2"))
        .and(query_param("user_id", "user-1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"[
                {"id": "r1", "name": "Ramen", "difficulty": 3, "mood_tags": ["cozy"]},
                {"id": "r2", "name": "Tacos", "is_favorited": true}
            ]"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let sink = TestSink::default();
    let records = provider(&server)
        .fetch_batch(&request("dinner"), &CancellationToken::new(), &sink)
        .await
        .expect("fetch ok");

    assert_eq!(records.len(), 2);
    assert_eq!(
        records[0],
        SuggestionRecord {
            id: "r1".to_string(),
            name: "Ramen".to_string(),
            description: None,
            image_url: None,
            prep_time: None,
            servings: None,
            difficulty: Some(3),
            cuisine: None,
            meal_type: None,
            mood_tags: vec!["cozy".to_string()],
            dietary_tags: Vec::new(),
            is_favorited: false,
        }
    );
    assert!(records[1].is_favorited);
    assert_eq!(sink.take(), vec![Checkpoint::Sending, Checkpoint::Received]);
}

#[tokio::test]
async fn empty_array_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/suggestions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
        .mount(&server)
        .await;

    let records = provider(&server)
        .fetch_batch(&request("all"), &CancellationToken::new(), &TestSink::default())
        .await
        .expect("fetch ok");
    assert!(records.is_empty());
}

#[tokio::test]
async fn http_failure_maps_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/suggestions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch_batch(&request("all"), &CancellationToken::new(), &TestSink::default())
        .await
        .unwrap_err();
    assert_eq!(err, ProviderError::HttpStatus(503));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/suggestions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch_batch(&request("all"), &CancellationToken::new(), &TestSink::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Decode(_)));
}

#[tokio::test]
async fn cancelled_token_aborts_slow_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/suggestions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_raw("[]", "application/json"),
        )
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let err = provider(&server)
        .fetch_batch(&request("all"), &token, &TestSink::default())
        .await
        .unwrap_err();
    assert_eq!(err, ProviderError::Cancelled);
}

#[test]
fn rejects_invalid_base_url() {
    let err = HttpRecommendationProvider::new("not a url", Duration::from_secs(1)).unwrap_err();
    assert!(matches!(err, ProviderError::InvalidUrl(_)));
}
