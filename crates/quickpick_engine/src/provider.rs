use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use quickpick_logging::qp_debug;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{BatchRequest, Checkpoint, EngineEvent, FetchId, ProviderError, SuggestionRecord};

/// Receives stage checkpoints for one fetch attempt.
pub trait ProgressSink: Send + Sync {
    fn checkpoint(&self, checkpoint: Checkpoint);
}

/// Forwards checkpoints to the engine event channel until the attempt is cancelled.
pub struct ChannelProgressSink {
    fetch_id: FetchId,
    token: CancellationToken,
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(fetch_id: FetchId, token: CancellationToken, tx: mpsc::Sender<EngineEvent>) -> Self {
        Self {
            fetch_id,
            token,
            tx,
        }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn checkpoint(&self, checkpoint: Checkpoint) {
        if self.token.is_cancelled() {
            return;
        }
        let _ = self.tx.send(EngineEvent::Progress {
            fetch_id: self.fetch_id,
            checkpoint,
        });
    }
}

/// Source of suggestion batches. Implementations should stop work once
/// `cancel` fires and report `ProviderError::Cancelled`.
#[async_trait::async_trait]
pub trait RecommendationProvider: Send + Sync {
    async fn fetch_batch(
        &self,
        request: &BatchRequest,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<SuggestionRecord>, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct HttpRecommendationProvider {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpRecommendationProvider {
    pub fn new(base_url: &str, connect_timeout: Duration) -> Result<Self, ProviderError> {
        let base_url = parse_base_url(base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|err| ProviderError::Network(err.to_string()))?;
        Ok(Self { base_url, client })
    }

    fn request_url(&self, request: &BatchRequest) -> Result<Url, ProviderError> {
        let mut url = self
            .base_url
            .join("suggestions")
            .map_err(|err| ProviderError::InvalidUrl(err.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("meal_type", &request.meal_type);
            query.append_pair("limit", &request.limit.to_string());
            if let Some(user_id) = request.user_id.as_deref() {
                query.append_pair("user_id", user_id);
            }
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl RecommendationProvider for HttpRecommendationProvider {
    async fn fetch_batch(
        &self,
        request: &BatchRequest,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<SuggestionRecord>, ProviderError> {
        let url = self.request_url(request)?;
        qp_debug!("GET {}", url);

        progress.checkpoint(Checkpoint::Sending);
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            result = self.client.get(url).send() => result.map_err(map_reqwest_error)?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::HttpStatus(status.as_u16()));
        }

        let body = tokio::select! {
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            result = response.bytes() => result.map_err(map_reqwest_error)?,
        };
        progress.checkpoint(Checkpoint::Received);

        serde_json::from_slice(&body).map_err(|err| ProviderError::Decode(err.to_string()))
    }
}

/// Serves batches from a fixed record list, filtered by meal type.
#[derive(Debug, Clone, Default)]
pub struct FixtureProvider {
    records: Vec<SuggestionRecord>,
    delay: Duration,
}

impl FixtureProvider {
    pub fn new(records: Vec<SuggestionRecord>) -> Self {
        Self {
            records,
            delay: Duration::ZERO,
        }
    }

    /// Loads a JSON array of records, the same shape the HTTP provider returns.
    pub fn from_path(path: &Path) -> Result<Self, ProviderError> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| ProviderError::Fixture(format!("{}: {err}", path.display())))?;
        let records = serde_json::from_str(&text)
            .map_err(|err| ProviderError::Decode(err.to_string()))?;
        Ok(Self::new(records))
    }

    /// Simulated network latency per fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait::async_trait]
impl RecommendationProvider for FixtureProvider {
    async fn fetch_batch(
        &self,
        request: &BatchRequest,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<SuggestionRecord>, ProviderError> {
        progress.checkpoint(Checkpoint::Sending);
        tokio::select! {
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            _ = tokio::time::sleep(self.delay) => {}
        }
        progress.checkpoint(Checkpoint::Received);

        let wildcard = request.meal_type.eq_ignore_ascii_case("all");
        Ok(self
            .records
            .iter()
            .filter(|record| {
                wildcard
                    || record
                        .meal_type
                        .as_deref()
                        .is_some_and(|meal| meal.eq_ignore_ascii_case(&request.meal_type))
            })
            .take(request.limit)
            .cloned()
            .collect())
    }
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ProviderError> {
    // Without a trailing slash `join` would replace the last path segment.
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|err| ProviderError::InvalidUrl(err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_decode() {
        return ProviderError::Decode(err.to_string());
    }
    ProviderError::Network(err.to_string())
}
