use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub type FetchId = u64;

/// Fixed request stages reported for UI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Checkpoint {
    Preparing,
    Sending,
    Received,
    Processed,
}

impl Checkpoint {
    pub fn percent(self) -> u8 {
        match self {
            Checkpoint::Preparing => 25,
            Checkpoint::Sending => 50,
            Checkpoint::Received => 75,
            Checkpoint::Processed => 100,
        }
    }
}

/// One recommendation as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuggestionRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub prep_time: Option<String>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub difficulty: Option<u8>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub mood_tags: Vec<String>,
    #[serde(default)]
    pub dietary_tags: Vec<String>,
    #[serde(default)]
    pub is_favorited: bool,
}

/// Parameters for one provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    /// Meal-type filter as sent on the wire (`all`, `dinner`, ...).
    pub meal_type: String,
    pub user_id: Option<String>,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress {
        fetch_id: FetchId,
        checkpoint: Checkpoint,
    },
    BatchReady {
        fetch_id: FetchId,
        records: Vec<SuggestionRecord>,
    },
    FetchFailed {
        fetch_id: FetchId,
        error: ProviderError,
    },
    FetchTimedOut {
        fetch_id: FetchId,
    },
    AdvanceDue {
        item_id: String,
    },
    FavoriteSaved {
        item_id: String,
        favorited: bool,
    },
    FavoriteFailed {
        item_id: String,
        favorited: bool,
        error: StoreError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("invalid provider url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("fixture unavailable: {0}")]
    Fixture(String),
    #[error("request cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("invalid store url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine: {0}")]
    Start(#[from] std::io::Error),
    #[error("engine thread is gone")]
    Disconnected,
}

/// How a single supervised fetch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResolution {
    Ready(Vec<SuggestionRecord>),
    Failed(ProviderError),
    TimedOut,
    /// Superseded or revoked; nothing is reported.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Watchdog armed alongside every fetch.
    pub fetch_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Checkpoint::Preparing => write!(f, "preparing"),
            Checkpoint::Sending => write!(f, "sending"),
            Checkpoint::Received => write!(f, "received"),
            Checkpoint::Processed => write!(f, "processed"),
        }
    }
}
