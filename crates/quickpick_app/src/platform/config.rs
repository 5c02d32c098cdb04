use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::LevelFilter;
use quickpick_core::{GestureConfig, MealFilter, SessionConfig, VisibilityPolicy};
use quickpick_engine::EngineConfig;
use serde::Deserialize;
use thiserror::Error;

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "quickpick.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum ProviderSource {
    Http { base_url: String },
    Fixture { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum FavoriteTarget {
    Http { base_url: String },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum VisibilityMode {
    ReconcileOnShow,
    CancelOnHide,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    pub swipe_threshold: f32,
    pub velocity_threshold: f32,
    pub double_tap_window_ms: i64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        let defaults = GestureConfig::default();
        Self {
            swipe_threshold: defaults.swipe_threshold,
            velocity_threshold: defaults.velocity_threshold,
            double_tap_window_ms: defaults.double_tap_window_ms,
        }
    }
}

/// On-disk configuration (RON).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ProviderSource,
    pub favorites: FavoriteTarget,
    pub user_id: Option<String>,
    pub initial_filter: String,
    pub batch_size: usize,
    pub connect_timeout_ms: u64,
    pub fetch_timeout_ms: u64,
    pub advance_delay_ms: u64,
    pub stuck_after_ms: u64,
    pub visibility: VisibilityMode,
    pub rollback_favorite_on_failure: bool,
    pub gesture: GestureSettings,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderSource::Http {
                base_url: "http://localhost:8080/api".to_string(),
            },
            favorites: FavoriteTarget::Memory,
            user_id: None,
            initial_filter: MealFilter::All.to_string(),
            batch_size: 20,
            connect_timeout_ms: 3_000,
            fetch_timeout_ms: 10_000,
            advance_delay_ms: 1_000,
            stuck_after_ms: 10_000,
            visibility: VisibilityMode::ReconcileOnShow,
            rollback_favorite_on_failure: false,
            gesture: GestureSettings::default(),
            log_destination: LogDestination::default(),
            log_file: PathBuf::from("quickpick.log"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn initial_filter(&self) -> Result<MealFilter, ConfigError> {
        self.initial_filter.parse().map_err(ConfigError::Invalid)
    }

    pub fn log_level(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("unknown log level {}", self.log_level)))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be positive".into()));
        }
        Ok(SessionConfig {
            user_id: self.user_id.clone(),
            batch_size: self.batch_size,
            advance_delay: Duration::from_millis(self.advance_delay_ms),
            stuck_after: Duration::from_millis(self.stuck_after_ms),
            visibility_policy: match self.visibility {
                VisibilityMode::ReconcileOnShow => VisibilityPolicy::ReconcileOnShow,
                VisibilityMode::CancelOnHide => VisibilityPolicy::CancelOnHide,
            },
            rollback_favorite_on_failure: self.rollback_favorite_on_failure,
            gesture: GestureConfig {
                swipe_threshold: self.gesture.swipe_threshold,
                velocity_threshold: self.gesture.velocity_threshold,
                double_tap_window_ms: self.gesture.double_tap_window_ms,
                ..GestureConfig::default()
            },
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
        }
    }
}

/// Reads the config at `path`; a missing file yields the defaults.
pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}
