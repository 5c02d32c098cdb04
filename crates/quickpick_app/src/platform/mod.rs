mod app;
mod config;
mod effects;
mod logging;
mod ui;

use quickpick_engine::{EngineError, ProviderError, StoreError};
use thiserror::Error;

pub use app::run_app;
pub use config::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("recommendation provider: {0}")]
    Provider(#[from] ProviderError),
    #[error("favorite store: {0}")]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
