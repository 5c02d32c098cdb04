//! Quickpick engine: provider and favorite IO, fetch supervision and timers.
mod engine;
mod favorites;
mod provider;
mod supervisor;
mod types;

pub use engine::EngineHandle;
pub use favorites::{FavoriteStore, HttpFavoriteStore, MemoryFavoriteStore};
pub use provider::{
    ChannelProgressSink, FixtureProvider, HttpRecommendationProvider, ProgressSink,
    RecommendationProvider,
};
pub use supervisor::FetchSupervisor;
pub use types::{
    BatchRequest, Checkpoint, EngineConfig, EngineError, EngineEvent, FetchId, FetchResolution,
    ProviderError, StoreError, SuggestionRecord,
};
