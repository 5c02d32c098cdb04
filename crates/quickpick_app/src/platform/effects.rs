use std::sync::Arc;
use std::time::Duration;

use quickpick_core::{Difficulty, Effect, FetchRequest, FetchTicket, Msg, Suggestion};
use quickpick_engine::{
    BatchRequest, EngineEvent, EngineHandle, FavoriteStore, FixtureProvider, HttpFavoriteStore,
    HttpRecommendationProvider, MemoryFavoriteStore, RecommendationProvider, SuggestionRecord,
};
use quickpick_logging::{qp_debug, qp_error, qp_info};

use super::config::{AppConfig, FavoriteTarget, ProviderSource};
use super::AppError;

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let provider: Arc<dyn RecommendationProvider> = match &config.provider {
            ProviderSource::Http { base_url } => {
                qp_info!("Using recommendation provider at {}", base_url);
                Arc::new(HttpRecommendationProvider::new(
                    base_url,
                    config.connect_timeout(),
                )?)
            }
            ProviderSource::Fixture { path } => {
                qp_info!("Using fixture suggestions from {:?}", path);
                Arc::new(FixtureProvider::from_path(path)?)
            }
        };
        let store: Arc<dyn FavoriteStore> = match &config.favorites {
            FavoriteTarget::Http { base_url } => {
                Arc::new(HttpFavoriteStore::new(base_url, config.connect_timeout())?)
            }
            FavoriteTarget::Memory => Arc::new(MemoryFavoriteStore::new()),
        };

        let engine = EngineHandle::new(config.engine_config(), provider, store)?;
        Ok(Self { engine })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            let result = match effect {
                Effect::StartFetch { ticket, request } => {
                    self.engine.start_fetch(ticket.0, batch_request(request))
                }
                Effect::CancelFetch { ticket } => self.engine.cancel_fetch(ticket.0),
                Effect::ScheduleAdvance { item_id, delay } => {
                    self.engine.schedule_advance(item_id, delay)
                }
                Effect::PersistFavorite {
                    user_id,
                    item_id,
                    favorited,
                } => self.engine.set_favorite(user_id, item_id, favorited),
            };
            if let Err(err) = result {
                qp_error!("Engine rejected effect: {}", err);
            }
        }
    }

    /// Next engine event as a message, if one is waiting.
    pub fn poll(&self) -> Option<Msg> {
        self.engine.try_recv().map(map_event)
    }

    /// Like [`poll`](Self::poll), but waits up to `timeout` for an event.
    pub fn wait(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }

    pub fn live_fetches(&self) -> usize {
        self.engine.live_fetches()
    }

    pub fn shutdown(&mut self) {
        self.engine.shutdown();
    }
}

fn batch_request(request: FetchRequest) -> BatchRequest {
    BatchRequest {
        meal_type: request.filter.as_str().to_string(),
        user_id: request.user_id,
        limit: request.limit,
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Progress {
            fetch_id,
            checkpoint,
        } => Msg::FetchProgress {
            ticket: FetchTicket(fetch_id),
            percent: checkpoint.percent(),
        },
        EngineEvent::BatchReady { fetch_id, records } => Msg::FetchSucceeded {
            ticket: FetchTicket(fetch_id),
            items: records.into_iter().map(to_suggestion).collect(),
        },
        EngineEvent::FetchFailed { fetch_id, error } => Msg::FetchFailed {
            ticket: FetchTicket(fetch_id),
            message: error.to_string(),
        },
        EngineEvent::FetchTimedOut { fetch_id } => Msg::FetchTimedOut {
            ticket: FetchTicket(fetch_id),
        },
        EngineEvent::AdvanceDue { item_id } => Msg::AdvanceDue { item_id },
        EngineEvent::FavoriteSaved { item_id, favorited } => {
            qp_debug!("Favorite {} saved as {}", item_id, favorited);
            Msg::NoOp
        }
        EngineEvent::FavoriteFailed {
            item_id, favorited, ..
        } => Msg::FavoritePersistFailed { item_id, favorited },
    }
}

fn to_suggestion(record: SuggestionRecord) -> Suggestion {
    let mut suggestion = Suggestion::new(record.id, record.name);
    suggestion.description = record.description;
    suggestion.image_url = record.image_url;
    suggestion.prep_time = record.prep_time;
    suggestion.servings = record.servings;
    suggestion.difficulty = record.difficulty.and_then(Difficulty::new);
    suggestion.cuisine = record.cuisine;
    suggestion.meal_type = record.meal_type;
    suggestion.mood_tags = record.mood_tags.into_iter().collect();
    suggestion.dietary_tags = record.dietary_tags.into_iter().collect();
    suggestion.is_favorited = record.is_favorited;
    suggestion
}
