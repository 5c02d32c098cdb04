use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use quickpick_logging::qp_debug;
use url::Url;

use crate::provider::parse_base_url;
use crate::{ProviderError, StoreError};

/// Durable favorite flags keyed by (user, item).
#[async_trait::async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Upserts the favorite when `favorited`, deletes it otherwise.
    async fn set_favorite(
        &self,
        user_id: &str,
        item_id: &str,
        favorited: bool,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct HttpFavoriteStore {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpFavoriteStore {
    pub fn new(base_url: &str, connect_timeout: Duration) -> Result<Self, StoreError> {
        let base_url = parse_base_url(base_url).map_err(|err| match err {
            ProviderError::InvalidUrl(message) => StoreError::InvalidUrl(message),
            other => StoreError::InvalidUrl(other.to_string()),
        })?;
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|err| StoreError::Network(err.to_string()))?;
        Ok(Self { base_url, client })
    }

    fn favorite_url(&self, user_id: &str, item_id: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["users", user_id, "favorites", item_id]);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl FavoriteStore for HttpFavoriteStore {
    async fn set_favorite(
        &self,
        user_id: &str,
        item_id: &str,
        favorited: bool,
    ) -> Result<(), StoreError> {
        let url = self.favorite_url(user_id, item_id)?;
        let request = if favorited {
            self.client.put(url)
        } else {
            self.client.delete(url)
        };
        let response = request
            .send()
            .await
            .map_err(|err| StoreError::Network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::HttpStatus(status.as_u16()));
        }
        qp_debug!("Favorite {} for {} stored as {}", item_id, user_id, favorited);
        Ok(())
    }
}

/// Process-local store for demos and tests.
#[derive(Debug, Default)]
pub struct MemoryFavoriteStore {
    favorites: Mutex<BTreeSet<(String, String)>>,
}

impl MemoryFavoriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_favorite(&self, user_id: &str, item_id: &str) -> bool {
        self.favorites
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(user_id.to_string(), item_id.to_string()))
    }
}

#[async_trait::async_trait]
impl FavoriteStore for MemoryFavoriteStore {
    async fn set_favorite(
        &self,
        user_id: &str,
        item_id: &str,
        favorited: bool,
    ) -> Result<(), StoreError> {
        let key = (user_id.to_string(), item_id.to_string());
        let mut favorites = self
            .favorites
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if favorited {
            favorites.insert(key);
        } else {
            favorites.remove(&key);
        }
        Ok(())
    }
}
