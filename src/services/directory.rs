use crate::models::PlayerId;
use crate::services::cache::{CacheKey, CacheManager};
use crate::services::postgres::PostgresError;
use crate::services::sources::PlayerDirectory;
use std::collections::HashMap;
use std::sync::Arc;

/// Player directory with the name cache in front of it
///
/// Cache failures are logged and fall through to the inner directory.
pub struct CachedDirectory<D> {
    inner: Arc<D>,
    cache: Option<Arc<CacheManager>>,
}

impl<D> CachedDirectory<D> {
    pub fn new(inner: Arc<D>, cache: Option<Arc<CacheManager>>) -> Self {
        Self { inner, cache }
    }
}

impl<D: PlayerDirectory + Send + Sync> PlayerDirectory for CachedDirectory<D> {
    async fn player_names(&self, player_ids: &[PlayerId]) -> Result<HashMap<PlayerId, String>, PostgresError> {
        let Some(cache) = &self.cache else {
            return self.inner.player_names(player_ids).await;
        };

        let mut names = HashMap::with_capacity(player_ids.len());
        let mut missing = Vec::new();

        for &id in player_ids {
            match cache.get::<String>(&CacheKey::player_name(id)).await {
                Ok(name) => {
                    names.insert(id, name);
                }
                Err(_) => missing.push(id),
            }
        }

        if missing.is_empty() {
            return Ok(names);
        }

        let fetched = self.inner.player_names(&missing).await?;
        for (id, name) in fetched {
            if let Err(e) = cache.set(&CacheKey::player_name(id), &name).await {
                tracing::warn!("Failed to cache name of player {}: {}", id, e);
            }
            names.insert(id, name);
        }

        tracing::debug!(
            "Resolved {} of {} player names ({} from database)",
            names.len(),
            player_ids.len(),
            missing.len()
        );

        Ok(names)
    }
}
