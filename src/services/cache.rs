use chrono::NaiveDate;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Multi-tier cache manager
///
/// L1 is an in-process moka cache, L2 is Redis shared across instances.
/// Holds player names and stored round pairings.
pub struct CacheManager {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a new cache manager
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
            l1_cache,
            ttl_secs,
        })
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let mut conn = self.redis.lock().await;
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut *conn).await?;
        drop(conn);

        if let Some(json) = value {
            tracing::trace!("L2 cache hit: {}", key);
            self.l1_cache.insert(key.to_string(), json.as_bytes().to_vec()).await;
            return Ok(serde_json::from_str(&json)?);
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in both tiers
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;
        self.l1_cache.insert(key.to_string(), json.as_bytes().to_vec()).await;

        let mut conn = self.redis.lock().await;
        redis::cmd("SETEX")
            .arg(key)
            .arg(self.ttl_secs)
            .arg(json)
            .query_async::<()>(&mut *conn)
            .await?;
        drop(conn);

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Delete a value from both tiers
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate(key).await;
        let mut conn = self.redis.lock().await;
        redis::cmd("DEL").arg(key).query_async::<()>(&mut *conn).await?;
        Ok(())
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Display name of one player
    pub fn player_name(player_id: i64) -> String {
        format!("player:{}", player_id)
    }

    /// Stored pairings of one session round
    pub fn round_pairings(session_date: NaiveDate, match_number: i32) -> String {
        format!("pairings:{}:{}", session_date, match_number)
    }

    /// Stored pairings of a whole session date
    pub fn day_pairings(session_date: NaiveDate) -> String {
        format!("pairings:{}", session_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_cache_set_get() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 1000, 60)
            .await
            .expect("Failed to create cache");

        let key = CacheKey::player_name(1);
        cache.set(&key, &"Aoi".to_string()).await.unwrap();
        let result: String = cache.get(&key).await.unwrap();
        assert_eq!(result, "Aoi");

        cache.delete(&key).await.unwrap();
        assert!(cache.get::<String>(&key).await.is_err());
    }

    #[test]
    fn test_cache_key_builder() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        assert_eq!(CacheKey::player_name(12), "player:12");
        assert_eq!(CacheKey::round_pairings(date, 3), "pairings:2024-06-20:3");
        assert_eq!(CacheKey::day_pairings(date), "pairings:2024-06-20");
    }
}
