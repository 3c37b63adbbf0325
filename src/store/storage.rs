use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use crate::errors::StoreResult;

/// Persistence port for the user store: whole-value reads and writes of
/// keyed JSON blobs.
///
/// Implementations must be thread-safe (`Send + Sync`) as they may be
/// called concurrently from multiple request handlers.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fetch the blob stored under `key`, or `None` if the key is absent.
    async fn load(&self, key: &str) -> StoreResult<Option<String>>;

    /// Overwrite the blob stored under `key`.
    async fn save(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// Redis-backed storage. Each record collection lives as one JSON value
/// under a fixed key, overwritten wholesale on every save.
pub struct RedisStorage {
    client: Arc<Client>,
}

impl RedisStorage {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Storage for RedisStorage {
    async fn load(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.client.get_async_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.client.get_async_connection().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }
}

impl Clone for RedisStorage {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
        }
    }
}

/// In-memory storage backend, used by the store tests. Keeps the same
/// whole-blob contract as the Redis implementation.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStorage {
    blobs: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, e.g. to simulate previously persisted state.
    pub fn with_blob(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage
            .blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        storage
    }
}

#[cfg(test)]
#[async_trait]
impl Storage for MemoryStorage {
    async fn load(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.blobs.lock().unwrap().get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
