//! File-backed key/value cache with optional per-entry expiry.
//!
//! Each key is one JSON file under `<namespace>/`. The file holds an envelope
//! with the original key, the optional expiry instant and the value, so keys
//! can be listed without a separate index.

use crate::domain::ports::Storage;
use crate::utils::error::{CrawlerError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope {
    key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    value: Value,
}

impl CacheEnvelope {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[derive(Debug, Clone)]
pub struct FileCache<S: Storage> {
    storage: S,
    namespace: String,
}

impl<S: Storage> FileCache<S> {
    pub fn new(storage: S, namespace: impl Into<String>) -> Self {
        Self {
            storage,
            namespace: namespace.into(),
        }
    }

    fn entry_path(&self, key: &str) -> String {
        let file_stem: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}/{}.json", self.namespace, file_stem)
    }

    async fn read_envelope(&self, path: &str) -> Result<Option<CacheEnvelope>> {
        let bytes = match self.storage.read_file(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        match serde_json::from_slice::<CacheEnvelope>(&bytes) {
            Ok(envelope) if envelope.is_expired(Utc::now()) => {
                self.storage.remove_file(path).await?;
                Ok(None)
            }
            Ok(envelope) => Ok(Some(envelope)),
            Err(e) => {
                tracing::warn!("🗑️ Dropping corrupt cache entry {}: {}", path, e);
                self.storage.remove_file(path).await?;
                Ok(None)
            }
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.entry_path(key);
        match self.read_envelope(&path).await? {
            Some(envelope) if envelope.key == key => Ok(Some(serde_json::from_value(envelope.value)?)),
            _ => Ok(None),
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.write_entry(key, value, None).await
    }

    pub async fn set_with_ttl<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| CrawlerError::CacheError {
            message: format!("invalid ttl for {}: {}", key, e),
        })?;
        self.write_entry(key, value, Some(Utc::now() + ttl)).await
    }

    async fn write_entry<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let envelope = CacheEnvelope {
            key: key.to_string(),
            expires_at,
            value: serde_json::to_value(value)?,
        };
        let bytes = serde_json::to_vec(&envelope)?;
        self.storage.write_file(&self.entry_path(key), &bytes).await
    }

    /// Removes `key`; an entry stored under a colliding key is left alone.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let path = self.entry_path(key);
        match self.read_envelope(&path).await? {
            Some(envelope) if envelope.key == key => self.storage.remove_file(&path).await,
            _ => Ok(false),
        }
    }

    pub async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get::<Value>(key).await?.is_some())
    }

    /// Live (non-expired) keys in this namespace.
    pub async fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for path in self.storage.list_files(&self.namespace).await? {
            if !path.ends_with(".json") {
                continue;
            }
            if let Some(envelope) = self.read_envelope(&path).await? {
                keys.push(envelope.key);
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use serde_json::json;
    use tempfile::TempDir;

    fn cache(dir: &TempDir) -> FileCache<LocalStorage> {
        FileCache::new(LocalStorage::new(dir.path()), "rank_cache")
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);

        assert_eq!(cache.get::<Value>("latest_rank_data").await.unwrap(), None);

        cache.set("latest_rank_data", &json!({"total_records": 3})).await.unwrap();
        let value: Value = cache.get("latest_rank_data").await.unwrap().unwrap();
        assert_eq!(value["total_records"], 3);
        assert!(cache.contains("latest_rank_data").await.unwrap());

        assert!(cache.delete("latest_rank_data").await.unwrap());
        assert!(!cache.contains("latest_rank_data").await.unwrap());
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);

        cache
            .set_with_ttl("portfolio_1", &json!(1), Duration::ZERO)
            .await
            .unwrap();
        cache
            .set_with_ttl("portfolio_2", &json!(2), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get::<Value>("portfolio_1").await.unwrap(), None);
        assert_eq!(cache.get::<i64>("portfolio_2").await.unwrap(), Some(2));
        assert_eq!(cache.keys().await.unwrap(), vec!["portfolio_2".to_string()]);
    }

    #[tokio::test]
    async fn test_keys_with_unsafe_characters() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);

        cache.set("a/b c", &json!("x")).await.unwrap();
        cache.set("rank_data_20240115", &json!("y")).await.unwrap();

        let mut keys = cache.keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a/b c".to_string(), "rank_data_20240115".to_string()]);
        assert_eq!(cache.get::<String>("a/b c").await.unwrap().as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_delete_leaves_colliding_key() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);

        // "a/b" and "a_b" share a file name
        cache.set("a_b", &json!("kept")).await.unwrap();

        assert!(!cache.delete("a/b").await.unwrap());
        assert_eq!(cache.get::<String>("a_b").await.unwrap().as_deref(), Some("kept"));
        assert!(cache.delete("a_b").await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_entry_reads_as_missing() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        std::fs::create_dir_all(dir.path().join("rank_cache")).unwrap();
        std::fs::write(dir.path().join("rank_cache/broken.json"), b"{not json").unwrap();

        assert_eq!(cache.get::<Value>("broken").await.unwrap(), None);
        assert!(!dir.path().join("rank_cache/broken.json").exists());
    }
}
