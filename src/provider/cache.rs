use crate::{NeboKrugError, Result};
use fjall::Keyspace;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

/// Persistent cache for archive responses, which never change once published
#[derive(Clone)]
pub struct ArchiveCache {
    store: Keyspace,
    ttl: Duration,
}

fn get_from_store(store: &Keyspace, key: &[u8]) -> Result<Option<Vec<u8>>> {
    Ok(store
        .get(key)
        .map_err(|e| NeboKrugError::cache(format!("read failed: {e}")))?
        .map(|v| v.to_vec()))
}

fn now_secs() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| NeboKrugError::cache(format!("system clock before epoch: {e}")))
}

impl ArchiveCache {
    pub fn open(path: impl AsRef<Path>, ttl: Duration) -> Result<Self> {
        let path = path.as_ref();
        let db = fjall::Database::builder(path)
            .open()
            .map_err(|e| NeboKrugError::cache(format!("cannot open {}: {e}", path.display())))?;
        let store = db
            .keyspace("archive", fjall::KeyspaceCreateOptions::default)
            .map_err(|e| NeboKrugError::cache(format!("cannot open keyspace: {e}")))?;
        Ok(Self { store, ttl })
    }

    /// Stores a serializable value for the configured time-to-live.
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(&self, key: &str, value: T) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let expires_at = now_secs()?.saturating_add(self.ttl.as_secs());
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry)
            .map_err(|e| NeboKrugError::cache(format!("encode failed: {e}")))?;

        task::spawn_blocking(move || store.insert(key, bytes))
            .await
            .map_err(|e| NeboKrugError::cache(format!("write task failed: {e}")))?
            .map_err(|e| NeboKrugError::cache(format!("write failed: {e}")))?;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes = task::spawn_blocking(move || get_from_store(&store, &key_bytes))
            .await
            .map_err(|e| NeboKrugError::cache(format!("read task failed: {e}")))??;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry<T> = postcard::from_bytes(&bytes)
            .map_err(|e| NeboKrugError::cache(format!("decode failed: {e}")))?;

        if now_secs()? < entry.expires_at {
            tracing::debug!("Key found and still fresh");
            Ok(Some(entry.value))
        } else {
            tracing::debug!("Key found but expired");
            self.remove(key).await?;
            Ok(None)
        }
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key))
            .await
            .map_err(|e| NeboKrugError::cache(format!("remove task failed: {e}")))?
            .map_err(|e| NeboKrugError::cache(format!("remove failed: {e}")))?;
        Ok(())
    }
}
