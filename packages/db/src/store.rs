//! Cached, file-backed record store for one entity type.
//!
//! Each store owns one object (a JSON file mapping id -> record) and an
//! in-memory copy of it. The copy is loaded lazily and replaced wholesale on
//! every write, so it never drifts from what was last persisted.
//!
//! All access goes through one async mutex. `read`/`write` hold it for a
//! single call; [`RecordStore::lock`] hands out a guard that keeps it across a
//! whole read-validate-mutate-write sequence.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use storage::{Storage, StorageError};
use tokio::sync::{Mutex, MutexGuard};

/// Snapshot of a store: record id -> record.
pub type Records<T> = BTreeMap<String, T>;

/// Anything a [`RecordStore`] can hold.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> Record for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

struct Cache<T> {
    records: Records<T>,
    loaded: bool,
}

/// Durable, cached, mutually exclusive map of records.
pub struct RecordStore<T> {
    storage: Storage,
    key: String,
    cache: Mutex<Cache<T>>,
}

impl<T: Record> RecordStore<T> {
    /// Bind a store to `key`, creating an empty object there if none exists.
    pub async fn open(storage: Storage, key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();
        if storage.touch(&key).await? {
            tracing::info!(key = %key, backend = storage.backend_name(), "created empty record file");
        }

        Ok(Self {
            storage,
            key,
            cache: Mutex::new(Cache {
                records: Records::new(),
                loaded: false,
            }),
        })
    }

    /// Object key this store persists to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Snapshot of all records as of the latest completed write.
    pub async fn read(&self) -> Result<Records<T>, StorageError> {
        let mut cache = self.cache.lock().await;
        self.ensure_loaded(&mut cache).await?;
        Ok(cache.records.clone())
    }

    /// Single record by id.
    pub async fn get(&self, id: &str) -> Result<Option<T>, StorageError> {
        let mut cache = self.cache.lock().await;
        self.ensure_loaded(&mut cache).await?;
        Ok(cache.records.get(id).cloned())
    }

    /// Replace every record, on storage first and then in the cache.
    pub async fn write(&self, records: Records<T>) -> Result<(), StorageError> {
        let mut cache = self.cache.lock().await;
        self.persist(&mut cache, records).await
    }

    /// Take exclusive access until the returned guard is dropped.
    pub async fn lock(&self) -> Result<RecordGuard<'_, T>, StorageError> {
        let mut cache = self.cache.lock().await;
        self.ensure_loaded(&mut cache).await?;
        Ok(RecordGuard { store: self, cache })
    }

    /// Drop the cached copy; the next access reloads from storage.
    pub async fn invalidate(&self) {
        let mut cache = self.cache.lock().await;
        cache.records.clear();
        cache.loaded = false;
    }

    async fn ensure_loaded(&self, cache: &mut Cache<T>) -> Result<(), StorageError> {
        if cache.loaded {
            return Ok(());
        }

        // A `null` document is an empty map.
        let records = self
            .storage
            .get_json::<Option<Records<T>>>(&self.key)
            .await
            .inspect_err(|e| tracing::error!(key = %self.key, error = %e, "failed to load records"))?
            .flatten()
            .unwrap_or_default();

        tracing::debug!(key = %self.key, count = records.len(), "loaded records");
        cache.records = records;
        cache.loaded = true;
        Ok(())
    }

    async fn persist(&self, cache: &mut Cache<T>, records: Records<T>) -> Result<(), StorageError> {
        self.storage
            .put_json(&self.key, &records)
            .await
            .inspect_err(|e| {
                tracing::error!(key = %self.key, error = %e, "failed to persist records; keeping previous cache")
            })?;

        tracing::debug!(key = %self.key, count = records.len(), "persisted records");
        cache.records = records;
        cache.loaded = true;
        Ok(())
    }
}

/// Exclusive access to a [`RecordStore`].
///
/// Changes are only visible to others once [`RecordGuard::commit`] succeeds.
/// Dropping the guard without committing leaves the store untouched.
pub struct RecordGuard<'a, T> {
    store: &'a RecordStore<T>,
    cache: MutexGuard<'a, Cache<T>>,
}

impl<T: Record> RecordGuard<'_, T> {
    pub fn get(&self, id: &str) -> Option<&T> {
        self.cache.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cache.records.contains_key(id)
    }

    /// Owned copy to mutate before committing.
    pub fn snapshot(&self) -> Records<T> {
        self.cache.records.clone()
    }

    /// Persist `records` and make them the current state.
    pub async fn commit(&mut self, records: Records<T>) -> Result<(), StorageError> {
        self.store.persist(&mut self.cache, records).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::disallowed_methods)]

    use storage::StorageConfig;

    use super::*;

    async fn put_raw(storage: &Storage, key: &str, raw: &str) -> Result<(), StorageError> {
        storage.put_bytes(key, raw.as_bytes().to_vec().into()).await
    }

    fn records(pairs: &[(&str, u32)]) -> Records<u32> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[tokio::test]
    async fn guard_commit_is_visible_and_drop_is_not() -> Result<(), StorageError> {
        let storage = Storage::new(StorageConfig::memory())?;
        let store: RecordStore<u32> = RecordStore::open(storage, "n.json").await?;

        {
            let mut guard = store.lock().await?;
            let mut next = guard.snapshot();
            next.insert("a".into(), 1);
            guard.commit(next).await?;
            assert_eq!(guard.get("a"), Some(&1));
        }
        {
            let guard = store.lock().await?;
            let mut next = guard.snapshot();
            next.insert("b".into(), 2);
            // dropped without commit
        }

        assert_eq!(store.read().await?, records(&[("a", 1)]));
        Ok(())
    }

    #[tokio::test]
    async fn null_file_reads_as_empty() -> Result<(), StorageError> {
        let storage = Storage::new(StorageConfig::memory())?;
        put_raw(&storage, "n.json", "null").await?;
        let store: RecordStore<u32> = RecordStore::open(storage, "n.json").await?;
        assert!(store.read().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn invalidate_reloads_from_storage() -> Result<(), StorageError> {
        let storage = Storage::new(StorageConfig::memory())?;
        let store: RecordStore<u32> = RecordStore::open(storage.clone(), "n.json").await?;
        store.write(records(&[("a", 1)])).await?;

        put_raw(&storage, "n.json", r#"{"b": 2}"#).await?;
        assert_eq!(store.read().await?, records(&[("a", 1)]));

        store.invalidate().await;
        assert_eq!(store.read().await?, records(&[("b", 2)]));
        Ok(())
    }
}
