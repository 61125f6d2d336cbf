//! Whole-object storage for the job board's record files.
//!
//! Each entity type lives in one object (`Jobs.json`, `Users.json`) that is
//! always replaced wholesale. `object_store` provides both backends:
//! - a local directory for real deployments
//! - an in-memory store for tests

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use object_store::path::Path;
use object_store::{ObjectStore, ObjectStoreExt, PutPayload};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Directory the filesystem backend uses when none is configured.
pub const DEFAULT_FS_ROOT: &str = "./data";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid storage config: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("object_store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where record files are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// One file per record set under `root`.
    Filesystem { root: PathBuf },
    /// Process-local; gone when the process exits.
    Memory,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Filesystem { .. } => "filesystem",
            Backend::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: Backend,
    /// Directory-like prefix put in front of every key, e.g. `board`.
    pub prefix: Option<String>,
}

impl StorageConfig {
    pub fn memory() -> Self {
        Self {
            backend: Backend::Memory,
            prefix: None,
        }
    }

    pub fn filesystem(root: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::Filesystem { root: root.into() },
            prefix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = clean_prefix(&prefix.into());
        self
    }

    /// Read the storage settings from the environment.
    ///
    /// - `STORAGE_BACKEND`: `filesystem` (default) or `memory`
    /// - `STORAGE_FS_ROOT`: directory for the record files (default `./data`)
    /// - `STORAGE_PREFIX`: optional key prefix
    pub fn from_env() -> Result<Self, StorageError> {
        let config = match env_var("STORAGE_BACKEND").as_deref() {
            None | Some("filesystem" | "fs") => {
                let root = env_var("STORAGE_FS_ROOT").unwrap_or_else(|| DEFAULT_FS_ROOT.into());
                Self::filesystem(root)
            }
            Some("memory" | "mem") => Self::memory(),
            Some(other) => {
                return Err(StorageError::InvalidConfig(format!(
                    "STORAGE_BACKEND must be filesystem or memory, got {other:?}"
                )));
            }
        };

        Ok(match env_var("STORAGE_PREFIX") {
            Some(prefix) => config.with_prefix(prefix),
            None => config,
        })
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::filesystem(DEFAULT_FS_ROOT)
    }
}

/// Handle to the configured backend. Clones share the same store.
#[derive(Clone)]
pub struct Storage {
    backend: &'static str,
    store: Arc<dyn ObjectStore>,
    prefix: Option<String>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("backend", &self.backend)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl Storage {
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        let backend = config.backend.name();
        let store: Arc<dyn ObjectStore> = match config.backend {
            Backend::Filesystem { root } => {
                std::fs::create_dir_all(&root)?;
                Arc::new(object_store::local::LocalFileSystem::new_with_prefix(&root)?)
            }
            Backend::Memory => Arc::new(object_store::memory::InMemory::new()),
        };

        Ok(Self {
            backend,
            store,
            prefix: config.prefix.as_deref().and_then(clean_prefix),
        })
    }

    /// Name of the backend, for logs.
    pub fn backend_name(&self) -> &'static str {
        self.backend
    }

    fn object_path(&self, key: &str) -> Result<Path, StorageError> {
        let key = key.trim_start_matches('/');
        if key.is_empty() {
            return Err(StorageError::InvalidConfig("empty object key".into()));
        }
        Ok(match &self.prefix {
            Some(prefix) => Path::from(format!("{prefix}/{key}")),
            None => Path::from(key),
        })
    }

    /// Replace the whole object at `key`.
    pub async fn put_bytes(&self, key: &str, bytes: Bytes) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        self.store.put(&path, PutPayload::from(bytes)).await?;
        Ok(())
    }

    /// Contents of the object at `key`, or `None` if there is none.
    pub async fn try_get_bytes(&self, key: &str) -> Result<Option<Bytes>, StorageError> {
        let path = self.object_path(key)?;
        match self.store.get(&path).await {
            Ok(found) => Ok(Some(found.bytes().await?)),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether an object exists at `key`, without fetching it.
    pub async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.object_path(key)?;
        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Create an empty object at `key` unless one exists. Returns `true` if created.
    pub async fn touch(&self, key: &str) -> Result<bool, StorageError> {
        if self.exists(key).await? {
            return Ok(false);
        }
        self.put_bytes(key, Bytes::new()).await?;
        Ok(true)
    }

    /// Replace the object at `key` with `value` as pretty-printed JSON.
    pub async fn put_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(value)?;
        self.put_bytes(key, Bytes::from(json)).await
    }

    /// Read and deserialize the object at `key`.
    ///
    /// A missing object, or one holding only whitespace, is `None`.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(bytes) = self.try_get_bytes(key).await? else {
            return Ok(None);
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

fn env_var(name: &str) -> Option<String> {
    let value = std::env::var(name).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn clean_prefix(prefix: &str) -> Option<String> {
    let prefix = prefix.trim().trim_matches('/');
    (!prefix.is_empty()).then(|| prefix.to_string())
}
