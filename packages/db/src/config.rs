//! Database configuration.

use storage::StorageConfig;

use crate::BoardError;

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Where the record files live.
    pub storage: StorageConfig,
    /// Object key of the job records file.
    pub jobs_key: String,
    /// Object key of the user records file.
    pub users_key: String,
    /// Bcrypt cost used when hashing new passwords.
    pub bcrypt_cost: u32,
    /// Buffer size of the event broadcast channel.
    pub event_capacity: usize,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            jobs_key: "Jobs.json".to_string(),
            users_key: "Users.json".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            event_capacity: 1024,
        }
    }
}

impl DbConfig {
    /// Create a config for in-memory testing.
    pub fn memory() -> Self {
        Self {
            storage: StorageConfig::memory(),
            ..Default::default()
        }
    }

    /// Create a config for file-based persistence under `root`.
    pub fn filesystem(root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            storage: StorageConfig::filesystem(root),
            ..Default::default()
        }
    }

    /// Build a config from environment variables.
    ///
    /// Storage is read via [`StorageConfig::from_env`]. On top of that:
    /// - `JOBS_FILE` (default: `Jobs.json`)
    /// - `USERS_FILE` (default: `Users.json`)
    /// - `BCRYPT_COST` (default: bcrypt's default cost)
    pub fn from_env() -> Result<Self, BoardError> {
        let mut cfg = Self {
            storage: StorageConfig::from_env()?,
            ..Default::default()
        };

        if let Some(jobs_key) = env_non_empty("JOBS_FILE") {
            cfg.jobs_key = jobs_key;
        }
        if let Some(users_key) = env_non_empty("USERS_FILE") {
            cfg.users_key = users_key;
        }
        if let Some(cost) = env_non_empty("BCRYPT_COST") {
            cfg.bcrypt_cost = parse_cost(&cost)?;
        }

        Ok(cfg)
    }

    /// Set the job records key.
    pub fn with_jobs_key(mut self, key: impl Into<String>) -> Self {
        self.jobs_key = key.into();
        self
    }

    /// Set the user records key.
    pub fn with_users_key(mut self, key: impl Into<String>) -> Self {
        self.users_key = key.into();
        self
    }

    /// Set the bcrypt cost.
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Set the event channel capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_cost(raw: &str) -> Result<u32, BoardError> {
    let cost: u32 = raw
        .parse()
        .map_err(|e| BoardError::InvalidConfig(format!("invalid BCRYPT_COST={raw}: {e}")))?;
    if !(4..=31).contains(&cost) {
        return Err(BoardError::InvalidConfig(format!(
            "BCRYPT_COST={cost} out of range (expected 4..=31)"
        )));
    }
    Ok(cost)
}
