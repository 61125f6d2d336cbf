//! Database handle owning the job and user stores.

use std::sync::Arc;

use board_core::{BoardEvent, Job, User};
use storage::Storage;
use tokio::sync::broadcast;

use crate::repositories::{JobRepository, UserRepository};
use crate::store::RecordStore;
use crate::{BoardError, DbConfig};

/// Handle to the board's persistent state.
///
/// Cheap to clone; every clone shares the same stores. Construct one at
/// startup and pass it to whatever serves requests.
#[derive(Clone)]
pub struct Database {
    inner: Arc<Inner>,
}

struct Inner {
    jobs: RecordStore<Job>,
    users: RecordStore<User>,
    events: broadcast::Sender<BoardEvent>,
    bcrypt_cost: u32,
}

impl Database {
    /// Open both stores, creating their files if needed.
    pub async fn open(config: DbConfig) -> Result<Self, BoardError> {
        let storage = Storage::new(config.storage)?;
        tracing::info!("Opening job board storage: {}", storage.backend_name());

        let jobs: RecordStore<Job> = RecordStore::open(storage.clone(), config.jobs_key).await?;
        let users: RecordStore<User> = RecordStore::open(storage, config.users_key).await?;
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        tracing::info!("Job board storage ready: {} / {}", jobs.key(), users.key());

        Ok(Self {
            inner: Arc::new(Inner {
                jobs,
                users,
                events,
                bcrypt_cost: config.bcrypt_cost,
            }),
        })
    }

    /// Job lifecycle operations.
    pub fn jobs(&self) -> JobRepository<'_> {
        JobRepository::new(self)
    }

    /// User accounts.
    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self)
    }

    /// Raw job store.
    pub fn job_store(&self) -> &RecordStore<Job> {
        &self.inner.jobs
    }

    /// Raw user store.
    pub fn user_store(&self) -> &RecordStore<User> {
        &self.inner.users
    }

    /// Subscribe to events emitted after successful mutations.
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn publish(&self, event: BoardEvent) {
        tracing::debug!("{}", event.description());
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    pub(crate) fn bcrypt_cost(&self) -> u32 {
        self.inner.bcrypt_cost
    }
}
