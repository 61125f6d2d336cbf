//! Job repository: posting, claiming and releasing jobs.
//!
//! Every mutation holds the job store's lock from its first read to its last
//! write, and takes the user store's lock while still holding it when a
//! back-reference changes. Locks are always taken jobs first, then users.

use board_core::{BoardEvent, Job, JobId, User};
use chrono::Utc;

use crate::store::RecordGuard;
use crate::{BoardError, Database};

/// Repository for job lifecycle operations.
pub struct JobRepository<'a> {
    db: &'a Database,
}

impl<'a> JobRepository<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// List every job, oldest first.
    pub async fn list(&self) -> Result<Vec<Job>, BoardError> {
        let jobs = self.db.job_store().read().await?;
        Ok(jobs.into_values().collect())
    }

    /// List jobs nobody is running yet, oldest first.
    pub async fn list_available(&self) -> Result<Vec<Job>, BoardError> {
        let jobs = self.db.job_store().read().await?;
        Ok(jobs.into_values().filter(|job| !job.is_claimed()).collect())
    }

    /// Get a job by ID.
    pub async fn get(&self, id: &JobId) -> Result<Job, BoardError> {
        self.db
            .job_store()
            .get(id.as_str())
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Post a new job on behalf of `author`.
    pub async fn create(
        &self,
        description: impl Into<String>,
        image_location: impl Into<String>,
        author: &str,
    ) -> Result<Job, BoardError> {
        let job = Job::new(description, image_location, author);

        let mut jobs = self.db.job_store().lock().await?;
        let mut users = self.db.user_store().lock().await?;

        let mut user = known_user(&users, author)?;
        if jobs.contains(job.id.as_str()) {
            tracing::warn!(job_id = %job.id, "generated job id already exists");
            return Err(BoardError::Conflict("Job already exists".into()));
        }

        let mut job_records = jobs.snapshot();
        job_records.insert(job.id.to_string(), job.clone());

        user.add_authored(job.id.clone());
        let mut user_records = users.snapshot();
        user_records.insert(author.to_string(), user);

        jobs.commit(job_records).await?;
        commit_users(&mut users, user_records, "create", &job.id).await?;

        self.db.publish(BoardEvent::JobPosted {
            job: job.clone(),
            timestamp: Utc::now(),
        });
        Ok(job)
    }

    /// Delete a job. Only its author may do so.
    ///
    /// Back-references in user records are left as they are; readers filter
    /// them out (see [`super::UserRepository::profile`]).
    pub async fn delete(&self, id: &JobId, requester: &str) -> Result<(), BoardError> {
        let mut jobs = self.db.job_store().lock().await?;

        let job = jobs.get(id.as_str()).ok_or_else(|| not_found(id))?;
        if job.author != requester {
            tracing::warn!(job_id = %id, requester, author = %job.author, "delete rejected: not the author");
            return Err(BoardError::Forbidden(
                "Only the author may delete this job".into(),
            ));
        }
        let author = job.author.clone();

        let mut job_records = jobs.snapshot();
        job_records.remove(id.as_str());
        jobs.commit(job_records).await?;

        self.db.publish(BoardEvent::JobDeleted {
            job_id: id.clone(),
            author,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Claim an unclaimed job for `requester`.
    pub async fn checkout(&self, id: &JobId, requester: &str) -> Result<Job, BoardError> {
        let mut jobs = self.db.job_store().lock().await?;
        let mut users = self.db.user_store().lock().await?;

        let mut user = known_user(&users, requester)?;
        let mut job = jobs.get(id.as_str()).cloned().ok_or_else(|| not_found(id))?;
        if let Some(runner) = job.runner() {
            tracing::warn!(job_id = %id, requester, runner, "checkout rejected: already claimed");
            return Err(BoardError::Conflict("This job is already being run".into()));
        }

        job.runner = requester.to_string();
        let mut job_records = jobs.snapshot();
        job_records.insert(id.to_string(), job.clone());

        user.start_running(id.clone());
        let mut user_records = users.snapshot();
        user_records.insert(requester.to_string(), user);

        jobs.commit(job_records).await?;
        commit_users(&mut users, user_records, "checkout", id).await?;

        self.db.publish(BoardEvent::JobCheckedOut {
            job_id: id.clone(),
            runner: requester.to_string(),
            timestamp: Utc::now(),
        });
        Ok(job)
    }

    /// Release a job `requester` is currently running.
    pub async fn checkin(&self, id: &JobId, requester: &str) -> Result<Job, BoardError> {
        let mut jobs = self.db.job_store().lock().await?;
        let mut users = self.db.user_store().lock().await?;

        let mut user = known_user(&users, requester)?;
        let mut job = jobs.get(id.as_str()).cloned().ok_or_else(|| not_found(id))?;
        if !job.is_run_by(requester) {
            tracing::warn!(job_id = %id, requester, runner = %job.runner, "checkin rejected: not the runner");
            return Err(BoardError::Conflict(
                "You are not currently running this job".into(),
            ));
        }

        job.runner.clear();
        let mut job_records = jobs.snapshot();
        job_records.insert(id.to_string(), job.clone());

        if !user.stop_running(id) {
            tracing::warn!(job_id = %id, requester, "checked-in job was missing from the runner's list");
        }
        let mut user_records = users.snapshot();
        user_records.insert(requester.to_string(), user);

        jobs.commit(job_records).await?;
        commit_users(&mut users, user_records, "checkin", id).await?;

        self.db.publish(BoardEvent::JobCheckedIn {
            job_id: id.clone(),
            runner: requester.to_string(),
            timestamp: Utc::now(),
        });
        Ok(job)
    }
}

fn not_found(id: &JobId) -> BoardError {
    BoardError::NotFound(format!("Job not found: {}", id))
}

/// The record stored under `username`; it must exist to hold back-references.
///
/// Callers write the updated record back under the same key.
fn known_user(users: &RecordGuard<'_, User>, username: &str) -> Result<User, BoardError> {
    users.get(username).cloned().ok_or_else(|| {
        tracing::warn!(username, "operation by unknown user");
        BoardError::Unauthenticated
    })
}

/// Second half of a two-store update; the job store is already committed.
async fn commit_users(
    users: &mut RecordGuard<'_, User>,
    records: crate::Records<User>,
    op: &str,
    id: &JobId,
) -> Result<(), BoardError> {
    users.commit(records).await.map_err(|e| {
        tracing::error!(op, job_id = %id, "job saved but user back-references were not: {}", e);
        BoardError::from(e)
    })
}
