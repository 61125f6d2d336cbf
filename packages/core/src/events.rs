//! Event types for real-time updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Job, JobId};

/// Events emitted by the job board after each successful mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BoardEvent {
    /// A new job was posted.
    JobPosted { job: Job, timestamp: DateTime<Utc> },
    /// A job was deleted by its author.
    JobDeleted {
        job_id: JobId,
        author: String,
        timestamp: DateTime<Utc>,
    },
    /// A runner claimed a job.
    JobCheckedOut {
        job_id: JobId,
        runner: String,
        timestamp: DateTime<Utc>,
    },
    /// A runner released a job.
    JobCheckedIn {
        job_id: JobId,
        runner: String,
        timestamp: DateTime<Utc>,
    },
    /// A new user signed up.
    UserRegistered {
        username: String,
        timestamp: DateTime<Utc>,
    },
}

impl BoardEvent {
    /// Get the job ID associated with this event, if any.
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            BoardEvent::JobPosted { job, .. } => Some(&job.id),
            BoardEvent::JobDeleted { job_id, .. } => Some(job_id),
            BoardEvent::JobCheckedOut { job_id, .. } => Some(job_id),
            BoardEvent::JobCheckedIn { job_id, .. } => Some(job_id),
            BoardEvent::UserRegistered { .. } => None,
        }
    }

    /// Get a short description of this event for logging.
    pub fn description(&self) -> String {
        match self {
            BoardEvent::JobPosted { job, .. } => {
                format!("Job {} posted by {}", job.id, job.author)
            }
            BoardEvent::JobDeleted { job_id, author, .. } => {
                format!("Job {} deleted by {}", job_id, author)
            }
            BoardEvent::JobCheckedOut { job_id, runner, .. } => {
                format!("Job {} checked out by {}", job_id, runner)
            }
            BoardEvent::JobCheckedIn { job_id, runner, .. } => {
                format!("Job {} checked in by {}", job_id, runner)
            }
            BoardEvent::UserRegistered { username, .. } => {
                format!("User {} registered", username)
            }
        }
    }
}
