//! Job domain types for posted tasks.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last identifier handed out by [`JobId::generate`], in nanoseconds.
static LAST_ID_NANOS: AtomicI64 = AtomicI64::new(0);

/// Unique identifier for a job.
///
/// Generated from the wall clock in nanoseconds and kept strictly increasing
/// within the process, so two jobs created back to back never share an id.
/// Once created it is treated as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generate a new unique job ID.
    pub fn generate() -> Self {
        let now = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
        let mut last = LAST_ID_NANOS.load(Ordering::Acquire);
        loop {
            let next = now.max(last.saturating_add(1));
            match LAST_ID_NANOS.compare_exchange_weak(
                last,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Self(next.to_string()),
                Err(actual) => last = actual,
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A task posted by an author and claimable by one runner at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Unique identifier for this job.
    pub id: JobId,
    /// What needs doing.
    pub description: String,
    /// Reference to an image illustrating the task.
    pub image_location: String,
    /// Username of the author. Never changes after creation.
    pub author: String,
    /// Username of the current runner, empty while unclaimed.
    #[serde(default)]
    pub runner: String,
    /// When the job was posted. Absent in files written by older versions.
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a new, unclaimed job with a freshly generated id.
    pub fn new(
        description: impl Into<String>,
        image_location: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: JobId::generate(),
            description: description.into(),
            image_location: image_location.into(),
            author: author.into(),
            runner: String::new(),
            posted_at: Some(Utc::now()),
        }
    }

    /// Check if some user currently holds this job.
    pub fn is_claimed(&self) -> bool {
        !self.runner.is_empty()
    }

    /// The current runner, if any.
    pub fn runner(&self) -> Option<&str> {
        if self.runner.is_empty() {
            None
        } else {
            Some(&self.runner)
        }
    }

    /// Check if `username` is the current runner.
    pub fn is_run_by(&self, username: &str) -> bool {
        self.is_claimed() && self.runner == username
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_strictly_increasing() {
        let ids: Vec<i64> = (0..1000)
            .map(|_| JobId::generate().as_str().parse().unwrap())
            .collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn new_job_is_unclaimed() {
        let job = Job::new("fix fence", "img://1", "alice");
        assert!(!job.is_claimed());
        assert_eq!(job.runner(), None);
        assert!(!job.is_run_by(""));
        assert_eq!(job.author, "alice");
    }

    #[test]
    fn reads_older_records_and_ignores_unknown_fields() {
        let raw = r#"{
            "id": "17",
            "description": "paint shed",
            "imageLocation": "img://2",
            "author": "alice",
            "runner": "bob",
            "priority": "high"
        }"#;
        let job: Job = serde_json::from_str(raw).unwrap();
        assert_eq!(job.id, JobId::from("17"));
        assert!(job.is_run_by("bob"));
        assert_eq!(job.posted_at, None);
    }

    #[test]
    fn writes_every_declared_field() {
        let mut job = Job::new("d", "i", "a");
        job.posted_at = None;
        let value = serde_json::to_value(&job).unwrap();
        let obj = value.as_object().unwrap();
        for field in ["id", "description", "imageLocation", "author", "runner", "postedAt"] {
            assert!(obj.contains_key(field), "missing {field}");
        }
        assert_eq!(obj["runner"], "");
    }
}
