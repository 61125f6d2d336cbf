//! User records and their back-references to jobs.

use serde::{Deserialize, Serialize};

use crate::JobId;

/// A registered user.
///
/// `authored` keeps creation order. `running` is unordered; entries are
/// removed by swapping with the last element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique username, also the key in the user store.
    pub username: String,
    /// Bcrypt hash of the user's password.
    pub password_hash: String,
    /// Jobs this user created.
    #[serde(default)]
    pub authored: Vec<JobId>,
    /// Jobs this user currently holds.
    #[serde(default)]
    pub running: Vec<JobId>,
}

impl User {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            authored: Vec::new(),
            running: Vec::new(),
        }
    }

    /// Record a job this user created.
    pub fn add_authored(&mut self, id: JobId) {
        self.authored.push(id);
    }

    /// Record a job this user claimed.
    pub fn start_running(&mut self, id: JobId) {
        self.running.push(id);
    }

    /// Forget a claimed job. Returns `false` if it wasn't in the list.
    pub fn stop_running(&mut self, id: &JobId) -> bool {
        match self.running.iter().position(|r| r == id) {
            Some(idx) => {
                self.running.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, id: &JobId) -> bool {
        self.running.contains(id)
    }

    /// Public view of this user, without credentials.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            authored: self.authored.clone(),
            running: self.running.clone(),
        }
    }
}

/// What callers get to see of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub authored: Vec<JobId>,
    pub running: Vec<JobId>,
}

impl UserProfile {
    /// Drop references to jobs for which `exists` returns false.
    pub fn retain_known(mut self, exists: impl Fn(&JobId) -> bool) -> Self {
        self.authored.retain(|id| exists(id));
        self.running.retain(|id| exists(id));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_running_swaps_out_the_entry() {
        let mut user = User::new("bob", "hash");
        for id in ["1", "2", "3"] {
            user.start_running(JobId::from(id));
        }

        assert!(user.stop_running(&JobId::from("1")));
        assert_eq!(user.running, vec![JobId::from("3"), JobId::from("2")]);
        assert!(!user.stop_running(&JobId::from("1")));
        assert!(!user.is_running(&JobId::from("1")));
    }

    #[test]
    fn profile_hides_the_password_and_filters_unknown_jobs() {
        let mut user = User::new("alice", "secret-hash");
        user.add_authored(JobId::from("1"));
        user.add_authored(JobId::from("2"));
        user.start_running(JobId::from("2"));

        let profile = user.profile().retain_known(|id| id.as_str() == "2");
        assert_eq!(profile.authored, vec![JobId::from("2")]);
        assert_eq!(profile.running, vec![JobId::from("2")]);

        let json = serde_json::to_string(&user.profile()).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
