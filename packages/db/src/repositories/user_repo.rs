//! User repository for accounts and their job back-references.

use board_core::{BoardEvent, User, UserProfile};
use chrono::Utc;

use crate::password::{hash_password, verify_password};
use crate::{BoardError, Database};

/// Repository for user accounts.
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create an account.
    pub async fn register(&self, username: &str, password: &str) -> Result<UserProfile, BoardError> {
        let username = normalize(username);
        if username.is_empty() {
            return Err(BoardError::InvalidInput("username must not be empty".into()));
        }
        if password.is_empty() {
            return Err(BoardError::InvalidInput("password must not be empty".into()));
        }

        // Hash before taking the lock; bcrypt is slow on purpose.
        let password_hash = hash_password(password, self.db.bcrypt_cost()).await?;

        let mut users = self.db.user_store().lock().await?;
        if users.contains(username) {
            return Err(BoardError::Conflict(format!(
                "User '{}' already exists",
                username
            )));
        }

        let user = User::new(username, password_hash);
        let profile = user.profile();
        let mut records = users.snapshot();
        records.insert(user.username.clone(), user);
        users.commit(records).await?;
        drop(users);

        self.db.publish(BoardEvent::UserRegistered {
            username: username.to_string(),
            timestamp: Utc::now(),
        });
        Ok(profile)
    }

    /// Check a username/password pair.
    ///
    /// Unknown users and wrong passwords are indistinguishable to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, BoardError> {
        let username = normalize(username);
        let Some(user) = self.db.user_store().get(username).await? else {
            return Err(BoardError::Unauthenticated);
        };

        match verify_password(password, &user.password_hash).await {
            Ok(true) => Ok(user),
            Ok(false) => Err(BoardError::Unauthenticated),
            Err(e) => {
                tracing::warn!(username, "stored password hash is unusable: {}", e);
                Err(BoardError::Unauthenticated)
            }
        }
    }

    /// Get a user by username.
    pub async fn get(&self, username: &str) -> Result<User, BoardError> {
        let username = normalize(username);
        self.db
            .user_store()
            .get(username)
            .await?
            .ok_or_else(|| BoardError::NotFound(format!("User not found: {}", username)))
    }

    /// Public view of a user, without references to deleted jobs.
    pub async fn profile(&self, username: &str) -> Result<UserProfile, BoardError> {
        let user = self.get(username).await?;
        let jobs = self.db.job_store().read().await?;
        Ok(user.profile().retain_known(|id| jobs.contains_key(id.as_str())))
    }
}

/// Usernames are stored and looked up without surrounding whitespace.
fn normalize(username: &str) -> &str {
    username.trim()
}
