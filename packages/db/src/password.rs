//! Password hashing.
//!
//! Bcrypt is CPU-bound, so both directions run on the blocking pool.

use crate::BoardError;

/// Hash a password with bcrypt at the given cost.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, BoardError> {
    let password = password.to_string();

    tokio::task::spawn_blocking(move || {
        bcrypt::hash(password, cost).map_err(|e| BoardError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| BoardError::Hashing(format!("Task join error: {}", e)))?
}

/// Check a password against a bcrypt hash.
///
/// Returns `Ok(false)` for a mismatch and `Err` if the hash is unreadable.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, BoardError> {
    let password = password.to_string();
    let hash = hash.to_string();

    tokio::task::spawn_blocking(move || {
        bcrypt::verify(password, &hash).map_err(|e| BoardError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| BoardError::Hashing(format!("Task join error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() -> Result<(), BoardError> {
        let hash = hash_password("hunter2", 4).await?;
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash).await?);
        assert!(!verify_password("hunter3", &hash).await?);
        Ok(())
    }

    #[tokio::test]
    async fn garbage_hash_is_an_error() {
        let res = verify_password("hunter2", "not-a-bcrypt-hash").await;
        assert!(matches!(res, Err(BoardError::Hashing(_))));
    }
}
