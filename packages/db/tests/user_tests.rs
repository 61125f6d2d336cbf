#![allow(clippy::disallowed_methods)]

mod common;

use std::error::Error;

use db::BoardError;

#[tokio::test]
async fn register_then_authenticate() -> Result<(), Box<dyn Error>> {
    let db = common::memory_db().await?;

    let profile = db.users().register("alice", "correct horse").await?;
    assert_eq!(profile.username, "alice");
    assert!(profile.authored.is_empty());

    let user = db.users().authenticate("alice", "correct horse").await?;
    assert_eq!(user.username, "alice");
    assert_ne!(user.password_hash, "correct horse");
    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_unauthenticated() -> Result<(), Box<dyn Error>> {
    let db = common::db_with_users(&["alice"]).await?;

    let wrong = db.users().authenticate("alice", "nope").await;
    assert!(matches!(wrong, Err(BoardError::Unauthenticated)));

    let unknown = db.users().authenticate("mallory", "nope").await;
    assert!(matches!(unknown, Err(BoardError::Unauthenticated)));
    Ok(())
}

#[tokio::test]
async fn duplicate_usernames_conflict() -> Result<(), Box<dyn Error>> {
    let db = common::db_with_users(&["alice"]).await?;

    let dup = db.users().register("alice", "other").await;
    assert!(matches!(dup, Err(BoardError::Conflict(_))));

    // The original password still works.
    db.users()
        .authenticate("alice", &common::password_for("alice"))
        .await?;
    Ok(())
}

#[tokio::test]
async fn blank_credentials_are_rejected() -> Result<(), Box<dyn Error>> {
    let db = common::memory_db().await?;

    let blank_name = db.users().register("  ", "pw").await;
    assert!(matches!(blank_name, Err(BoardError::InvalidInput(_))));

    let blank_password = db.users().register("alice", "").await;
    assert!(matches!(blank_password, Err(BoardError::InvalidInput(_))));

    assert!(db.user_store().read().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_user_is_not_found() -> Result<(), Box<dyn Error>> {
    let db = common::memory_db().await?;
    assert!(matches!(
        db.users().get("nobody").await,
        Err(BoardError::NotFound(_))
    ));
    assert!(matches!(
        db.users().profile("nobody").await,
        Err(BoardError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn usernames_are_trimmed_everywhere() -> Result<(), Box<dyn Error>> {
    let db = common::memory_db().await?;

    db.users().register(" alice ", "pw").await?;
    assert!(db.user_store().read().await?.contains_key("alice"));

    db.users().authenticate(" alice", "pw").await?;
    db.users().authenticate("alice", "pw").await?;
    assert_eq!(db.users().get("alice ").await?.username, "alice");
    assert_eq!(db.users().profile("\talice").await?.username, "alice");
    Ok(())
}
