#![allow(dead_code)]

use db::{BoardError, Database, DbConfig};

/// Lowest cost bcrypt accepts; keeps registration fast in tests.
pub const TEST_BCRYPT_COST: u32 = 4;

pub async fn memory_db() -> Result<Database, BoardError> {
    db::init(DbConfig::memory().with_bcrypt_cost(TEST_BCRYPT_COST)).await
}

pub async fn fs_db(root: &std::path::Path) -> Result<Database, BoardError> {
    db::init(DbConfig::filesystem(root).with_bcrypt_cost(TEST_BCRYPT_COST)).await
}

pub async fn register_all(db: &Database, names: &[&str]) -> Result<(), BoardError> {
    for name in names {
        db.users().register(name, &password_for(name)).await?;
    }
    Ok(())
}

pub async fn db_with_users(names: &[&str]) -> Result<Database, BoardError> {
    let db = memory_db().await?;
    register_all(&db, names).await?;
    Ok(db)
}

pub fn password_for(name: &str) -> String {
    format!("{name}-password")
}
