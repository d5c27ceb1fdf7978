// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use banksim::application::TransferService;
use banksim::domain::{User, UserId};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(TransferService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = TransferService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Create an account and return the stored user.
pub async fn create_user(service: &TransferService, name: &str, balance: i64) -> Result<User> {
    let email = format!("{}@example.com", name.to_lowercase());
    Ok(service.create_account(name, &email, balance).await?.user)
}

/// Current balance straight from the store.
pub async fn balance_of(service: &TransferService, id: UserId) -> Result<i64> {
    let user = service
        .repository()
        .lookup_by_id(id)
        .await?
        .expect("user should exist");
    Ok(user.balance)
}

/// Run raw SQL against the test database.
pub async fn execute(service: &TransferService, sql: &str) -> Result<()> {
    sqlx::query(sql)
        .execute(service.repository().pool())
        .await?;
    Ok(())
}

/// Store fault injection via SQLite triggers.
pub struct Faults;

impl Faults {
    /// Every balance write to this user aborts.
    pub async fn freeze(service: &TransferService, id: UserId) -> Result<()> {
        execute(
            service,
            &format!(
                "CREATE TRIGGER freeze_{id} BEFORE UPDATE OF balance ON users \
                 WHEN NEW.id = {id} BEGIN SELECT RAISE(ABORT, 'account frozen'); END"
            ),
        )
        .await
    }

    /// Writes setting this user's balance back to `balance` abort.
    pub async fn block_restore(
        service: &TransferService,
        id: UserId,
        balance: i64,
    ) -> Result<()> {
        execute(
            service,
            &format!(
                "CREATE TRIGGER block_restore_{id} BEFORE UPDATE OF balance ON users \
                 WHEN NEW.id = {id} AND NEW.balance = {balance} \
                 BEGIN SELECT RAISE(ABORT, 'restore blocked'); END"
            ),
        )
        .await
    }

    /// Any write to `watched` also nudges `bumped` by one, as a concurrent
    /// writer would.
    pub async fn interfere(
        service: &TransferService,
        watched: UserId,
        bumped: UserId,
    ) -> Result<()> {
        execute(
            service,
            &format!(
                "CREATE TRIGGER interfere_{watched} AFTER UPDATE OF balance ON users \
                 WHEN NEW.id = {watched} \
                 BEGIN UPDATE users SET balance = balance + 1 WHERE id = {bumped}; END"
            ),
        )
        .await
    }

    /// Remove the table so every store call fails.
    pub async fn drop_store(service: &TransferService) -> Result<()> {
        execute(service, "DROP TABLE users").await
    }
}
