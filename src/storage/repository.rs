use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

use crate::domain::{Amount, User, UserId};

use super::MIGRATION_001_USERS;

const USER_COLUMNS: &str = "id, name, email, balance";

/// Outcome of inserting a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewAccount {
    Created(User),
    /// The UNIQUE constraint on `email` rejected the row.
    EmailTaken,
}

/// Repository for reading and writing rows of the `users` table.
///
/// Every store failure is logged here and handed back to the caller with
/// context attached; a missing row is `None`, never an error.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(store_fault("Failed to connect to database"))?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_USERS)
            .execute(&self.pool)
            .await
            .map_err(store_fault("Failed to run migration 001"))?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// The underlying pool, for callers that need raw access to the store.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ========================
    // Lookups
    // ========================

    /// Get a user by ID.
    pub async fn lookup_by_id(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_fault("Failed to fetch user"))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    /// Get a user by ID and exact name. This is the only check standing in
    /// for authentication.
    pub async fn lookup_by_id_and_name(&self, id: UserId, name: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ? AND name = ?"
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_fault("Failed to fetch user by name"))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    /// Balance of the user matching both ID and name.
    pub async fn get_balance(&self, id: UserId, name: &str) -> Result<Option<Amount>> {
        Ok(self
            .lookup_by_id_and_name(id, name)
            .await?
            .map(|user| user.balance))
    }

    /// List all users ordered by ID.
    pub async fn list_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(store_fault("Failed to list users"))?;

        rows.iter().map(Self::row_to_user).collect()
    }

    // ========================
    // Balance writes
    // ========================

    /// Unconditionally set a user's balance.
    /// Returns true if a row was updated.
    pub async fn update_balance(&self, id: UserId, new_balance: Amount) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET balance = ? WHERE id = ?")
            .bind(new_balance)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_fault("Failed to update balance"))?;

        Ok(result.rows_affected() > 0)
    }

    /// Set a user's balance only if it still equals `expected`.
    /// Returns false when the row is gone or was changed by someone else.
    pub async fn compare_and_set_balance(
        &self,
        id: UserId,
        expected: Amount,
        new_balance: Amount,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET balance = ? WHERE id = ? AND balance = ?")
            .bind(new_balance)
            .bind(id)
            .bind(expected)
            .execute(&self.pool)
            .await
            .map_err(store_fault("Failed to update balance"))?;

        if result.rows_affected() == 0 {
            tracing::debug!(user_id = id, expected, "balance changed underneath update");
        }
        Ok(result.rows_affected() > 0)
    }

    // ========================
    // Account lifecycle
    // ========================

    /// Insert a new user. Email uniqueness is enforced by the table itself,
    /// so there is no window between checking and inserting.
    pub async fn create_account(
        &self,
        name: &str,
        email: &str,
        initial_balance: Amount,
    ) -> Result<NewAccount> {
        let result = sqlx::query(&format!(
            "INSERT INTO users (name, email, balance) VALUES (?, ?, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(initial_balance)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(NewAccount::Created(Self::row_to_user(&row)?)),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                tracing::debug!(email, "email already registered");
                Ok(NewAccount::EmailTaken)
            }
            Err(err) => Err(store_fault("Failed to create account")(err)),
        }
    }

    /// Delete a user by ID, returning the removed row.
    pub async fn delete_account(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "DELETE FROM users WHERE id = ? RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_fault("Failed to delete account"))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    /// Delete a user only if both ID and name still match.
    pub async fn delete_account_named(&self, id: UserId, name: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "DELETE FROM users WHERE id = ? AND name = ? RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_fault("Failed to delete account"))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
        Ok(User {
            id: row.try_get("id").context("Invalid user ID")?,
            name: row.try_get("name").context("Invalid user name")?,
            email: row.try_get("email").context("Invalid user email")?,
            balance: row.try_get("balance").context("Invalid user balance")?,
        })
    }
}

/// Log a store error and wrap it with context for the caller.
fn store_fault(action: &'static str) -> impl FnOnce(sqlx::Error) -> anyhow::Error {
    move |err| {
        tracing::error!(error = %err, "{action}");
        anyhow::Error::new(err).context(action)
    }
}
