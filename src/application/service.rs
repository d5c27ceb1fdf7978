use std::fmt;

use crate::domain::{
    Amount, Ledger, Transaction, User, UserId, format_amount, is_plausible_email,
};
use crate::storage::{NewAccount, Repository};

use super::AppError;

/// Application service enforcing account and transfer rules.
/// This is the primary interface for any client (menu, subcommands, tests).
///
/// The service owns the ledger of transfers completed through it.
pub struct TransferService {
    repo: Repository,
    ledger: Ledger,
}

/// Result of a balance check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceCheck {
    pub user_id: UserId,
    pub name: String,
    pub balance: Amount,
}

/// Result of a completed transfer
#[derive(Debug, Clone)]
pub struct TransferResult {
    pub transaction: Transaction,
}

/// Result of creating an account
#[derive(Debug, Clone)]
pub struct CreatedAccount {
    pub user: User,
}

/// Result of deleting an account
#[derive(Debug, Clone)]
pub struct DeletedAccount {
    pub user: User,
}

impl fmt::Display for BalanceCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Balance for {}: {}", self.name, format_amount(self.balance))
    }
}

impl fmt::Display for TransferResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully transferred {} from {} to {}",
            format_amount(self.transaction.amount),
            self.transaction.sender_name,
            self.transaction.receiver_name
        )
    }
}

impl fmt::Display for CreatedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Account created successfully for {} with ID {}",
            self.user.name, self.user.id
        )
    }
}

impl fmt::Display for DeletedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Account for {} (ID: {}) deleted successfully",
            self.user.name, self.user.id
        )
    }
}

impl TransferService {
    /// Create a service with an empty ledger.
    pub fn new(repo: Repository) -> Self {
        Self::with_ledger(repo, Ledger::new())
    }

    /// Create a service that appends to an existing ledger.
    pub fn with_ledger(repo: Repository, ledger: Ledger) -> Self {
        Self { repo, ledger }
    }

    /// Initialize a database at the given path, creating it if needed.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to a database, creating the file and schema if they are
    /// missing. The migration is idempotent.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        Self::init(database_path).await
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    // ========================
    // Balances
    // ========================

    /// Check the balance of the user matching both ID and name.
    pub async fn check_balance(
        &self,
        user_id: UserId,
        name: &str,
    ) -> Result<BalanceCheck, AppError> {
        if user_id == 0 || name.is_empty() {
            return Err(AppError::InvalidInput(
                "User ID and name are required".to_string(),
            ));
        }

        let balance = self
            .repo
            .get_balance(user_id, name)
            .await?
            .ok_or_else(|| AppError::NotFoundByName {
                id: user_id,
                name: name.to_string(),
            })?;

        Ok(BalanceCheck {
            user_id,
            name: name.to_string(),
            balance,
        })
    }

    // ========================
    // Transfers
    // ========================

    /// Move `amount` from the sender (confirmed by name) to the receiver.
    ///
    /// The two balance writes are separate store calls. Each is guarded by
    /// the balance read at the start, so a concurrent change makes the
    /// transfer fail rather than overwrite it. If the receiver write fails,
    /// the sender is restored; `PartialFailure` means that restore failed too.
    pub async fn transfer_funds(
        &mut self,
        sender_id: UserId,
        sender_name: &str,
        receiver_id: UserId,
        amount: Amount,
    ) -> Result<TransferResult, AppError> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount(
                "Transfer amount must be greater than 0".to_string(),
            ));
        }

        let sender = self
            .repo
            .lookup_by_id_and_name(sender_id, sender_name)
            .await?
            .ok_or_else(|| AppError::SenderNotFound {
                id: sender_id,
                name: sender_name.to_string(),
            })?;

        let receiver = self
            .repo
            .lookup_by_id(receiver_id)
            .await?
            .ok_or(AppError::ReceiverNotFound { id: receiver_id })?;

        if sender.id == receiver.id {
            return Err(AppError::InvalidInput(
                "Sender and receiver must be different accounts".to_string(),
            ));
        }

        if sender.balance < amount {
            return Err(AppError::InsufficientFunds {
                balance: sender.balance,
                required: amount,
            });
        }

        let transaction = Transaction::between(&sender, &receiver, amount).ok_or_else(|| {
            AppError::InvalidAmount(format!(
                "Transfer of {} would overflow the balance of {}",
                format_amount(amount),
                receiver.name
            ))
        })?;

        if !self
            .repo
            .compare_and_set_balance(
                sender.id,
                transaction.sender_balance_before,
                transaction.sender_balance_after,
            )
            .await?
        {
            return Err(AppError::SenderUpdateFailed);
        }

        let credited = self
            .repo
            .compare_and_set_balance(
                receiver.id,
                transaction.receiver_balance_before,
                transaction.receiver_balance_after,
            )
            .await;

        match credited {
            Ok(true) => {}
            Ok(false) => return Err(self.restore_sender(&transaction).await),
            Err(err) => {
                tracing::warn!(error = %err, "receiver update errored, restoring sender");
                return Err(self.restore_sender(&transaction).await);
            }
        }

        tracing::info!(
            sender_id = transaction.sender_id,
            receiver_id = transaction.receiver_id,
            amount,
            "transfer completed"
        );
        let transaction = self.ledger.record(transaction).clone();
        Ok(TransferResult { transaction })
    }

    /// Undo the sender-side write of a transfer whose receiver write failed.
    async fn restore_sender(&self, transaction: &Transaction) -> AppError {
        let restored = self
            .repo
            .compare_and_set_balance(
                transaction.sender_id,
                transaction.sender_balance_after,
                transaction.sender_balance_before,
            )
            .await;

        match restored {
            Ok(true) => AppError::RolledBack,
            Ok(false) | Err(_) => {
                tracing::error!(
                    sender_id = transaction.sender_id,
                    sender_balance = transaction.sender_balance_before,
                    "could not restore sender balance"
                );
                AppError::PartialFailure {
                    sender_id: transaction.sender_id,
                    sender_balance: transaction.sender_balance_before,
                    receiver_id: transaction.receiver_id,
                    amount: transaction.amount,
                }
            }
        }
    }

    /// Transfers completed through this service, oldest first.
    pub fn transaction_history(&self) -> &[Transaction] {
        self.ledger.entries()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // ========================
    // Accounts
    // ========================

    /// Create a new account.
    pub async fn create_account(
        &self,
        name: &str,
        email: &str,
        initial_balance: Amount,
    ) -> Result<CreatedAccount, AppError> {
        let name = name.trim();
        let email = email.trim();

        if name.is_empty() || email.is_empty() {
            return Err(AppError::InvalidInput(
                "Name and email are required".to_string(),
            ));
        }
        if !is_plausible_email(email) {
            return Err(AppError::InvalidInput("Invalid email format".to_string()));
        }
        if initial_balance < 0 {
            return Err(AppError::InvalidAmount(
                "Initial balance cannot be negative".to_string(),
            ));
        }

        match self.repo.create_account(name, email, initial_balance).await? {
            NewAccount::Created(user) => {
                tracing::info!(user_id = user.id, "account created");
                Ok(CreatedAccount { user })
            }
            NewAccount::EmailTaken => Err(AppError::Conflict(email.to_string())),
        }
    }

    /// Delete an account after confirming the holder's name.
    pub async fn delete_account(
        &self,
        user_id: UserId,
        confirm_name: &str,
    ) -> Result<DeletedAccount, AppError> {
        if user_id == 0 {
            return Err(AppError::InvalidInput("User ID is required".to_string()));
        }

        let user = self
            .repo
            .lookup_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound { id: user_id })?;

        if !user.is_named(confirm_name) {
            return Err(AppError::NameConfirmationFailed);
        }

        // The row may have been renamed or removed since the lookup.
        let user = self
            .repo
            .delete_account_named(user_id, confirm_name)
            .await?
            .ok_or(AppError::NotFound { id: user_id })?;

        tracing::info!(user_id = user.id, "account deleted");
        Ok(DeletedAccount { user })
    }

    /// List every user in the store.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.repo.list_all().await?)
    }
}
