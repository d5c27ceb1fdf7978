use thiserror::Error;

use crate::domain::{Amount, UserId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    InvalidAmount(String),

    #[error("User with ID {id} not found")]
    NotFound { id: UserId },

    #[error("User with ID {id} and name '{name}' not found")]
    NotFoundByName { id: UserId, name: String },

    #[error("Sender with ID {id} and name '{name}' not found")]
    SenderNotFound { id: UserId, name: String },

    #[error("Receiver with ID {id} not found")]
    ReceiverNotFound { id: UserId },

    #[error("Insufficient balance. Current balance: ${balance}, Required: ${required}")]
    InsufficientFunds { balance: Amount, required: Amount },

    #[error("Email {0} already exists")]
    Conflict(String),

    #[error("Name confirmation failed. Account not deleted.")]
    NameConfirmationFailed,

    #[error("Failed to update sender balance")]
    SenderUpdateFailed,

    #[error("Failed to update receiver balance. Transaction rolled back")]
    RolledBack,

    #[error(
        "Failed to update receiver balance and could not restore sender {sender_id} to ${sender_balance}; balances are inconsistent"
    )]
    PartialFailure {
        sender_id: UserId,
        sender_balance: Amount,
        receiver_id: UserId,
        amount: Amount,
    },

    #[error("Store error: {0:#}")]
    StoreFault(#[from] anyhow::Error),
}

impl AppError {
    /// True when the store itself failed, as opposed to a rule rejecting
    /// the request.
    pub fn is_store_fault(&self) -> bool {
        matches!(self, AppError::StoreFault(_))
    }
}
