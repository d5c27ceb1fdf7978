use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Amount, User, UserId, format_amount};

/// A completed transfer between two users, with both balances captured
/// before and after the move. Never persisted to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender_id: UserId,
    pub sender_name: String,
    pub receiver_id: UserId,
    pub receiver_name: String,
    /// Always positive
    pub amount: Amount,
    pub sender_balance_before: Amount,
    pub sender_balance_after: Amount,
    pub receiver_balance_before: Amount,
    pub receiver_balance_after: Amount,
    /// When the transfer was assembled
    pub recorded_at: DateTime<Utc>,
}

impl Transaction {
    /// Build the record for moving `amount` from `sender` to `receiver`,
    /// where both users carry the balances read before the move.
    /// Returns `None` when either resulting balance would overflow.
    pub fn between(sender: &User, receiver: &User, amount: Amount) -> Option<Self> {
        let sender_balance_after = sender.balance.checked_sub(amount)?;
        let receiver_balance_after = receiver.balance.checked_add(amount)?;

        Some(Self {
            sender_id: sender.id,
            sender_name: sender.name.clone(),
            receiver_id: receiver.id,
            receiver_name: receiver.name.clone(),
            amount,
            sender_balance_before: sender.balance,
            sender_balance_after,
            receiver_balance_before: receiver.balance,
            receiver_balance_after,
            recorded_at: Utc::now(),
        })
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{rule}")?;
        writeln!(f, "TRANSACTION DETAILS")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "From: {} (ID: {})", self.sender_name, self.sender_id)?;
        writeln!(f, "To: {} (ID: {})", self.receiver_name, self.receiver_id)?;
        writeln!(f, "Amount: {}", format_amount(self.amount))?;
        writeln!(
            f,
            "Sender Balance: {} → {}",
            format_amount(self.sender_balance_before),
            format_amount(self.sender_balance_after)
        )?;
        writeln!(
            f,
            "Receiver Balance: {} → {}",
            format_amount(self.receiver_balance_before),
            format_amount(self.receiver_balance_after)
        )?;
        write!(f, "{rule}")
    }
}
