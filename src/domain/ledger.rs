use super::Transaction;

/// Append-only, in-memory record of completed transfers.
/// Lives as long as its owner; nothing here reaches the store.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed transfer and return a reference to it.
    pub fn record(&mut self, transaction: Transaction) -> &Transaction {
        self.entries.push(transaction);
        &self.entries[self.entries.len() - 1]
    }

    /// All transfers in the order they completed.
    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn last(&self) -> Option<&Transaction> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
