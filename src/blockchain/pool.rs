use std::mem;

use super::transaction::Transaction;

/// Admitted transactions waiting to be sealed into a block, in arrival order
#[derive(Debug, Clone, Default)]
pub struct PendingPool {
    transactions: Vec<Transaction>,
}

impl PendingPool {
    pub fn new() -> Self {
        PendingPool {
            transactions: Vec::new(),
        }
    }

    pub fn push(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// Takes every pending transaction, leaving the pool empty
    pub fn drain(&mut self) -> Vec<Transaction> {
        mem::take(&mut self.transactions)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
