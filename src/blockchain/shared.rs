use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::account::AccountId;
use super::block::Block;
use super::chain::{Ledger, LedgerError, LedgerSummary, MiningResult, SubmissionResult};
use super::transaction::Transaction;
use crate::config::LedgerConfig;

/// Cloneable handle to one ledger shared between tasks.
///
/// Every mutation runs under a single lock acquisition, so a block always
/// seals exactly the transactions admitted before it.
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        SharedLedger {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    pub fn with_config(config: LedgerConfig) -> Result<Self, LedgerError> {
        Ok(Self::new(Ledger::with_config(config)?))
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        // Mutations validate before writing anything
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with shared access to the ledger
    pub fn read<T>(&self, f: impl FnOnce(&Ledger) -> T) -> T {
        let guard = self.lock();
        f(&*guard)
    }

    pub fn submit_transaction(&self, sender: &str, receiver: &str, amount: f64) -> SubmissionResult {
        self.lock().submit_transaction(sender, receiver, amount)
    }

    pub fn mine(&self, miner: &str) -> MiningResult {
        self.lock().mine(miner)
    }

    pub fn summary(&self) -> LedgerSummary {
        self.read(Ledger::summary)
    }

    pub fn balance(&self, id: &str) -> Option<f64> {
        self.read(|ledger| ledger.balance(id))
    }

    pub fn balances(&self) -> Vec<(AccountId, f64)> {
        self.read(Ledger::balances)
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.read(|ledger| ledger.pending_transactions().to_vec())
    }

    pub fn chain(&self) -> Vec<Block> {
        self.read(|ledger| ledger.chain().to_vec())
    }

    pub fn is_valid(&self) -> bool {
        self.read(Ledger::is_valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_concurrent_submissions_and_mining() {
        let shared = SharedLedger::default();

        let submitters: Vec<_> = (0..4)
            .map(|worker| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        let receiver = format!("worker-{}", worker);
                        assert!(shared.submit_transaction("Bank Network", &receiver, 1.0).accepted);
                    }
                })
            })
            .collect();

        let miner = {
            let shared = shared.clone();
            thread::spawn(move || {
                for _ in 0..10 {
                    shared.mine("miner");
                }
            })
        };

        for handle in submitters {
            handle.join().unwrap();
        }
        miner.join().unwrap();
        shared.mine("miner");

        let chain = shared.chain();
        assert_eq!(chain.len(), 12);
        assert!(shared.pending_transactions().is_empty());
        assert!(shared.is_valid());

        let sealed: Vec<_> = chain.iter().flat_map(|block| block.transactions.iter()).collect();
        let unique: HashSet<_> = sealed.iter().map(|tx| tx.id).collect();
        assert_eq!(sealed.len(), 100);
        assert_eq!(unique.len(), 100);

        for worker in 0..4 {
            assert_eq!(shared.balance(&format!("worker-{}", worker)), Some(125.0));
        }
        assert_eq!(shared.balance("miner"), Some(100.0 + 11.0 * 10.0));
    }

    #[test]
    fn test_clones_share_state() {
        let shared = SharedLedger::default();
        let other = shared.clone();

        shared.submit_transaction("Bob", "Carol", 5.0);
        assert_eq!(other.summary().pending_count, 1);
        assert_eq!(other.balances().len(), 3);
    }
}
