// Blockchain module
//
// This module contains the ledger core:
// - Account registry
// - Transactions and transfer validation
// - Pending pool
// - Blocks and the chain
// - Mining progress emitter
// - Shared ledger handle

pub mod account;
pub mod block;
pub mod chain;
pub mod mining;
pub mod pool;
pub mod shared;
pub mod transaction;

// Re-export main components for easier access
pub use account::{Account, AccountError, AccountId, AccountRegistry};
pub use block::Block;
pub use chain::{Ledger, LedgerError, LedgerSummary, MiningResult, SubmissionResult};
pub use mining::{mine_with_progress, MiningProgress, ProgressOutcome};
pub use pool::PendingPool;
pub use shared::SharedLedger;
pub use transaction::{validate_transfer, Transaction, TransactionError};
