//! In-memory bank blockchain simulator.
//!
//! The [`blockchain`] module holds the ledger core: balance bookkeeping,
//! transfer validation, the pending pool and block sealing. The [`api`]
//! module is a thin JSON dashboard over a [`blockchain::SharedLedger`].
//!
//! ```rust
//! use bank_ledger::blockchain::Ledger;
//!
//! let mut ledger = Ledger::new();
//! let result = ledger.submit_transaction("Bank Network", "Alice", 50.0);
//! assert!(result.accepted);
//!
//! let mined = ledger.mine("Alice");
//! assert_eq!(mined.block.transactions.len(), 1);
//! assert_eq!(ledger.balance("Alice"), Some(160.0));
//! ```

pub mod api;
pub mod blockchain;
pub mod config;

pub use blockchain::{Block, Ledger, SharedLedger, Transaction};
pub use config::{Config, LedgerConfig};
