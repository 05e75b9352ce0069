use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::transaction::Transaction;

/// Link value stored in the genesis block
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Represents a sealed block in the chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Block {
    /// Index of the block in the chain
    pub index: u64,

    /// Timestamp when the block was created
    #[schema(value_type = String, example = "2023-01-01T12:00:00Z")]
    pub timestamp: DateTime<Utc>,

    /// Transactions sealed in this block, in submission order
    pub transactions: Vec<Transaction>,

    /// Link to the previous block.
    ///
    /// This is the previous block's index rendered as a string, not a digest.
    pub previous_hash: String,
}

impl Block {
    /// Creates a block linked to the block at `index - 1`
    pub fn new(index: u64, transactions: Vec<Transaction>) -> Self {
        Block {
            index,
            timestamp: Utc::now(),
            transactions,
            previous_hash: Self::link_for(index),
        }
    }

    /// Creates the first block of a chain
    pub fn genesis() -> Self {
        Block::new(0, Vec::new())
    }

    /// Expected `previous_hash` of the block at `index`
    pub fn link_for(index: u64) -> String {
        match index.checked_sub(1) {
            Some(previous) => previous.to_string(),
            None => GENESIS_PREVIOUS_HASH.to_string(),
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::AccountId;

    #[test]
    fn test_genesis_block() {
        let genesis = Block::genesis();

        assert_eq!(genesis.index, 0);
        assert!(genesis.transactions.is_empty());
        assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
        assert!(genesis.is_genesis());
    }

    #[test]
    fn test_new_block_links_to_previous_index() {
        let transactions = vec![
            Transaction::new(AccountId::from("a"), AccountId::from("b"), 1.0),
            Transaction::new(AccountId::from("b"), AccountId::from("c"), 2.0),
        ];

        let block = Block::new(3, transactions.clone());

        assert_eq!(block.index, 3);
        assert_eq!(block.previous_hash, "2");
        assert_eq!(block.transactions, transactions);
        assert_eq!(Block::link_for(1), "0");
    }
}
