use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use std::collections::HashSet;

use super::account::{AccountError, AccountId, AccountRegistry};
use super::block::{Block, GENESIS_PREVIOUS_HASH};
use super::pool::PendingPool;
use super::transaction::{validate_transfer, Transaction, TransactionError};
use crate::config::{ConfigError, LedgerConfig};

/// Errors that can occur during ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Transaction error: {0}")]
    TransactionError(#[from] TransactionError),

    #[error("Account error: {0}")]
    AccountError(#[from] AccountError),

    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Mining cancelled before the block was sealed")]
    MiningCancelled,
}

/// Outcome of a submission, as reported to the caller
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmissionResult {
    /// Whether the transfer was admitted to the pending pool
    pub accepted: bool,

    /// Confirmation or rejection reason
    pub message: String,

    /// The admitted transaction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Transaction>,
}

/// Outcome of a mining operation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MiningResult {
    /// The newly sealed block
    pub block: Block,

    /// Confirmation naming the miner and the reward
    pub message: String,
}

/// Headline figures of the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LedgerSummary {
    pub account_count: usize,
    pub total_coins: f64,
    pub pending_count: usize,
    pub last_block_index: u64,
}

/// The ledger: account balances, pending pool and sealed chain
#[derive(Debug, Clone)]
pub struct Ledger {
    /// The chain of blocks, never empty
    chain: Vec<Block>,

    /// Transactions admitted since the last block
    pending: PendingPool,

    /// Balance of every known account
    accounts: AccountRegistry,

    config: LedgerConfig,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Creates a ledger with the default settings
    pub fn new() -> Self {
        Self::build(LedgerConfig::default())
    }

    /// Creates a ledger with custom settings
    pub fn with_config(config: LedgerConfig) -> Result<Self, LedgerError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: LedgerConfig) -> Self {
        let mut accounts = AccountRegistry::new();
        accounts.ensure(
            &AccountId::from(config.privileged_account.as_str()),
            config.privileged_seed,
        );

        Ledger {
            chain: vec![Block::genesis()],
            pending: PendingPool::new(),
            accounts,
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn is_privileged(&self, id: &str) -> bool {
        id == self.config.privileged_account
    }

    fn provision(&mut self, id: &AccountId) {
        if self.accounts.ensure(id, self.config.default_balance) {
            debug!("Provisioned account {} with {} coins", id, self.config.default_balance);
        }
    }

    /// Validates a transfer and, if admissible, applies it and queues it.
    ///
    /// Nothing is modified when an error is returned.
    pub fn add_transaction(
        &mut self,
        sender: &str,
        receiver: &str,
        amount: f64,
    ) -> Result<Transaction, LedgerError> {
        let sender = sender.trim();
        let receiver = receiver.trim();

        validate_transfer(
            &self.accounts,
            &self.config.privileged_account,
            self.config.default_balance,
            sender,
            receiver,
            amount,
        )?;

        let transaction = Transaction::new(AccountId::from(sender), AccountId::from(receiver), amount);

        self.provision(&transaction.sender);
        self.provision(&transaction.receiver);

        if !self.is_privileged(sender) {
            self.accounts.debit(sender, amount)?;
        }
        self.accounts.credit(receiver, amount)?;

        self.pending.push(transaction.clone());
        info!("Accepted transaction {} ({})", transaction.id, transaction);

        Ok(transaction)
    }

    /// Submits a transfer, reporting acceptance as a flag plus a message
    pub fn submit_transaction(&mut self, sender: &str, receiver: &str, amount: f64) -> SubmissionResult {
        match self.add_transaction(sender, receiver, amount) {
            Ok(transaction) => SubmissionResult {
                accepted: true,
                message: transaction.to_string(),
                transaction: Some(transaction),
            },
            Err(err) => {
                let message = match err {
                    LedgerError::TransactionError(reason) => reason.to_string(),
                    other => other.to_string(),
                };
                info!("Rejected transaction {} → {} ({}): {}", sender, receiver, amount, message);

                SubmissionResult {
                    accepted: false,
                    message,
                    transaction: None,
                }
            }
        }
    }

    /// Seals every pending transaction into a new block and rewards the miner
    pub fn mine(&mut self, miner: &str) -> MiningResult {
        let miner = AccountId::from(miner.trim());
        self.provision(&miner);

        let index = self.chain.len() as u64;
        let block = Block::new(index, self.pending.drain());
        self.chain.push(block.clone());

        let reward = self.credit_reward(&miner);

        info!(
            "Sealed block {} with {} transactions, mined by {}",
            block.index,
            block.transactions.len(),
            miner
        );

        MiningResult {
            block,
            message: format!("Block mined by {}, reward: {} coins", miner, reward),
        }
    }

    /// Mints the configured reward to `miner` and returns the amount credited.
    ///
    /// The reward is withheld when it would push the miner's balance or the
    /// total supply out of the finite range.
    fn credit_reward(&mut self, miner: &AccountId) -> f64 {
        let reward = self.config.mining_reward;

        if !(self.total_coins() + reward).is_finite() {
            warn!("Mining reward for {} withheld: total supply would overflow", miner);
            return 0.0;
        }

        match self.accounts.credit(miner.as_str(), reward) {
            Ok(()) => reward,
            Err(err) => {
                warn!("Mining reward for {} withheld: {}", miner, err);
                0.0
            }
        }
    }

    /// Number of known accounts
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Sum of every account balance
    pub fn total_coins(&self) -> f64 {
        self.accounts.total()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn last_block(&self) -> &Block {
        // The genesis block is pushed at construction and blocks are never removed
        &self.chain[self.chain.len() - 1]
    }

    pub fn last_block_index(&self) -> u64 {
        self.last_block().index
    }

    pub fn balance(&self, id: &str) -> Option<f64> {
        self.accounts.balance(id)
    }

    /// Balance table in first-seen order
    pub fn balances(&self) -> Vec<(AccountId, f64)> {
        self.accounts
            .iter()
            .map(|account| (account.id.clone(), account.balance))
            .collect()
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        self.pending.transactions()
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary {
            account_count: self.account_count(),
            total_coins: self.total_coins(),
            pending_count: self.pending_count(),
            last_block_index: self.last_block_index(),
        }
    }

    /// Checks the structure of the chain.
    ///
    /// Indices must run from 0 without gaps, every block must link to its
    /// predecessor's index, and no transaction may be recorded twice.
    pub fn is_valid(&self) -> bool {
        match self.chain.first() {
            Some(genesis)
                if genesis.is_genesis()
                    && genesis.transactions.is_empty()
                    && genesis.previous_hash == GENESIS_PREVIOUS_HASH => {}
            _ => return false,
        }

        let mut seen = HashSet::new();

        for (position, block) in self.chain.iter().enumerate() {
            let position = position as u64;

            if block.index != position || block.previous_hash != Block::link_for(position) {
                return false;
            }

            for transaction in &block.transactions {
                if !seen.insert(transaction.id) {
                    return false;
                }
            }
        }

        self.pending
            .transactions()
            .iter()
            .all(|transaction| seen.insert(transaction.id))
    }
}
