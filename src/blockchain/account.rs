use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::borrow::Borrow;
use std::fmt;

/// Errors that can occur during account operations
#[derive(Debug, Error, PartialEq)]
pub enum AccountError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// Identifier of an account (a free-form holder name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(name: impl Into<String>) -> Self {
        AccountId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(name: &str) -> Self {
        AccountId(name.to_string())
    }
}

impl From<String> for AccountId {
    fn from(name: String) -> Self {
        AccountId(name)
    }
}

impl Borrow<str> for AccountId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A balance entry in the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The account holder
    pub id: AccountId,

    /// Coins currently held
    pub balance: f64,
}

fn check_amount(amount: f64) -> Result<(), AccountError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(AccountError::InvalidAmount(format!(
            "Amount must be a non-negative number: {}",
            amount
        )));
    }
    Ok(())
}

impl Account {
    pub fn new(id: AccountId, balance: f64) -> Self {
        Account { id, balance }
    }

    /// Increases the account's balance, refusing to leave the finite range
    pub fn deposit(&mut self, amount: f64) -> Result<(), AccountError> {
        check_amount(amount)?;

        let balance = self.balance + amount;
        if !balance.is_finite() {
            return Err(AccountError::InvalidAmount(format!(
                "Deposit of {} would overflow balance {}",
                amount, self.balance
            )));
        }

        self.balance = balance;
        Ok(())
    }

    /// Decreases the account's balance, refusing to overdraw it
    pub fn withdraw(&mut self, amount: f64) -> Result<(), AccountError> {
        check_amount(amount)?;

        if !self.has_sufficient_funds(amount) {
            return Err(AccountError::InsufficientFunds {
                required: amount,
                available: self.balance,
            });
        }

        self.balance -= amount;
        Ok(())
    }

    pub fn has_sufficient_funds(&self, amount: f64) -> bool {
        self.balance >= amount
    }
}

/// Balance table of every account the ledger has seen.
///
/// Accounts are never created implicitly by a lookup: callers provision them
/// through [`AccountRegistry::ensure`]. Iteration follows first-seen order.
#[derive(Debug, Clone, Default)]
pub struct AccountRegistry {
    accounts: IndexMap<AccountId, Account>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        AccountRegistry {
            accounts: IndexMap::new(),
        }
    }

    /// Inserts `id` with `default_balance` unless it already exists.
    ///
    /// Returns true when a new account was created.
    pub fn ensure(&mut self, id: &AccountId, default_balance: f64) -> bool {
        if self.accounts.contains_key(id) {
            return false;
        }

        self.accounts
            .insert(id.clone(), Account::new(id.clone(), default_balance));
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.accounts.contains_key(id)
    }

    pub fn balance(&self, id: &str) -> Option<f64> {
        self.accounts.get(id).map(|account| account.balance)
    }

    /// Adds coins to an existing account
    pub fn credit(&mut self, id: &str, amount: f64) -> Result<(), AccountError> {
        self.accounts
            .get_mut(id)
            .ok_or_else(|| AccountError::AccountNotFound(id.to_string()))?
            .deposit(amount)
    }

    /// Removes coins from an existing account
    pub fn debit(&mut self, id: &str, amount: f64) -> Result<(), AccountError> {
        self.accounts
            .get_mut(id)
            .ok_or_else(|| AccountError::AccountNotFound(id.to_string()))?
            .withdraw(amount)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Sum of all balances
    pub fn total(&self) -> f64 {
        self.accounts.values().map(|account| account.balance).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }
}
