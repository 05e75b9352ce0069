use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use std::fmt;

use super::account::{AccountId, AccountRegistry};

/// Reasons a transfer is refused.
///
/// The display strings are shown to users as-is.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransactionError {
    #[error("Sender and receiver are required.")]
    MissingParty,

    #[error("Sender and receiver must be different.")]
    SameParty,

    #[error("Amount must be greater than 0.")]
    NonPositiveAmount(f64),

    #[error("{sender} has insufficient balance.")]
    InsufficientBalance {
        sender: AccountId,
        required: f64,
        available: f64,
    },

    #[error("Amount is too large.")]
    AmountTooLarge(f64),
}

/// A balance transfer between two accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    /// Unique identifier for the transaction
    #[schema(value_type = String, example = "1b4e28ba-2fa1-11d2-883f-0016d3cca427")]
    pub id: Uuid,

    /// Account the coins come from
    #[schema(value_type = String, example = "Bank Network")]
    pub sender: AccountId,

    /// Account the coins go to
    #[schema(value_type = String, example = "Alice")]
    pub receiver: AccountId,

    /// Amount being transferred
    pub amount: f64,

    /// Timestamp when the transaction was accepted
    #[schema(value_type = String, example = "2023-01-01T12:00:00Z")]
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(sender: AccountId, receiver: AccountId, amount: f64) -> Self {
        Transaction {
            id: Uuid::new_v4(),
            sender,
            receiver,
            amount,
            timestamp: Utc::now(),
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}: {} coins", self.sender, self.receiver, self.amount)
    }
}

/// Decides whether a transfer may be admitted, without touching any state.
///
/// Names are compared after trimming. Accounts missing from `registry` are
/// judged as if they already held `default_balance`. `privileged` is never
/// balance checked as a sender, but no transfer may push a balance or the
/// total supply out of the finite range.
pub fn validate_transfer(
    registry: &AccountRegistry,
    privileged: &str,
    default_balance: f64,
    sender: &str,
    receiver: &str,
    amount: f64,
) -> Result<(), TransactionError> {
    let sender = sender.trim();
    let receiver = receiver.trim();

    if sender.is_empty() || receiver.is_empty() {
        return Err(TransactionError::MissingParty);
    }

    if sender == receiver {
        return Err(TransactionError::SameParty);
    }

    if !amount.is_finite() || amount <= 0.0 {
        return Err(TransactionError::NonPositiveAmount(amount));
    }

    if sender != privileged {
        let available = registry.balance(sender).unwrap_or(default_balance);
        if available < amount {
            return Err(TransactionError::InsufficientBalance {
                sender: AccountId::from(sender),
                required: amount,
                available,
            });
        }
    }

    let receiver_after = registry.balance(receiver).unwrap_or(default_balance) + amount;
    if !receiver_after.is_finite() {
        return Err(TransactionError::AmountTooLarge(amount));
    }

    if sender == privileged {
        let provisioned = [sender, receiver]
            .iter()
            .filter(|id| !registry.contains(**id))
            .count() as f64;
        let supply_after = registry.total() + provisioned * default_balance + amount;
        if !supply_after.is_finite() {
            return Err(TransactionError::AmountTooLarge(amount));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANK: &str = "Bank Network";

    fn registry() -> AccountRegistry {
        let mut registry = AccountRegistry::new();
        registry.ensure(&AccountId::from(BANK), 1_000_000.0);
        registry.ensure(&AccountId::from("Bob"), 100.0);
        registry
    }

    #[test]
    fn test_new_transaction() {
        let tx = Transaction::new(AccountId::from("Bob"), AccountId::from("Carol"), 30.0);

        assert_eq!(tx.sender.as_str(), "Bob");
        assert_eq!(tx.receiver.as_str(), "Carol");
        assert_eq!(tx.amount, 30.0);
        assert_eq!(tx.to_string(), "Bob → Carol: 30 coins");

        let other = Transaction::new(AccountId::from("Bob"), AccountId::from("Carol"), 30.0);
        assert_ne!(tx.id, other.id);
    }

    #[test]
    fn test_valid_transfer() {
        let registry = registry();
        assert!(validate_transfer(&registry, BANK, 100.0, "Bob", "Carol", 30.0).is_ok());
        assert!(validate_transfer(&registry, BANK, 100.0, "Bob", "Carol", 100.0).is_ok());
    }

    #[test]
    fn test_non_positive_amount() {
        let registry = registry();

        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = validate_transfer(&registry, BANK, 100.0, "Bob", "Carol", amount).unwrap_err();
            assert!(matches!(err, TransactionError::NonPositiveAmount(_)));
            assert_eq!(err.to_string(), "Amount must be greater than 0.");
        }
    }

    #[test]
    fn test_insufficient_balance_uses_default_for_unseen_sender() {
        let registry = registry();

        let err = validate_transfer(&registry, BANK, 100.0, "Dave", "Eve", 1000.0).unwrap_err();
        assert_eq!(
            err,
            TransactionError::InsufficientBalance {
                sender: AccountId::from("Dave"),
                required: 1000.0,
                available: 100.0,
            }
        );
        assert_eq!(err.to_string(), "Dave has insufficient balance.");
    }

    #[test]
    fn test_privileged_sender_skips_balance_check() {
        let registry = registry();
        assert!(validate_transfer(&registry, BANK, 100.0, BANK, "Alice", 5_000_000.0).is_ok());
    }

    #[test]
    fn test_identity_checks() {
        let registry = registry();

        assert_eq!(
            validate_transfer(&registry, BANK, 100.0, " ", "Carol", 1.0),
            Err(TransactionError::MissingParty)
        );
        assert_eq!(
            validate_transfer(&registry, BANK, 100.0, "Bob", "", 1.0),
            Err(TransactionError::MissingParty)
        );
        assert_eq!(
            validate_transfer(&registry, BANK, 100.0, "Bob", "Bob", 1.0),
            Err(TransactionError::SameParty)
        );
        assert_eq!(
            validate_transfer(&registry, BANK, 100.0, "Bob", " Bob ", 1.0),
            Err(TransactionError::SameParty)
        );
    }

    #[test]
    fn test_padded_sender_is_checked_as_trimmed() {
        let registry = registry();

        let err = validate_transfer(&registry, BANK, 0.0, " Bob", "Carol", 150.0).unwrap_err();
        assert!(matches!(err, TransactionError::InsufficientBalance { available, .. } if available == 100.0));
    }

    #[test]
    fn test_amount_that_overflows_receiver() {
        let mut registry = registry();
        registry.ensure(&AccountId::from("Alice"), f64::MAX);

        let err = validate_transfer(&registry, BANK, 100.0, BANK, "Alice", f64::MAX).unwrap_err();
        assert_eq!(err, TransactionError::AmountTooLarge(f64::MAX));
        assert_eq!(err.to_string(), "Amount is too large.");
    }

    #[test]
    fn test_amount_that_overflows_total_supply() {
        let mut registry = registry();
        registry.ensure(&AccountId::from("Alice"), f64::MAX / 2.0 + f64::MAX / 4.0);

        // Carol alone could hold it, but the sum of all balances could not
        let err = validate_transfer(&registry, BANK, 100.0, BANK, "Carol", f64::MAX / 2.0).unwrap_err();
        assert_eq!(err, TransactionError::AmountTooLarge(f64::MAX / 2.0));
    }
}
