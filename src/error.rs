// Error types
//
// StoreError covers expected business outcomes: every variant means the
// operation was rejected and no state changed. PersistenceError is the fault
// class for the local snapshot slot and never mixes with business rejections.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Insufficient balance: {available} available, {requested} requested")]
    InsufficientBalance {
        available: Decimal,
        requested: Decimal,
    },

    #[error("Slip is empty")]
    EmptySlip,

    #[error("Selection already in slip: {selection} ({market}) on {match_id}")]
    DuplicateSelection {
        match_id: String,
        market: String,
        selection: String,
    },

    #[error("Stake must be greater than zero")]
    InvalidStake,

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Odds must be at least 1.00, got {0}")]
    InvalidOdds(Decimal),

    /// Money or odds arithmetic would leave the representable range
    #[error("Amount out of range")]
    AmountOutOfRange,

    #[error("Match {0} not found")]
    MatchNotFound(String),

    #[error("Market {market} not offered on match {match_id}")]
    MarketNotFound { match_id: String, market: String },

    #[error("Selection '{label}' not offered in {market} on match {match_id}")]
    SelectionNotFound {
        match_id: String,
        market: String,
        label: String,
    },

    #[error("Slip selection {0} not found")]
    SelectionIdNotFound(String),

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Transaction {0} not found")]
    TransactionNotFound(String),

    #[error("Transaction {0} is not a withdrawal request")]
    NotAWithdrawal(String),

    #[error("Withdrawal {0} has already been reviewed")]
    AlreadyResolved(String),

    #[error("Notification {0} not found")]
    NotificationNotFound(String),

    #[error("Ticket {0} not found")]
    TicketNotFound(String),
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("snapshot storage unavailable: {0}")]
    Storage(#[from] sled::Error),

    #[error("snapshot encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_business_messages() {
        assert_eq!(StoreError::InvalidCredentials.to_string(), "Invalid credentials");
        assert_eq!(StoreError::EmptySlip.to_string(), "Slip is empty");

        let err = StoreError::InsufficientBalance {
            available: dec!(5.00),
            requested: dec!(10),
        };
        assert!(err.to_string().starts_with("Insufficient balance"));
    }
}
