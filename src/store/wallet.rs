// ============================================================================
// Wallet & Account Administration
// ============================================================================
//
// Admin balance adjustments, account status and the withdrawal lifecycle.
//
// Withdrawals are debited on approval, not at request time:
//
//   request   -> Pending WithdrawalRequest of -amount, balance untouched
//   approve   -> balance += amount (negative), status Approved
//   reject    -> status Rejected, balance untouched
//
// A new request is checked against the balance minus every withdrawal still
// Pending, so the same funds cannot be requested twice. That reservation only
// binds other withdrawal requests: bet placement checks the raw balance and
// may spend reserved funds. Approval applies the debit even if the balance
// has dropped since the request. Approved and Rejected are terminal.
//
// ============================================================================

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::Sportsbook;
use crate::error::StoreError;
use crate::ids::generate_id;
use crate::models::*;

/// Admin verdict on a pending withdrawal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WithdrawalDecision {
    Approved,
    Rejected,
}

impl From<WithdrawalDecision> for TxStatus {
    fn from(decision: WithdrawalDecision) -> Self {
        match decision {
            WithdrawalDecision::Approved => TxStatus::Approved,
            WithdrawalDecision::Rejected => TxStatus::Rejected,
        }
    }
}

impl Sportsbook {
    /// Sum of still-pending withdrawal requests for `user_id`, as a positive amount
    pub fn pending_withdrawals(&self, user_id: &str) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.user_id == user_id && t.is_pending_withdrawal())
            .fold(Decimal::ZERO, |total, t| total.saturating_sub(t.amount))
    }

    /// Balance not already spoken for by pending withdrawals
    pub fn available_balance(&self, user_id: &str) -> Option<Decimal> {
        self.find_user(user_id)
            .map(|u| u.balance.saturating_sub(self.pending_withdrawals(user_id)))
    }

    /// Apply a signed adjustment and record it with `reason` as the description
    pub fn update_user_balance(
        &mut self,
        user_id: &str,
        amount: Decimal,
        reason: &str,
    ) -> Result<Transaction, StoreError> {
        let idx = self.user_index(user_id)?;
        let balance = self.users[idx]
            .balance
            .checked_add(amount)
            .ok_or(StoreError::AmountOutOfRange)?;

        let transaction = Transaction {
            id: generate_id(),
            user_id: user_id.to_string(),
            tx_type: TxType::AdminAdjustment,
            amount,
            description: reason.to_string(),
            status: TxStatus::Completed,
            created_at: Utc::now(),
            reference_id: None,
        };
        self.users[idx].balance = balance;
        self.transactions.push(transaction.clone());
        self.commit();

        info!(user = user_id, %amount, reason, %balance, "💰 Balance adjusted");
        Ok(transaction)
    }

    pub fn toggle_user_status(&mut self, user_id: &str) -> Result<UserStatus, StoreError> {
        let idx = self.user_index(user_id)?;
        let status = self.users[idx].status.toggled();
        self.users[idx].status = status;
        self.commit();

        info!(user = user_id, ?status, "🔁 User status toggled");
        Ok(status)
    }

    pub fn create_withdrawal_request(
        &mut self,
        amount: Decimal,
    ) -> Result<Transaction, StoreError> {
        let idx = self.bettor_index()?;
        if amount <= Decimal::ZERO {
            return Err(StoreError::InvalidAmount);
        }
        let user_id = self.users[idx].id.clone();
        let available = self.users[idx]
            .balance
            .saturating_sub(self.pending_withdrawals(&user_id));
        if amount > available {
            return Err(StoreError::InsufficientBalance {
                available,
                requested: amount,
            });
        }

        let transaction = Transaction {
            id: generate_id(),
            user_id: user_id.clone(),
            tx_type: TxType::WithdrawalRequest,
            amount: -amount,
            description: "Withdrawal request".to_string(),
            status: TxStatus::Pending,
            created_at: Utc::now(),
            reference_id: None,
        };
        self.transactions.push(transaction.clone());
        self.commit();

        info!(user = %user_id, %amount, tx = %transaction.id, "🏦 Withdrawal requested");
        Ok(transaction)
    }

    pub fn update_transaction_status(
        &mut self,
        transaction_id: &str,
        decision: WithdrawalDecision,
    ) -> Result<(), StoreError> {
        let tx_idx = self
            .transactions
            .iter()
            .position(|t| t.id == transaction_id)
            .ok_or_else(|| StoreError::TransactionNotFound(transaction_id.to_string()))?;
        let transaction = &self.transactions[tx_idx];
        if transaction.tx_type != TxType::WithdrawalRequest {
            return Err(StoreError::NotAWithdrawal(transaction_id.to_string()));
        }
        if transaction.status != TxStatus::Pending {
            return Err(StoreError::AlreadyResolved(transaction_id.to_string()));
        }
        let amount = transaction.amount;

        // New balance resolved before anything is written
        let debit = match decision {
            WithdrawalDecision::Approved => {
                let user_idx = self.user_index(&transaction.user_id)?;
                let balance = self.users[user_idx]
                    .balance
                    .checked_add(amount)
                    .ok_or(StoreError::AmountOutOfRange)?;
                Some((user_idx, balance))
            }
            WithdrawalDecision::Rejected => None,
        };
        if let Some((user_idx, balance)) = debit {
            self.users[user_idx].balance = balance;
        }
        self.transactions[tx_idx].status = decision.into();
        self.commit();

        info!(tx = transaction_id, ?decision, "✅ Withdrawal reviewed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{balance, logged_in_user};
    use crate::store::Outcome;
    use rust_decimal_macros::dec;

    /// user-1 with exactly 100 on the books
    fn user_with_100() -> Sportsbook {
        let mut book = logged_in_user(Outcome::Lost);
        book.update_user_balance("user-1", dec!(-150), "reset").unwrap();
        book
    }

    #[test]
    fn test_admin_correction() {
        let mut book = Sportsbook::new();
        let tx = book.update_user_balance("user-2", dec!(-25), "correction").unwrap();

        assert_eq!(balance(&book, "user-2"), dec!(475));
        assert_eq!(tx.tx_type, TxType::AdminAdjustment);
        assert_eq!(tx.amount, dec!(-25));
        assert_eq!(tx.description, "correction");
        assert_eq!(tx.status, TxStatus::Completed);
        assert_eq!(book.transactions().len(), 1);
    }

    #[test]
    fn test_adjustment_may_go_negative() {
        let mut book = Sportsbook::new();
        book.update_user_balance("user-4", dec!(-10), "chargeback").unwrap();
        assert_eq!(balance(&book, "user-4"), dec!(-10));
    }

    #[test]
    fn test_adjust_unknown_user() {
        let mut book = Sportsbook::new();
        let err = book.update_user_balance("user-99", dec!(5), "bonus").unwrap_err();
        assert_eq!(err, StoreError::UserNotFound("user-99".into()));
        assert!(book.transactions().is_empty());
    }

    #[test]
    fn test_adjustment_out_of_range() {
        let mut book = Sportsbook::new();
        let err = book.update_user_balance("user-2", Decimal::MAX, "fat finger").unwrap_err();
        assert_eq!(err, StoreError::AmountOutOfRange);
        assert_eq!(balance(&book, "user-2"), dec!(500));
        assert!(book.transactions().is_empty());
    }

    #[test]
    fn test_toggle_status() {
        let mut book = Sportsbook::new();
        assert_eq!(book.toggle_user_status("user-4").unwrap(), UserStatus::Active);
        assert_eq!(book.toggle_user_status("user-4").unwrap(), UserStatus::Suspended);
        assert!(book.toggle_user_status("nobody").is_err());
    }

    #[test]
    fn test_withdrawal_approved() {
        let mut book = user_with_100();

        let tx = book.create_withdrawal_request(dec!(50)).unwrap();
        assert_eq!(tx.status, TxStatus::Pending);
        assert_eq!(tx.amount, dec!(-50));
        assert_eq!(tx.description, "Withdrawal request");
        assert_eq!(balance(&book, "user-1"), dec!(100));

        book.update_transaction_status(&tx.id, WithdrawalDecision::Approved).unwrap();
        assert_eq!(balance(&book, "user-1"), dec!(50));
        let stored = book.transactions().iter().find(|t| t.id == tx.id).unwrap();
        assert_eq!(stored.status, TxStatus::Approved);
    }

    #[test]
    fn test_withdrawal_rejected_keeps_balance() {
        let mut book = user_with_100();
        let tx = book.create_withdrawal_request(dec!(40)).unwrap();

        book.update_transaction_status(&tx.id, WithdrawalDecision::Rejected).unwrap();

        assert_eq!(balance(&book, "user-1"), dec!(100));
        assert_eq!(book.pending_withdrawals("user-1"), Decimal::ZERO);
    }

    #[test]
    fn test_reviewed_withdrawal_is_terminal() {
        let mut book = user_with_100();
        let tx = book.create_withdrawal_request(dec!(50)).unwrap();
        book.update_transaction_status(&tx.id, WithdrawalDecision::Approved).unwrap();

        for decision in [WithdrawalDecision::Approved, WithdrawalDecision::Rejected] {
            assert_eq!(
                book.update_transaction_status(&tx.id, decision).unwrap_err(),
                StoreError::AlreadyResolved(tx.id.clone())
            );
        }
        assert_eq!(balance(&book, "user-1"), dec!(50));
    }

    #[test]
    fn test_status_change_on_non_withdrawal() {
        let mut book = user_with_100();
        let adjustment = book.transactions()[0].clone();

        let err = book
            .update_transaction_status(&adjustment.id, WithdrawalDecision::Approved)
            .unwrap_err();
        assert_eq!(err, StoreError::NotAWithdrawal(adjustment.id.clone()));
        assert_eq!(book.transactions()[0], adjustment);
        assert!(matches!(
            book.update_transaction_status("nope", WithdrawalDecision::Rejected),
            Err(StoreError::TransactionNotFound(_))
        ));
    }

    #[test]
    fn test_pending_requests_reserve_funds() {
        let mut book = user_with_100();
        book.create_withdrawal_request(dec!(60)).unwrap();

        let err = book.create_withdrawal_request(dec!(50)).unwrap_err();
        assert_eq!(
            err,
            StoreError::InsufficientBalance {
                available: dec!(40),
                requested: dec!(50)
            }
        );
        assert_eq!(book.available_balance("user-1"), Some(dec!(40)));

        book.create_withdrawal_request(dec!(40)).unwrap();
        assert_eq!(book.available_balance("user-1"), Some(dec!(0)));
    }

    #[test]
    fn test_approval_applies_even_if_balance_dropped() {
        let mut book = user_with_100();
        let tx = book.create_withdrawal_request(dec!(80)).unwrap();
        book.update_user_balance("user-1", dec!(-50), "correction").unwrap();

        book.update_transaction_status(&tx.id, WithdrawalDecision::Approved).unwrap();
        assert_eq!(balance(&book, "user-1"), dec!(-30));
    }

    #[test]
    fn test_out_of_range_approval_stays_pending() {
        let mut book = user_with_100();
        let tx = book.create_withdrawal_request(dec!(100)).unwrap();
        book.update_user_balance("user-1", Decimal::MIN, "write-off").unwrap();
        book.update_user_balance("user-1", dec!(-60), "fee").unwrap();
        let before = balance(&book, "user-1");

        let err = book
            .update_transaction_status(&tx.id, WithdrawalDecision::Approved)
            .unwrap_err();
        assert_eq!(err, StoreError::AmountOutOfRange);
        assert_eq!(balance(&book, "user-1"), before);
        let stored = book.transactions().iter().find(|t| t.id == tx.id).unwrap();
        assert_eq!(stored.status, TxStatus::Pending);

        // Rejecting needs no arithmetic and still goes through
        book.update_transaction_status(&tx.id, WithdrawalDecision::Rejected).unwrap();
        assert_eq!(book.pending_withdrawals("user-1"), Decimal::ZERO);
    }

    #[test]
    fn test_withdrawal_validation() {
        let mut book = user_with_100();
        assert_eq!(book.create_withdrawal_request(dec!(0)).unwrap_err(), StoreError::InvalidAmount);
        assert!(matches!(
            book.create_withdrawal_request(dec!(100.01)),
            Err(StoreError::InsufficientBalance { .. })
        ));

        book.logout();
        assert_eq!(
            book.create_withdrawal_request(dec!(10)).unwrap_err(),
            StoreError::NotAuthenticated
        );
        assert_eq!(book.transactions().len(), 1);
    }

    #[test]
    fn test_balance_conservation() {
        let mut book = logged_in_user(Outcome::Won);
        let seed = balance(&book, "user-1");

        let selection = book.selection_for("nfl-1", MarketType::Moneyline, "Chiefs").unwrap();
        book.add_to_slip(selection).unwrap();
        book.place_bet(dec!(10)).unwrap();
        let selection = book.selection_for("nba-3", MarketType::Spread, "Nuggets +1.5").unwrap();
        book.add_to_slip(selection).unwrap();
        book.place_bet(dec!(20)).unwrap();
        book.update_match("nfl-1", MatchUpdate::status(MatchStatus::Final)).unwrap();
        book.update_user_balance("user-1", dec!(15), "promo credit").unwrap();
        let approved = book.create_withdrawal_request(dec!(30)).unwrap();
        let rejected = book.create_withdrawal_request(dec!(5)).unwrap();
        book.create_withdrawal_request(dec!(1)).unwrap();
        book.update_transaction_status(&approved.id, WithdrawalDecision::Approved).unwrap();
        book.update_transaction_status(&rejected.id, WithdrawalDecision::Rejected).unwrap();

        let mut expected = seed;
        for bet in book.bets().iter().filter(|b| b.user_id == "user-1") {
            expected -= bet.stake;
            if bet.status == BetStatus::Won {
                expected += bet.potential_payout;
            }
        }
        for tx in book.transactions().iter().filter(|t| t.user_id == "user-1") {
            match (tx.tx_type, tx.status) {
                (TxType::AdminAdjustment, _) => expected += tx.amount,
                (TxType::WithdrawalRequest, TxStatus::Approved) => expected += tx.amount,
                _ => {}
            }
        }
        assert_eq!(balance(&book, "user-1"), expected);
        // 250 - 10 - 20 + 18.50 + 15 - 30
        assert_eq!(expected, dec!(223.50));
    }
}
