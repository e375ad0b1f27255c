// ============================================================================
// Bet Slip & Placement
// ============================================================================
//
// The slip is the bettor's in-progress set of selections. Placement turns
// the whole slip into one Bet in a single step:
//
//   totalOdds        = product of leg odds
//   potentialPayout  = stake * totalOdds
//
// and, together, debits the stake, appends a BetPlaced ledger entry and a
// notification, and empties the slip.
//
// ============================================================================

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use super::Sportsbook;
use crate::error::StoreError;
use crate::ids::{generate_id, generate_reference_id};
use crate::models::*;

impl Sportsbook {
    /// Build a selection from the match's current odds for `label`
    pub fn selection_for(
        &self,
        match_id: &str,
        market_type: MarketType,
        label: &str,
    ) -> Result<NewSelection, StoreError> {
        let m = self
            .find_match(match_id)
            .ok_or_else(|| StoreError::MatchNotFound(match_id.to_string()))?;
        let market = m.market(market_type).ok_or_else(|| StoreError::MarketNotFound {
            match_id: match_id.to_string(),
            market: market_type.as_str().to_string(),
        })?;
        let option = market
            .options
            .iter()
            .find(|o| o.label == label)
            .ok_or_else(|| StoreError::SelectionNotFound {
                match_id: match_id.to_string(),
                market: market_type.as_str().to_string(),
                label: label.to_string(),
            })?;

        Ok(NewSelection {
            match_id: m.id.clone(),
            match_label: m.label(),
            market_type,
            selection_label: option.label.clone(),
            odds_decimal: option.odds,
        })
    }

    /// Append a selection. A second selection with the same
    /// (match, market, label) is rejected and the slip is left as is.
    pub fn add_to_slip(&mut self, selection: NewSelection) -> Result<SlipSelection, StoreError> {
        if selection.odds_decimal < Decimal::ONE {
            return Err(StoreError::InvalidOdds(selection.odds_decimal));
        }
        if self.find_match(&selection.match_id).is_none() {
            return Err(StoreError::MatchNotFound(selection.match_id));
        }
        let key = (
            selection.match_id.as_str(),
            selection.market_type,
            selection.selection_label.as_str(),
        );
        if self.slip.iter().any(|s| s.key() == key) {
            return Err(StoreError::DuplicateSelection {
                match_id: selection.match_id.clone(),
                market: selection.market_type.as_str().to_string(),
                selection: selection.selection_label.clone(),
            });
        }

        let entry = SlipSelection {
            id: generate_id(),
            match_id: selection.match_id,
            match_label: selection.match_label,
            market_type: selection.market_type,
            selection_label: selection.selection_label,
            odds_decimal: selection.odds_decimal,
            added_at: Utc::now(),
        };
        self.slip.push(entry.clone());
        self.commit();
        Ok(entry)
    }

    pub fn remove_from_slip(&mut self, selection_id: &str) -> Result<(), StoreError> {
        let idx = self
            .slip
            .iter()
            .position(|s| s.id == selection_id)
            .ok_or_else(|| StoreError::SelectionIdNotFound(selection_id.to_string()))?;
        self.slip.remove(idx);
        self.commit();
        Ok(())
    }

    pub fn clear_slip(&mut self) {
        self.slip.clear();
        self.commit();
    }

    /// Place the whole slip as one bet. Returns the new reference id.
    pub fn place_bet(&mut self, stake: Decimal) -> Result<String, StoreError> {
        let user_idx = self.bettor_index()?;
        if stake <= Decimal::ZERO {
            return Err(StoreError::InvalidStake);
        }
        let available = self.users[user_idx].balance;
        if stake > available {
            return Err(StoreError::InsufficientBalance {
                available,
                requested: stake,
            });
        }
        if self.slip.is_empty() {
            return Err(StoreError::EmptySlip);
        }

        let legs: Vec<BetLeg> = self.slip.iter().map(BetLeg::from).collect();
        let total_odds =
            combined_odds(legs.iter().map(|l| l.odds)).ok_or(StoreError::AmountOutOfRange)?;
        let potential_payout = stake
            .checked_mul(total_odds)
            .ok_or(StoreError::AmountOutOfRange)?;
        let reference_id = self.unique_reference_id();
        let user_id = self.users[user_idx].id.clone();
        let bet_type = BetType::for_legs(legs.len());
        let now = Utc::now();

        let bet = Bet {
            bet_id: generate_id(),
            reference_id: reference_id.clone(),
            bet_type,
            legs,
            stake,
            total_odds,
            potential_payout,
            status: BetStatus::Pending,
            created_at: now,
            settled_at: None,
            user_id: user_id.clone(),
        };
        let transaction = Transaction {
            id: generate_id(),
            user_id: user_id.clone(),
            tx_type: TxType::BetPlaced,
            amount: -stake,
            description: format!("Bet placed: {}", reference_id),
            status: TxStatus::Completed,
            created_at: now,
            reference_id: Some(reference_id.clone()),
        };

        // Everything below is infallible: the bet lands whole or not at all.
        // 0 < stake <= balance, so the debit cannot overflow.
        self.users[user_idx].balance -= stake;
        self.bets.push(bet);
        self.transactions.push(transaction);
        self.push_notification(NewNotification {
            user_id: user_id.clone(),
            kind: NotificationType::BetPlaced,
            title: "Bet Placed".to_string(),
            message: format!("Your {} bet of ${:.2} has been placed.", bet_type, stake),
        });
        self.slip.clear();
        self.commit();

        info!(
            reference = %reference_id,
            user = %user_id,
            %stake,
            odds = %total_odds,
            payout = %potential_payout,
            "🎯 Bet placed"
        );
        Ok(reference_id)
    }

    fn unique_reference_id(&self) -> String {
        loop {
            let candidate = generate_reference_id();
            if self.find_bet(&candidate).is_none() {
                return candidate;
            }
        }
    }
}
