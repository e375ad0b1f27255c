// ============================================================================
// Settlement Engine
// ============================================================================
//
// When a match goes Final, every Pending bet with a leg on that match is
// resolved:
//
//   Won  -> owner credited potentialPayout, BetWon ledger entry,
//           "Bet Won!" notification
//   Lost -> "Bet Lost" notification only
//
// Who wins is decided by an OutcomeResolver. The default flips an unweighted
// coin per bet and ignores the selections; swap in a resolver that grades
// legs against the final score without touching the bookkeeping here.
//
// A bet leaves Pending at most once. The engine re-checks the status of
// every candidate itself, so a parlay whose legs span two matches is settled
// by whichever match finalizes first and skipped by the other.
//
// ============================================================================

use std::collections::HashMap;

use chrono::Utc;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use super::Sportsbook;
use crate::error::StoreError;
use crate::ids::generate_id;
use crate::models::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Won,
    Lost,
}

impl From<Outcome> for BetStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Won => BetStatus::Won,
            Outcome::Lost => BetStatus::Lost,
        }
    }
}

/// Grades one pending bet against the match that just went Final
pub trait OutcomeResolver: Send {
    fn resolve(&mut self, bet: &Bet, finished: &Match) -> Outcome;
}

/// Unweighted coin flip per bet
pub struct CoinFlip {
    rng: StdRng,
}

impl CoinFlip {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for CoinFlip {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl OutcomeResolver for CoinFlip {
    fn resolve(&mut self, _bet: &Bet, _finished: &Match) -> Outcome {
        if self.rng.gen_bool(0.5) {
            Outcome::Won
        } else {
            Outcome::Lost
        }
    }
}

/// Every bet gets the same outcome
#[derive(Debug, Clone, Copy)]
pub struct FixedOutcome(pub Outcome);

impl OutcomeResolver for FixedOutcome {
    fn resolve(&mut self, _bet: &Bet, _finished: &Match) -> Outcome {
        self.0
    }
}

/// What one settlement pass did
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettlementReport {
    pub match_id: String,
    /// Reference ids of bets that won
    pub won: Vec<String>,
    /// Reference ids of bets that lost
    pub lost: Vec<String>,
    pub paid_out: Decimal,
}

impl SettlementReport {
    pub fn settled(&self) -> usize {
        self.won.len() + self.lost.len()
    }
}

impl Sportsbook {
    /// Resolve every Pending bet that has a leg on `match_id`. Bets already
    /// Won or Lost are never touched, so repeated calls are harmless.
    ///
    /// Winner credits are checked before anything is written: if any
    /// balance would leave the `Decimal` range the pass is rejected with
    /// `AmountOutOfRange` and every bet stays Pending.
    pub fn settle_match_bets(&mut self, match_id: &str) -> Result<SettlementReport, StoreError> {
        let finished = self
            .find_match(match_id)
            .cloned()
            .ok_or_else(|| StoreError::MatchNotFound(match_id.to_string()))?;

        // Decide every outcome before mutating anything
        let mut decisions = Vec::new();
        for (idx, bet) in self.bets.iter().enumerate() {
            if bet.is_pending() && bet.touches_match(match_id) {
                decisions.push((idx, self.resolver.resolve(bet, &finished)));
            }
        }

        let mut report = SettlementReport {
            match_id: match_id.to_string(),
            ..Default::default()
        };
        if decisions.is_empty() {
            return Ok(report);
        }

        // Balances after every credit, keyed by user index
        let mut credited: HashMap<usize, Decimal> = HashMap::new();
        for &(idx, outcome) in &decisions {
            if outcome != Outcome::Won {
                continue;
            }
            let bet = &self.bets[idx];
            report.paid_out = report
                .paid_out
                .checked_add(bet.potential_payout)
                .ok_or(StoreError::AmountOutOfRange)?;
            match self.users.iter().position(|u| u.id == bet.user_id) {
                Some(user_idx) => {
                    let balance = credited
                        .entry(user_idx)
                        .or_insert(self.users[user_idx].balance);
                    *balance = balance
                        .checked_add(bet.potential_payout)
                        .ok_or(StoreError::AmountOutOfRange)?;
                }
                None => warn!(
                    user = %bet.user_id,
                    reference = %bet.reference_id,
                    "Winning bet has no user record"
                ),
            }
        }

        let now = Utc::now();
        for (idx, outcome) in decisions {
            let bet = &mut self.bets[idx];
            bet.status = outcome.into();
            bet.settled_at = Some(now);
            let bet = bet.clone();

            match outcome {
                Outcome::Won => {
                    self.transactions.push(Transaction {
                        id: generate_id(),
                        user_id: bet.user_id.clone(),
                        tx_type: TxType::BetWon,
                        amount: bet.potential_payout,
                        description: format!("Bet won: {}", bet.reference_id),
                        status: TxStatus::Completed,
                        created_at: now,
                        reference_id: Some(bet.reference_id.clone()),
                    });
                    self.push_notification(NewNotification {
                        user_id: bet.user_id.clone(),
                        kind: NotificationType::BetSettled,
                        title: "Bet Won! 🎉".to_string(),
                        message: format!(
                            "Your {} bet won ${:.2}!",
                            bet.bet_type, bet.potential_payout
                        ),
                    });
                    report.won.push(bet.reference_id);
                }
                Outcome::Lost => {
                    self.push_notification(NewNotification {
                        user_id: bet.user_id.clone(),
                        kind: NotificationType::BetSettled,
                        title: "Bet Lost".to_string(),
                        message: format!(
                            "Your {} bet did not win. Better luck next time!",
                            bet.bet_type
                        ),
                    });
                    report.lost.push(bet.reference_id);
                }
            }
        }
        for (user_idx, balance) in credited {
            self.users[user_idx].balance = balance;
        }
        self.commit();

        info!(
            match_id,
            won = report.won.len(),
            lost = report.lost.len(),
            paid_out = %report.paid_out,
            "✅ Settled match bets"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{balance, logged_in_user};
    use rust_decimal_macros::dec;
    use std::collections::VecDeque;

    /// Hands out outcomes in order, for mixed results in one pass
    struct Scripted(VecDeque<Outcome>);

    impl OutcomeResolver for Scripted {
        fn resolve(&mut self, _bet: &Bet, _finished: &Match) -> Outcome {
            self.0.pop_front().unwrap_or(Outcome::Lost)
        }
    }

    fn place(book: &mut Sportsbook, picks: &[(&str, MarketType, &str)], stake: Decimal) -> String {
        for (match_id, market, label) in picks {
            let selection = book.selection_for(match_id, *market, label).unwrap();
            book.add_to_slip(selection).unwrap();
        }
        book.place_bet(stake).unwrap()
    }

    #[test]
    fn test_winning_bet_credits_payout() {
        let mut book = logged_in_user(Outcome::Won);
        let reference = place(&mut book, &[("nfl-1", MarketType::Moneyline, "Chiefs")], dec!(10));

        let report = book.settle_match_bets("nfl-1").unwrap();

        assert_eq!(report.won, vec![reference.clone()]);
        assert_eq!(report.paid_out, dec!(18.50));
        assert_eq!(balance(&book, "user-1"), dec!(258.50));

        let bet = book.find_bet(&reference).unwrap();
        assert_eq!(bet.status, BetStatus::Won);
        assert!(bet.settled_at.is_some());

        let won: Vec<_> = book
            .transactions()
            .iter()
            .filter(|t| t.tx_type == TxType::BetWon)
            .collect();
        assert_eq!(won.len(), 1);
        assert_eq!(won[0].amount, dec!(18.50));
        assert_eq!(won[0].description, format!("Bet won: {}", reference));

        let note = book.notifications().last().unwrap();
        assert_eq!(note.title, "Bet Won! 🎉");
        assert_eq!(note.message, "Your Single bet won $18.50!");
    }

    #[test]
    fn test_losing_bet_only_notifies() {
        let mut book = logged_in_user(Outcome::Lost);
        let picks = [("nba-1", MarketType::Spread, "Lakers +4.5")];
        let reference = place(&mut book, &picks, dec!(25));
        let tx_count = book.transactions().len();

        let report = book.settle_match_bets("nba-1").unwrap();

        assert_eq!(report.lost, vec![reference.clone()]);
        assert_eq!(report.paid_out, Decimal::ZERO);
        assert_eq!(balance(&book, "user-1"), dec!(225));
        assert_eq!(book.transactions().len(), tx_count);
        assert_eq!(book.find_bet(&reference).unwrap().status, BetStatus::Lost);
        assert_eq!(book.notifications().last().unwrap().title, "Bet Lost");
    }

    #[test]
    fn test_settlement_is_idempotent() {
        let mut book = logged_in_user(Outcome::Won);
        place(&mut book, &[("nfl-1", MarketType::Moneyline, "Chiefs")], dec!(10));

        book.settle_match_bets("nfl-1").unwrap();
        let after_first = balance(&book, "user-1");
        let notes = book.notifications().len();

        let report = book.settle_match_bets("nfl-1").unwrap();
        assert_eq!(report.settled(), 0);
        assert_eq!(balance(&book, "user-1"), after_first);
        assert_eq!(book.notifications().len(), notes);
    }

    #[test]
    fn test_parlay_across_two_matches_settles_once() {
        let mut book = logged_in_user(Outcome::Won);
        let reference = place(
            &mut book,
            &[
                ("nfl-1", MarketType::Moneyline, "Chiefs"),
                ("nba-1", MarketType::Moneyline, "Lakers"),
            ],
            dec!(10),
        );

        let first = book.settle_match_bets("nfl-1").unwrap();
        let second = book.settle_match_bets("nba-1").unwrap();

        assert_eq!(first.won, vec![reference]);
        assert_eq!(second.settled(), 0);
        // 240 + 10 * 1.85 * 2.15
        assert_eq!(balance(&book, "user-1"), dec!(279.775));
        let won = book.transactions().iter().filter(|t| t.tx_type == TxType::BetWon);
        assert_eq!(won.count(), 1);
    }

    #[test]
    fn test_only_bets_on_the_match_are_settled() {
        let mut book = logged_in_user(Outcome::Lost);
        let on_match = place(&mut book, &[("epl-1", MarketType::Moneyline, "Arsenal")], dec!(5));
        let elsewhere = place(&mut book, &[("epl-3", MarketType::Moneyline, "Draw")], dec!(5));

        book.settle_match_bets("epl-1").unwrap();

        assert_eq!(book.find_bet(&on_match).unwrap().status, BetStatus::Lost);
        assert_eq!(book.find_bet(&elsewhere).unwrap().status, BetStatus::Pending);
    }

    #[test]
    fn test_mixed_outcomes_one_ledger_entry_per_winner() {
        let script = VecDeque::from(vec![Outcome::Won, Outcome::Lost, Outcome::Won]);
        let mut book = logged_in_user(Outcome::Lost).with_resolver(Scripted(script));
        let a = place(&mut book, &[("nfl-3", MarketType::Moneyline, "Cowboys")], dec!(10));
        let b = place(&mut book, &[("nfl-3", MarketType::Moneyline, "Dolphins")], dec!(10));
        let c = place(&mut book, &[("nfl-3", MarketType::OverUnder, "Over 52.5")], dec!(20));

        let report = book.settle_match_bets("nfl-3").unwrap();

        assert_eq!(report.won, vec![a.clone(), c.clone()]);
        assert_eq!(report.lost, vec![b]);
        // 21.00 + 37.00
        assert_eq!(report.paid_out, dec!(58.00));
        assert_eq!(balance(&book, "user-1"), dec!(268.00));

        let won: Vec<_> = book
            .transactions()
            .iter()
            .filter(|t| t.tx_type == TxType::BetWon)
            .map(|t| (t.reference_id.clone().unwrap(), t.amount))
            .collect();
        assert_eq!(won, vec![(a, dec!(21.00)), (c, dec!(37.00))]);
    }

    #[test]
    fn test_out_of_range_credit_rejects_whole_pass() {
        let mut book = logged_in_user(Outcome::Won);
        let small = place(&mut book, &[("nfl-1", MarketType::Moneyline, "Chiefs")], dec!(1));
        let big = place(&mut book, &[("nfl-1", MarketType::Moneyline, "Bills")], dec!(100));
        book.update_user_balance("user-1", Decimal::MAX - dec!(200), "whale").unwrap();
        let before = balance(&book, "user-1");
        let tx_count = book.transactions().len();

        let err = book.settle_match_bets("nfl-1").unwrap_err();

        assert_eq!(err, StoreError::AmountOutOfRange);
        assert_eq!(balance(&book, "user-1"), before);
        assert_eq!(book.transactions().len(), tx_count);
        for reference in [small, big] {
            assert!(book.find_bet(&reference).unwrap().is_pending());
        }
    }

    #[test]
    fn test_unknown_match() {
        let mut book = logged_in_user(Outcome::Won);
        assert_eq!(
            book.settle_match_bets("nope").unwrap_err(),
            StoreError::MatchNotFound("nope".into())
        );
    }

    #[test]
    fn test_coin_flip_produces_both_outcomes() {
        let mut flip = CoinFlip::seeded(9);
        let book = Sportsbook::new();
        let m = &book.matches()[0];
        let bet = Bet {
            bet_id: "b".into(),
            reference_id: "PP-20260101-AAAAAA".into(),
            bet_type: BetType::Single,
            legs: vec![],
            stake: dec!(1),
            total_odds: dec!(2),
            potential_payout: dec!(2),
            status: BetStatus::Pending,
            created_at: Utc::now(),
            settled_at: None,
            user_id: "user-1".into(),
        };

        let outcomes: Vec<Outcome> = (0..64).map(|_| flip.resolve(&bet, m)).collect();
        assert!(outcomes.contains(&Outcome::Won));
        assert!(outcomes.contains(&Outcome::Lost));
    }
}
