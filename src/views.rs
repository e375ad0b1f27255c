// ============================================================================
// Derived Views
// ============================================================================
//
// Read-only projections over a Sportsbook. Nothing here is cached; every
// call recomputes from the book as it stands.
//
// Lists come back newest first. Searches are case-insensitive substring
// matches and an empty term matches everything.
//
// ============================================================================

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models::*;
use crate::store::Sportsbook;

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn term_matches(term: Option<&str>, fields: &[&str]) -> bool {
    match term.map(str::trim) {
        None | Some("") => true,
        Some(term) => fields.iter().any(|f| contains_ci(f, term)),
    }
}

// ============================================================================
// BETTOR VIEWS
// ============================================================================

/// Wallet history tabs
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionFilter {
    #[default]
    All,
    /// BetPlaced and BetWon
    Bets,
    AdminAdjustment,
    /// Withdrawal requests in any status
    Requests,
}

impl TransactionFilter {
    pub fn accepts(self, tx: &Transaction) -> bool {
        match self {
            TransactionFilter::All => true,
            TransactionFilter::Bets => matches!(tx.tx_type, TxType::BetPlaced | TxType::BetWon),
            TransactionFilter::AdminAdjustment => tx.tx_type == TxType::AdminAdjustment,
            TransactionFilter::Requests => tx.tx_type == TxType::WithdrawalRequest,
        }
    }
}

/// Inbox tabs
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationFilter {
    #[default]
    All,
    Bets,
    /// Settlements and match results
    Results,
    Promo,
}

impl NotificationFilter {
    pub fn accepts(self, n: &Notification) -> bool {
        match self {
            NotificationFilter::All => true,
            NotificationFilter::Bets => n.kind == NotificationType::BetPlaced,
            NotificationFilter::Results => {
                matches!(n.kind, NotificationType::BetSettled | NotificationType::MatchResult)
            }
            NotificationFilter::Promo => n.kind == NotificationType::Promo,
        }
    }
}

pub fn user_bets<'a>(book: &'a Sportsbook, user_id: &str) -> Vec<&'a Bet> {
    book.bets().iter().rev().filter(|b| b.user_id == user_id).collect()
}

pub fn user_transactions<'a>(
    book: &'a Sportsbook,
    user_id: &str,
    filter: TransactionFilter,
) -> Vec<&'a Transaction> {
    book.transactions()
        .iter()
        .rev()
        .filter(|t| t.user_id == user_id && filter.accepts(t))
        .collect()
}

pub fn user_notifications<'a>(
    book: &'a Sportsbook,
    user_id: &str,
    filter: NotificationFilter,
) -> Vec<&'a Notification> {
    book.notifications()
        .iter()
        .rev()
        .filter(|n| n.user_id == user_id && filter.accepts(n))
        .collect()
}

pub fn unread_count(book: &Sportsbook, user_id: &str) -> usize {
    book.notifications().iter().filter(|n| n.user_id == user_id && !n.read).count()
}

/// Bet slip preview for a prospective stake
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlipQuote {
    pub legs: usize,
    /// None while the slip is empty
    pub bet_type: Option<BetType>,
    pub total_odds: Decimal,
    pub stake: Decimal,
    pub potential_payout: Decimal,
}

/// Quote `stake` against the slip. Odds or payout beyond the `Decimal`
/// range are rejected rather than rounded.
pub fn quote(slip: &[SlipSelection], stake: Decimal) -> Result<SlipQuote, StoreError> {
    let total_odds =
        combined_odds(slip.iter().map(|s| s.odds_decimal)).ok_or(StoreError::AmountOutOfRange)?;
    let potential_payout = stake
        .checked_mul(total_odds)
        .ok_or(StoreError::AmountOutOfRange)?;

    Ok(SlipQuote {
        legs: slip.len(),
        bet_type: (!slip.is_empty()).then(|| BetType::for_legs(slip.len())),
        total_odds,
        stake,
        potential_payout,
    })
}

/// Totals on admin screens clamp instead of failing the whole view
fn saturating_total(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, |total, amount| total.saturating_add(amount))
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WalletSummary {
    pub balance: Decimal,
    /// Balance less pending withdrawal requests
    pub available_balance: Decimal,
    pub pending_withdrawals: Decimal,
    pub open_bets: usize,
    pub settled_bets: usize,
}

pub fn wallet_summary(book: &Sportsbook, user_id: &str) -> Option<WalletSummary> {
    let user = book.find_user(user_id)?;
    let pending_withdrawals = book.pending_withdrawals(user_id);
    let bets = user_bets(book, user_id);
    let open_bets = bets.iter().filter(|b| b.is_pending()).count();

    Some(WalletSummary {
        balance: user.balance,
        available_balance: user.balance.saturating_sub(pending_withdrawals),
        pending_withdrawals,
        open_bets,
        settled_bets: bets.len() - open_bets,
    })
}

// ============================================================================
// ADMIN VIEWS
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardStats {
    pub total_users: usize,
    /// Bets still Pending
    pub active_bets: usize,
    /// Sum of every stake ever taken
    pub total_revenue: Decimal,
    pub pending_withdrawals: usize,
    pub open_tickets: usize,
    pub live_matches: usize,
}

pub fn dashboard(book: &Sportsbook) -> DashboardStats {
    DashboardStats {
        total_users: book.users().len(),
        active_bets: book.bets().iter().filter(|b| b.is_pending()).count(),
        total_revenue: saturating_total(
            book.transactions()
                .iter()
                .filter(|t| t.tx_type == TxType::BetPlaced)
                .map(|t| t.amount.abs()),
        ),
        pending_withdrawals: book
            .transactions()
            .iter()
            .filter(|t| t.is_pending_withdrawal())
            .count(),
        open_tickets: book.tickets().iter().filter(|t| t.status == TicketStatus::Open).count(),
        live_matches: book.matches().iter().filter(|m| m.status == MatchStatus::Live).count(),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SportCount {
    pub sport: Sport,
    pub bets: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Analytics {
    pub total_bets: usize,
    pub pending_bets: usize,
    pub settled_bets: usize,
    pub won_bets: usize,
    pub lost_bets: usize,
    pub total_staked: Decimal,
    pub total_paid_out: Decimal,
    /// Staked minus paid out
    pub net_revenue: Decimal,
    /// A parlay counts once for every sport it has a leg in
    pub bets_by_sport: Vec<SportCount>,
    pub active_users: usize,
}

pub fn analytics(book: &Sportsbook) -> Analytics {
    let bets = book.bets();
    let count = |status: BetStatus| bets.iter().filter(|b| b.status == status).count();

    let total_staked = saturating_total(bets.iter().map(|b| b.stake));
    let total_paid_out = saturating_total(
        bets.iter()
            .filter(|b| b.status == BetStatus::Won)
            .map(|b| b.potential_payout),
    );

    let sport_of = |match_id: &str| book.find_match(match_id).map(|m| m.sport);
    let bets_by_sport = Sport::ALL
        .iter()
        .map(|&sport| SportCount {
            sport,
            bets: bets
                .iter()
                .filter(|b| b.legs.iter().any(|l| sport_of(&l.match_id) == Some(sport)))
                .count(),
        })
        .collect();

    let pending_bets = count(BetStatus::Pending);
    Analytics {
        total_bets: bets.len(),
        pending_bets,
        settled_bets: bets.len() - pending_bets,
        won_bets: count(BetStatus::Won),
        lost_bets: count(BetStatus::Lost),
        total_staked,
        total_paid_out,
        net_revenue: total_staked.saturating_sub(total_paid_out),
        bets_by_sport,
        active_users: book.users().iter().filter(|u| u.status == UserStatus::Active).count(),
    }
}

// ===== SEARCHES =====

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchQuery {
    pub sport: Option<Sport>,
    pub status: Option<MatchStatus>,
    /// Home or away team name
    pub search: Option<String>,
}

pub fn search_matches<'a>(book: &'a Sportsbook, query: &MatchQuery) -> Vec<&'a Match> {
    book.matches()
        .iter()
        .filter(|m| query.sport.map_or(true, |s| m.sport == s))
        .filter(|m| query.status.map_or(true, |s| m.status == s))
        .filter(|m| term_matches(query.search.as_deref(), &[&m.home_team, &m.away_team]))
        .collect()
}

/// Username or email
pub fn search_users<'a>(book: &'a Sportsbook, term: Option<&str>) -> Vec<&'a User> {
    book.users()
        .iter()
        .filter(|u| term_matches(term, &[&u.username, &u.email]))
        .collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionQuery {
    /// Description or owner's username
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub tx_type: Option<TxType>,
    pub status: Option<TxStatus>,
}

pub fn search_transactions<'a>(
    book: &'a Sportsbook,
    query: &TransactionQuery,
) -> Vec<&'a Transaction> {
    book.transactions()
        .iter()
        .rev()
        .filter(|t| query.tx_type.map_or(true, |ty| t.tx_type == ty))
        .filter(|t| query.status.map_or(true, |s| t.status == s))
        .filter(|t| {
            let username = book.find_user(&t.user_id).map(|u| u.username.as_str()).unwrap_or("");
            term_matches(query.search.as_deref(), &[&t.description, username])
        })
        .collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketQuery {
    /// Subject or owner's username
    pub search: Option<String>,
    pub status: Option<TicketStatus>,
}

pub fn search_tickets<'a>(book: &'a Sportsbook, query: &TicketQuery) -> Vec<&'a SupportTicket> {
    book.tickets()
        .iter()
        .filter(|t| query.status.map_or(true, |s| t.status == s))
        .filter(|t| {
            let username = book.find_user(&t.user_id).map(|u| u.username.as_str()).unwrap_or("");
            term_matches(query.search.as_deref(), &[&t.subject, username])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::logged_in_user;
    use crate::store::{Outcome, WithdrawalDecision};
    use rust_decimal_macros::dec;

    fn bet_on(book: &mut Sportsbook, match_id: &str, label: &str, stake: Decimal) -> String {
        let selection = book.selection_for(match_id, MarketType::Moneyline, label).unwrap();
        book.add_to_slip(selection).unwrap();
        book.place_bet(stake).unwrap()
    }

    #[test]
    fn test_user_lists_newest_first() {
        let mut book = logged_in_user(Outcome::Lost);
        let first = bet_on(&mut book, "nfl-1", "Chiefs", dec!(10));
        let second = bet_on(&mut book, "nba-1", "Lakers", dec!(5));
        book.update_user_balance("user-2", dec!(5), "bonus").unwrap();

        let bets: Vec<_> = user_bets(&book, "user-1")
            .iter()
            .map(|b| b.reference_id.clone())
            .collect();
        assert_eq!(bets, vec![second, first]);
        assert!(user_bets(&book, "user-2").is_empty());

        let txs = user_transactions(&book, "user-1", TransactionFilter::All);
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].amount, dec!(-5));
    }

    #[test]
    fn test_transaction_filter() {
        let mut book = logged_in_user(Outcome::Won);
        bet_on(&mut book, "nfl-1", "Chiefs", dec!(10));
        book.settle_match_bets("nfl-1").unwrap();
        book.update_user_balance("user-1", dec!(-1), "fee").unwrap();
        let w = book.create_withdrawal_request(dec!(20)).unwrap();
        book.update_transaction_status(&w.id, WithdrawalDecision::Rejected).unwrap();

        let count = |f| user_transactions(&book, "user-1", f).len();
        assert_eq!(count(TransactionFilter::All), 4);
        assert_eq!(count(TransactionFilter::Bets), 2);
        assert_eq!(count(TransactionFilter::AdminAdjustment), 1);
        assert_eq!(count(TransactionFilter::Requests), 1);
    }

    #[test]
    fn test_notification_filter_and_unread() {
        let mut book = logged_in_user(Outcome::Lost);
        bet_on(&mut book, "epl-1", "Draw", dec!(2));
        book.settle_match_bets("epl-1").unwrap();
        book.add_notification(NewNotification {
            user_id: "user-1".into(),
            kind: NotificationType::Promo,
            title: "Free bet".into(),
            message: "On the house".into(),
        });

        assert_eq!(user_notifications(&book, "user-1", NotificationFilter::All).len(), 3);
        assert_eq!(user_notifications(&book, "user-1", NotificationFilter::Bets).len(), 1);
        assert_eq!(user_notifications(&book, "user-1", NotificationFilter::Results).len(), 1);
        assert_eq!(user_notifications(&book, "user-1", NotificationFilter::Promo).len(), 1);
        assert_eq!(unread_count(&book, "user-1"), 3);

        book.mark_all_as_read();
        assert_eq!(unread_count(&book, "user-1"), 0);
    }

    #[test]
    fn test_slip_quote() {
        let mut book = logged_in_user(Outcome::Lost);
        assert_eq!(quote(book.slip(), dec!(5)).unwrap().bet_type, None);

        for (id, label) in [("nfl-1", "Chiefs"), ("nfl-1", "Bills")] {
            let selection = book.selection_for(id, MarketType::Moneyline, label).unwrap();
            book.add_to_slip(selection).unwrap();
        }
        let q = quote(book.slip(), dec!(5)).unwrap();
        assert_eq!(q.legs, 2);
        assert_eq!(q.bet_type, Some(BetType::Parlay));
        assert_eq!(q.total_odds, dec!(3.7925));
        assert_eq!(q.potential_payout, dec!(18.9625));
    }

    #[test]
    fn test_quote_out_of_range() {
        let mut book = logged_in_user(Outcome::Lost);
        let selection = book.selection_for("nfl-1", MarketType::Moneyline, "Chiefs").unwrap();
        book.add_to_slip(selection).unwrap();

        assert_eq!(quote(book.slip(), Decimal::MAX), Err(StoreError::AmountOutOfRange));
        assert_eq!(quote(book.slip(), Decimal::ONE).unwrap().potential_payout, dec!(1.85));
    }

    #[test]
    fn test_wallet_summary() {
        let mut book = logged_in_user(Outcome::Won);
        bet_on(&mut book, "nfl-1", "Chiefs", dec!(10));
        bet_on(&mut book, "nba-3", "Bucks", dec!(10));
        book.settle_match_bets("nfl-1").unwrap();
        book.create_withdrawal_request(dec!(30)).unwrap();

        let summary = wallet_summary(&book, "user-1").unwrap();
        assert_eq!(summary.balance, dec!(248.50));
        assert_eq!(summary.pending_withdrawals, dec!(30));
        assert_eq!(summary.available_balance, dec!(218.50));
        assert_eq!((summary.open_bets, summary.settled_bets), (1, 1));
        assert!(wallet_summary(&book, "ghost").is_none());
    }

    #[test]
    fn test_dashboard_and_analytics() {
        let mut book = logged_in_user(Outcome::Won);
        bet_on(&mut book, "nfl-1", "Chiefs", dec!(10));
        bet_on(&mut book, "epl-1", "Arsenal", dec!(4));
        book.settle_match_bets("nfl-1").unwrap();
        book.create_withdrawal_request(dec!(1)).unwrap();

        let stats = dashboard(&book);
        assert_eq!(stats.total_users, 4);
        assert_eq!(stats.active_bets, 1);
        assert_eq!(stats.total_revenue, dec!(14));
        assert_eq!(stats.pending_withdrawals, 1);
        assert_eq!(stats.open_tickets, 1);
        assert_eq!(stats.live_matches, 3);

        let a = analytics(&book);
        assert_eq!((a.total_bets, a.pending_bets, a.settled_bets), (2, 1, 1));
        assert_eq!((a.won_bets, a.lost_bets), (1, 0));
        assert_eq!(a.total_staked, dec!(14));
        assert_eq!(a.total_paid_out, dec!(18.50));
        assert_eq!(a.net_revenue, dec!(-4.50));
        assert_eq!(a.active_users, 3);
        let by_sport: Vec<_> = a.bets_by_sport.iter().map(|s| (s.sport, s.bets)).collect();
        assert_eq!(by_sport, vec![(Sport::Nfl, 1), (Sport::Nba, 0), (Sport::Epl, 1)]);
    }

    #[test]
    fn test_match_search() {
        let book = Sportsbook::new();
        let ids = |q: MatchQuery| {
            search_matches(&book, &q)
                .iter()
                .map(|m| m.id.clone())
                .collect::<Vec<_>>()
        };

        assert_eq!(ids(MatchQuery::default()).len(), 12);
        let nba = MatchQuery {
            sport: Some(Sport::Nba),
            ..Default::default()
        };
        assert_eq!(ids(nba).len(), 4);
        let live = MatchQuery {
            status: Some(MatchStatus::Live),
            ..Default::default()
        };
        assert_eq!(ids(live), vec!["nfl-2", "nba-2", "epl-2"]);
        let manchester = MatchQuery {
            search: Some("manchester".into()),
            ..Default::default()
        };
        assert_eq!(ids(manchester), vec!["epl-1", "epl-3"]);
        let villa_final = MatchQuery {
            sport: Some(Sport::Epl),
            status: Some(MatchStatus::Final),
            search: Some("VILLA".into()),
        };
        assert_eq!(ids(villa_final), vec!["epl-4"]);
    }

    #[test]
    fn test_admin_searches() {
        let mut book = Sportsbook::new();
        book.update_user_balance("user-2", dec!(10), "Loyalty bonus").unwrap();
        book.update_user_balance("user-3", dec!(-5), "correction").unwrap();

        assert_eq!(search_users(&book, Some("PIRATES")).len(), 1);
        assert_eq!(search_users(&book, Some("  ")).len(), 4);
        assert_eq!(search_users(&book, None).len(), 4);

        let by_name = TransactionQuery {

            search: Some("seawolf".into()),

            ..Default::default()

        };
        assert_eq!(search_transactions(&book, &by_name)[0].description, "correction");
        let by_desc = TransactionQuery {
            search: Some("loyalty".into()),
            ..Default::default()
        };
        assert_eq!(search_transactions(&book, &by_desc).len(), 1);
        let pending = TransactionQuery {
            status: Some(TxStatus::Pending),
            ..Default::default()
        };
        assert!(search_transactions(&book, &pending).is_empty());

        let open = TicketQuery {

            status: Some(TicketStatus::Open),

            ..Default::default()

        };
        assert_eq!(search_tickets(&book, &open)[0].id, "ticket-1");
        let kyc = TicketQuery {
            search: Some("kyc".into()),
            ..Default::default()
        };
        assert_eq!(search_tickets(&book, &kyc)[0].id, "ticket-2");
        let by_owner = TicketQuery {
            search: Some("jackparrot".into()),
            ..Default::default()
        };
        assert_eq!(search_tickets(&book, &by_owner)[0].id, "ticket-1");
    }
}
