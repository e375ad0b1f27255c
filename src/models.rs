// Data models for the Pirate Parlays sportsbook

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// SESSION
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// The one live login for this process
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub username: String,
    pub role: Role,
    pub user_id: String,
    pub login_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

// ============================================================================
// MATCHES & MARKETS
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Sport {
    #[serde(rename = "NFL")]
    Nfl,
    #[serde(rename = "NBA")]
    Nba,
    #[serde(rename = "EPL")]
    Epl,
}

impl Sport {
    pub const ALL: [Sport; 3] = [Sport::Nfl, Sport::Nba, Sport::Epl];
}

/// Upcoming -> Live -> Final in practice, though edits may set any status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchStatus {
    Upcoming,
    Live,
    Final,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Moneyline,
    Spread,
    #[serde(rename = "overunder")]
    OverUnder,
}

impl MarketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Moneyline => "moneyline",
            MarketType::Spread => "spread",
            MarketType::OverUnder => "overunder",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketOption {
    pub label: String,
    /// Decimal odds, always >= 1
    pub odds: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Market {
    #[serde(rename = "type")]
    pub market_type: MarketType,
    pub options: Vec<MarketOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Match {
    pub id: String,
    pub sport: Sport,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub start_time: DateTime<Utc>,
    pub status: MatchStatus,
    pub home_score: u32,
    pub away_score: u32,
    pub markets: Vec<Market>,
}

impl Match {
    /// Display label used on slips and bet legs
    pub fn label(&self) -> String {
        format!("{} @ {}", self.away_team, self.home_team)
    }

    pub fn market(&self, market_type: MarketType) -> Option<&Market> {
        self.markets.iter().find(|m| m.market_type == market_type)
    }
}

/// Partial edit applied by `Sportsbook::update_match`; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchUpdate {
    #[serde(default)]
    pub sport: Option<Sport>,
    #[serde(default)]
    pub league: Option<String>,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<MatchStatus>,
    #[serde(default)]
    pub home_score: Option<u32>,
    #[serde(default)]
    pub away_score: Option<u32>,
    #[serde(default)]
    pub markets: Option<Vec<Market>>,
}

impl MatchUpdate {
    pub fn status(status: MatchStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub(crate) fn apply(self, m: &mut Match) {
        if let Some(sport) = self.sport {
            m.sport = sport;
        }
        if let Some(league) = self.league {
            m.league = league;
        }
        if let Some(home) = self.home_team {
            m.home_team = home;
        }
        if let Some(away) = self.away_team {
            m.away_team = away;
        }
        if let Some(start) = self.start_time {
            m.start_time = start;
        }
        if let Some(status) = self.status {
            m.status = status;
        }
        if let Some(score) = self.home_score {
            m.home_score = score;
        }
        if let Some(score) = self.away_score {
            m.away_score = score;
        }
        if let Some(markets) = self.markets {
            m.markets = markets;
        }
    }
}

// ============================================================================
// SLIP & BETS
// ============================================================================

/// Caller-supplied part of a slip selection; id and timestamp are assigned by the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSelection {
    pub match_id: String,
    pub match_label: String,
    pub market_type: MarketType,
    pub selection_label: String,
    pub odds_decimal: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlipSelection {
    pub id: String,
    pub match_id: String,
    pub match_label: String,
    pub market_type: MarketType,
    pub selection_label: String,
    pub odds_decimal: Decimal,
    pub added_at: DateTime<Utc>,
}

impl SlipSelection {
    /// At most one selection per key may sit on the slip
    pub fn key(&self) -> (&str, MarketType, &str) {
        (&self.match_id, self.market_type, &self.selection_label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BetType {
    Single,
    Parlay,
}

impl BetType {
    pub fn for_legs(count: usize) -> Self {
        if count == 1 {
            BetType::Single
        } else {
            BetType::Parlay
        }
    }
}

impl std::fmt::Display for BetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BetType::Single => write!(f, "Single"),
            BetType::Parlay => write!(f, "Parlay"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
}

/// Immutable snapshot of a slip selection at placement time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BetLeg {
    pub match_id: String,
    pub match_label: String,
    pub market_type: MarketType,
    pub selection_label: String,
    pub odds: Decimal,
}

impl From<&SlipSelection> for BetLeg {
    fn from(s: &SlipSelection) -> Self {
        Self {
            match_id: s.match_id.clone(),
            match_label: s.match_label.clone(),
            market_type: s.market_type,
            selection_label: s.selection_label.clone(),
            odds: s.odds_decimal,
        }
    }
}

/// Parlay odds: the product of every leg's decimal odds. None when the
/// product does not fit in a `Decimal`.
pub fn combined_odds<I: IntoIterator<Item = Decimal>>(odds: I) -> Option<Decimal> {
    odds.into_iter().try_fold(Decimal::ONE, |acc, o| acc.checked_mul(o))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bet {
    pub bet_id: String,
    /// Human-readable, globally unique (PP-YYYYMMDD-XXXXXX)
    pub reference_id: String,
    #[serde(rename = "type")]
    pub bet_type: BetType,
    pub legs: Vec<BetLeg>,
    pub stake: Decimal,
    /// Product of leg odds at placement
    pub total_odds: Decimal,
    pub potential_payout: Decimal,
    pub status: BetStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<DateTime<Utc>>,
    pub user_id: String,
}

impl Bet {
    pub fn is_pending(&self) -> bool {
        self.status == BetStatus::Pending
    }

    pub fn touches_match(&self, match_id: &str) -> bool {
        self.legs.iter().any(|l| l.match_id == match_id)
    }
}

// ============================================================================
// LEDGER
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TxType {
    BetPlaced,
    BetWon,
    AdminAdjustment,
    WithdrawalRequest,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TxStatus {
    Completed,
    Pending,
    Approved,
    Rejected,
}

/// Append-only ledger entry; only a withdrawal's status ever changes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    /// Signed; negative is a debit
    pub amount: Decimal,
    pub description: String,
    pub status: TxStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
}

impl Transaction {
    pub fn is_pending_withdrawal(&self) -> bool {
        self.tx_type == TxType::WithdrawalRequest && self.status == TxStatus::Pending
    }
}

// ============================================================================
// NOTIFICATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationType {
    BetPlaced,
    BetSettled,
    MatchResult,
    Promo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewNotification {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

// ============================================================================
// USERS
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserStatus {
    Active,
    Suspended,
}

impl UserStatus {
    pub fn toggled(self) -> Self {
        match self {
            UserStatus::Active => UserStatus::Suspended,
            UserStatus::Suspended => UserStatus::Active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Not clamped: admin adjustments and approved withdrawals may push it below zero
    pub balance: Decimal,
    pub status: UserStatus,
    pub kyc_verified: bool,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// SUPPORT TICKETS
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TicketStatus {
    Open,
    Pending,
    Resolved,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TicketPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    User,
    Agent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketMessage {
    pub id: String,
    pub sender: MessageSender,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupportTicket {
    pub id: String,
    pub user_id: String,
    pub subject: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created_at: DateTime<Utc>,
    /// Append-only
    pub messages: Vec<TicketMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}
