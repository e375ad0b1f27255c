// ============================================================================
// Sportsbook Store - Pirate Parlays
// ============================================================================
//
// The single owner of every mutable entity: session, matches, slip, bets,
// users, ledger, notifications and support tickets. Nothing else writes
// these collections.
//
// Rules:
//   - Every operation validates first and mutates second, so a rejected
//     call leaves the book exactly as it was.
//   - A successful mutation ends with `commit()`, which writes the
//     persisted subset through to the local snapshot (if one is attached).
//   - The book itself is not thread-safe; callers serialize access through
//     a single lock (see `app_state::SharedState`).
//
// ============================================================================

pub mod inbox;
pub mod live;
pub mod settlement;
pub mod slip;
pub mod support;
pub mod wallet;

pub use settlement::{CoinFlip, FixedOutcome, Outcome, OutcomeResolver, SettlementReport};
pub use wallet::WithdrawalDecision;

use chrono::Utc;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::error::{PersistenceError, StoreError};
use crate::models::*;
use crate::persistence::{Snapshot, SnapshotRef};
use crate::seed;

// ============================================================================
// CREDENTIALS
// ============================================================================

struct DemoCredential {
    username: &'static str,
    password: &'static str,
    role: Role,
    user_id: &'static str,
}

/// The only two logins this demo knows
const DEMO_CREDENTIALS: [DemoCredential; 2] = [
    DemoCredential {
        username: "user",
        password: "1234u",
        role: Role::User,
        user_id: "user-1",
    },
    DemoCredential {
        username: "admin",
        password: "1234a",
        role: Role::Admin,
        user_id: "admin-1",
    },
];

// ============================================================================
// SPORTSBOOK
// ============================================================================

pub struct Sportsbook {
    pub(crate) session: Option<Session>,
    pub(crate) theme: Theme,
    pub(crate) matches: Vec<Match>,
    pub(crate) slip: Vec<SlipSelection>,
    /// Chronological; views present newest first
    pub(crate) bets: Vec<Bet>,
    pub(crate) users: Vec<User>,
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) notifications: Vec<Notification>,
    pub(crate) tickets: Vec<SupportTicket>,

    /// Decides Won/Lost for each bet the settlement engine resolves
    pub(crate) resolver: Box<dyn OutcomeResolver>,
    /// Live score ticks and simulated odds imports
    pub(crate) rng: StdRng,
    snapshot: Option<Snapshot>,
}

impl Default for Sportsbook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Sportsbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sportsbook")
            .field("session", &self.session)
            .field("matches", &self.matches.len())
            .field("slip", &self.slip.len())
            .field("bets", &self.bets.len())
            .field("transactions", &self.transactions.len())
            .field("persistent", &self.snapshot.is_some())
            .finish()
    }
}

impl Sportsbook {
    /// Seeded, in-memory book with coin-flip settlement
    pub fn new() -> Self {
        Self {
            session: None,
            theme: Theme::default(),
            matches: seed::initial_matches(),
            slip: Vec::new(),
            bets: Vec::new(),
            users: seed::initial_users(),
            transactions: Vec::new(),
            notifications: Vec::new(),
            tickets: seed::initial_tickets(),
            resolver: Box::new(CoinFlip::default()),
            rng: StdRng::from_entropy(),
            snapshot: None,
        }
    }

    /// Seeded book rehydrated from `snapshot`; fields absent from the stored
    /// document keep their seed values. Every later commit writes back.
    pub fn open(snapshot: Snapshot) -> Result<Self, PersistenceError> {
        let mut book = Self::new();

        match snapshot.load()? {
            Some(stored) => {
                if let Some(session) = stored.session {
                    book.session = Some(session);
                }
                if let Some(theme) = stored.theme {
                    book.theme = theme;
                }
                if let Some(matches) = stored.matches {
                    book.matches = matches;
                }
                if let Some(slip) = stored.slip {
                    book.slip = slip;
                }
                if let Some(bets) = stored.bets {
                    book.bets = bets;
                }
                if let Some(users) = stored.users {
                    book.users = users;
                }
                if let Some(transactions) = stored.transactions {
                    book.transactions = transactions;
                }
                if let Some(notifications) = stored.notifications {
                    book.notifications = notifications;
                }
                if let Some(tickets) = stored.tickets {
                    book.tickets = tickets;
                }
                info!(
                    bets = book.bets.len(),
                    transactions = book.transactions.len(),
                    "💾 Rehydrated sportsbook from snapshot"
                );
            }
            None => info!("ℹ️  No snapshot found, starting from seed data"),
        }

        book.snapshot = Some(snapshot);
        Ok(book)
    }

    /// `open`, except that a stored document which no longer decodes is
    /// discarded: the book starts from seed data and the slot stays attached,
    /// so write-through persistence keeps working. Storage faults still fail.
    pub fn open_or_reseed(snapshot: Snapshot) -> Result<Self, PersistenceError> {
        match Self::open(snapshot.clone()) {
            Err(PersistenceError::Encoding(e)) => {
                error!(error = %e, "❌ Snapshot unreadable, discarding it and reseeding");
                snapshot.clear()?;
                let book = Self::open(snapshot)?;
                book.commit();
                Ok(book)
            }
            other => other,
        }
    }

    pub fn with_resolver(mut self, resolver: impl OutcomeResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Write-through to the attached snapshot. A failed write is logged and
    /// the in-memory book stays authoritative.
    pub(crate) fn commit(&self) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        if let Err(e) = snapshot.save(&self.snapshot_ref()) {
            warn!(error = %e, "⚠️  Snapshot write failed, keeping in-memory state");
        }
    }

    /// Durably flush the snapshot, used on shutdown
    pub fn flush(&self) -> Result<(), PersistenceError> {
        match &self.snapshot {
            Some(snapshot) => {
                snapshot.save(&self.snapshot_ref())?;
                snapshot.flush()
            }
            None => Ok(()),
        }
    }

    fn snapshot_ref(&self) -> SnapshotRef<'_> {
        SnapshotRef {
            session: &self.session,
            theme: &self.theme,
            matches: &self.matches,
            slip: &self.slip,
            bets: &self.bets,
            users: &self.users,
            transactions: &self.transactions,
            notifications: &self.notifications,
            tickets: &self.tickets,
        }
    }

    // ===== READ ACCESS =====

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn slip(&self) -> &[SlipSelection] {
        &self.slip
    }

    pub fn bets(&self) -> &[Bet] {
        &self.bets
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn tickets(&self) -> &[SupportTicket] {
        &self.tickets
    }

    pub fn find_match(&self, match_id: &str) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    pub fn find_user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    pub fn find_bet(&self, reference_id: &str) -> Option<&Bet> {
        self.bets.iter().find(|b| b.reference_id == reference_id)
    }

    pub fn is_admin(&self) -> bool {
        matches!(&self.session, Some(s) if s.role == Role::Admin)
    }

    /// Index of the logged-in bettor's user record. Admin sessions and
    /// sessions whose user record is gone count as not authenticated.
    pub(crate) fn bettor_index(&self) -> Result<usize, StoreError> {
        let session = self.session.as_ref().ok_or(StoreError::NotAuthenticated)?;
        if session.role != Role::User {
            return Err(StoreError::NotAuthenticated);
        }
        self.users
            .iter()
            .position(|u| u.id == session.user_id)
            .ok_or(StoreError::NotAuthenticated)
    }

    pub(crate) fn user_index(&self, user_id: &str) -> Result<usize, StoreError> {
        self.users
            .iter()
            .position(|u| u.id == user_id)
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))
    }

    // ===== SESSION =====

    pub fn login(&mut self, username: &str, password: &str) -> Result<Session, StoreError> {
        let credential = DEMO_CREDENTIALS
            .iter()
            .find(|c| c.username == username && c.password == password)
            .ok_or_else(|| {
                warn!(username, "🚫 Rejected login");
                StoreError::InvalidCredentials
            })?;

        let session = Session {
            username: credential.username.to_string(),
            role: credential.role,
            user_id: credential.user_id.to_string(),
            login_time: Utc::now(),
        };
        self.session = Some(session.clone());
        self.commit();

        info!(username, role = ?session.role, "🔐 Logged in");
        Ok(session)
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!(username = %session.username, "👋 Logged out");
        }
        self.commit();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.commit();
    }

    // ===== MATCHES =====

    /// Merge `update` into the match. A transition into Final settles the
    /// match's pending bets in the same call and returns the report. If that
    /// settlement is rejected the match edit is rolled back too.
    pub fn update_match(
        &mut self,
        match_id: &str,
        update: MatchUpdate,
    ) -> Result<Option<SettlementReport>, StoreError> {
        if let Some(markets) = &update.markets {
            validate_odds(markets)?;
        }
        let idx = self
            .matches
            .iter()
            .position(|m| m.id == match_id)
            .ok_or_else(|| StoreError::MatchNotFound(match_id.to_string()))?;

        let previous = self.matches[idx].clone();
        let m = &mut self.matches[idx];
        update.apply(m);
        let settles = m.status == MatchStatus::Final && previous.status != MatchStatus::Final;
        info!(
            match_id,
            status = ?m.status,
            score = %format!("{}-{}", m.home_score, m.away_score),
            "📝 Match updated"
        );

        if !settles {
            self.commit();
            return Ok(None);
        }
        match self.settle_match_bets(match_id) {
            Ok(report) => {
                self.commit();
                Ok(Some(report))
            }
            Err(e) => {
                warn!(match_id, error = %e, "⚠️  Settlement rejected, match edit rolled back");
                self.matches[idx] = previous;
                Err(e)
            }
        }
    }

    /// Simulated odds import: every option of the match is re-priced to a
    /// random 1.50..=3.00. Placed bets keep the odds they were struck at.
    pub fn refresh_odds(&mut self, match_id: &str) -> Result<&Match, StoreError> {
        let idx = self
            .matches
            .iter()
            .position(|m| m.id == match_id)
            .ok_or_else(|| StoreError::MatchNotFound(match_id.to_string()))?;

        for market in &mut self.matches[idx].markets {
            for option in &mut market.options {
                option.odds = Decimal::new(self.rng.gen_range(150..=300), 2);
            }
        }
        self.commit();
        info!(match_id, "📈 Odds refreshed");
        Ok(&self.matches[idx])
    }
}

fn validate_odds(markets: &[Market]) -> Result<(), StoreError> {
    for option in markets.iter().flat_map(|m| &m.options) {
        if option.odds < Decimal::ONE {
            return Err(StoreError::InvalidOdds(option.odds));
        }
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
