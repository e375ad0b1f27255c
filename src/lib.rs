/// Pirate Parlays sportsbook
/// Exports all modules for use as a library crate

pub mod app_state;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ids;
pub mod models;
pub mod persistence;
pub mod routes;
pub mod seed;
pub mod store;
pub mod ticker;
pub mod views;

pub use app_state::{AppState, SharedState};
pub use config::Config;
pub use error::{PersistenceError, StoreError};
pub use persistence::{PersistedState, Snapshot, SNAPSHOT_KEY};
pub use routes::router;
pub use store::{
    CoinFlip, FixedOutcome, Outcome, OutcomeResolver, SettlementReport, Sportsbook,
    WithdrawalDecision,
};
