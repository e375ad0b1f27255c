// Local snapshot slot
//
// One sled key holds a JSON document with the persisted subset of the
// sportsbook. Every field is optional on load so an older or partial
// snapshot falls back to seed data field by field.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PersistenceError;
use crate::models::*;

/// Fixed storage slot for this application
pub const SNAPSHOT_KEY: &str = "pirate-parlays-storage";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub theme: Option<Theme>,
    #[serde(default)]
    pub matches: Option<Vec<Match>>,
    #[serde(default)]
    pub slip: Option<Vec<SlipSelection>>,
    #[serde(default)]
    pub bets: Option<Vec<Bet>>,
    #[serde(default)]
    pub users: Option<Vec<User>>,
    #[serde(default)]
    pub transactions: Option<Vec<Transaction>>,
    #[serde(default)]
    pub notifications: Option<Vec<Notification>>,
    #[serde(default)]
    pub tickets: Option<Vec<SupportTicket>>,
}

/// Borrowed view written on every commit, avoids cloning the whole book
#[derive(Serialize)]
pub(crate) struct SnapshotRef<'a> {
    pub session: &'a Option<Session>,
    pub theme: &'a Theme,
    pub matches: &'a [Match],
    pub slip: &'a [SlipSelection],
    pub bets: &'a [Bet],
    pub users: &'a [User],
    pub transactions: &'a [Transaction],
    pub notifications: &'a [Notification],
    pub tickets: &'a [SupportTicket],
}

#[derive(Clone)]
pub struct Snapshot {
    db: sled::Db,
}

impl Snapshot {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Throwaway database removed on drop
    pub fn temporary() -> Result<Self, PersistenceError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    pub fn load(&self) -> Result<Option<PersistedState>, PersistenceError> {
        match self.db.get(SNAPSHOT_KEY)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn save(&self, state: &SnapshotRef<'_>) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec(state)?;
        self.db.insert(SNAPSHOT_KEY, bytes)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), PersistenceError> {
        self.db.remove(SNAPSHOT_KEY)?;
        Ok(())
    }

    pub fn flush(&self) -> Result<(), PersistenceError> {
        self.db.flush()?;
        Ok(())
    }

    /// Raw write, used to seed partial snapshots
    pub fn write_raw(&self, json: &serde_json::Value) -> Result<(), PersistenceError> {
        self.db.insert(SNAPSHOT_KEY, serde_json::to_vec(json)?)?;
        Ok(())
    }
}
