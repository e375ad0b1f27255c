// Application state shared by every handler and the live ticker

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::store::Sportsbook;

/// Most recent activity lines kept for GET /activity
pub const ACTIVITY_CAPACITY: usize = 1000;

pub type SharedState = Arc<Mutex<AppState>>;

pub struct AppState {
    pub book: Sportsbook,
    /// Human-readable feed, oldest first
    pub activity: VecDeque<String>,
}

impl AppState {
    pub fn new(book: Sportsbook) -> Self {
        Self {
            book,
            activity: VecDeque::with_capacity(ACTIVITY_CAPACITY),
        }
    }

    pub fn shared(book: Sportsbook) -> SharedState {
        Arc::new(Mutex::new(Self::new(book)))
    }

    pub fn log_activity(&mut self, emoji: &str, action: &str, details: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        let entry = format!("[{}] {} {} | {}", timestamp, emoji, action, details);
        info!(target: "activity", "{}", entry);
        self.activity.push_back(entry);
        while self.activity.len() > ACTIVITY_CAPACITY {
            self.activity.pop_front();
        }
    }

    /// Newest first
    pub fn recent_activity(&self, limit: usize) -> Vec<&str> {
        self.activity.iter().rev().take(limit).map(String::as_str).collect()
    }
}
