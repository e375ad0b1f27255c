// Periodic live-score simulation for every Live match

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::app_state::SharedState;

/// One pass over the board. Returns how many live matches were ticked.
pub fn tick_live_matches(state: &SharedState) -> usize {
    let mut app = state.lock();
    let live = app.book.live_match_ids();
    for match_id in &live {
        // Ids come from the book under the same lock
        if let Ok((home, away)) = app.book.simulate_live_update(match_id) {
            debug!(match_id = %match_id, home, away, "⚡ Live tick");
        }
    }
    live.len()
}

pub fn spawn_live_ticker(state: SharedState, period: Duration) -> JoinHandle<()> {
    info!(period_secs = period.as_secs(), "⏱️  Live ticker started");
    tokio::spawn(async move {
        let mut ticks = interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick fires immediately
        ticks.tick().await;
        loop {
            ticks.tick().await;
            tick_live_matches(&state);
        }
    })
}
