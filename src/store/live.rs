// Live score simulation. Cosmetic only: nothing here settles bets or
// changes status.

use rand::Rng;
use tracing::debug;

use super::Sportsbook;
use crate::error::StoreError;
use crate::models::MatchStatus;

/// Chance per side per tick that the score moves
const SCORE_CHANCE: f64 = 0.3;
/// Largest single-tick increment
const MAX_GOALS_PER_TICK: u32 = 2;

impl Sportsbook {
    /// Ids of every match currently Live
    pub fn live_match_ids(&self) -> Vec<String> {
        self.matches
            .iter()
            .filter(|m| m.status == MatchStatus::Live)
            .map(|m| m.id.clone())
            .collect()
    }

    /// One simulated tick. Non-live matches are left alone. Returns the
    /// (home, away) score after the tick.
    pub fn simulate_live_update(&mut self, match_id: &str) -> Result<(u32, u32), StoreError> {
        let m = self
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| StoreError::MatchNotFound(match_id.to_string()))?;
        if m.status != MatchStatus::Live {
            return Ok((m.home_score, m.away_score));
        }

        let mut changed = false;
        for score in [&mut m.home_score, &mut m.away_score] {
            if self.rng.gen_bool(SCORE_CHANCE) {
                let add = self.rng.gen_range(0..=MAX_GOALS_PER_TICK);
                *score = score.saturating_add(add);
                changed |= add > 0;
            }
        }
        let score = (m.home_score, m.away_score);

        if changed {
            debug!(match_id, home = score.0, away = score.1, "⚡ Live score tick");
            self.commit();
        }
        Ok(score)
    }
}
