//! Leaderboard
//!
//! One entry per user, best score kept, top 20 by score. Persisted through
//! the same [`Store`] as saves.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persistence::Store;
use crate::sim::GameState;

/// Maximum number of entries to keep
pub const MAX_LEADERBOARD_ENTRIES: usize = 20;

/// Store key for the leaderboard
pub const LEADERBOARD_KEY: &str = "clicker_battleship_leaderboard";

/// Score for a game state
///
/// floor(coins × 0.1) plus weighted upgrades and combat stats, minus a small
/// penalty per bomb launched. Integer arithmetic keeps it exact.
pub fn calculate_score(state: &GameState) -> i64 {
    let upgrades = &state.upgrades;
    let stats = &state.stats;
    let coins = i64::try_from(state.resources.coins / 10).unwrap_or(i64::MAX);
    let upgrade_score = i64::from(upgrades.click_multiplier) * 50
        + i64::from(upgrades.auto_clickers) * 100
        + i64::from(upgrades.bomb_efficiency) * 200
        + i64::from(upgrades.shield_strength) * 150;
    let stats_score = stats.hits_landed as i64 * 20 + stats.ships_sunk as i64 * 100
        - stats.bombs_launched as i64 * 5;
    coins.saturating_add(upgrade_score).saturating_add(stats_score)
}

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub player_name: String,
    pub score: i64,
    pub clicks: u64,
    /// Unix timestamp (ms) when recorded
    pub timestamp_ms: u64,
    pub ships_sunk: u64,
    pub bombs_launched: u64,
    pub hits_landed: u64,
}

impl LeaderboardEntry {
    /// Snapshot the scoring fields of a game state
    pub fn from_state(user_id: &str, player_name: &str, state: &GameState, timestamp_ms: u64) -> Self {
        Self {
            user_id: user_id.to_string(),
            player_name: player_name.to_string(),
            score: calculate_score(state),
            clicks: state.resources.clicks,
            timestamp_ms,
            ships_sunk: state.stats.ships_sunk,
            bombs_launched: state.stats.bombs_launched,
            hits_landed: state.stats.hits_landed,
        }
    }
}

/// Ordering for leaderboard views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    Score,
    Clicks,
}

/// Leaderboard, kept sorted by score descending
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record an entry
    ///
    /// A user already on the board is only replaced by a strictly higher
    /// score. Returns the entry's 1-indexed rank, or None if it did not make
    /// the board.
    pub fn submit(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        let user_id = entry.user_id.clone();
        match self.entries.iter().position(|e| e.user_id == user_id) {
            Some(i) if entry.score > self.entries[i].score => self.entries[i] = entry,
            Some(_) => {}
            None => self.entries.push(entry),
        }

        // Stable sort keeps earlier entries ahead on ties
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_LEADERBOARD_ENTRIES);

        self.rank_of(&user_id)
    }

    /// 1-indexed rank by score
    pub fn rank_of(&self, user_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.user_id == user_id)
            .map(|i| i + 1)
    }

    /// Entries ordered by the given key, descending
    pub fn sorted_by(&self, key: SortKey) -> Vec<&LeaderboardEntry> {
        let mut view: Vec<&LeaderboardEntry> = self.entries.iter().collect();
        match key {
            SortKey::Score => view.sort_by(|a, b| b.score.cmp(&a.score)),
            SortKey::Clicks => view.sort_by(|a, b| b.clicks.cmp(&a.clicks)),
        }
        view
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<i64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from a store; a missing or unreadable board starts fresh
    pub fn load(store: &dyn Store) -> Self {
        match store.get(LEADERBOARD_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Leaderboard>(&json) {
                Ok(board) => {
                    log::info!("Loaded {} leaderboard entries", board.entries.len());
                    return board;
                }
                Err(e) => log::warn!("Discarding unreadable leaderboard: {e}"),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Leaderboard store unavailable: {e}"),
        }
        log::info!("No leaderboard found, starting fresh");
        Self::new()
    }

    pub fn save(&self, store: &mut dyn Store) -> Result<()> {
        store.set(LEADERBOARD_KEY, &serde_json::to_string(self)?)?;
        log::info!("Leaderboard saved ({} entries)", self.entries.len());
        Ok(())
    }
}
