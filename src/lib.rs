//! Clicker Battleship - an incremental clicker feeding a grid-combat engine
//!
//! Core modules:
//! - `sim`: Deterministic engine (economy, placement, combat, turns)
//! - `session`: Timers around the engine (opponent delay, auto-clickers)
//! - `persistence`: Save/load through a pluggable key/value store
//! - `leaderboard`: Per-user best scores
//! - `users`: Nickname login and the signed-in user
//! - `settings`: Engine configuration

pub mod error;
pub mod leaderboard;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sim;
pub mod users;

pub use error::{GameError, Result};
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use session::Session;
pub use settings::Settings;
pub use users::{User, UserRegistry};

/// Game configuration constants
pub mod consts {
    /// Default grid dimension (10×10)
    pub const DEFAULT_GRID_SIZE: usize = 10;
    /// Standard fleet, by ship size
    pub const FLEET: [usize; 5] = [5, 4, 3, 3, 2];

    pub const DEFAULT_PLAYER_NAME: &str = "Player";
    pub const OPPONENT_NAME: &str = "Computer";

    /// Shields granted to a new game
    pub const STARTING_SHIELDS: u32 = 10;

    /// Opponent answer delay
    pub const DEFAULT_OPPONENT_DELAY_MS: u64 = 1000;
    /// Auto-clicker cadence
    pub const DEFAULT_AUTO_CLICK_INTERVAL_MS: u64 = 1000;

    /// Random placement attempts per ship before falling back to a scan
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 1000;
}
