//! Deterministic game engine
//!
//! All gameplay rules live here. This module must stay pure and deterministic:
//! - Commands are synchronous state transitions
//! - Seeded RNG only (carried in the state)
//! - No clocks, timers or I/O; the session drives time

pub mod combat;
pub mod command;
pub mod economy;
pub mod placement;
pub mod state;
pub mod turn;

pub use combat::{blast_area, deploy_shield, fire_at_opponent, launch_reset_bomb, opponent_turn};
pub use command::{Command, Outcome, Rejection, apply};
pub use placement::{auto_place_fleet, footprint, place_ship, rotate_ship};
pub use state::{
    BattleGrid, CellGrid, GamePhase, GameState, GridCell, Player, Resources, RngState, Ship,
    ShipId, ShipPosition, Stats, Upgrades,
};
pub use turn::{reset_game, set_player_ready, start_battle};
