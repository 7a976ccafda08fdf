//! Command surface
//!
//! Hosts describe what the player did as a [`Command`] and hand it to
//! [`apply`]. Every command either applies atomically or is rejected with the
//! state left exactly as it was.

use serde::{Deserialize, Serialize};

use super::state::{GamePhase, GameState, ShipId};
use super::{combat, economy, placement, turn};
use crate::error::Result;

/// A single player/host action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Click,
    EarnCoins,
    PurchaseClickMultiplier,
    PurchaseAutoClicker,
    /// Passive income tick, driven on a fixed cadence by the host
    AutoClickTick,
    PurchaseBomb,
    PurchaseShield,
    UpgradeBombEfficiency,
    UpgradeShieldStrength,
    RebuildShip { ship: ShipId },
    PlaceShip {
        ship: ShipId,
        x: usize,
        y: usize,
        horizontal: bool,
    },
    RotateShip { ship: ShipId },
    /// Auto-place every unplaced player ship (setup helper)
    AutoPlaceShips,
    Ready,
    Fire { x: usize, y: usize },
    DeployShield { x: usize, y: usize },
    LaunchResetBomb { x: usize, y: usize },
    /// Opponent's counter-move; normally issued by the session timer
    OpponentTurn,
    Reset,
    /// Grant coins without counting them as earned (debug/testing)
    AddCoins { amount: u64 },
}

/// Why a command was turned into a no-op
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    InsufficientFunds { cost: u64, coins: u64 },
    WrongPhase,
    NotPlayerTurn,
    /// Opponent move requested while the player is to move
    NotOpponentTurn,
    NoOpponent,
    OutOfBounds,
    Collision,
    ShipNotPlaced,
    ShipsNotPlaced,
    AlreadyHit,
    NoShip,
    AlreadyShielded,
    NoShields,
    NoBombs,
    FullHealth,
    ShipSunk,
}

/// Result of applying a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Applied,
    /// Applied; the opponent moves after the turn delay, provided the match
    /// is still on `generation` by then
    AwaitOpponent { generation: u64 },
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, Outcome::Rejected(_))
    }
}

/// Apply one command to the state
///
/// `Err` is reserved for caller bugs (unknown ship ids) and impossible
/// fleet layouts; ordinary rule violations come back as `Outcome::Rejected`.
pub fn apply(state: &mut GameState, command: &Command) -> Result<Outcome> {
    let outcome = match *command {
        Command::Click => economy::click(state),
        Command::EarnCoins => economy::earn_coins(state),
        Command::PurchaseClickMultiplier => economy::purchase_click_multiplier(state),
        Command::PurchaseAutoClicker => economy::purchase_auto_clicker(state),
        Command::AutoClickTick => economy::auto_click_tick(state),
        Command::PurchaseBomb => economy::purchase_bomb(state),
        Command::PurchaseShield => economy::purchase_shield(state),
        Command::UpgradeBombEfficiency => economy::upgrade_bomb_efficiency(state),
        Command::UpgradeShieldStrength => economy::upgrade_shield_strength(state),
        Command::RebuildShip { ship } => economy::rebuild_ship(state, ship)?,
        Command::PlaceShip {
            ship,
            x,
            y,
            horizontal,
        } => placement::place_ship(state, ship, x, y, horizontal)?,
        Command::RotateShip { ship } => placement::rotate_ship(state, ship)?,
        Command::AutoPlaceShips => auto_place_player(state)?,
        Command::Ready => turn::set_player_ready(state)?,
        Command::Fire { x, y } => combat::fire_at_opponent(state, x, y),
        Command::DeployShield { x, y } => combat::deploy_shield(state, x, y),
        Command::LaunchResetBomb { x, y } => combat::launch_reset_bomb(state, x, y),
        Command::OpponentTurn => combat::opponent_turn(state),
        Command::Reset => turn::reset_game(state),
        Command::AddCoins { amount } => economy::add_coins(state, amount),
    };

    if let Outcome::Rejected(reason) = outcome {
        log::debug!("Rejected {:?}: {:?}", command, reason);
    }
    Ok(outcome)
}

fn auto_place_player(state: &mut GameState) -> Result<Outcome> {
    if state.grid.phase != GamePhase::Setup {
        return Ok(Outcome::Rejected(Rejection::WrongPhase));
    }
    let mut rng = state.rng.next_rng();
    let mut player = state.grid.player.clone();
    placement::auto_place_fleet(&mut player, &mut rng)?;
    state.grid.player = player;
    Ok(Outcome::Applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_routes_economy() {
        let mut state = GameState::new(1);
        apply(&mut state, &Command::Click).unwrap();
        apply(&mut state, &Command::EarnCoins).unwrap();
        assert_eq!(state.stats.total_clicks, 1);
        assert_eq!(state.resources.coins, 1);
    }

    #[test]
    fn test_earn_after_max_grant() {
        let mut state = GameState::new(1);
        state.upgrades.auto_clickers = 2;
        apply(&mut state, &Command::AddCoins { amount: u64::MAX }).unwrap();
        apply(&mut state, &Command::EarnCoins).unwrap();
        apply(&mut state, &Command::AutoClickTick).unwrap();
        assert_eq!(state.resources.coins, u64::MAX);
        assert_eq!(state.stats.total_coins_earned, 3);
    }

    #[test]
    fn test_rejection_leaves_state() {
        let mut state = GameState::new(1);
        let before = state.clone();
        let outcome = apply(&mut state, &Command::Fire { x: 0, y: 0 }).unwrap();
        assert_eq!(outcome, Outcome::Rejected(Rejection::WrongPhase));
        assert!(!outcome.is_applied());
        assert_eq!(state, before);
    }

    #[test]
    fn test_auto_place_then_ready() {
        let mut state = GameState::new(21);
        assert_eq!(
            apply(&mut state, &Command::Ready).unwrap(),
            Outcome::Rejected(Rejection::ShipsNotPlaced)
        );
        assert!(apply(&mut state, &Command::AutoPlaceShips).unwrap().is_applied());
        assert!(state.grid.player.all_placed());
        assert_eq!(apply(&mut state, &Command::Ready).unwrap(), Outcome::Applied);
        assert_eq!(state.phase(), GamePhase::Battle);

        // Fleet is locked once battle starts
        assert_eq!(
            apply(&mut state, &Command::AutoPlaceShips).unwrap(),
            Outcome::Rejected(Rejection::WrongPhase)
        );
    }

    #[test]
    fn test_command_json() {
        let cmd = Command::PlaceShip {
            ship: 3,
            x: 1,
            y: 2,
            horizontal: false,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }
}
