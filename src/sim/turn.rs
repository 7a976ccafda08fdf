//! Match lifecycle: setup → battle → ended, plus reset

use super::command::{Outcome, Rejection};
use super::placement::auto_place_fleet;
use super::state::{BattleGrid, GamePhase, GameState};
use crate::consts::OPPONENT_NAME;
use crate::error::Result;

/// Mark the player ready once every ship is placed
///
/// With no opponent yet, one is generated and auto-placed and the battle
/// starts immediately.
pub fn set_player_ready(state: &mut GameState) -> Result<Outcome> {
    if state.grid.phase != GamePhase::Setup {
        return Ok(Outcome::Rejected(Rejection::WrongPhase));
    }
    if !state.grid.player.all_placed() {
        return Ok(Outcome::Rejected(Rejection::ShipsNotPlaced));
    }

    match state.grid.opponent.as_ref().map(|o| o.is_ready) {
        Some(opponent_ready) => {
            state.grid.player.is_ready = true;
            if opponent_ready {
                state.grid.phase = GamePhase::Battle;
                log::info!("Battle started");
            }
        }
        None => {
            start_battle(state)?;
            state.grid.player.is_ready = true;
        }
    }
    Ok(Outcome::Applied)
}

/// Generate and auto-place the computer opponent, then enter battle
///
/// Works on a draft of the state and commits only once the opponent fleet is
/// placed, so a `FleetDoesNotFit` error leaves `state` untouched.
pub fn start_battle(state: &mut GameState) -> Result<()> {
    let mut draft = state.clone();
    let mut opponent = draft.new_player(OPPONENT_NAME);
    let mut rng = draft.rng.next_rng();
    auto_place_fleet(&mut opponent, &mut rng)?;
    opponent.is_ready = true;

    log::info!(
        "Battle started: {} vs {} on a {}x{} grid",
        draft.grid.player.name,
        opponent.name,
        draft.grid.size,
        draft.grid.size
    );
    draft.grid.opponent = Some(opponent);
    draft.grid.phase = GamePhase::Battle;
    draft.grid.is_player_turn = true;
    *state = draft;
    Ok(())
}

/// Throw away the match and start a fresh setup
///
/// Resources, upgrades and click/coin stats carry over; combat stats do not.
/// The generation bump invalidates any opponent turn still scheduled.
pub fn reset_game(state: &mut GameState) -> Outcome {
    let name = state.grid.player.name.clone();
    let generation = state.grid.generation.wrapping_add(1);
    let size = state.grid.size;

    let player = state.new_player(&name);
    state.grid = BattleGrid {
        size,
        player,
        opponent: None,
        is_player_turn: true,
        phase: GamePhase::Setup,
        winner: None,
        generation,
    };
    state.stats.reset_combat();
    log::info!("Match reset (generation {generation})");
    Outcome::Applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::command::{Command, apply};

    fn placed_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        apply(&mut state, &Command::AutoPlaceShips).unwrap();
        state
    }

    #[test]
    fn test_ready_requires_all_ships() {
        let mut state = GameState::new(4);
        let first = state.grid.player.ships[0].id;
        apply(
            &mut state,
            &Command::PlaceShip {
                ship: first,
                x: 0,
                y: 0,
                horizontal: true,
            },
        )
        .unwrap();
        let before = state.clone();
        assert_eq!(
            set_player_ready(&mut state).unwrap(),
            Outcome::Rejected(Rejection::ShipsNotPlaced)
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_ready_starts_battle() {
        let mut state = placed_state(8);
        assert_eq!(set_player_ready(&mut state).unwrap(), Outcome::Applied);
        assert!(state.grid.player.is_ready);
        assert_eq!(state.grid.phase, GamePhase::Battle);
        assert!(state.grid.is_player_turn);

        let opponent = state.grid.opponent.as_ref().unwrap();
        assert_eq!(opponent.name, OPPONENT_NAME);
        assert!(opponent.is_ready);
        assert!(opponent.all_placed());
        assert_eq!(opponent.grid.occupied_count(), 17);

        // Second ready is a no-op
        assert_eq!(
            set_player_ready(&mut state).unwrap(),
            Outcome::Rejected(Rejection::WrongPhase)
        );
    }

    #[test]
    fn test_ready_waits_for_unready_opponent() {
        let mut state = placed_state(8);
        let opponent = state.new_player("Rival");
        state.grid.opponent = Some(opponent);
        assert_eq!(set_player_ready(&mut state).unwrap(), Outcome::Applied);
        assert!(state.grid.player.is_ready);
        assert_eq!(state.grid.phase, GamePhase::Setup);
    }

    #[test]
    fn test_failed_start_leaves_state() {
        // A 4x4 board cannot hold the carrier
        let mut state = GameState::with_player(6, "Ada", 4);
        let before = state.clone();
        assert!(matches!(
            start_battle(&mut state),
            Err(crate::error::GameError::FleetDoesNotFit { size: 5, grid_size: 4 })
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_reset_keeps_economy() {
        let mut state = placed_state(12);
        set_player_ready(&mut state).unwrap();
        state.resources.coins = 321;
        state.upgrades.click_multiplier = 4;
        state.stats.total_clicks = 50;
        state.stats.total_coins_earned = 400;
        state.stats.hits_landed = 3;
        state.stats.ships_sunk = 1;
        state.stats.bombs_launched = 2;
        state.stats.shields_deployed = 1;
        let old_ids: Vec<u32> = state.grid.player.ships.iter().map(|s| s.id).collect();

        assert_eq!(reset_game(&mut state), Outcome::Applied);
        assert_eq!(state.grid.phase, GamePhase::Setup);
        assert_eq!(state.grid.generation, 1);
        assert!(state.grid.opponent.is_none());
        assert!(state.grid.winner.is_none());
        assert_eq!(state.grid.player.name, "Player");
        assert_eq!(state.grid.player.grid.occupied_count(), 0);
        assert!(state.grid.player.ships.iter().all(|s| !s.is_placed()));
        assert!(state.grid.player.ships.iter().all(|s| !old_ids.contains(&s.id)));

        assert_eq!(state.resources.coins, 321);
        assert_eq!(state.upgrades.click_multiplier, 4);
        assert_eq!(state.stats.total_clicks, 50);
        assert_eq!(state.stats.total_coins_earned, 400);
        assert_eq!(state.stats.hits_landed, 0);
        assert_eq!(state.stats.ships_sunk, 0);
        assert_eq!(state.stats.bombs_launched, 0);
        assert_eq!(state.stats.shields_deployed, 0);
    }
}
