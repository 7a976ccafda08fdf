//! Combat resolution: single shots, reset bombs, shields and the opponent AI
//!
//! Health is the single source of truth for defeat: a side loses when every
//! hull is at or below zero. Sinks are counted on the transition to zero, so
//! overkill from a bomb never counts a ship twice.

use rand::Rng;

use super::command::{Outcome, Rejection};
use super::state::{GamePhase, GameState, Player};

/// Damage dealt per ship cell caught in a reset bomb blast
pub const BOMB_DAMAGE: i32 = 2;

/// Squares within `radius` (Chebyshev) of (cx, cy), clipped to the grid
///
/// The centre itself may lie off the grid; only the overlap is returned.
pub fn blast_area(grid_size: usize, cx: usize, cy: usize, radius: usize) -> Vec<(usize, usize)> {
    let Some(last) = grid_size.checked_sub(1) else {
        return Vec::new();
    };
    let x0 = cx.saturating_sub(radius);
    let y0 = cy.saturating_sub(radius);
    let x1 = cx.saturating_add(radius).min(last);
    let y1 = cy.saturating_add(radius).min(last);

    let mut cells = Vec::new();
    if x0 > x1 || y0 > y1 {
        return cells;
    }
    for y in y0..=y1 {
        for x in x0..=x1 {
            cells.push((x, y));
        }
    }
    cells
}

/// Damage the ship covering (x, y); true if this hit sank it
fn damage_ship_at(target: &mut Player, x: usize, y: usize, amount: i32) -> bool {
    match target.ship_at_mut(x, y) {
        Some(ship) => {
            let was_afloat = !ship.is_sunk();
            ship.health -= amount;
            was_afloat && ship.is_sunk()
        }
        None => false,
    }
}

/// Common guard for the player's attack actions
fn player_action_guard(state: &GameState) -> Option<Rejection> {
    if state.grid.phase != GamePhase::Battle {
        Some(Rejection::WrongPhase)
    } else if !state.grid.is_player_turn {
        Some(Rejection::NotPlayerTurn)
    } else {
        None
    }
}

/// Declare the player the winner if the opponent fleet is gone, otherwise
/// hand the turn to the opponent
fn end_player_attack(state: &mut GameState) -> Outcome {
    let defeated = state.grid.opponent.as_ref().is_some_and(Player::all_sunk);
    if defeated {
        state.grid.phase = GamePhase::Ended;
        state.grid.winner = Some(state.grid.player.name.clone());
        log::info!("{} wins the battle", state.grid.player.name);
        Outcome::Applied
    } else {
        state.grid.is_player_turn = false;
        Outcome::AwaitOpponent {
            generation: state.grid.generation,
        }
    }
}

/// Fire a single shot at the opponent grid
pub fn fire_at_opponent(state: &mut GameState, x: usize, y: usize) -> Outcome {
    if let Some(reason) = player_action_guard(state) {
        return Outcome::Rejected(reason);
    }
    let Some(opponent) = state.grid.opponent.as_mut() else {
        return Outcome::Rejected(Rejection::NoOpponent);
    };
    let Some(cell) = opponent.grid.cell_mut(x, y) else {
        return Outcome::Rejected(Rejection::OutOfBounds);
    };
    if cell.is_hit {
        return Outcome::Rejected(Rejection::AlreadyHit);
    }

    cell.is_hit = true;
    if cell.has_ship {
        state.stats.hits_landed += 1;
        if damage_ship_at(opponent, x, y, 1) {
            state.stats.ships_sunk += 1;
            log::debug!("Opponent ship sunk at ({x}, {y})");
        }
    }
    end_player_attack(state)
}

/// Launch a reset bomb centred on (x, y)
///
/// Radius equals `bomb_efficiency`. Every cell in the square is marked hit,
/// and every ship cell in it deals double damage, already-hit cells included.
/// The square is clipped to the grid; a blast that misses the grid entirely
/// is rejected without spending the bomb.
pub fn launch_reset_bomb(state: &mut GameState, x: usize, y: usize) -> Outcome {
    if let Some(reason) = player_action_guard(state) {
        return Outcome::Rejected(reason);
    }
    if state.resources.bombs == 0 {
        return Outcome::Rejected(Rejection::NoBombs);
    }
    let radius = state.upgrades.bomb_efficiency as usize;
    let Some(opponent) = state.grid.opponent.as_mut() else {
        return Outcome::Rejected(Rejection::NoOpponent);
    };
    let area = blast_area(opponent.grid.size(), x, y, radius);
    if area.is_empty() {
        return Outcome::Rejected(Rejection::OutOfBounds);
    }

    state.resources.bombs -= 1;
    state.stats.bombs_launched += 1;

    for (bx, by) in area {
        let Some(cell) = opponent.grid.cell_mut(bx, by) else {
            continue;
        };
        cell.is_hit = true;
        if cell.has_ship {
            state.stats.hits_landed += 1;
            if damage_ship_at(opponent, bx, by, BOMB_DAMAGE) {
                state.stats.ships_sunk += 1;
            }
        }
    }
    log::debug!("Reset bomb at ({x}, {y}) radius {radius}");
    end_player_attack(state)
}

/// Shield one of the player's ship cells; does not consume the turn
pub fn deploy_shield(state: &mut GameState, x: usize, y: usize) -> Outcome {
    if let Some(reason) = player_action_guard(state) {
        return Outcome::Rejected(reason);
    }
    if state.resources.shields == 0 {
        return Outcome::Rejected(Rejection::NoShields);
    }
    let Some(cell) = state.grid.player.grid.cell_mut(x, y) else {
        return Outcome::Rejected(Rejection::OutOfBounds);
    };
    if !cell.has_ship {
        return Outcome::Rejected(Rejection::NoShip);
    }
    if cell.is_shielded {
        return Outcome::Rejected(Rejection::AlreadyShielded);
    }

    cell.is_shielded = true;
    state.resources.shields -= 1;
    state.stats.shields_deployed += 1;
    Outcome::Applied
}

/// The opponent's move: one shot at a random unhit player cell
///
/// Only acts in battle while it is not the player's turn, so a stale timer
/// firing after the player already moved (or the match ended) is a no-op.
pub fn opponent_turn(state: &mut GameState) -> Outcome {
    if state.grid.phase != GamePhase::Battle {
        return Outcome::Rejected(Rejection::WrongPhase);
    }
    if state.grid.is_player_turn {
        return Outcome::Rejected(Rejection::NotOpponentTurn);
    }
    let Some(opponent_name) = state.grid.opponent.as_ref().map(|o| o.name.clone()) else {
        return Outcome::Rejected(Rejection::NoOpponent);
    };

    let candidates = state.grid.player.grid.unhit_cells();
    if !candidates.is_empty() {
        let pick = state.rng.next_rng().random_range(0..candidates.len());
        let (x, y) = candidates[pick];
        let player = &mut state.grid.player;

        if let Some(cell) = player.grid.cell_mut(x, y) {
            cell.is_hit = true;
            if cell.has_ship {
                if cell.is_shielded {
                    cell.is_shielded = false;
                    log::debug!("Shield absorbed hit at ({x}, {y})");
                } else {
                    damage_ship_at(player, x, y, 1);
                    if player.all_sunk() {
                        state.grid.phase = GamePhase::Ended;
                        state.grid.winner = Some(opponent_name.clone());
                        log::info!("{opponent_name} wins the battle");
                    }
                }
            }
        }
    }

    state.grid.is_player_turn = true;
    Outcome::Applied
}
