//! Ship placement and rotation
//!
//! A ship occupies a straight horizontal or vertical run of `size` cells. No
//! two ships share a cell and no ship leaves the grid.

use rand::Rng;

use super::command::{Outcome, Rejection};
use super::state::{CellGrid, GamePhase, GameState, Player, ShipId, ShipPosition};
use crate::consts::MAX_PLACEMENT_ATTEMPTS;
use crate::error::{GameError, Result};

/// Cells a ship of `size` would cover at (x, y), or None if any leaves the grid
pub fn footprint(
    grid_size: usize,
    size: usize,
    x: usize,
    y: usize,
    horizontal: bool,
) -> Option<Vec<(usize, usize)>> {
    let last = size.checked_sub(1)?;
    let (end_x, end_y) = if horizontal {
        (x.checked_add(last)?, y)
    } else {
        (x, y.checked_add(last)?)
    };
    if end_x >= grid_size || end_y >= grid_size {
        return None;
    }
    Some(ShipPosition { x, y, horizontal }.cells(size).collect())
}

/// True if none of `cells` holds a ship, ignoring cells listed in `own`
fn is_free(grid: &CellGrid, cells: &[(usize, usize)], own: &[(usize, usize)]) -> bool {
    cells.iter().all(|&(x, y)| {
        own.contains(&(x, y)) || grid.cell(x, y).is_some_and(|c| !c.has_ship)
    })
}

/// Move `ship_id` to a new anchor/orientation if the footprint is valid
///
/// Returns the rejection reason on failure; the player is untouched then.
fn relocate(
    player: &mut Player,
    ship_id: ShipId,
    x: usize,
    y: usize,
    horizontal: bool,
) -> Result<Option<Rejection>> {
    let grid_size = player.grid.size();
    let ship = player.ship(ship_id).ok_or(GameError::UnknownShip(ship_id))?;
    let size = ship.size;
    let old_cells = ship.cells();

    let Some(new_cells) = footprint(grid_size, size, x, y, horizontal) else {
        return Ok(Some(Rejection::OutOfBounds));
    };
    if !is_free(&player.grid, &new_cells, &old_cells) {
        return Ok(Some(Rejection::Collision));
    }

    player.grid.set_ship(&old_cells, false);
    player.grid.set_ship(&new_cells, true);
    if let Some(ship) = player.ship_mut(ship_id) {
        ship.position = Some(ShipPosition { x, y, horizontal });
    }
    Ok(None)
}

/// Place (or move) one of the player's ships during setup
pub fn place_ship(
    state: &mut GameState,
    ship_id: ShipId,
    x: usize,
    y: usize,
    horizontal: bool,
) -> Result<Outcome> {
    let player = &mut state.grid.player;
    if player.ship(ship_id).is_none() {
        return Err(GameError::UnknownShip(ship_id));
    }
    if state.grid.phase != GamePhase::Setup {
        return Ok(Outcome::Rejected(Rejection::WrongPhase));
    }
    Ok(match relocate(player, ship_id, x, y, horizontal)? {
        Some(reason) => Outcome::Rejected(reason),
        None => Outcome::Applied,
    })
}

/// Flip a placed ship's orientation around its anchor
pub fn rotate_ship(state: &mut GameState, ship_id: ShipId) -> Result<Outcome> {
    let player = &mut state.grid.player;
    let ship = player.ship(ship_id).ok_or(GameError::UnknownShip(ship_id))?;
    if state.grid.phase != GamePhase::Setup {
        return Ok(Outcome::Rejected(Rejection::WrongPhase));
    }
    let Some(pos) = ship.position else {
        return Ok(Outcome::Rejected(Rejection::ShipNotPlaced));
    };
    Ok(match relocate(player, ship_id, pos.x, pos.y, !pos.horizontal)? {
        Some(reason) => Outcome::Rejected(reason),
        None => Outcome::Applied,
    })
}

/// Randomly place every unplaced ship in `player`'s roster
///
/// Rejection sampling with a bounded number of attempts per ship, then a
/// row-major scan so a crowded board still terminates.
pub fn auto_place_fleet<R: Rng>(player: &mut Player, rng: &mut R) -> Result<()> {
    let grid_size = player.grid.size();
    let pending: Vec<(ShipId, usize)> = player
        .ships
        .iter()
        .filter(|s| !s.is_placed())
        .map(|s| (s.id, s.size))
        .collect();

    for (ship_id, size) in pending {
        if size == 0 || size > grid_size {
            return Err(GameError::FleetDoesNotFit { size, grid_size });
        }

        let mut placed = false;
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let horizontal = rng.random_bool(0.5);
            let (max_x, max_y) = if horizontal {
                (grid_size - size, grid_size - 1)
            } else {
                (grid_size - 1, grid_size - size)
            };
            let x = rng.random_range(0..=max_x);
            let y = rng.random_range(0..=max_y);
            if relocate(player, ship_id, x, y, horizontal)?.is_none() {
                placed = true;
                break;
            }
        }

        if !placed {
            log::debug!("Random placement exhausted for ship {ship_id}, scanning");
            placed = scan_place(player, ship_id, grid_size)?;
        }
        if !placed {
            return Err(GameError::FleetDoesNotFit { size, grid_size });
        }
    }
    Ok(())
}

fn scan_place(player: &mut Player, ship_id: ShipId, grid_size: usize) -> Result<bool> {
    for horizontal in [true, false] {
        for y in 0..grid_size {
            for x in 0..grid_size {
                if relocate(player, ship_id, x, y, horizontal)?.is_none() {
                    return Ok(true);
                }
            }
        }
    }
    Ok(false)
}
