//! Clicker economy: income, shop purchases and upgrades
//!
//! Every spend is gated on `coins >= cost` and is all-or-nothing.

use rand::Rng;

use super::command::{Outcome, Rejection};
use super::state::{GamePhase, GameState, ShipId};
use crate::error::{GameError, Result};

/// Price of one reset bomb
pub const BOMB_COST: u64 = 100;
/// Price of one shield
pub const SHIELD_COST: u64 = 50;
/// Repair price per missing health point
pub const REPAIR_COST_PER_HP: u64 = 50;
/// Per auto-clicker chance of a free bomb on each tick
pub const BOMB_DROP_CHANCE_PER_AUTO_CLICKER: f64 = 0.005;

pub fn click_multiplier_cost(state: &GameState) -> u64 {
    u64::from(state.upgrades.click_multiplier) * 10
}

pub fn auto_clicker_cost(state: &GameState) -> u64 {
    (u64::from(state.upgrades.auto_clickers) + 1) * 50
}

pub fn bomb_efficiency_cost(state: &GameState) -> u64 {
    u64::from(state.upgrades.bomb_efficiency) * 200
}

pub fn shield_strength_cost(state: &GameState) -> u64 {
    u64::from(state.upgrades.shield_strength) * 150
}

/// Coins per `AutoClickTick`
pub fn passive_income(state: &GameState) -> u64 {
    let upgrades = &state.upgrades;
    u64::from(upgrades.auto_clickers).saturating_mul(u64::from(upgrades.click_multiplier))
}

/// Pay out earned coins; balances stop at the type's ceiling
fn credit(state: &mut GameState, earned: u64) {
    state.resources.coins = state.resources.coins.saturating_add(earned);
    state.stats.total_coins_earned = state.stats.total_coins_earned.saturating_add(earned);
}

/// Deduct `cost` if affordable
fn spend(state: &mut GameState, cost: u64) -> Option<Rejection> {
    let coins = state.resources.coins;
    if coins < cost {
        return Some(Rejection::InsufficientFunds { cost, coins });
    }
    state.resources.coins = coins - cost;
    None
}

/// Run `grant` only after a successful spend
fn purchase(state: &mut GameState, cost: u64, grant: impl FnOnce(&mut GameState)) -> Outcome {
    match spend(state, cost) {
        Some(reason) => Outcome::Rejected(reason),
        None => {
            grant(state);
            Outcome::Applied
        }
    }
}

pub fn click(state: &mut GameState) -> Outcome {
    state.stats.total_clicks += 1;
    state.resources.clicks += 1;
    Outcome::Applied
}

pub fn earn_coins(state: &mut GameState) -> Outcome {
    let earned = u64::from(state.upgrades.click_multiplier);
    credit(state, earned);
    Outcome::Applied
}

pub fn add_coins(state: &mut GameState, amount: u64) -> Outcome {
    state.resources.coins = state.resources.coins.saturating_add(amount);
    Outcome::Applied
}

pub fn auto_click_tick(state: &mut GameState) -> Outcome {
    let earned = passive_income(state);
    credit(state, earned);

    let auto_clickers = state.upgrades.auto_clickers;
    if auto_clickers > 0 {
        let chance = (BOMB_DROP_CHANCE_PER_AUTO_CLICKER * f64::from(auto_clickers)).min(1.0);
        if state.rng.next_rng().random_bool(chance) {
            state.resources.bombs = state.resources.bombs.saturating_add(1);
            log::debug!("Auto-clickers found a bomb");
        }
    }
    Outcome::Applied
}

pub fn purchase_click_multiplier(state: &mut GameState) -> Outcome {
    let cost = click_multiplier_cost(state);
    purchase(state, cost, |s| s.upgrades.click_multiplier += 1)
}

pub fn purchase_auto_clicker(state: &mut GameState) -> Outcome {
    let cost = auto_clicker_cost(state);
    purchase(state, cost, |s| s.upgrades.auto_clickers += 1)
}

pub fn purchase_bomb(state: &mut GameState) -> Outcome {
    purchase(state, BOMB_COST, |s| s.resources.bombs += 1)
}

pub fn purchase_shield(state: &mut GameState) -> Outcome {
    purchase(state, SHIELD_COST, |s| s.resources.shields += 1)
}

pub fn upgrade_bomb_efficiency(state: &mut GameState) -> Outcome {
    let cost = bomb_efficiency_cost(state);
    purchase(state, cost, |s| s.upgrades.bomb_efficiency += 1)
}

pub fn upgrade_shield_strength(state: &mut GameState) -> Outcome {
    let cost = shield_strength_cost(state);
    purchase(state, cost, |s| s.upgrades.shield_strength += 1)
}

/// Restore a damaged (not sunk) player ship to full health during battle
pub fn rebuild_ship(state: &mut GameState, ship_id: ShipId) -> Result<Outcome> {
    let ship = state
        .grid
        .player
        .ship(ship_id)
        .ok_or(GameError::UnknownShip(ship_id))?;

    if state.grid.phase != GamePhase::Battle {
        return Ok(Outcome::Rejected(Rejection::WrongPhase));
    }
    if ship.is_sunk() {
        return Ok(Outcome::Rejected(Rejection::ShipSunk));
    }
    let missing = ship.damage();
    if missing == 0 {
        return Ok(Outcome::Rejected(Rejection::FullHealth));
    }

    let cost = u64::from(missing) * REPAIR_COST_PER_HP;
    Ok(purchase(state, cost, |s| {
        if let Some(ship) = s.grid.player.ship_mut(ship_id) {
            ship.health = ship.size as i32;
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_coins(coins: u64) -> GameState {
        let mut state = GameState::new(1);
        state.resources.coins = coins;
        state
    }

    #[test]
    fn test_click_and_earn_are_separate() {
        let mut state = GameState::new(1);
        click(&mut state);
        assert_eq!(state.stats.total_clicks, 1);
        assert_eq!(state.resources.clicks, 1);
        assert_eq!(state.resources.coins, 0);

        for _ in 0..4 {
            click(&mut state);
            earn_coins(&mut state);
        }
        assert_eq!(state.stats.total_clicks, 5);
        assert_eq!(state.resources.coins, 4);
        assert_eq!(state.stats.total_coins_earned, 4);
    }

    #[test]
    fn test_purchase_click_multiplier_broke() {
        let mut state = with_coins(0);
        let before = state.clone();
        let outcome = purchase_click_multiplier(&mut state);
        assert_eq!(
            outcome,
            Outcome::Rejected(Rejection::InsufficientFunds { cost: 10, coins: 0 })
        );
        assert_eq!(state, before);
        assert_eq!(state.upgrades.click_multiplier, 1);
    }

    #[test]
    fn test_purchase_click_multiplier() {
        let mut state = with_coins(20);
        assert_eq!(purchase_click_multiplier(&mut state), Outcome::Applied);
        assert_eq!(state.resources.coins, 10);
        assert_eq!(state.upgrades.click_multiplier, 2);

        // Next level costs 20
        assert!(!purchase_click_multiplier(&mut state).is_applied());

        earn_coins(&mut state);
        assert_eq!(state.resources.coins, 12);
        assert_eq!(state.stats.total_coins_earned, 2);
    }

    #[test]
    fn test_income_saturates_at_ceiling() {
        let mut state = GameState::new(1);
        add_coins(&mut state, u64::MAX);
        state.stats.total_coins_earned = u64::MAX - 1;
        state.upgrades.auto_clickers = 3;

        assert_eq!(earn_coins(&mut state), Outcome::Applied);
        for _ in 0..5 {
            auto_click_tick(&mut state);
        }
        add_coins(&mut state, 1);
        assert_eq!(state.resources.coins, u64::MAX);
        assert_eq!(state.stats.total_coins_earned, u64::MAX);

        // Purchases still work from a saturated balance
        assert_eq!(purchase_bomb(&mut state), Outcome::Applied);
        assert_eq!(state.resources.coins, u64::MAX - BOMB_COST);
    }

    #[test]
    fn test_add_coins_not_earned() {
        let mut state = GameState::new(1);
        add_coins(&mut state, 10);
        purchase_click_multiplier(&mut state);
        earn_coins(&mut state);
        assert_eq!(state.resources.coins, 2);
        assert_eq!(state.stats.total_coins_earned, 2);
    }

    #[test]
    fn test_auto_clicker_pricing_and_income() {
        let mut state = with_coins(60);
        assert_eq!(purchase_auto_clicker(&mut state), Outcome::Applied);
        assert_eq!(state.resources.coins, 10);
        assert_eq!(state.upgrades.auto_clickers, 1);
        assert_eq!(auto_clicker_cost(&state), 100);

        state.resources.coins = 0;
        auto_click_tick(&mut state);
        assert_eq!(state.resources.coins, 1);
        assert_eq!(state.stats.total_coins_earned, 1);

        state.upgrades.click_multiplier = 3;
        state.upgrades.auto_clickers = 4;
        auto_click_tick(&mut state);
        assert_eq!(state.resources.coins, 13);
    }

    #[test]
    fn test_auto_click_bomb_chance_clamped() {
        // 0.005 * 400 = 2.0, clamped to a certain drop
        let mut state = GameState::new(9);
        state.upgrades.auto_clickers = 400;
        auto_click_tick(&mut state);
        assert_eq!(state.resources.bombs, 1);

        // No auto-clickers, no income and no bombs
        let mut idle = GameState::new(9);
        let before = idle.clone();
        auto_click_tick(&mut idle);
        assert_eq!(idle.resources, before.resources);
    }

    #[test]
    fn test_shop_items() {
        let mut state = with_coins(150);
        assert_eq!(purchase_bomb(&mut state), Outcome::Applied);
        assert_eq!(state.resources.bombs, 1);
        assert_eq!(state.resources.coins, 50);
        assert!(!purchase_bomb(&mut state).is_applied());

        assert_eq!(purchase_shield(&mut state), Outcome::Applied);
        assert_eq!(state.resources.shields, 11);
        assert_eq!(state.resources.coins, 0);
    }

    #[test]
    fn test_upgrades_scale() {
        let mut state = with_coins(200 + 400 + 150);
        assert_eq!(upgrade_bomb_efficiency(&mut state), Outcome::Applied);
        assert_eq!(upgrade_bomb_efficiency(&mut state), Outcome::Applied);
        assert_eq!(state.upgrades.bomb_efficiency, 3);
        assert_eq!(upgrade_shield_strength(&mut state), Outcome::Applied);
        assert_eq!(state.upgrades.shield_strength, 2);
        assert_eq!(state.resources.coins, 0);
        assert_eq!(shield_strength_cost(&state), 300);
    }

    #[test]
    fn test_rebuild_ship() {
        let mut state = with_coins(100);
        let ship_id = state.grid.player.ships[0].id;

        // Setup phase: rejected
        assert_eq!(
            rebuild_ship(&mut state, ship_id).unwrap(),
            Outcome::Rejected(Rejection::WrongPhase)
        );

        state.grid.phase = GamePhase::Battle;
        assert_eq!(
            rebuild_ship(&mut state, ship_id).unwrap(),
            Outcome::Rejected(Rejection::FullHealth)
        );

        state.grid.player.ships[0].health -= 3;
        // Three points cost 150
        assert!(!rebuild_ship(&mut state, ship_id).unwrap().is_applied());
        state.grid.player.ships[0].health += 1;
        assert_eq!(rebuild_ship(&mut state, ship_id).unwrap(), Outcome::Applied);
        assert_eq!(state.grid.player.ships[0].health, 5);
        assert_eq!(state.resources.coins, 0);

        state.grid.player.ships[0].health = 0;
        state.resources.coins = 1000;
        assert_eq!(
            rebuild_ship(&mut state, ship_id).unwrap(),
            Outcome::Rejected(Rejection::ShipSunk)
        );

        assert!(matches!(
            rebuild_ship(&mut state, 4242),
            Err(GameError::UnknownShip(4242))
        ));
    }
}
