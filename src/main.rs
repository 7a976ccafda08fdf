//! Clicker Battleship entry point
//!
//! Headless demo host: loads settings, signs in, plays the clicker and a full battle
//! against the computer, then records the result on the leaderboard.
//!
//! Usage: `clicker-battleship [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Clicker Battleship (native) starting...");

    if let Err(e) = demo::run() {
        log::error!("Demo failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts embed the library directly
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use clicker_battleship::persistence::{self, FileStore, MemoryStore, Store};
    use clicker_battleship::sim::{Command, GamePhase, Outcome};
    use clicker_battleship::{
        Leaderboard, LeaderboardEntry, Result, Session, Settings, UserRegistry,
    };

    const SETTINGS_FILE: &str = "settings.json";
    const DEMO_CLICKS: u32 = 400;

    fn now_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn open_store(settings: &Settings) -> Result<Box<dyn Store>> {
        match &settings.save_dir {
            Some(dir) => {
                log::info!("Saving to {}", dir.display());
                Ok(Box::new(FileStore::open(dir)?))
            }
            None => Ok(Box::new(MemoryStore::new())),
        }
    }

    pub fn run() -> Result<()> {
        let settings_path = std::env::args()
            .nth(1)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE));
        let settings = Settings::load(&settings_path);

        let seed = settings.seed.unwrap_or_else(now_ms);
        log::info!("Game initialized with seed: {seed}");

        let mut store = open_store(&settings)?;

        // Sign in as the configured player, reusing the account if it exists
        let mut users = UserRegistry::load(&*store);
        let user = users.login(&settings.player_name, now_ms())?.clone();
        users.save(&mut *store)?;
        log::info!("Signed in as {} ({})", user.nickname, user.id);

        let mut session = match persistence::load_game(&*store, Some(user.id.as_str())) {
            Ok(Some(state)) => Session::from_state(state, &settings),
            Ok(None) => Session::new(&settings, seed)?,
            Err(e) => {
                log::warn!("Ignoring saved game: {e}");
                Session::new(&settings, seed)?
            }
        };
        if session.state().phase() == GamePhase::Ended {
            session.dispatch(&Command::Reset)?;
        }

        play_clicker(&mut session)?;
        play_battle(&mut session, seed)?;

        let state = session.state();
        log::info!(
            "Winner: {} ({} hits, {} ships sunk, {} coins)",
            state.grid.winner.as_deref().unwrap_or("none"),
            state.stats.hits_landed,
            state.stats.ships_sunk,
            state.resources.coins
        );

        persistence::save_game(&mut *store, state, Some(user.id.as_str()))?;

        let mut leaderboard = Leaderboard::load(&*store);
        let entry = LeaderboardEntry::from_state(&user.id, &user.nickname, state, now_ms());
        match leaderboard.submit(entry) {
            Some(rank) => log::info!("Leaderboard rank: #{rank}"),
            None => log::info!("Score did not make the leaderboard"),
        }
        leaderboard.save(&mut *store)?;
        Ok(())
    }

    /// Click for coins and spend them on upgrades and munitions
    fn play_clicker(session: &mut Session) -> Result<()> {
        for _ in 0..DEMO_CLICKS {
            session.dispatch(&Command::Click)?;
            session.dispatch(&Command::EarnCoins)?;
        }
        for command in [
            Command::PurchaseAutoClicker,
            Command::PurchaseClickMultiplier,
            Command::PurchaseBomb,
            Command::PurchaseShield,
        ] {
            let outcome = session.dispatch(&command)?;
            log::info!("{command:?}: {outcome:?}");
        }
        let coins = session.state().resources.coins;
        log::info!("Clicker phase done with {coins} coins");
        Ok(())
    }

    /// Auto-place, ready up and trade shots until someone wins
    fn play_battle(session: &mut Session, seed: u64) -> Result<()> {
        if session.state().phase() == GamePhase::Setup {
            session.dispatch(&Command::AutoPlaceShips)?;
            session.dispatch(&Command::Ready)?;
        }

        let grid_size = session.state().grid.size;
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut bomb_used = false;

        // Each round marks at least one fresh cell
        for _ in 0..grid_size * grid_size * 2 {
            let state = session.state();
            if state.phase() != GamePhase::Battle {
                break;
            }
            if !state.grid.is_player_turn {
                session.resolve_pending()?;
                continue;
            }
            let Some(opponent) = state.grid.opponent.as_ref() else {
                break;
            };
            let targets = opponent.grid.unhit_cells();
            if targets.is_empty() {
                break;
            }
            let (x, y) = targets[rng.random_range(0..targets.len())];

            let command = if !bomb_used && state.resources.bombs > 0 {
                bomb_used = true;
                Command::LaunchResetBomb { x, y }
            } else {
                Command::Fire { x, y }
            };
            if let Outcome::AwaitOpponent { .. } = session.dispatch(&command)? {
                session.resolve_pending()?;
            }
        }
        Ok(())
    }
}
