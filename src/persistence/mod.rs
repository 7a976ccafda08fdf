//! Save/load boundary
//!
//! Features:
//! - Pluggable string store ([`Store`]) with memory and file backends
//! - Versioned JSON envelope around the game state
//! - Per-user save slots with an anonymous fallback

pub mod store;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::sim::GameState;

pub use store::{FileStore, MemoryStore, Store};

/// Envelope version written by this build
pub const SAVE_VERSION: u32 = 1;

/// Prefix for per-user save keys
pub const SAVE_KEY_PREFIX: &str = "clicker_battleship_game_state_";

/// Slot used when no user is signed in
pub const ANONYMOUS_USER: &str = "anonymous";

#[derive(Debug, Serialize, Deserialize)]
struct SaveEnvelope<S> {
    version: u32,
    state: S,
}

/// Peeks at the version before decoding the state
#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Store key for a user's save slot
pub fn save_key(user_id: Option<&str>) -> String {
    format!("{SAVE_KEY_PREFIX}{}", user_id.unwrap_or(ANONYMOUS_USER))
}

/// Serialize `state` into a versioned envelope
pub fn encode(state: &GameState) -> Result<String> {
    Ok(serde_json::to_string(&SaveEnvelope {
        version: SAVE_VERSION,
        state,
    })?)
}

/// Decode an envelope, rejecting other versions
pub fn decode(json: &str) -> Result<GameState> {
    let probe: VersionProbe = serde_json::from_str(json)?;
    if probe.version != SAVE_VERSION {
        return Err(GameError::UnsupportedSaveVersion {
            found: probe.version,
            expected: SAVE_VERSION,
        });
    }
    let envelope: SaveEnvelope<GameState> = serde_json::from_str(json)?;
    Ok(envelope.state)
}

pub fn save_game(store: &mut dyn Store, state: &GameState, user_id: Option<&str>) -> Result<()> {
    store.set(&save_key(user_id), &encode(state)?)?;
    log::info!(
        "Game saved for {} ({} coins)",
        user_id.unwrap_or(ANONYMOUS_USER),
        state.resources.coins
    );
    Ok(())
}

/// Load a user's save; `Ok(None)` when the slot is empty
pub fn load_game(store: &dyn Store, user_id: Option<&str>) -> Result<Option<GameState>> {
    let Some(json) = store.get(&save_key(user_id))? else {
        log::info!("No saved game for {}", user_id.unwrap_or(ANONYMOUS_USER));
        return Ok(None);
    };
    let state = decode(&json)?;
    log::info!("Loaded saved game for {}", user_id.unwrap_or(ANONYMOUS_USER));
    Ok(Some(state))
}

pub fn clear_game(store: &mut dyn Store, user_id: Option<&str>) -> Result<()> {
    store.remove(&save_key(user_id))?;
    log::info!("Saved game cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Command, apply};

    fn played_state() -> GameState {
        let mut state = GameState::new(31);
        apply(&mut state, &Command::AddCoins { amount: 75 }).unwrap();
        apply(&mut state, &Command::PurchaseAutoClicker).unwrap();
        apply(&mut state, &Command::AutoPlaceShips).unwrap();
        apply(&mut state, &Command::Ready).unwrap();
        apply(&mut state, &Command::Fire { x: 4, y: 4 }).unwrap();
        state
    }

    #[test]
    fn test_keys() {
        assert_eq!(save_key(None), "clicker_battleship_game_state_anonymous");
        assert_eq!(save_key(Some("u1")), "clicker_battleship_game_state_u1");
    }

    #[test]
    fn test_save_load_clear() {
        let mut store = MemoryStore::new();
        let state = played_state();

        assert!(load_game(&store, Some("u1")).unwrap().is_none());
        save_game(&mut store, &state, Some("u1")).unwrap();
        assert!(load_game(&store, None).unwrap().is_none());
        assert_eq!(load_game(&store, Some("u1")).unwrap(), Some(state));

        clear_game(&mut store, Some("u1")).unwrap();
        assert!(load_game(&store, Some("u1")).unwrap().is_none());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        let state = played_state();
        save_game(&mut store, &state, None).unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(load_game(&reopened, None).unwrap(), Some(state));
    }

    #[test]
    fn test_similar_user_ids_keep_separate_saves() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        let mut alice = GameState::new(1);
        alice.resources.coins = 111;
        let mut bob = GameState::new(2);
        bob.resources.coins = 222;

        save_game(&mut store, &alice, Some("a.b")).unwrap();
        save_game(&mut store, &bob, Some("a_b")).unwrap();
        assert_eq!(load_game(&store, Some("a.b")).unwrap(), Some(alice));
        assert_eq!(load_game(&store, Some("a_b")).unwrap(), Some(bob));
    }

    #[test]
    fn test_foreign_version_rejected() {
        let json = encode(&GameState::new(1))
            .unwrap()
            .replacen("\"version\":1", "\"version\":99", 1);
        assert!(matches!(
            decode(&json),
            Err(GameError::UnsupportedSaveVersion {
                found: 99,
                expected: SAVE_VERSION
            })
        ));
    }

    #[test]
    fn test_corrupt_save_is_error() {
        let mut store = MemoryStore::new();
        store.set(&save_key(None), "{ truncated").unwrap();
        assert!(matches!(load_game(&store, None), Err(GameError::Json(_))));
    }
}
