//! Local user registry
//!
//! Nickname login with no password: a known nickname signs back in as the
//! same user, a new one gets a fresh id. The signed-in user's id keys their
//! save slot and leaderboard entry. The user list and the current user live
//! in the same [`Store`] as saves.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GameError, Result};
use crate::persistence::Store;

/// Store key for the user list
pub const USERS_KEY: &str = "clicker_battleship_users";

/// Store key for the signed-in user
pub const CURRENT_USER_KEY: &str = "clicker_battleship_current_user";

/// A registered player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub nickname: String,
    /// Unix timestamp (ms)
    pub created_at_ms: u64,
    /// Unix timestamp (ms)
    pub last_login_ms: u64,
}

/// Known users plus the one signed in, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRegistry {
    users: Vec<User>,
    current: Option<String>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find_by_nickname(&self, nickname: &str) -> Option<&User> {
        self.users.iter().find(|u| u.nickname == nickname)
    }

    /// The signed-in user
    pub fn current(&self) -> Option<&User> {
        let id = self.current.as_deref()?;
        self.users.iter().find(|u| u.id == id)
    }

    pub fn is_logged_in(&self) -> bool {
        self.current().is_some()
    }

    /// Sign in by nickname, registering it on first use
    pub fn login(&mut self, nickname: &str, now_ms: u64) -> Result<&User> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(GameError::EmptyNickname);
        }

        let index = match self.users.iter().position(|u| u.nickname == nickname) {
            Some(i) => {
                self.users[i].last_login_ms = now_ms;
                log::info!("Welcome back, {nickname}");
                i
            }
            None => {
                self.users.push(User {
                    id: Uuid::new_v4().to_string(),
                    nickname: nickname.to_string(),
                    created_at_ms: now_ms,
                    last_login_ms: now_ms,
                });
                log::info!("Registered new user {nickname}");
                self.users.len() - 1
            }
        };
        let user = &self.users[index];
        self.current = Some(user.id.clone());
        Ok(user)
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.current() {
            log::info!("{} signed out", user.nickname);
        }
        self.current = None;
    }

    /// Rename the signed-in user; false when nobody is signed in
    pub fn update_nickname(&mut self, nickname: &str) -> Result<bool> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(GameError::EmptyNickname);
        }
        let Some(id) = self.current.as_deref() else {
            return Ok(false);
        };
        match self.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.nickname = nickname.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Load from a store; unreadable data starts an empty registry
    pub fn load(store: &dyn Store) -> Self {
        let mut registry = Self::new();
        match store.get(USERS_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<User>>(&json) {
                Ok(users) => registry.users = users,
                Err(e) => log::warn!("Discarding unreadable user list: {e}"),
            },
            Ok(None) => {}
            Err(e) => log::warn!("User store unavailable: {e}"),
        }

        match store.get(CURRENT_USER_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<User>(&json) {
                Ok(user) => {
                    if !registry.users.iter().any(|u| u.id == user.id) {
                        registry.users.push(user.clone());
                    }
                    registry.current = Some(user.id);
                }
                Err(e) => log::warn!("Discarding unreadable current user: {e}"),
            },
            Ok(None) => {}
            Err(e) => log::warn!("User store unavailable: {e}"),
        }
        log::info!("Loaded {} users", registry.users.len());
        registry
    }

    pub fn save(&self, store: &mut dyn Store) -> Result<()> {
        store.set(USERS_KEY, &serde_json::to_string(&self.users)?)?;
        match self.current() {
            Some(user) => store.set(CURRENT_USER_KEY, &serde_json::to_string(user)?)?,
            None => store.remove(CURRENT_USER_KEY)?,
        }
        Ok(())
    }
}
