//! Host-facing session: owns the state and drives time
//!
//! The engine itself has no clock. A session adds the two timed behaviours:
//! the opponent's delayed counter-move and the auto-clicker cadence. Both are
//! advanced by the host calling [`Session::advance`] with the elapsed time,
//! the same way a fixed-timestep game loop feeds its accumulator.
//!
//! All mutation goes through `&mut self`, so commands never interleave. Hosts
//! sharing a session across threads wrap it in a `Mutex`.

use std::collections::VecDeque;
use std::time::Duration;

use crate::error::Result;
use crate::settings::Settings;
use crate::sim::{Command, GamePhase, GameState, Outcome, apply};

/// Maximum auto-click ticks run by one `advance` call
pub const MAX_AUTO_CLICK_CATCHUP: u32 = 60;

/// An opponent move waiting for its delay to elapse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTurn {
    /// Match generation the move belongs to
    pub generation: u64,
    pub remaining: Duration,
}

/// Engine state plus timers and the inbound command queue
#[derive(Debug, Clone)]
pub struct Session {
    state: GameState,
    opponent_delay: Duration,
    auto_click_interval: Duration,
    auto_click_accumulator: Duration,
    scheduled: Vec<ScheduledTurn>,
    queue: VecDeque<Command>,
}

impl Session {
    /// Start a fresh game
    pub fn new(settings: &Settings, seed: u64) -> Result<Self> {
        settings.validate()?;
        let state = GameState::with_player(seed, &settings.player_name, settings.grid_size);
        log::info!("Session started with seed: {seed}");
        Ok(Self::from_state(state, settings))
    }

    /// Resume from a loaded state
    ///
    /// Opponent turns that were pending when the state was saved are not
    /// persisted; if the save caught the opponent mid-delay, the move is
    /// rescheduled here.
    pub fn from_state(state: GameState, settings: &Settings) -> Self {
        let mut session = Self {
            state,
            opponent_delay: settings.opponent_delay(),
            auto_click_interval: settings.auto_click_interval(),
            auto_click_accumulator: Duration::ZERO,
            scheduled: Vec::new(),
            queue: VecDeque::new(),
        };
        let grid = &session.state.grid;
        if grid.phase == GamePhase::Battle && !grid.is_player_turn {
            let generation = grid.generation;
            session.schedule_opponent(generation);
        }
        session
    }

    /// Read-only snapshot for presentation layers
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Apply a command now
    pub fn dispatch(&mut self, command: &Command) -> Result<Outcome> {
        let outcome = apply(&mut self.state, command)?;
        if let Outcome::AwaitOpponent { generation } = outcome {
            self.schedule_opponent(generation);
        }
        Ok(outcome)
    }

    /// Queue a command for the next `advance`
    pub fn submit(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// True while an opponent move for the current match is pending
    pub fn awaiting_opponent(&self) -> bool {
        let generation = self.state.grid.generation;
        self.scheduled.iter().any(|t| t.generation == generation)
    }

    /// Time until the next opponent move, if any is scheduled
    pub fn time_until_opponent(&self) -> Option<Duration> {
        self.scheduled.iter().map(|t| t.remaining).min()
    }

    /// Advance timers by `elapsed`, then drain queued commands
    ///
    /// Due opponent moves run first. A queued battle action waits (together
    /// with everything queued behind it) while the opponent still has a move
    /// pending. Returns the outcomes of the drained commands in order.
    ///
    /// On `Err` the failing command is dropped. Commands drained before it
    /// stay applied (their outcomes are not returned) and commands behind it
    /// stay queued for the next call.
    pub fn advance(&mut self, elapsed: Duration) -> Result<Vec<Outcome>> {
        self.run_opponent_timers(elapsed)?;
        self.run_auto_clickers(elapsed)?;

        let mut outcomes = Vec::new();
        while let Some(command) = self.queue.front() {
            if is_battle_action(command) && self.awaiting_opponent() {
                break;
            }
            if let Some(command) = self.queue.pop_front() {
                outcomes.push(self.dispatch(&command)?);
            }
        }
        Ok(outcomes)
    }

    /// Run every scheduled opponent move immediately
    pub fn resolve_pending(&mut self) -> Result<Vec<Outcome>> {
        let longest = self.time_until_longest();
        self.advance(longest)
    }

    fn time_until_longest(&self) -> Duration {
        self.scheduled
            .iter()
            .map(|t| t.remaining)
            .max()
            .unwrap_or(Duration::ZERO)
    }

    fn schedule_opponent(&mut self, generation: u64) {
        self.scheduled.push(ScheduledTurn {
            generation,
            remaining: self.opponent_delay,
        });
    }

    fn run_opponent_timers(&mut self, elapsed: Duration) -> Result<()> {
        for turn in &mut self.scheduled {
            turn.remaining = turn.remaining.saturating_sub(elapsed);
        }
        let (due, waiting): (Vec<_>, Vec<_>) = self
            .scheduled
            .drain(..)
            .partition(|t| t.remaining.is_zero());
        self.scheduled = waiting;

        for turn in due {
            if turn.generation != self.state.grid.generation {
                log::debug!(
                    "Discarding opponent turn from generation {} (now {})",
                    turn.generation,
                    self.state.grid.generation
                );
                continue;
            }
            apply(&mut self.state, &Command::OpponentTurn)?;
        }
        Ok(())
    }

    fn run_auto_clickers(&mut self, elapsed: Duration) -> Result<()> {
        if self.state.upgrades.auto_clickers == 0 {
            self.auto_click_accumulator = Duration::ZERO;
            return Ok(());
        }

        self.auto_click_accumulator += elapsed;
        let mut ticks = 0;
        while self.auto_click_accumulator >= self.auto_click_interval
            && ticks < MAX_AUTO_CLICK_CATCHUP
        {
            apply(&mut self.state, &Command::AutoClickTick)?;
            self.auto_click_accumulator -= self.auto_click_interval;
            ticks += 1;
        }
        if self.auto_click_accumulator >= self.auto_click_interval {
            log::debug!("Auto-clicker fell behind, dropping backlog");
            self.auto_click_accumulator = Duration::ZERO;
        }
        Ok(())
    }
}

/// Commands that only make sense on the player's battle turn
fn is_battle_action(command: &Command) -> bool {
    matches!(
        command,
        Command::Fire { .. } | Command::LaunchResetBomb { .. } | Command::DeployShield { .. }
    )
}
