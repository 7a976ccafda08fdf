//! Game state and core engine types
//!
//! Everything a save file needs lives here. The aggregate is a plain value:
//! command handlers take `&mut GameState` and nothing else.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Ship identifier, unique within a match
pub type ShipId = u32;

/// Top-level match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Player is placing ships
    Setup,
    /// Alternating attacks
    Battle,
    /// Terminal, winner recorded
    Ended,
}

/// A single grid square
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub x: usize,
    pub y: usize,
    pub has_ship: bool,
    pub is_hit: bool,
    pub is_shielded: bool,
}

/// Square grid of cells, row-major (`y * size + x`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellGrid {
    size: usize,
    cells: Vec<GridCell>,
}

impl CellGrid {
    /// Create an empty grid
    pub fn new(size: usize) -> Self {
        let mut cells = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                cells.push(GridCell {
                    x,
                    y,
                    has_ship: false,
                    is_hit: false,
                    is_shielded: false,
                });
            }
        }
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&GridCell> {
        if self.in_bounds(x, y) {
            self.cells.get(y * self.size + x)
        } else {
            None
        }
    }

    pub fn cell_mut(&mut self, x: usize, y: usize) -> Option<&mut GridCell> {
        if self.in_bounds(x, y) {
            self.cells.get_mut(y * self.size + x)
        } else {
            None
        }
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter()
    }

    /// Number of cells holding a ship segment
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.has_ship).count()
    }

    /// Coordinates of every cell not yet hit, row-major
    pub fn unhit_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .filter(|c| !c.is_hit)
            .map(|c| (c.x, c.y))
            .collect()
    }

    pub(crate) fn set_ship(&mut self, cells: &[(usize, usize)], has_ship: bool) {
        for &(x, y) in cells {
            if let Some(cell) = self.cell_mut(x, y) {
                cell.has_ship = has_ship;
            }
        }
    }
}

/// Anchor and orientation of a placed ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipPosition {
    pub x: usize,
    pub y: usize,
    pub horizontal: bool,
}

impl ShipPosition {
    /// Cells covered by a ship of `size` at this position
    pub fn cells(&self, size: usize) -> impl Iterator<Item = (usize, usize)> + use<> {
        let Self { x, y, horizontal } = *self;
        (0..size).map(move |i| if horizontal { (x + i, y) } else { (x, y + i) })
    }
}

/// A ship in a roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    pub id: ShipId,
    pub size: usize,
    /// Remaining health; sunk at `<= 0`, may go negative under bomb damage
    pub health: i32,
    /// `None` until placed
    pub position: Option<ShipPosition>,
}

impl Ship {
    pub fn new(id: ShipId, size: usize) -> Self {
        Self {
            id,
            size,
            health: size as i32,
            position: None,
        }
    }

    pub fn is_placed(&self) -> bool {
        self.position.is_some()
    }

    pub fn is_sunk(&self) -> bool {
        self.health <= 0
    }

    /// Health points missing relative to a fresh hull
    pub fn damage(&self) -> u32 {
        (self.size as i32 - self.health).max(0) as u32
    }

    /// Cells currently occupied (empty when unplaced)
    pub fn cells(&self) -> Vec<(usize, usize)> {
        self.position
            .map(|p| p.cells(self.size).collect())
            .unwrap_or_default()
    }

    pub fn occupies(&self, x: usize, y: usize) -> bool {
        self.position
            .is_some_and(|p| p.cells(self.size).any(|c| c == (x, y)))
    }
}

/// One side of the match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub grid: CellGrid,
    pub ships: Vec<Ship>,
    pub is_ready: bool,
}

impl Player {
    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.iter().find(|s| s.id == id)
    }

    pub fn ship_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.ships.iter_mut().find(|s| s.id == id)
    }

    /// Ship whose footprint covers (x, y)
    pub fn ship_at_mut(&mut self, x: usize, y: usize) -> Option<&mut Ship> {
        self.ships.iter_mut().find(|s| s.occupies(x, y))
    }

    pub fn all_placed(&self) -> bool {
        self.ships.iter().all(Ship::is_placed)
    }

    /// Authoritative defeat check: every hull at or below zero health
    pub fn all_sunk(&self) -> bool {
        self.ships.iter().all(Ship::is_sunk)
    }
}

/// The match aggregate: both sides plus turn bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleGrid {
    pub size: usize,
    pub player: Player,
    pub opponent: Option<Player>,
    pub is_player_turn: bool,
    pub phase: GamePhase,
    pub winner: Option<String>,
    /// Bumped on every reset; scheduled opponent turns carry the value they
    /// were scheduled under
    pub generation: u64,
}

/// Spendable resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub coins: u64,
    pub clicks: u64,
    pub bombs: u32,
    pub shields: u32,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            coins: 0,
            clicks: 0,
            bombs: 0,
            shields: STARTING_SHIELDS,
        }
    }
}

/// Purchased upgrade levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrades {
    pub click_multiplier: u32,
    pub auto_clickers: u32,
    pub bomb_efficiency: u32,
    /// Reserved; only affects score and its own upgrade price
    pub shield_strength: u32,
}

impl Default for Upgrades {
    fn default() -> Self {
        Self {
            click_multiplier: 1,
            auto_clickers: 0,
            bomb_efficiency: 1,
            shield_strength: 1,
        }
    }
}

/// Cumulative counters used for scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub total_clicks: u64,
    pub total_coins_earned: u64,
    pub bombs_launched: u64,
    pub shields_deployed: u64,
    pub hits_landed: u64,
    pub ships_sunk: u64,
}

impl Stats {
    /// Zero the per-match combat counters
    pub fn reset_combat(&mut self) {
        self.bombs_launched = 0;
        self.shields_deployed = 0;
        self.hits_landed = 0;
        self.ships_sunk = 0;
    }
}

/// RNG state wrapper for serialization
///
/// Each draw site takes a generator on a fresh stream, so the whole sequence
/// is reproducible from `(seed, stream)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn next_rng(&mut self) -> Pcg32 {
        let rng = Pcg32::new(self.seed, self.stream);
        self.stream = self.stream.wrapping_add(1);
        rng
    }
}

/// Complete engine state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub resources: Resources,
    pub upgrades: Upgrades,
    pub stats: Stats,
    pub grid: BattleGrid,
    pub rng: RngState,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// New state with the default player name and grid size
    pub fn new(seed: u64) -> Self {
        Self::with_player(seed, DEFAULT_PLAYER_NAME, DEFAULT_GRID_SIZE)
    }

    /// New state for a named player on a `grid_size` board
    pub fn with_player(seed: u64, name: &str, grid_size: usize) -> Self {
        let mut state = Self {
            resources: Resources::default(),
            upgrades: Upgrades::default(),
            stats: Stats::default(),
            grid: BattleGrid {
                size: grid_size,
                player: Player {
                    id: 0,
                    name: String::new(),
                    grid: CellGrid::new(0),
                    ships: Vec::new(),
                    is_ready: false,
                },
                opponent: None,
                is_player_turn: true,
                phase: GamePhase::Setup,
                winner: None,
                generation: 0,
            },
            rng: RngState::new(seed),
            next_id: 1,
        };
        state.grid.player = state.new_player(name);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Fresh player with an empty grid and an unplaced standard fleet
    pub fn new_player(&mut self, name: &str) -> Player {
        let id = self.next_entity_id();
        let ships = FLEET
            .iter()
            .map(|&size| Ship::new(self.next_entity_id(), size))
            .collect();
        Player {
            id,
            name: name.to_string(),
            grid: CellGrid::new(self.grid.size),
            ships,
            is_ready: false,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.grid.phase
    }
}
