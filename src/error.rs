//! Error types for the engine and its collaborators.
//!
//! Gameplay rule violations are not errors: they come back as
//! [`Rejection`](crate::sim::Rejection)s with the state untouched. The
//! variants here are for caller bugs and I/O.

use thiserror::Error;

use crate::sim::ShipId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum GameError {
    /// Ship id is not in the roster (caller and state out of sync).
    #[error("Unknown ship ID: {0}")]
    UnknownShip(ShipId),

    /// Auto-placement found no free footprint for a ship.
    #[error("No room for a ship of size {size} on a {grid_size}x{grid_size} grid")]
    FleetDoesNotFit {
        /// Size of the ship that could not be placed.
        size: usize,
        /// Grid dimension.
        grid_size: usize,
    },

    /// Nickname is blank after trimming.
    #[error("Nickname must not be empty")]
    EmptyNickname,

    /// Settings failed validation.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Save written by an incompatible version.
    #[error("Unsupported save version {found} (expected {expected})")]
    UnsupportedSaveVersion {
        /// Version found in the envelope.
        found: u32,
        /// Version this build writes.
        expected: u32,
    },

    /// Storage backend I/O failure.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
