//! Error types for maze construction and queries

use glam::IVec3;
use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid lattice dimensions, margins or densities.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Coordinate {0} is outside the grid")]
    OutOfBounds(IVec3),

    #[error("Coordinate {0} is a wall cell")]
    Wall(IVec3),

    #[error("Coordinate {0} is not connected to the goal")]
    Unreachable(IVec3),

    #[error("Coordinate {0} is not a floating block")]
    NotFloatingBlock(IVec3),

    #[error("Obstruction class {0} does not exist")]
    UnknownClass(usize),

    /// The distance field was requested before `solve()` ran.
    #[error("Distance field has not been computed")]
    NotSolved,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}
