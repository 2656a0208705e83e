//! Error types for the simulation.

use crate::Position;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Tried to place an entity onto a cell that already holds one.
    #[error("Cell {0} is already occupied")]
    OccupiedCell(Position),

    #[error("Position {0} is outside the grid")]
    OutOfBounds(Position),

    /// Tried to move onto an occupied or out-of-bounds cell.
    #[error("Invalid move from {from} to {to}")]
    InvalidMove { from: Position, to: Position },

    /// No empty cell around the parent to place a child into.
    #[error("Unable to spawn an agent near {0}")]
    UnableToSpawn(Position),

    #[error("No world attached")]
    MissingWorld,

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
