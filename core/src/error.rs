use thiserror::Error;

use crate::CellCount;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Reasons a [`GameConfig`](crate::GameConfig) cannot start a game.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Board must be at least 1x1")]
    EmptyBoard,
    #[error("At least one mine is required")]
    NoMines,
    #[error(
        "Too many mines: {requested} requested but a {cells}-cell board fits at most {max} with a safe first move"
    )]
    TooManyMines {
        requested: CellCount,
        cells: CellCount,
        max: CellCount,
    },
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Unreadable save data: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
