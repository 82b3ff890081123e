use core::fmt;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use error::*;
pub use rank::*;
pub use render::*;
pub use save::*;
pub use session::*;
pub use store::*;
pub use transform::*;
pub use types::*;
pub use view::*;

mod board;
mod cell;
mod error;
mod rank;
mod render;
mod save;
mod session;
mod store;
mod transform;
mod types;
mod view;

/// Difficulty bucket a game belongs to, also the key used for saves and rankings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    Easy,
    Medium,
    Hard,
    Extreme,
    Custom,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Easy,
        Level::Medium,
        Level::Hard,
        Level::Extreme,
        Level::Custom,
    ];

    pub const fn name(self) -> &'static str {
        use Level::*;
        match self {
            Easy => "Easy",
            Medium => "Medium",
            Hard => "Hard",
            Extreme => "Extreme",
            Custom => "Custom",
        }
    }

    pub const fn description(self) -> &'static str {
        use Level::*;
        match self {
            Easy => "Beginner-friendly, fewer mines.",
            Medium => "Intermediate level, more mines.",
            Hard => "Advanced, densely mined.",
            Extreme => "Expert level, extreme mines.",
            Custom => "Create your minefield.",
        }
    }

    /// Custom boards have no comparable best times.
    pub const fn is_ranked(self) -> bool {
        !matches!(self, Level::Custom)
    }

    /// The fixed board for a preset, `None` for [`Level::Custom`].
    pub const fn preset(self) -> Option<GameConfig> {
        use Level::*;
        match self {
            Easy => Some(GameConfig::EASY),
            Medium => Some(GameConfig::MEDIUM),
            Hard => Some(GameConfig::HARD),
            Extreme => Some(GameConfig::EXTREME),
            Custom => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: Coord,
    pub height: Coord,
    pub mine_count: CellCount,
    pub level: Level,
}

impl GameConfig {
    pub const EASY: Self = Self::new_unchecked((10, 10), 10, Level::Easy);
    pub const MEDIUM: Self = Self::new_unchecked((18, 14), 40, Level::Medium);
    pub const HARD: Self = Self::new_unchecked((30, 16), 99, Level::Hard);
    pub const EXTREME: Self = Self::new_unchecked((50, 30), 400, Level::Extreme);

    pub const fn new_unchecked((width, height): Coord2, mine_count: CellCount, level: Level) -> Self {
        Self {
            width,
            height,
            mine_count,
            level,
        }
    }

    pub fn custom(size: Coord2, mine_count: CellCount) -> core::result::Result<Self, ConfigError> {
        let config = Self::new_unchecked(size, mine_count, Level::Custom);
        config.validate()?;
        Ok(config)
    }

    pub const fn size(&self) -> Coord2 {
        (self.width, self.height)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.width, self.height)
    }

    pub const fn safe_cell_count(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mine_count)
    }

    /// Largest mine count that still leaves room for a mine-free first move wherever it lands.
    pub fn max_mines(&self) -> CellCount {
        let exclusion = mult(self.width.min(3), self.height.min(3));
        self.total_cells().saturating_sub(exclusion)
    }

    /// Same board turned on its side, useful when the viewport orientation differs from the preset.
    pub const fn rotate(&self) -> Self {
        Self::new_unchecked((self.height, self.width), self.mine_count, self.level)
    }

    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyBoard);
        }
        if self.mine_count == 0 {
            return Err(ConfigError::NoMines);
        }
        let max = self.max_mines();
        if self.mine_count > max {
            return Err(ConfigError::TooManyMines {
                requested: self.mine_count,
                cells: self.total_cells(),
                max,
            });
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}
