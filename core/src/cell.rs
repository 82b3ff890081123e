use serde::{Deserialize, Serialize};

/// Player-visible state of a single cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Hidden,
    Opened,
    Flagged,
    /// "Maybe a mine" marker, does not count as a flag.
    Uncertain,
}

/// Which markers a repeated flag action walks through.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagCycle {
    /// `Hidden -> Flagged -> Hidden`
    TwoState,
    /// `Hidden -> Flagged -> Uncertain -> Hidden`
    #[default]
    ThreeState,
}

impl FlagCycle {
    pub const fn from_mark_uncertain(mark_uncertain: bool) -> Self {
        if mark_uncertain {
            Self::ThreeState
        } else {
            Self::TwoState
        }
    }

    /// Next marker for a cell currently in `visibility`, `None` for opened cells.
    pub const fn next(self, visibility: Visibility) -> Option<Visibility> {
        use Visibility::*;
        match (self, visibility) {
            (_, Opened) => None,
            (_, Hidden) => Some(Flagged),
            (Self::TwoState, Flagged) => Some(Hidden),
            (Self::ThreeState, Flagged) => Some(Uncertain),
            (_, Uncertain) => Some(Hidden),
        }
    }
}
