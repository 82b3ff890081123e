use serde::{Deserialize, Serialize};

use crate::*;

/// What the renderer should draw for one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MineItemUI {
    Hidden,
    HiddenHover,
    Flagged,
    Uncertain,
    OpenedBoom,
    OpenedCount(u8),
    /// Hidden cell flashing because a chord lacked flags, settles to [`MineItemUI::Hidden`].
    BlinkAnimation,
    /// Cell that was just opened, settles to [`MineItemUI::OpenedCount`].
    RevealAnimation(u8),
}

impl MineItemUI {
    pub const fn is_animation(self) -> bool {
        matches!(self, Self::BlinkAnimation | Self::RevealAnimation(_))
    }

    /// Item an animation ends on, other items are their own target.
    pub const fn settled(self) -> Self {
        match self {
            Self::BlinkAnimation => Self::Hidden,
            Self::RevealAnimation(count) => Self::OpenedCount(count),
            other => other,
        }
    }
}

/// Transient effect requested for a cell in the next snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Animation {
    Blink,
    Reveal,
}

/// Immutable render snapshot of a whole board, row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MineMapUI {
    pub width: Coord,
    pub height: Coord,
    items: Vec<MineItemUI>,
}

impl MineMapUI {
    pub fn items(&self) -> &[MineItemUI] {
        &self.items
    }

    /// Item at `coords`, `None` outside the map.
    pub fn item_at(&self, (x, y): Coord2) -> Option<MineItemUI> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.items.get(flatten((x, y), self.width) as usize).copied()
    }

    pub fn has_animation(&self) -> bool {
        self.items.iter().any(|item| item.is_animation())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[MineItemUI]> {
        self.items.chunks(usize::from(self.width))
    }

    /// Same map with every animation replaced by its end state.
    pub fn settled(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            items: self.items.iter().map(|item| item.settled()).collect(),
        }
    }
}

/// Pure projection of `board` plus hover and pending animations into a render snapshot.
///
/// Hover only shows on hidden cells. A reveal animation only applies to opened safe cells, a blink only to hidden
/// ones; mismatched requests fall back to the plain item.
pub fn build_render_snapshot(
    board: &Board,
    hover: Option<Coord2>,
    animations: &[(Animation, Coord2)],
) -> MineMapUI {
    let mut overlay = vec![None; board.total_cells() as usize];
    for &(animation, coords) in animations {
        if board.contains(coords) {
            overlay[flatten(coords, board.width()) as usize] = Some(animation);
        }
    }

    let items = board
        .iter_coords()
        .zip(overlay)
        .map(|(coords, animation)| {
            let visibility = board.visibility(coords);
            let opened_count = (visibility == Visibility::Opened && !board.has_mine(coords))
                .then(|| board.adjacent_mine_count(coords));
            match (animation, visibility, opened_count) {
                (Some(Animation::Reveal), _, Some(count)) => MineItemUI::RevealAnimation(count),
                (Some(Animation::Blink), Visibility::Hidden, _) => MineItemUI::BlinkAnimation,
                (_, Visibility::Hidden, _) if hover == Some(coords) => MineItemUI::HiddenHover,
                (_, Visibility::Hidden, _) => MineItemUI::Hidden,
                (_, Visibility::Flagged, _) => MineItemUI::Flagged,
                (_, Visibility::Uncertain, _) => MineItemUI::Uncertain,
                (_, Visibility::Opened, Some(count)) => MineItemUI::OpenedCount(count),
                (_, Visibility::Opened, None) => MineItemUI::OpenedBoom,
            }
        })
        .collect();

    MineMapUI {
        width: board.width(),
        height: board.height(),
        items,
    }
}
