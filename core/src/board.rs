use std::collections::{BTreeSet, VecDeque};

use ndarray::Array2;
use rand::Rng;
use smallvec::SmallVec;

use crate::*;

/// Up to 8 neighbours plus the centre cell.
pub type CellGroup = SmallVec<[Coord2; 9]>;

/// Minefield plus what the player has uncovered or marked so far.
///
/// Mines are not placed on construction, [`Board::place_mines_avoiding`] fills them in once the first cell to open
/// is known. Opened and flagged counts are kept alongside the visibility grid so win checks and the remaining-mine
/// display are O(1).
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    size: Coord2,
    mines: Array2<bool>,
    adjacent: Array2<u8>,
    visibility: Array2<Visibility>,
    mine_count: CellCount,
    mines_placed: bool,
    opened_count: CellCount,
    flagged_count: CellCount,
}

/// What a single reveal batch did to the board.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RevealReport {
    /// Safe cells that went from hidden to opened, in BFS order.
    pub opened: Vec<Coord2>,
    /// First mine uncovered by the batch.
    pub hit_mine: Option<Coord2>,
}

impl RevealReport {
    pub fn is_empty(&self) -> bool {
        self.opened.is_empty() && self.hit_mine.is_none()
    }
}

/// Result of trying to open the neighbours of a numbered cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Chord {
    /// Not an opened numbered cell, too many flags, or nothing left to open.
    Ignored,
    /// Fewer flags than the number, holds the hidden neighbours that could not be opened.
    Underflagged(CellGroup),
    Opened(RevealReport),
}

impl Board {
    /// Empty board with no mines placed yet.
    ///
    /// # Panics
    ///
    /// When either dimension is zero, configurations are validated before a board is ever built.
    pub fn new(size: Coord2) -> Self {
        assert!(size.0 > 0 && size.1 > 0, "board must be at least 1x1, got {size:?}");
        let shape = nd_shape(size);
        Self {
            size,
            mines: Array2::default(shape),
            adjacent: Array2::zeros(shape),
            visibility: Array2::default(shape),
            mine_count: 0,
            mines_placed: false,
            opened_count: 0,
            flagged_count: 0,
        }
    }

    /// Board with mines at exactly `mine_coords`, everything hidden.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut board = Self::new(size);
        for &coords in mine_coords {
            let coords = board.validate_coords(coords)?;
            board.mines[coords.to_nd_index()] = true;
        }
        board.finish_placement();
        Ok(board)
    }

    /// Rebuilds a saved board from flattened cell indices, out of range indices are dropped.
    pub fn restore(
        size: Coord2,
        mine_indices: &[CellCount],
        opened_indices: &[CellCount],
        flagged_indices: &[CellCount],
    ) -> Self {
        let mut board = Self::new(size);

        for coords in board.valid_indices(mine_indices, "mine") {
            board.mines[coords.to_nd_index()] = true;
        }
        if board.mines.iter().any(|&mine| mine) {
            board.finish_placement();
        }

        for coords in board.valid_indices(opened_indices, "opened") {
            if board.visibility[coords.to_nd_index()] == Visibility::Opened {
                continue;
            }
            board.visibility[coords.to_nd_index()] = Visibility::Opened;
            if !board.mines[coords.to_nd_index()] {
                board.opened_count += 1;
            }
        }

        for coords in board.valid_indices(flagged_indices, "flagged") {
            if board.visibility[coords.to_nd_index()] == Visibility::Hidden {
                board.visibility[coords.to_nd_index()] = Visibility::Flagged;
                board.flagged_count += 1;
            }
        }

        board
    }

    fn valid_indices(&self, indices: &[CellCount], kind: &str) -> Vec<Coord2> {
        indices
            .iter()
            .filter_map(|&index| {
                let coords = unflatten(index, self.size);
                if coords.is_none() {
                    log::warn!("Dropping {kind} index {index} outside a {:?} board", self.size);
                }
                coords
            })
            .collect()
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn width(&self) -> Coord {
        self.size.0
    }

    pub fn height(&self) -> Coord {
        self.size.1
    }

    pub fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    /// Mines actually on the board, zero until placement.
    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    pub fn opened_count(&self) -> CellCount {
        self.opened_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    /// Every safe cell has been opened.
    pub fn is_cleared(&self) -> bool {
        self.mines_placed && self.opened_count == self.safe_cell_count()
    }

    /// Some opened cell holds a mine.
    pub fn is_exploded(&self) -> bool {
        self.mines
            .iter()
            .zip(self.visibility.iter())
            .any(|(&mine, &visibility)| mine && visibility == Visibility::Opened)
    }

    pub fn contains(&self, (x, y): Coord2) -> bool {
        x < self.size.0 && y < self.size.1
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn has_mine(&self, coords: Coord2) -> bool {
        self.mines[coords.to_nd_index()]
    }

    /// Mined neighbours of `coords`, meaningless for mine cells.
    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.adjacent[coords.to_nd_index()]
    }

    pub fn visibility(&self, coords: Coord2) -> Visibility {
        self.visibility[coords.to_nd_index()]
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size)
    }

    /// All cells in row-major order.
    pub fn iter_coords(&self) -> impl Iterator<Item = Coord2> + use<> {
        let (width, height) = self.size;
        (0..height).flat_map(move |y| (0..width).map(move |x| (x, y)))
    }

    pub fn mine_indices(&self) -> Vec<CellCount> {
        Self::indices_where(&self.mines, |&mine| mine)
    }

    pub fn opened_indices(&self) -> Vec<CellCount> {
        Self::indices_where(&self.visibility, |&v| v == Visibility::Opened)
    }

    pub fn flagged_indices(&self) -> Vec<CellCount> {
        Self::indices_where(&self.visibility, |&v| v == Visibility::Flagged)
    }

    fn indices_where<T>(grid: &Array2<T>, pred: impl Fn(&T) -> bool) -> Vec<CellCount> {
        // `iter` walks in logical row-major order, which is the flattened index order
        grid.iter()
            .enumerate()
            .filter(|(_, item)| pred(*item))
            .map(|(index, _)| index as CellCount)
            .collect()
    }

    /// Start cell and its in-bounds neighbours.
    pub fn exclusion_zone(&self, first: Coord2) -> CellGroup {
        let mut zone = CellGroup::new();
        zone.push(first);
        zone.extend(self.iter_neighbors(first));
        zone
    }

    /// Places `mine_count` mines uniformly at random, never on `first`, a cell next to it, or a cell already opened.
    ///
    /// Returns how many mines were placed. Asking for more than fits outside the exclusion zone places as many as fit,
    /// configurations are expected to have been validated before this point.
    pub fn place_mines_avoiding<R: Rng + ?Sized>(
        &mut self,
        first: Coord2,
        mine_count: CellCount,
        rng: &mut R,
    ) -> CellCount {
        if self.mines_placed {
            log::warn!("Mines already placed, ignoring placement request");
            return self.mine_count;
        }
        let Ok(first) = self.validate_coords(first) else {
            log::warn!("Placement start {first:?} outside board {:?}", self.size);
            return 0;
        };

        let zone = self.exclusion_zone(first);
        let candidates: Vec<Coord2> = self
            .iter_coords()
            .filter(|coords| !zone.contains(coords))
            .filter(|coords| self.visibility[coords.to_nd_index()] != Visibility::Opened)
            .collect();

        let mut amount = mine_count as usize;
        if amount > candidates.len() {
            log::warn!(
                "Cannot fit {} mines outside the start area, placing {} instead",
                mine_count,
                candidates.len()
            );
            amount = candidates.len();
        }

        for index in rand::seq::index::sample(rng, candidates.len(), amount).iter() {
            self.mines[candidates[index].to_nd_index()] = true;
        }
        self.finish_placement();

        log::debug!(
            "Placed {} mines on {:?} avoiding {:?}",
            self.mine_count,
            self.size,
            first
        );
        self.mine_count
    }

    fn finish_placement(&mut self) {
        self.mine_count = self.mines.iter().filter(|&&mine| mine).count() as CellCount;
        for coords in self.iter_coords() {
            let count = if self.has_mine(coords) {
                0
            } else {
                self.iter_neighbors(coords)
                    .filter(|&pos| self.has_mine(pos))
                    .count() as u8
            };
            self.adjacent[coords.to_nd_index()] = count;
        }
        self.mines_placed = true;
    }

    /// Breadth-first reveal seeded with `start_cells`.
    ///
    /// Zero cells pull their hidden neighbours into the queue. Once a mine is uncovered nothing new is queued, but
    /// cells already queued in this batch are still opened. Out of range cells are skipped.
    pub fn reveal(&mut self, start_cells: &[Coord2]) -> RevealReport {
        let mut report = RevealReport::default();
        let mut to_visit: VecDeque<Coord2> = start_cells
            .iter()
            .copied()
            .filter(|&coords| self.contains(coords))
            .collect();

        while let Some(coords) = to_visit.pop_front() {
            // a cell can be queued twice before it is processed
            if self.visibility(coords) != Visibility::Hidden {
                continue;
            }
            self.visibility[coords.to_nd_index()] = Visibility::Opened;

            if self.has_mine(coords) {
                log::debug!("Mine uncovered at {coords:?}");
                report.hit_mine.get_or_insert(coords);
                continue;
            }

            self.opened_count += 1;
            report.opened.push(coords);
            let count = self.adjacent_mine_count(coords);
            log::trace!("Opened {coords:?}, adjacent mines: {count}");

            if count == 0 && report.hit_mine.is_none() {
                to_visit.extend(
                    self.iter_neighbors(coords)
                        .filter(|&pos| self.visibility(pos) == Visibility::Hidden),
                );
            }
        }

        report
    }

    /// Opens every hidden neighbour of a numbered cell whose flags already account for all its mines.
    pub fn try_open_neighbours(&mut self, coords: Coord2) -> Chord {
        if !self.contains(coords) || self.visibility(coords) != Visibility::Opened {
            return Chord::Ignored;
        }
        let count = self.adjacent_mine_count(coords);
        if count == 0 || self.has_mine(coords) {
            return Chord::Ignored;
        }

        let flagged = self.count_neighbors(coords, |v| v == Visibility::Flagged);
        let hidden: CellGroup = self
            .iter_neighbors(coords)
            .filter(|&pos| self.visibility(pos) == Visibility::Hidden)
            .collect();

        if hidden.is_empty() {
            Chord::Ignored
        } else if flagged == count {
            Chord::Opened(self.reveal(&hidden))
        } else if flagged < count {
            Chord::Underflagged(hidden)
        } else {
            Chord::Ignored
        }
    }

    /// Advances the marker on an unopened cell along `cycle`.
    pub fn cycle_flag(&mut self, coords: Coord2, cycle: FlagCycle) -> MarkOutcome {
        if !self.contains(coords) {
            return MarkOutcome::NoChange;
        }
        let current = self.visibility(coords);
        let Some(next) = cycle.next(current) else {
            return MarkOutcome::NoChange;
        };

        if current == Visibility::Flagged {
            self.flagged_count -= 1;
        }
        if next == Visibility::Flagged {
            self.flagged_count += 1;
        }
        self.visibility[coords.to_nd_index()] = next;
        MarkOutcome::Changed
    }

    /// Flags hidden neighbours of every opened number whose unopened neighbours must all be mines.
    ///
    /// Returns how many cells were flagged, calling it again right away flags nothing.
    pub fn flag_all_deducible(&mut self) -> CellCount {
        let mut targets = BTreeSet::new();
        for coords in self.iter_coords() {
            if self.visibility(coords) != Visibility::Opened || self.has_mine(coords) {
                continue;
            }
            let count = self.adjacent_mine_count(coords);
            if count == 0 {
                continue;
            }
            let unopened = self.count_neighbors(coords, |v| {
                matches!(v, Visibility::Hidden | Visibility::Flagged)
            });
            if unopened == count {
                targets.extend(
                    self.iter_neighbors(coords)
                        .filter(|&pos| self.visibility(pos) == Visibility::Hidden),
                );
            }
        }

        for &coords in &targets {
            self.visibility[coords.to_nd_index()] = Visibility::Flagged;
            self.flagged_count += 1;
        }
        if !targets.is_empty() {
            log::debug!("Auto-flagged {} cells", targets.len());
        }
        targets.len() as CellCount
    }

    fn count_neighbors(&self, coords: Coord2, pred: impl Fn(Visibility) -> bool) -> u8 {
        self.iter_neighbors(coords)
            .filter(|&pos| pred(self.visibility(pos)))
            .count() as u8
    }
}
