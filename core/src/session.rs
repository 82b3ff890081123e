use core::fmt;
use core::time::Duration;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Running,
    Won,
    Lost,
}

impl SessionState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Best times after a win and where this game landed, `rank` is `None` when unranked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WinInfo {
    pub records: RankTable,
    pub rank: Option<usize>,
}

/// Change notifications for whatever presents the session, every method defaults to doing nothing.
pub trait SessionListener {
    fn map_changed(&mut self, _map: &Arc<MineMapUI>) {}
    fn time_changed(&mut self, _time: &str) {}
    fn mines_remaining_changed(&mut self, _remaining: CellCount) {}
    fn state_changed(&mut self, _state: SessionState) {}
}

/// Input preferences, they change how actions are interpreted but never the rules.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Primary tap flags instead of digging, once the game has started.
    pub tap_is_flag: bool,
    pub flag_cycle: FlagCycle,
    /// Primary tap on an opened number tries to open its neighbours.
    pub chord_on_tap: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            tap_is_flag: false,
            flag_cycle: FlagCycle::ThreeState,
            chord_on_tap: true,
        }
    }
}

/// Formats elapsed time as `m:ss`.
pub fn format_elapsed(elapsed_millis: u64) -> String {
    let secs = elapsed_millis / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// One game from the first tap to a win or a loss.
///
/// Every action validates its cell and the session state and quietly does nothing when either is off, pointer
/// mapping misses the board all the time. Each mutation republishes a fresh [`MineMapUI`].
pub struct GameSession {
    config: GameConfig,
    board: Board,
    state: SessionState,
    elapsed_millis: u64,
    timer_running: bool,
    paused: bool,
    hover: Option<Coord2>,
    options: SessionOptions,
    snapshot: Arc<MineMapUI>,
    win_recorded: bool,
    rng: SmallRng,
    listener: Option<Box<dyn SessionListener>>,
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("elapsed_millis", &self.elapsed_millis)
            .field("timer_running", &self.timer_running)
            .field("paused", &self.paused)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Fresh game, mines get placed around the first revealed cell using an RNG seeded with `seed`.
    pub fn new(config: GameConfig, seed: u64) -> core::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_board(config, Board::new(config.size()), 0, seed))
    }

    /// Resumes a saved game, the timer restarts right away if the game had started.
    pub fn from_save(save: &GameSave, seed: u64) -> Self {
        let mut session = Self::from_board(save.config, save.to_board(), save.elapsed_millis, seed);
        if session.is_started() {
            session.start_timer();
        }
        session
    }

    /// Wraps an existing board, deriving the state from what is already opened.
    pub fn from_board(config: GameConfig, board: Board, elapsed_millis: u64, seed: u64) -> Self {
        let state = if board.is_exploded() {
            SessionState::Lost
        } else if board.is_cleared() {
            SessionState::Won
        } else {
            SessionState::Running
        };
        let snapshot = Arc::new(build_render_snapshot(&board, None, &[]));
        Self {
            config,
            board,
            state,
            elapsed_millis,
            timer_running: false,
            paused: false,
            hover: None,
            options: SessionOptions::default(),
            snapshot,
            // a restored win was already ranked when it happened
            win_recorded: state == SessionState::Won,
            rng: SmallRng::seed_from_u64(seed),
            listener: None,
        }
    }

    pub fn set_listener(&mut self, listener: Box<dyn SessionListener>) {
        self.listener = Some(listener);
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn is_won(&self) -> bool {
        self.state == SessionState::Won
    }

    pub fn is_lost(&self) -> bool {
        self.state == SessionState::Lost
    }

    /// At least one cell has been opened.
    pub fn is_started(&self) -> bool {
        self.board.opened_count() > 0
    }

    pub fn opened_count(&self) -> CellCount {
        self.board.opened_count()
    }

    pub fn flagged_count(&self) -> CellCount {
        self.board.flagged_count()
    }

    /// Configured mines minus placed flags, never below zero.
    pub fn mines_remaining(&self) -> CellCount {
        self.config.mine_count.saturating_sub(self.board.flagged_count())
    }

    pub fn elapsed_millis(&self) -> u64 {
        self.elapsed_millis
    }

    pub fn time_string(&self) -> String {
        format_elapsed(self.elapsed_millis)
    }

    pub fn render_snapshot(&self) -> Arc<MineMapUI> {
        Arc::clone(&self.snapshot)
    }

    pub fn hover(&self) -> Option<Coord2> {
        self.hover
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn set_options(&mut self, options: SessionOptions) {
        self.options = options;
    }

    pub fn tap_is_flag(&self) -> bool {
        self.options.tap_is_flag
    }

    pub fn toggle_tap_behavior(&mut self) -> bool {
        self.options.tap_is_flag = !self.options.tap_is_flag;
        log::debug!("Tap now flags: {}", self.options.tap_is_flag);
        self.options.tap_is_flag
    }

    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// No-op when already running or once the game is over.
    pub fn start_timer(&mut self) {
        if self.timer_running || self.is_finished() {
            return;
        }
        self.timer_running = true;
        log::debug!("Timer started at {}", self.time_string());
    }

    /// No-op when already stopped.
    pub fn stop_timer(&mut self) {
        if !self.timer_running {
            return;
        }
        self.timer_running = false;
        log::debug!("Timer stopped at {}", self.time_string());
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
        if self.is_started() {
            self.start_timer();
        }
    }

    /// Accrues `delta` while the timer runs un-paused, returns whether anything accrued.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if !self.timer_running || self.paused || self.is_finished() {
            return false;
        }
        let before = self.time_string();
        self.elapsed_millis = self.elapsed_millis.saturating_add(delta.as_millis() as u64);
        let after = self.time_string();
        if before != after {
            if let Some(listener) = self.listener.as_mut() {
                listener.time_changed(&after);
            }
        }
        true
    }

    fn accepts(&self, coords: Coord2) -> bool {
        !self.is_finished() && self.board.contains(coords)
    }

    /// Opens a hidden cell, placing the mines first if this is the first reveal.
    pub fn reveal(&mut self, coords: Coord2) -> RevealOutcome {
        if !self.accepts(coords) || self.board.visibility(coords) != Visibility::Hidden {
            return RevealOutcome::NoChange;
        }
        if !self.board.mines_placed() {
            self.board
                .place_mines_avoiding(coords, self.config.mine_count, &mut self.rng);
        }
        self.start_timer();
        let report = self.board.reveal(&[coords]);
        self.apply_reveal(report)
    }

    /// Advances the flag marker on an unopened cell.
    pub fn cycle_flag(&mut self, coords: Coord2) -> MarkOutcome {
        if !self.accepts(coords) {
            return MarkOutcome::NoChange;
        }
        let flagged_before = self.board.flagged_count();
        let outcome = self.board.cycle_flag(coords, self.options.flag_cycle);
        if outcome.has_update() {
            self.publish(&[]);
            if flagged_before != self.board.flagged_count() {
                self.notify_mines_remaining();
            }
        }
        outcome
    }

    /// Chords an opened number, an under-flagged chord only blinks the hidden neighbours.
    pub fn try_open_neighbours(&mut self, coords: Coord2) -> RevealOutcome {
        if !self.accepts(coords) {
            return RevealOutcome::NoChange;
        }
        match self.board.try_open_neighbours(coords) {
            Chord::Ignored => RevealOutcome::NoChange,
            Chord::Underflagged(hidden) => {
                let blinks: Vec<_> = hidden
                    .into_iter()
                    .map(|pos| (Animation::Blink, pos))
                    .collect();
                self.publish(&blinks);
                RevealOutcome::NoChange
            }
            Chord::Opened(report) => self.apply_reveal(report),
        }
    }

    /// Flags every hidden cell that must be a mine given the opened numbers.
    pub fn flag_all_deducible(&mut self) -> CellCount {
        if self.is_finished() {
            return 0;
        }
        let flagged = self.board.flag_all_deducible();
        if flagged > 0 {
            self.publish(&[]);
            self.notify_mines_remaining();
        }
        flagged
    }

    /// Tracks the hidden cell under the pointer, anything else clears the hover.
    pub fn on_hover(&mut self, coords: Option<Coord2>) {
        let hover = coords.filter(|&pos| {
            self.board.contains(pos) && self.board.visibility(pos) == Visibility::Hidden
        });
        if hover != self.hover {
            self.hover = hover;
            self.publish(&[]);
        }
    }

    /// Primary action: dig, or flag when tap-is-flag is on and the game already started.
    pub fn tap(&mut self, coords: Coord2) -> bool {
        if !self.accepts(coords) {
            return false;
        }
        match self.board.visibility(coords) {
            Visibility::Hidden if self.is_started() && self.options.tap_is_flag => {
                self.cycle_flag(coords).has_update()
            }
            Visibility::Hidden => self.reveal(coords).has_update(),
            Visibility::Flagged | Visibility::Uncertain if self.options.tap_is_flag => {
                self.cycle_flag(coords).has_update()
            }
            Visibility::Flagged | Visibility::Uncertain => false,
            Visibility::Opened if self.options.chord_on_tap => {
                self.try_open_neighbours(coords).has_update()
            }
            Visibility::Opened => false,
        }
    }

    /// Secondary touch action, the opposite of [`GameSession::tap`].
    pub fn long_tap(&mut self, coords: Coord2) -> bool {
        if self.options.tap_is_flag {
            self.reveal(coords).has_update()
        } else {
            self.cycle_flag(coords).has_update()
        }
    }

    pub fn secondary_click(&mut self, coords: Coord2) -> bool {
        self.cycle_flag(coords).has_update()
    }

    pub fn middle_click(&mut self, coords: Coord2) -> bool {
        self.try_open_neighbours(coords).has_update()
    }

    /// Snapshot for the persistence collaborator.
    pub fn save(&self) -> GameSave {
        GameSave::from_board(self.config, &self.board, self.elapsed_millis)
    }

    /// Ranks a won game once, later calls and non-wins return `None`.
    pub fn record_win(&mut self, store: &mut dyn GameStore) -> Option<WinInfo> {
        if !self.is_won() || self.win_recorded {
            return None;
        }
        self.win_recorded = true;

        let level = self.config.level;
        if !level.is_ranked() {
            return Some(WinInfo {
                records: RankTable::default(),
                rank: None,
            });
        }

        let mut records = store.load_rank_table(level);
        let rank = records.insert(RankItem {
            timestamp_millis: now_millis(),
            elapsed_millis: self.elapsed_millis,
        });
        if rank.is_some() {
            store.save_rank_table(level, &records);
        }
        log::info!(
            "{level} won in {}, rank: {:?}",
            self.time_string(),
            rank.map(|position| position + 1)
        );
        Some(WinInfo { records, rank })
    }

    fn apply_reveal(&mut self, report: RevealReport) -> RevealOutcome {
        if report.is_empty() {
            return RevealOutcome::NoChange;
        }
        let animations: Vec<_> = report
            .opened
            .iter()
            .map(|&pos| (Animation::Reveal, pos))
            .collect();

        let outcome = if report.hit_mine.is_some() {
            self.end_game(SessionState::Lost);
            RevealOutcome::HitMine
        } else if self.board.is_cleared() {
            self.end_game(SessionState::Won);
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        };

        self.publish(&animations);
        outcome
    }

    fn end_game(&mut self, state: SessionState) {
        if self.is_finished() {
            return;
        }
        self.state = state;
        self.stop_timer();
        self.hover = None;
        log::debug!("Game ended: {state:?} after {}", self.time_string());
        if let Some(listener) = self.listener.as_mut() {
            listener.state_changed(state);
        }
    }

    fn publish(&mut self, animations: &[(Animation, Coord2)]) {
        self.snapshot = Arc::new(build_render_snapshot(&self.board, self.hover, animations));
        if let Some(listener) = self.listener.as_mut() {
            listener.map_changed(&self.snapshot);
        }
    }

    fn notify_mines_remaining(&mut self) {
        let remaining = self.mines_remaining();
        if let Some(listener) = self.listener.as_mut() {
            listener.mines_remaining_changed(remaining);
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |since| since.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn session(size: Coord2, mines: &[Coord2]) -> GameSession {
        let config = GameConfig::new_unchecked(size, mines.len() as CellCount, Level::Custom);
        let board = Board::from_mine_coords(size, mines).unwrap();
        GameSession::from_board(config, board, 0, 0)
    }

    fn easy_session(mines: &[Coord2]) -> GameSession {
        let mut session = session((10, 10), mines);
        session.config = GameConfig::new_unchecked((10, 10), mines.len() as CellCount, Level::Easy);
        session
    }

    #[derive(Default)]
    struct Events {
        maps: usize,
        times: Vec<String>,
        remaining: Vec<CellCount>,
        states: Vec<SessionState>,
    }

    struct Recorder(Arc<Mutex<Events>>);

    impl SessionListener for Recorder {
        fn map_changed(&mut self, _map: &Arc<MineMapUI>) {
            self.0.lock().unwrap().maps += 1;
        }

        fn time_changed(&mut self, time: &str) {
            self.0.lock().unwrap().times.push(time.to_string());
        }

        fn mines_remaining_changed(&mut self, remaining: CellCount) {
            self.0.lock().unwrap().remaining.push(remaining);
        }

        fn state_changed(&mut self, state: SessionState) {
            self.0.lock().unwrap().states.push(state);
        }
    }

    #[test]
    fn first_tap_is_safe_on_easy_board() {
        for seed in 0..20 {
            let mut session = GameSession::new(GameConfig::EASY, seed).unwrap();

            let outcome = session.reveal((5, 5));

            assert!(outcome.has_update());
            let board = session.board();
            for coords in board.exclusion_zone((5, 5)) {
                assert!(!board.has_mine(coords), "seed {seed}: mine at {coords:?}");
            }
            assert_eq!(board.mine_count(), 10);
            assert!(session.opened_count() >= 1);
            assert_eq!(session.state(), SessionState::Running);
            assert!(session.timer_running());
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let mut a = GameSession::new(GameConfig::MEDIUM, 42).unwrap();
        let mut b = GameSession::new(GameConfig::MEDIUM, 42).unwrap();
        a.reveal((3, 3));
        b.reveal((3, 3));
        assert_eq!(a.board().mine_indices(), b.board().mine_indices());
    }

    #[test]
    fn invalid_config_is_rejected_at_start() {
        let config = GameConfig::new_unchecked((4, 4), 10, Level::Custom);
        assert!(matches!(
            GameSession::new(config, 0),
            Err(ConfigError::TooManyMines { .. })
        ));
    }

    #[test]
    fn opening_all_safe_cells_wins_once() {
        let events = Arc::new(Mutex::new(Events::default()));
        let mut session = session((3, 1), &[(2, 0)]);
        session.set_listener(Box::new(Recorder(events.clone())));

        assert_eq!(session.reveal((0, 0)), RevealOutcome::Won);
        assert!(session.is_won());
        assert_eq!(session.opened_count(), 2);
        assert!(!session.timer_running());
        assert_eq!(events.lock().unwrap().states, vec![SessionState::Won]);
    }

    #[test]
    fn win_iff_all_safe_cells_opened() {
        let mut session = session((4, 1), &[(3, 0)]);
        session.cycle_flag((1, 0));
        session.reveal((0, 0));
        assert_eq!(session.state(), SessionState::Running);
        assert_ne!(session.opened_count(), session.board().safe_cell_count());

        session.cycle_flag((1, 0));
        session.cycle_flag((1, 0));
        assert_eq!(session.reveal((1, 0)), RevealOutcome::Won);
        assert_eq!(session.opened_count(), session.board().safe_cell_count());
    }

    #[test]
    fn losing_freezes_the_board() {
        let mut session = session((3, 3), &[(0, 0), (2, 2)]);
        session.reveal((1, 1));
        session.tick(Duration::from_secs(3));

        assert_eq!(session.reveal((0, 0)), RevealOutcome::HitMine);
        assert!(session.is_lost());

        let board = session.board().clone();
        assert_eq!(session.reveal((2, 0)), RevealOutcome::NoChange);
        assert_eq!(session.cycle_flag((2, 2)), MarkOutcome::NoChange);
        assert_eq!(session.try_open_neighbours((1, 1)), RevealOutcome::NoChange);
        assert_eq!(session.flag_all_deducible(), 0);
        assert!(!session.tap((2, 0)));
        assert_eq!(session.board(), &board);

        assert!(!session.tick(Duration::from_secs(5)));
        assert_eq!(session.elapsed_millis(), 3000);
    }

    #[test]
    fn out_of_range_actions_are_ignored() {
        let mut session = session((2, 2), &[(0, 0)]);
        assert_eq!(session.reveal((9, 0)), RevealOutcome::NoChange);
        assert_eq!(session.cycle_flag((0, 9)), MarkOutcome::NoChange);
        assert!(!session.middle_click((2, 2)));
        session.on_hover(Some((5, 5)));
        assert_eq!(session.hover(), None);
    }

    #[test]
    fn flag_cycle_updates_remaining_mines() {
        let events = Arc::new(Mutex::new(Events::default()));
        let mut session = session((3, 3), &[(0, 0)]);
        session.set_listener(Box::new(Recorder(events.clone())));

        session.cycle_flag((0, 0));
        assert_eq!(session.mines_remaining(), 0);
        assert_eq!(session.board().visibility((0, 0)), Visibility::Flagged);
        session.cycle_flag((0, 0));
        assert_eq!(session.board().visibility((0, 0)), Visibility::Uncertain);
        session.cycle_flag((0, 0));
        assert_eq!(session.board().visibility((0, 0)), Visibility::Hidden);

        let events = events.lock().unwrap();
        assert_eq!(events.remaining, vec![0, 1]);
        assert_eq!(events.maps, 3);
    }

    #[test]
    fn remaining_mines_floor_at_zero() {
        let mut session = session((3, 3), &[(0, 0)]);
        session.cycle_flag((0, 0));
        session.cycle_flag((1, 1));
        assert_eq!(session.flagged_count(), 2);
        assert_eq!(session.mines_remaining(), 0);
    }

    #[test]
    fn two_state_flag_cycle() {
        let mut session = session((3, 3), &[(0, 0)]);
        session.set_options(SessionOptions {
            flag_cycle: FlagCycle::TwoState,
            ..Default::default()
        });
        session.cycle_flag((2, 2));
        session.cycle_flag((2, 2));
        assert_eq!(session.board().visibility((2, 2)), Visibility::Hidden);
    }

    #[test]
    fn underflagged_chord_blinks_without_mutating() {
        let mut session = session((3, 3), &[(0, 1), (2, 1)]);
        session.reveal((1, 1));
        let board = session.board().clone();

        assert_eq!(session.try_open_neighbours((1, 1)), RevealOutcome::NoChange);

        assert_eq!(session.board(), &board);
        let map = session.render_snapshot();
        assert_eq!(map.item_at((0, 0)), Some(MineItemUI::BlinkAnimation));
        assert_eq!(map.item_at((1, 1)), Some(MineItemUI::OpenedCount(2)));
    }

    #[test]
    fn reveal_publishes_reveal_animations() {
        let mut session = session((3, 3), &[(2, 2)]);
        let before = session.render_snapshot();

        session.reveal((0, 0));

        let map = session.render_snapshot();
        assert!(!Arc::ptr_eq(&before, &map));
        assert_eq!(map.item_at((0, 0)), Some(MineItemUI::RevealAnimation(0)));
        assert_eq!(before.item_at((0, 0)), Some(MineItemUI::Hidden));
    }

    #[test]
    fn hover_only_tracks_hidden_cells() {
        let mut session = session((3, 1), &[(2, 0)]);
        session.on_hover(Some((1, 0)));
        assert_eq!(session.render_snapshot().item_at((1, 0)), Some(MineItemUI::HiddenHover));

        session.reveal((1, 0));
        session.on_hover(Some((1, 0)));
        assert_eq!(session.hover(), None);
    }

    #[test]
    fn timer_start_and_stop_are_idempotent() {
        let events = Arc::new(Mutex::new(Events::default()));
        let mut session = GameSession::new(GameConfig::EASY, 1).unwrap();
        session.set_listener(Box::new(Recorder(events.clone())));

        assert!(!session.tick(Duration::from_secs(1)));
        session.reveal((0, 0));
        session.start_timer();
        assert!(session.tick(Duration::from_millis(1500)));
        assert_eq!(session.time_string(), "0:01");

        session.pause();
        assert!(!session.tick(Duration::from_secs(10)));
        session.resume();
        session.tick(Duration::from_secs(59));
        assert_eq!(session.time_string(), "1:00");

        session.stop_timer();
        session.stop_timer();
        assert!(!session.tick(Duration::from_secs(1)));
        assert_eq!(events.lock().unwrap().times, vec!["0:01", "1:00"]);
    }

    #[test]
    fn format_elapsed_pads_seconds() {
        assert_eq!(format_elapsed(0), "0:00");
        assert_eq!(format_elapsed(65_999), "1:05");
        assert_eq!(format_elapsed(754_000), "12:34");
    }

    #[test]
    fn tap_dispatch_follows_tap_behavior() {
        let mut session = session((5, 1), &[(2, 0), (4, 0)]);
        session.toggle_tap_behavior();
        assert!(session.tap_is_flag());

        // the first tap always digs
        assert!(session.tap((0, 0)));
        assert_eq!(session.opened_count(), 2);
        assert!(session.tap((4, 0)));
        assert_eq!(session.board().visibility((4, 0)), Visibility::Flagged);

        session.toggle_tap_behavior();
        assert!(!session.tap((4, 0)));
        assert_eq!(session.board().visibility((4, 0)), Visibility::Flagged);

        session.toggle_tap_behavior();
        assert!(session.long_tap((3, 0)));
        assert!(session.is_won());
    }

    #[test]
    fn tap_on_number_chords_when_enabled() {
        let mut session = session((3, 3), &[(0, 1), (2, 1)]);
        session.reveal((1, 1));
        session.secondary_click((0, 1));
        session.secondary_click((2, 1));

        assert!(session.tap((1, 1)));
        assert!(session.is_won());
    }

    #[test]
    fn tap_on_number_without_chording_does_nothing() {
        let mut session = session((3, 3), &[(0, 1), (2, 1)]);
        session.set_options(SessionOptions {
            chord_on_tap: false,
            ..Default::default()
        });
        session.reveal((1, 1));
        session.secondary_click((0, 1));
        session.secondary_click((2, 1));

        assert!(!session.tap((1, 1)));
        assert!(session.middle_click((1, 1)));
    }

    #[test]
    fn auto_flag_updates_remaining() {
        let mut session = session((4, 1), &[(0, 0), (2, 0)]);
        session.reveal((1, 0));
        assert_eq!(session.flag_all_deducible(), 2);
        assert_eq!(session.mines_remaining(), 0);
    }

    #[test]
    fn win_is_ranked_once() {
        let mut store = MemoryStore::new();
        let mut session = easy_session(&[(9, 9)]);
        session.start_timer();
        session.tick(Duration::from_secs(7));
        assert!(session.record_win(&mut store).is_none());

        session.reveal((0, 0));
        assert!(session.is_won());

        let info = session.record_win(&mut store).unwrap();
        assert_eq!(info.rank, Some(0));
        assert_eq!(info.records.items()[0].elapsed_millis, 7000);
        assert_eq!(store.load_rank_table(Level::Easy), info.records);
        assert!(session.record_win(&mut store).is_none());
    }

    #[test]
    fn save_without_mines_never_mines_opened_cells() {
        let data = r#"{
            "config": {"width": 6, "height": 6, "mine_count": 5, "level": "Custom"},
            "mine_indices": "x,-1",
            "opened_indices": "0,1,2",
            "flagged_indices": "",
            "elapsed_millis": 3000
        }"#;
        let save = GameSave::decode(data).unwrap();
        let mut session = GameSession::from_save(&save, 11);
        assert!(!session.board().mines_placed());

        session.reveal((5, 5));

        assert!(!session.is_lost());
        assert_eq!(session.board().mine_indices().len(), 5);
        for coords in [(0, 0), (1, 0), (2, 0)] {
            assert!(!session.board().has_mine(coords), "{coords:?}");
        }
        assert_eq!(
            session.board().opened_count() as usize,
            session.board().opened_indices().len()
        );
    }

    #[test]
    fn custom_win_is_unranked() {
        let mut store = MemoryStore::new();
        let mut session = session((2, 1), &[(0, 0)]);
        session.reveal((1, 0));

        let info = session.record_win(&mut store).unwrap();

        assert_eq!(info.rank, None);
        assert!(info.records.is_empty());
        assert!(store.load_rank_table(Level::Custom).is_empty());
    }

    #[test]
    fn save_and_resume_continues_the_game() {
        let mut session = session((5, 5), &[(0, 3), (1, 3), (1, 4)]);
        session.reveal((4, 0));
        session.cycle_flag((1, 4));
        session.tick(Duration::from_secs(12));

        let restored = GameSession::from_save(&session.save(), 99);

        assert_eq!(restored.board(), session.board());
        assert_eq!(restored.elapsed_millis(), 12_000);
        assert_eq!(restored.state(), SessionState::Running);
        assert!(restored.timer_running());
        assert_eq!(restored.mines_remaining(), 2);
    }

    #[test]
    fn unstarted_save_defers_placement() {
        let session = GameSession::new(GameConfig::EASY, 5).unwrap();
        let mut restored = GameSession::from_save(&session.save(), 5);

        assert!(!restored.board().mines_placed());
        assert!(!restored.timer_running());
        restored.reveal((0, 9));
        assert_eq!(restored.board().mine_count(), 10);
    }
}
