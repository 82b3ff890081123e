use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context;
use sapper_core::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{self, Duration, Instant, MissedTickBehavior};

use crate::command::{Command, HELP};
use crate::text;

/// Marks the screen for a redraw and logs the rest.
struct TerminalListener {
    dirty: Rc<Cell<bool>>,
}

impl SessionListener for TerminalListener {
    fn map_changed(&mut self, _map: &Arc<MineMapUI>) {
        self.dirty.set(true);
    }

    fn time_changed(&mut self, time: &str) {
        log::trace!("time: {time}");
    }

    fn mines_remaining_changed(&mut self, remaining: CellCount) {
        log::debug!("mines remaining: {remaining}");
    }

    fn state_changed(&mut self, state: SessionState) {
        log::info!("game {state:?}");
        self.dirty.set(true);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Quit,
}

/// Everything one terminal play session needs: the running game, its view and where results go.
pub(crate) struct Game<S: GameStore> {
    config: GameConfig,
    options: SessionOptions,
    store: S,
    session: GameSession,
    view: BoardView,
    seed: u64,
    games_started: u64,
    dirty: Rc<Cell<bool>>,
}

impl<S: GameStore> Game<S> {
    /// Resumes the stored game for this board when `resume` is set and one exists, otherwise starts fresh. A save
    /// of the same level played on its side resumes in the orientation it was saved in.
    pub fn new(
        config: GameConfig,
        options: SessionOptions,
        store: S,
        seed: u64,
        viewport: Rect,
        resume: bool,
    ) -> anyhow::Result<Self> {
        let saved = if resume {
            store
                .load_game_save(config.level)
                .filter(|save| save.config == config || save.config == config.rotate())
        } else {
            None
        };
        let (config, session) = match saved {
            Some(save) => {
                log::info!("Resuming {} game at {}", config.level, format_elapsed(save.elapsed_millis));
                (save.config, GameSession::from_save(&save, seed))
            }
            None => (config, GameSession::new(config, seed).context("invalid board configuration")?),
        };

        let mut game = Self {
            config,
            options,
            store,
            view: BoardView::new(config.size(), viewport),
            session,
            seed,
            games_started: 1,
            dirty: Rc::new(Cell::new(true)),
        };
        game.install(|session| session);
        Ok(game)
    }

    fn install(&mut self, prepare: impl FnOnce(GameSession) -> GameSession) {
        let placeholder = GameSession::from_board(self.config, Board::new(self.config.size()), 0, 0);
        let mut session = prepare(std::mem::replace(&mut self.session, placeholder));
        session.set_options(self.options);
        session.set_listener(Box::new(TerminalListener {
            dirty: Rc::clone(&self.dirty),
        }));
        self.session = session;
        self.dirty.set(true);
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn new_game(&mut self) -> anyhow::Result<()> {
        self.persist();
        let seed = self.seed.wrapping_add(self.games_started);
        self.games_started += 1;
        let session = GameSession::new(self.config, seed).context("invalid board configuration")?;
        self.install(|_| session);
        self.view.refit(self.view.viewport());
        Ok(())
    }

    /// Stores an unfinished game, a finished one leaves no save behind.
    pub fn persist(&mut self) {
        let level = self.config.level;
        if self.session.is_finished() {
            self.store.remove_game_save(level);
        } else if self.session.is_started() {
            self.store.save_game(level, &self.session.save());
            log::debug!("Saved {level} game");
        }
    }

    pub fn tick(&mut self, delta: Duration) {
        self.session.tick(delta);
    }

    fn pointer_cell(&self, point: Point) -> Option<Coord2> {
        let cell = self.view.cell_at(point, true);
        if cell.is_none() {
            log::debug!("No cell under {point:?}");
        }
        cell
    }

    pub fn handle(&mut self, command: Command) -> anyhow::Result<Flow> {
        use Command::*;
        let was_finished = self.session.is_finished();
        match command {
            Open(cell) => {
                self.session.reveal(cell);
            }
            Flag(cell) => {
                self.session.cycle_flag(cell);
            }
            Chord(cell) => {
                self.session.try_open_neighbours(cell);
            }
            Tap(point) => {
                if let Some(cell) = self.pointer_cell(point) {
                    self.session.tap(cell);
                }
            }
            LongTap(point) => {
                if let Some(cell) = self.pointer_cell(point) {
                    self.session.long_tap(cell);
                }
            }
            RightClick(point) => {
                if let Some(cell) = self.pointer_cell(point) {
                    self.session.secondary_click(cell);
                }
            }
            MiddleClick(point) => {
                if let Some(cell) = self.pointer_cell(point) {
                    self.session.middle_click(cell);
                }
            }
            Hover(point) => {
                let cell = point.and_then(|point| self.view.cell_at(point, false));
                self.session.on_hover(cell);
            }
            Pan(dx, dy) => {
                self.view.pan(dx, dy);
                log::debug!("view: {:?}", self.view.transform());
            }
            Zoom(factor, pivot) => {
                self.view.zoom(factor, pivot);
                log::debug!("view: {:?}", self.view.transform());
            }
            Scroll(delta_y, pivot) => {
                self.view.scroll(delta_y, pivot);
                log::debug!("view: {:?}", self.view.transform());
            }
            Fit => self.view.refit(self.view.viewport()),
            AutoFlag => {
                let flagged = self.session.flag_all_deducible();
                println!("flagged {flagged} cells");
            }
            ToggleTap => {
                self.session.toggle_tap_behavior();
                self.options = self.session.options();
                self.dirty.set(true);
            }
            Pause => {
                if self.session.is_paused() {
                    self.session.resume();
                } else {
                    self.session.pause();
                    self.persist();
                }
                self.dirty.set(true);
            }
            NewGame => self.new_game()?,
            Show => self.dirty.set(true),
            Help => println!("{HELP}"),
            Quit => return Ok(Flow::Quit),
        }

        if !was_finished && self.session.is_finished() {
            self.finish();
        }
        Ok(Flow::Continue)
    }

    fn finish(&mut self) {
        self.store.remove_game_save(self.config.level);
        if let Some(info) = self.session.record_win(&mut self.store) {
            println!("cleared in {}!", self.session.time_string());
            if self.config.level.is_ranked() {
                print!("{}", text::draw_ranking(&info.records, info.rank));
            }
        } else if self.session.is_lost() {
            println!("boom, \"n\" starts a new game");
        }
    }

    /// Prints the board if anything changed since the last call.
    pub fn render(&self) {
        if self.dirty.replace(false) {
            print!("{}", text::draw_map(&self.session.render_snapshot()));
            println!("{}", text::draw_status(&self.session));
        }
    }
}

/// Reads commands from stdin until `q` or end of input, ticking the timer once a second in between.
pub(crate) async fn run<S: GameStore>(mut game: Game<S>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();

    println!("{HELP}");
    game.render();
    loop {
        tokio::select! {
            now = ticker.tick() => {
                game.tick(now - last_tick);
                last_tick = now;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("reading input")? else {
                    break;
                };
                match Command::parse(&line).and_then(|command| game.handle(command)) {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(err) => println!("{err:#}"),
                }
                game.render();
            }
        }
    }

    game.persist();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 1280.0, 720.0);

    fn game(config: GameConfig, store: MemoryStore, resume: bool) -> Game<MemoryStore> {
        Game::new(config, SessionOptions::default(), store, 3, VIEWPORT, resume).unwrap()
    }

    #[test]
    fn quitting_keeps_an_unfinished_game() {
        let mut game = game(GameConfig::EASY, MemoryStore::new(), true);
        assert_eq!(game.handle(Command::Open((5, 5))).unwrap(), Flow::Continue);
        assert_eq!(game.handle(Command::Quit).unwrap(), Flow::Quit);
        game.persist();

        let saved = game.store().load_game_save(Level::Easy).unwrap();
        let resumed = self::game(GameConfig::EASY, game.store.clone(), true);
        assert_eq!(resumed.session().board(), game.session().board());
        assert_eq!(saved.config, GameConfig::EASY);

        let fresh = self::game(GameConfig::EASY, game.store.clone(), false);
        assert!(!fresh.session().is_started());
    }

    #[test]
    fn rotated_game_resumes_on_the_same_board() {
        let mut game = game(GameConfig::HARD.rotate(), MemoryStore::new(), true);
        game.handle(Command::Open((2, 20))).unwrap();
        assert!(game.session().is_started());
        game.persist();

        for config in [GameConfig::HARD.rotate(), GameConfig::HARD] {
            let resumed = self::game(config, game.store.clone(), true);
            assert!(resumed.session().is_started(), "{config:?}");
            assert_eq!(resumed.session().board(), game.session().board());
            assert_eq!(resumed.config.size(), (16, 30));
            assert_eq!(resumed.view.board_size(), (16, 30));
        }
    }

    #[test]
    fn taps_resolve_through_the_view() {
        let mut game = game(GameConfig::EASY, MemoryStore::new(), false);
        game.handle(Command::parse("zoom nan 10 10").unwrap()).unwrap();
        game.handle(Command::parse("pan nan 0").unwrap()).unwrap();
        let size = CELL_SIZE * game.view.scale();
        let target = game.view.cell_origin((2, 3)) + Point::new(size / 2.0, size / 2.0);

        game.handle(Command::Tap(target)).unwrap();

        assert_eq!(game.session().board().visibility((2, 3)), Visibility::Opened);
        game.handle(Command::Tap(Point::new(-50.0, -50.0))).unwrap();
    }

    #[test]
    fn winning_ranks_and_drops_the_save() {
        let config = GameConfig::new_unchecked((10, 10), 1, Level::Easy);
        let mut store = MemoryStore::new();
        store.save_game(
            Level::Easy,
            &GameSave::from_board(config, &Board::new((10, 10)), 0),
        );
        let mut game = game(GameConfig::EASY, store, false);
        game.config = config;
        game.install(|_| {
            let board = Board::from_mine_coords((10, 10), &[(9, 9)]).unwrap();
            GameSession::from_board(config, board, 4_000, 0)
        });

        game.handle(Command::Open((0, 0))).unwrap();

        assert!(game.session().is_won());
        assert_eq!(game.store().load_rank_table(Level::Easy).len(), 1);
        assert_eq!(game.store().load_game_save(Level::Easy), None);
    }

    #[test]
    fn new_game_uses_a_fresh_board() {
        let mut game = game(GameConfig::MEDIUM, MemoryStore::new(), false);
        game.handle(Command::Open((0, 0))).unwrap();
        game.handle(Command::NewGame).unwrap();

        assert!(!game.session().is_started());
        assert!(game.store().load_game_save(Level::Medium).is_some());
    }

    #[test]
    fn toggle_is_kept_across_games() {
        let mut game = game(GameConfig::EASY, MemoryStore::new(), false);
        game.handle(Command::ToggleTap).unwrap();
        game.handle(Command::NewGame).unwrap();
        assert!(game.session().tap_is_flag());
    }
}
