use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use sapper_core::{GameConfig, GameStore, Level, Rect};
use tracing::level_filters::LevelFilter;

mod command;
mod play;
mod settings;
mod store;
mod text;

use settings::{LocalOrDefault, Settings};
use store::FileStore;

#[derive(Parser, Debug)]
#[command(version, about = "Minesweeper in the terminal", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Where saves, best times and settings live
    #[arg(long, default_value = ".sapper", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Action>,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Play a game, resuming the saved one for the level if there is one
    Play(PlayArgs),
    /// Show best times
    Rank {
        #[arg(value_parser = parse_level)]
        level: Option<Level>,
    },
    /// Forget best times and saved games
    Clear {
        #[arg(value_parser = parse_level)]
        level: Option<Level>,
    },
}

#[derive(clap::Args, Debug)]
struct PlayArgs {
    /// easy, medium, hard, extreme or custom
    #[arg(short, long, value_parser = parse_level, default_value = "easy")]
    level: Level,

    /// Custom board width, implies `--level custom`
    #[arg(long, requires_all = ["height", "mines"])]
    width: Option<u16>,

    #[arg(long, requires_all = ["width", "mines"])]
    height: Option<u16>,

    #[arg(long, requires_all = ["width", "height"])]
    mines: Option<u32>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Pixel size of the virtual screen pointer commands refer to, as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_viewport, default_value = "1280x720")]
    viewport: Rect,

    /// Board turned on its side
    #[arg(long)]
    rotate: bool,

    /// Start over even if a saved game exists
    #[arg(long)]
    new: bool,
}

fn parse_level(raw: &str) -> Result<Level, String> {
    Level::ALL
        .into_iter()
        .find(|level| level.name().eq_ignore_ascii_case(raw))
        .ok_or_else(|| format!("unknown level {raw:?}"))
}

fn parse_viewport(raw: &str) -> Result<Rect, String> {
    let (width, height) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {raw:?}"))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|value| *value > 0.0)
            .ok_or_else(|| format!("invalid viewport size {raw:?}"))
    };
    Ok(Rect::new(0.0, 0.0, parse(width)?, parse(height)?))
}

fn level_filter(level: Option<log::Level>) -> LevelFilter {
    match level {
        None => LevelFilter::OFF,
        Some(log::Level::Error) => LevelFilter::ERROR,
        Some(log::Level::Warn) => LevelFilter::WARN,
        Some(log::Level::Info) => LevelFilter::INFO,
        Some(log::Level::Debug) => LevelFilter::DEBUG,
        Some(log::Level::Trace) => LevelFilter::TRACE,
    }
}

/// Board for this run, custom sizes fall back to the last remembered custom board.
fn board_config(args: &PlayArgs, settings: &mut Settings) -> anyhow::Result<GameConfig> {
    let config = match (args.width, args.height, args.mines) {
        (Some(width), Some(height), Some(mines)) => GameConfig::custom((width, height), mines)?,
        _ => match args.level.preset() {
            Some(config) => config,
            None => match settings.custom_config() {
                Some(config) => config,
                None => bail!("custom games need --width, --height and --mines"),
            },
        },
    };
    if config.level == Level::Custom {
        settings.remember_custom(&config);
    }
    Ok(if args.rotate { config.rotate() } else { config })
}

async fn play(args: PlayArgs, data_dir: &Path) -> anyhow::Result<()> {
    let mut settings = Settings::local_or_default(data_dir);
    let config = board_config(&args, &mut settings)?;
    if let Err(err) = settings.store_local(data_dir) {
        log::warn!("Could not store settings: {err:#}");
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    log::debug!("seed: {seed}");

    let store = FileStore::open(data_dir)?;
    let game = play::Game::new(
        config,
        settings.session_options(),
        store,
        seed,
        args.viewport,
        !args.new,
    )?;
    play::run(game).await
}

fn show_ranking(store: &FileStore, level: Option<Level>) {
    for level in level.map_or(Level::ALL.to_vec(), |level| vec![level]) {
        if !level.is_ranked() {
            continue;
        }
        println!("{level}: {}", level.description());
        print!("{}", text::draw_ranking(&store.load_rank_table(level), None));
    }
}

fn clear(store: &mut FileStore, level: Option<Level>) {
    for level in level.map_or(Level::ALL.to_vec(), |level| vec![level]) {
        store.remove_game_save(level);
        store.save_rank_table(level, &Default::default());
        log::info!("Cleared {level}");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(level_filter(args.verbose.log_level()))
        .with_writer(std::io::stderr)
        .init();
    log::debug!("args: {args:?}");

    match args.command.unwrap_or(Action::Play(PlayArgs::default_from_cli())) {
        Action::Play(play_args) => play(play_args, &args.data_dir).await,
        Action::Rank { level } => {
            show_ranking(&FileStore::open(&args.data_dir)?, level);
            Ok(())
        }
        Action::Clear { level } => {
            let mut store = FileStore::open(&args.data_dir).context("opening data dir")?;
            clear(&mut store, level);
            Ok(())
        }
    }
}

impl PlayArgs {
    /// The options `play` gets when no subcommand is given.
    fn default_from_cli() -> Self {
        Self {
            level: Level::Easy,
            width: None,
            height: None,
            mines: None,
            seed: None,
            viewport: Rect::new(0.0, 0.0, 1280.0, 720.0),
            rotate: false,
            new: false,
        }
    }
}
