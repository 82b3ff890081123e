use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use sapper_core::{GameSave, GameStore, Level, RankTable};

/// One JSON file per level and kind under a data directory.
///
/// Failures are logged and otherwise ignored, losing a save is better than losing the game.
#[derive(Clone, Debug)]
pub(crate) struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(dir).with_context(|| format!("creating data dir {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn save_path(&self, level: Level) -> PathBuf {
        self.dir.join(format!("save-{}.json", level.name().to_lowercase()))
    }

    fn rank_path(&self, level: Level) -> PathBuf {
        self.dir.join(format!("rank-{}.json", level.name().to_lowercase()))
    }

    fn read(path: &Path) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(data) => Some(data),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                log::warn!("Could not read {}: {err}", path.display());
                None
            }
        }
    }

    fn write(path: &Path, data: &str) {
        if let Err(err) = fs::write(path, data) {
            log::error!("Could not write {}: {err}", path.display());
        }
    }
}

impl GameStore for FileStore {
    fn load_game_save(&self, level: Level) -> Option<GameSave> {
        GameSave::decode_or_none(&Self::read(&self.save_path(level))?)
    }

    fn save_game(&mut self, level: Level, save: &GameSave) {
        match save.encode() {
            Ok(data) => Self::write(&self.save_path(level), &data),
            Err(err) => log::error!("Could not encode {level} save: {err}"),
        }
    }

    fn remove_game_save(&mut self, level: Level) {
        let path = self.save_path(level);
        match fs::remove_file(&path) {
            Ok(()) => log::debug!("Removed {}", path.display()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => log::warn!("Could not remove {}: {err}", path.display()),
        }
    }

    fn load_rank_table(&self, level: Level) -> RankTable {
        let Some(data) = Self::read(&self.rank_path(level)) else {
            return RankTable::default();
        };
        serde_json::from_str(&data).unwrap_or_else(|err| {
            log::warn!("Ignoring unreadable {level} ranking: {err}");
            RankTable::default()
        })
    }

    fn save_rank_table(&mut self, level: Level, table: &RankTable) {
        match serde_json::to_string(table) {
            Ok(data) => Self::write(&self.rank_path(level), &data),
            Err(err) => log::error!("Could not encode {level} ranking: {err}"),
        }
    }
}
