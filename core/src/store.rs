use std::collections::BTreeMap;

use crate::*;

/// Persistence collaborator for saves and best times, keyed by level.
///
/// Storage is best effort: implementations log failures instead of surfacing them, and a save that cannot be read
/// back is reported as missing.
pub trait GameStore {
    fn load_game_save(&self, level: Level) -> Option<GameSave>;
    fn save_game(&mut self, level: Level, save: &GameSave);
    fn remove_game_save(&mut self, level: Level);
    fn load_rank_table(&self, level: Level) -> RankTable;
    fn save_rank_table(&mut self, level: Level, table: &RankTable);
}

/// Keeps everything in memory, saves go through the same encoding a persistent store would use.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    saves: BTreeMap<Level, String>,
    ranks: BTreeMap<Level, RankTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw encoded save, lets tests corrupt what is stored.
    pub fn raw_save_mut(&mut self, level: Level) -> Option<&mut String> {
        self.saves.get_mut(&level)
    }
}

impl GameStore for MemoryStore {
    fn load_game_save(&self, level: Level) -> Option<GameSave> {
        GameSave::decode_or_none(self.saves.get(&level)?)
    }

    fn save_game(&mut self, level: Level, save: &GameSave) {
        match save.encode() {
            Ok(encoded) => {
                self.saves.insert(level, encoded);
            }
            Err(err) => log::error!("Could not encode {level} save: {err}"),
        }
    }

    fn remove_game_save(&mut self, level: Level) {
        self.saves.remove(&level);
    }

    fn load_rank_table(&self, level: Level) -> RankTable {
        self.ranks.get(&level).cloned().unwrap_or_default()
    }

    fn save_rank_table(&mut self, level: Level, table: &RankTable) {
        self.ranks.insert(level, table.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupted_save_loads_as_none() {
        let mut store = MemoryStore::new();
        let save = GameSave::from_board(GameConfig::EASY, &Board::new((10, 10)), 0);
        store.save_game(Level::Easy, &save);
        assert_eq!(store.load_game_save(Level::Easy), Some(save));

        store.raw_save_mut(Level::Easy).unwrap().truncate(5);
        assert_eq!(store.load_game_save(Level::Easy), None);
    }

    #[test]
    fn missing_rank_table_is_empty() {
        assert!(MemoryStore::new().load_rank_table(Level::Hard).is_empty());
    }
}
