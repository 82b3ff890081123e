use serde::{Deserialize, Serialize};

use crate::*;

/// Snapshot of an unfinished game, sparse enough to store as a handful of strings.
///
/// The three index lists hold flattened row-major cell indices and serialize as comma-separated strings. Decoding
/// drops tokens that do not parse instead of rejecting the whole save. Uncertain marks are not kept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSave {
    pub config: GameConfig,
    #[serde(with = "index_list")]
    pub mine_indices: Vec<CellCount>,
    #[serde(with = "index_list")]
    pub opened_indices: Vec<CellCount>,
    #[serde(with = "index_list")]
    pub flagged_indices: Vec<CellCount>,
    pub elapsed_millis: u64,
}

impl GameSave {
    pub fn from_board(config: GameConfig, board: &Board, elapsed_millis: u64) -> Self {
        Self {
            config,
            mine_indices: board.mine_indices(),
            opened_indices: board.opened_indices(),
            flagged_indices: board.flagged_indices(),
            elapsed_millis,
        }
    }

    pub fn to_board(&self) -> Board {
        Board::restore(
            self.config.size(),
            &self.mine_indices,
            &self.opened_indices,
            &self.flagged_indices,
        )
    }

    pub fn encode(&self) -> core::result::Result<String, SaveError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a stored save, preset levels always take their board from the preset in whichever orientation the
    /// save was played.
    pub fn decode(data: &str) -> core::result::Result<Self, SaveError> {
        let mut save: Self = serde_json::from_str(data)?;
        if let Some(preset) = save.config.level.preset() {
            let rotated = preset.rotate();
            save.config = if save.config.size() == rotated.size() {
                rotated
            } else {
                preset
            };
        }
        save.config.validate()?;
        Ok(save)
    }

    /// Like [`GameSave::decode`] but an unreadable save just counts as no save.
    pub fn decode_or_none(data: &str) -> Option<Self> {
        Self::decode(data)
            .inspect_err(|err| log::warn!("Ignoring game save: {err}"))
            .ok()
    }
}

pub(crate) mod index_list {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::CellCount;

    pub fn serialize<S: Serializer>(indices: &[CellCount], serializer: S) -> Result<S::Ok, S::Error> {
        let joined = indices
            .iter()
            .map(|index| index.to_string())
            .collect::<Vec<_>>()
            .join(",");
        serializer.serialize_str(&joined)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<CellCount>, D::Error> {
        let joined = String::deserialize(deserializer)?;
        Ok(parse(&joined))
    }

    pub fn parse(joined: &str) -> Vec<CellCount> {
        joined
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .filter_map(|token| {
                token
                    .parse()
                    .inspect_err(|_| log::warn!("Dropping malformed cell index {token:?}"))
                    .ok()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(size: Coord2, mines: CellCount) -> GameConfig {
        GameConfig::custom(size, mines).unwrap()
    }

    #[test]
    fn round_trip_restores_board() {
        let config = custom((5, 4), 3);
        let mut board = Board::from_mine_coords((5, 4), &[(4, 0), (4, 1), (0, 3)]).unwrap();
        board.reveal(&[(0, 0)]);
        board.cycle_flag((4, 0), FlagCycle::TwoState);

        let save = GameSave::from_board(config, &board, 12_345);
        let decoded = GameSave::decode(&save.encode().unwrap()).unwrap();

        assert_eq!(decoded, save);
        assert_eq!(decoded.to_board(), board);
    }

    #[test]
    fn round_trip_with_empty_lists() {
        let config = custom((4, 4), 2);
        let board = Board::from_mine_coords((4, 4), &[(3, 3), (0, 3)]).unwrap();

        let encoded = GameSave::from_board(config, &board, 0).encode().unwrap();
        assert!(encoded.contains(r#""opened_indices":"""#));

        let decoded = GameSave::decode(&encoded).unwrap();
        assert!(decoded.opened_indices.is_empty());
        assert!(decoded.flagged_indices.is_empty());
        assert_eq!(decoded.to_board(), board);
    }

    #[test]
    fn malformed_tokens_are_dropped() {
        let data = r#"{
            "config": {"width": 4, "height": 4, "mine_count": 2, "level": "Custom"},
            "mine_indices": "3,x,15,",
            "opened_indices": "0, 1,-4",
            "flagged_indices": "",
            "elapsed_millis": 7000
        }"#;

        let save = GameSave::decode(data).unwrap();

        assert_eq!(save.mine_indices, vec![3, 15]);
        assert_eq!(save.opened_indices, vec![0, 1]);
        assert_eq!(save.elapsed_millis, 7000);
    }

    #[test]
    fn preset_level_uses_preset_board() {
        let mut save = GameSave::from_board(GameConfig::EASY, &Board::new((10, 10)), 0);
        save.config.width = 3;

        let decoded = GameSave::decode(&save.encode().unwrap()).unwrap();

        assert_eq!(decoded.config, GameConfig::EASY);
    }

    #[test]
    fn rotated_preset_keeps_its_orientation() {
        let config = GameConfig::HARD.rotate();
        let mut board = Board::from_mine_coords(config.size(), &[(15, 0), (0, 29), (3, 20)]).unwrap();
        board.reveal(&[(2, 2)]);
        let mut save = GameSave::from_board(config, &board, 9_000);
        save.config.mine_count = 5;

        let decoded = GameSave::decode(&save.encode().unwrap()).unwrap();

        assert_eq!(decoded.config, config);
        assert_eq!(decoded.config.size(), (16, 30));
        assert_eq!(decoded.to_board(), board);
    }

    #[test]
    fn unreadable_save_is_no_save() {
        assert_eq!(GameSave::decode_or_none("{not json"), None);
        let overfull = r#"{"config":{"width":3,"height":3,"mine_count":9,"level":"Custom"},
            "mine_indices":"","opened_indices":"","flagged_indices":"","elapsed_millis":0}"#;
        assert_eq!(GameSave::decode_or_none(overfull), None);
    }
}
