use std::fs;
use std::path::Path;

use anyhow::Context;
use sapper_core::{Coord2, CellCount, FlagCycle, GameConfig, SessionOptions};
use serde::{Deserialize, Serialize};

/// File name a persisted type lives under inside the data directory.
pub(crate) trait StorageKey {
    const KEY: &'static str;
}

/// Loads a persisted value, anything missing or unreadable gives the default.
pub(crate) trait LocalOrDefault: Sized {
    fn local_or_default(dir: &Path) -> Self;
    fn store_local(&self, dir: &Path) -> anyhow::Result<()>;
}

impl<T> LocalOrDefault for T
where
    T: StorageKey + Default + Serialize + for<'de> Deserialize<'de>,
{
    fn local_or_default(dir: &Path) -> Self {
        let path = dir.join(T::KEY);
        let Ok(data) = fs::read_to_string(&path) else {
            log::debug!("No {} yet, using defaults", path.display());
            return T::default();
        };
        toml::from_str(&data).unwrap_or_else(|err| {
            log::warn!("Ignoring unreadable {}: {err}", path.display());
            T::default()
        })
    }

    fn store_local(&self, dir: &Path) -> anyhow::Result<()> {
        let path = dir.join(T::KEY);
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let data = toml::to_string_pretty(self).context("encoding settings")?;
        fs::write(&path, data).with_context(|| format!("writing {}", path.display()))
    }
}

/// What a primary tap does once the game has started.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum DefaultAction {
    Flag,
    #[default]
    Dig,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CustomBoard {
    pub width: u16,
    pub height: u16,
    pub mines: CellCount,
}

impl CustomBoard {
    pub fn size(&self) -> Coord2 {
        (self.width, self.height)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub default_action: DefaultAction,
    /// Flagging walks through the "maybe" marker too.
    pub mark_uncertain: bool,
    pub chord_on_tap: bool,
    /// Last custom board that was played.
    pub custom: Option<CustomBoard>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_action: DefaultAction::Dig,
            mark_uncertain: true,
            chord_on_tap: true,
            custom: None,
        }
    }
}

impl StorageKey for Settings {
    const KEY: &'static str = "settings.toml";
}

impl Settings {
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            tap_is_flag: self.default_action == DefaultAction::Flag,
            flag_cycle: FlagCycle::from_mark_uncertain(self.mark_uncertain),
            chord_on_tap: self.chord_on_tap,
        }
    }

    /// Remembered custom board, if it is still a valid configuration.
    pub fn custom_config(&self) -> Option<GameConfig> {
        let custom = self.custom?;
        GameConfig::custom(custom.size(), custom.mines)
            .inspect_err(|err| log::warn!("Ignoring remembered custom board: {err}"))
            .ok()
    }

    pub fn remember_custom(&mut self, config: &GameConfig) {
        self.custom = Some(CustomBoard {
            width: config.width,
            height: config.height,
            mines: config.mine_count,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::temp_dir;

    #[test]
    fn missing_settings_are_default() {
        let dir = temp_dir("settings-missing");
        assert_eq!(Settings::local_or_default(&dir), Settings::default());
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let dir = temp_dir("settings-round-trip");
        let mut settings = Settings {
            default_action: DefaultAction::Flag,
            mark_uncertain: false,
            ..Default::default()
        };
        settings.remember_custom(&GameConfig::custom((12, 9), 20).unwrap());

        settings.store_local(&dir).unwrap();

        let loaded = Settings::local_or_default(&dir);
        assert_eq!(loaded, settings);
        let options = loaded.session_options();
        assert!(options.tap_is_flag);
        assert_eq!(options.flag_cycle, FlagCycle::TwoState);
        assert_eq!(loaded.custom_config().map(|c| c.size()), Some((12, 9)));
    }

    #[test]
    fn partial_and_broken_files_fall_back() {
        let dir = temp_dir("settings-partial");
        fs::write(dir.join(Settings::KEY), "chord_on_tap = false\n").unwrap();
        let settings = Settings::local_or_default(&dir);
        assert!(!settings.chord_on_tap);
        assert!(settings.mark_uncertain);

        fs::write(dir.join(Settings::KEY), "default_action = 5").unwrap();
        assert_eq!(Settings::local_or_default(&dir), Settings::default());
    }

    #[test]
    fn invalid_custom_board_is_forgotten() {
        let settings = Settings {
            custom: Some(CustomBoard {
                width: 3,
                height: 3,
                mines: 8,
            }),
            ..Default::default()
        };
        assert_eq!(settings.custom_config(), None);
    }
}
