//! Layered settings: struct defaults, an optional TOML file, then
//! `FOLDER_PLAYER__*` environment variables.

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::error::SettingsError;
use crate::utils::file_scanner::ScanOptions;

const APP_DIR: &str = "folder_player";
const ENV_PREFIX: &str = "FOLDER_PLAYER";
const CONFIG_PATH_VAR: &str = "FOLDER_PLAYER_CONFIG_PATH";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub player: PlayerSettings,
    pub library: LibrarySettings,
    pub art: ArtSettings,
    pub window: WindowSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerSettings {
    /// Volume slider position at startup, 0-100.
    pub initial_volume: i32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self { initial_volume: 50 }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LibrarySettings {
    /// Folder scanned once at startup.
    pub start_folder: Option<PathBuf>,
    pub max_depth: Option<usize>,
    pub follow_links: bool,
}

impl LibrarySettings {
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            max_depth: self.max_depth,
            follow_links: self.follow_links,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtSettings {
    /// Edge length of the square album-art thumbnail, in pixels.
    pub thumbnail_size: u32,
}

impl Default for ArtSettings {
    fn default() -> Self {
        Self { thumbnail_size: 200 }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowSettings {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 600.0,
        }
    }
}

impl Settings {
    /// Loads settings from the config file (if any) and the environment.
    pub fn load() -> Result<Self, SettingsError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = resolve_config_path() {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(0..=100).contains(&self.player.initial_volume) {
            return Err(SettingsError::Invalid(format!(
                "player.initial_volume must be within 0..=100, got {}",
                self.player.initial_volume
            )));
        }
        if self.art.thumbnail_size == 0 {
            return Err(SettingsError::Invalid(
                "art.thumbnail_size must be >= 1".to_string(),
            ));
        }
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            return Err(SettingsError::Invalid(
                "window.width and window.height must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// `$FOLDER_PLAYER_CONFIG_PATH`, else `<config dir>/folder_player/config.toml`.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os(CONFIG_PATH_VAR) {
        return Some(PathBuf::from(p));
    }
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}
