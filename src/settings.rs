//! User settings loaded from the platform config directory.
//!
//! Resolves `settings.json` under:
//! - macOS: ~/Library/Application Support/earthneo/
//! - Linux: ~/.config/earthneo/
//! - Windows: %APPDATA%\earthneo\config\
//!
//! A missing file means defaults. Environment variables win over the file.
//!
//! Textures are not bundled. The app reads them from `assets/<asset_base>/`
//! under Bevy's asset root (`BEVY_ASSET_ROOT`, else the cargo manifest or
//! executable directory), named `<subject>_<map>_<w>x<h>.jpg` for the active
//! quality tier, e.g. `earth_map_2048x1024.jpg` or `skymap_posx_1024x1024.jpg`.
//! Missing files only cost their texture; the scene still runs.

use anyhow::Context;
use bevy::prelude::*;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::assets::QualityTier;

pub const SETTINGS_FILE: &str = "settings.json";
pub const API_KEY_ENV: &str = "NASA_API_KEY";
pub const QUALITY_ENV: &str = "EARTHNEO_QUALITY";
/// Bevy's default asset folder under its base path.
pub const ASSET_FOLDER: &str = "assets";

#[derive(Resource, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub quality: QualityTier,
    /// Prefix for every texture path, relative to the Bevy asset folder.
    pub asset_base: String,
    pub shadows: bool,
    pub neo: NeoSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityTier::High,
            asset_base: "textures".to_string(),
            shadows: true,
            neo: NeoSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NeoSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub api_key: String,
}

impl Default for NeoSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.nasa.gov/neo/rest/v1/feed".to_string(),
            api_key: "DEMO_KEY".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the platform config directory, falling back to
    /// defaults when the file is absent or unusable.
    pub fn load_or_default() -> Self {
        let mut settings = match settings_path() {
            Some(path) => match Self::read_from(&path) {
                Ok(Some(settings)) => {
                    info!("[INIT] Loaded settings from {}", path.display());
                    settings
                }
                Ok(None) => Self::default(),
                Err(err) => {
                    warn!("Ignoring settings file: {:#}", err);
                    Self::default()
                }
            },
            None => {
                warn!("Failed to resolve config directory, using default settings");
                Self::default()
            }
        };
        settings.apply_overrides(|key| std::env::var(key).ok());
        settings
    }

    /// Returns Ok(None) if the file doesn't exist.
    pub fn read_from(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let settings = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(settings))
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.neo.api_key = key.trim().to_string();
        }
        if let Some(raw) = lookup(QUALITY_ENV) {
            match raw.parse::<QualityTier>() {
                Ok(tier) => self.quality = tier,
                Err(err) => warn!("{}: {}", QUALITY_ENV, err),
            }
        }
    }
}

impl Settings {
    /// Where textures are looked up for an asset folder at `asset_dir`.
    pub fn texture_dir(&self, asset_dir: &Path) -> PathBuf {
        asset_dir.join(&self.asset_base)
    }
}

/// Warn once at startup when the texture directory is absent, since every
/// surface then falls back to its base colour. Returns whether it exists.
pub fn check_texture_dir(dir: &Path) -> bool {
    if dir.is_dir() {
        return true;
    }
    warn!(
        "[INIT] Texture directory {} not found; bodies render untextured. \
         Place the texture set there or point `asset_base` at it.",
        dir.display()
    );
    false
}

#[cfg(not(target_arch = "wasm32"))]
fn report_texture_dir(settings: Res<Settings>) {
    let asset_dir = bevy::asset::io::file::FileAssetReader::get_base_path().join(ASSET_FOLDER);
    check_texture_dir(&settings.texture_dir(&asset_dir));
}

fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "earthneo").map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}

/// Inserts [`Settings`]; add after `DefaultPlugins` so logging is up.
pub struct SettingsPlugin;

impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<Settings>() {
            app.insert_resource(Settings::load_or_default());
        }
        #[cfg(not(target_arch = "wasm32"))]
        app.add_systems(Startup, report_texture_dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_file(test_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "earthneo-settings-{}-{}-{}.json",
            test_name,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let path = unique_temp_file("missing");
        assert!(Settings::read_from(&path).unwrap().is_none());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let path = unique_temp_file("partial");
        fs::write(&path, r#"{ "quality": "sd", "neo": { "api_key": "abc" } }"#).unwrap();
        let settings = Settings::read_from(&path).unwrap().unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(settings.quality, QualityTier::Standard);
        assert_eq!(settings.neo.api_key, "abc");
        assert!(settings.neo.enabled);
        assert_eq!(settings.neo.endpoint, NeoSettings::default().endpoint);
        assert_eq!(settings.asset_base, "textures");
    }

    #[test]
    fn invalid_file_reports_path() {
        let path = unique_temp_file("invalid");
        fs::write(&path, "{ not json").unwrap();
        let err = Settings::read_from(&path).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(format!("{:#}", err).contains("parsing"));
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut settings = Settings::default();
        settings.apply_overrides(|key| match key {
            API_KEY_ENV => Some(" secret ".to_string()),
            QUALITY_ENV => Some("sd".to_string()),
            _ => None,
        });
        assert_eq!(settings.neo.api_key, "secret");
        assert_eq!(settings.quality, QualityTier::Standard);
    }

    #[test]
    fn texture_dir_is_checked_under_the_asset_folder() {
        let root = unique_temp_file("assets").with_extension("");
        let settings = Settings::default();
        let dir = settings.texture_dir(&root);
        assert_eq!(dir, root.join("textures"));
        assert!(!check_texture_dir(&dir));

        fs::create_dir_all(&dir).unwrap();
        assert!(check_texture_dir(&dir));
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let mut settings = Settings::default();
        settings.apply_overrides(|key| (key == API_KEY_ENV).then(|| "  ".to_string()));
        assert_eq!(settings.neo.api_key, "DEMO_KEY");
    }
}
