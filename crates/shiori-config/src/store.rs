//! Settings file loading and creation.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use shiori_common::ConfigError;

use crate::schema::Settings;

/// Load settings from a specific JSON file path.
///
/// Missing fields use serde defaults; out-of-range values are clamped.
pub fn load_from_path(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let mut settings: Settings = serde_json::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse JSON: {e}")))?;

    settings.clamp();
    info!("loaded settings from {}", path.display());
    Ok(settings)
}

/// Load settings from the platform-specific default path.
///
/// If the file does not exist, writes a default settings file and returns
/// defaults. A corrupt file falls back to defaults with a warning rather
/// than failing startup.
pub fn load_default() -> Result<Settings, ConfigError> {
    let path = default_settings_path()?;

    if !path.exists() {
        info!("no settings found at {}, creating default", path.display());
        let defaults = Settings::default();
        save_to_path(&path, &defaults)?;
        return Ok(defaults);
    }

    match load_from_path(&path) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            warn!("settings load failed, using defaults: {e}");
            Ok(Settings::default())
        }
    }
}

/// The platform-specific default settings file path.
///
/// On macOS: `~/Library/Application Support/shiori/settings.json`
/// On Linux: `~/.config/shiori/settings.json`
pub fn default_settings_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))?;
    Ok(config_dir.join("shiori").join("settings.json"))
}

/// Persist settings to a specific path, creating parent directories.
pub fn save_to_path(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::WriteError(format!(
                "failed to create config directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| ConfigError::WriteError(format!("failed to serialize settings: {e}")))?;

    std::fs::write(path, content).map_err(|e| {
        ConfigError::WriteError(format!("failed to write {}: {e}", path.display()))
    })?;

    Ok(())
}

/// Persist settings to the platform default path.
pub fn save(settings: &Settings) -> Result<(), ConfigError> {
    let path = default_settings_path()?;
    save_to_path(&path, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SearchEngine, Theme};

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = Settings {
            theme: Theme::Dark,
            search_engine: SearchEngine::DuckDuckGo,
            quick_links_limit: 4,
            animations_enabled: false,
        };
        save_to_path(&path, &settings).unwrap();

        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded.theme, Theme::Dark);
        assert_eq!(loaded.search_engine, SearchEngine::DuckDuckGo);
        assert_eq!(loaded.quick_links_limit, 4);
        assert!(!loaded.animations_enabled);
    }

    #[test]
    fn load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn load_corrupt_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_clamps_out_of_range_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"quickLinksLimit": 50}"#).unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded.quick_links_limit, 6);
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("settings.json");
        save_to_path(&path, &Settings::default()).unwrap();
        assert!(path.exists());
    }
}
