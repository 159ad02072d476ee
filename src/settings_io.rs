use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config;
use crate::settings::HistorySettings;

const SETTINGS_FILE_NAME: &str = "settings.json";

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(config::logging::APP_DIR_NAME))
}

pub fn settings_path(dir: &Path) -> PathBuf {
    dir.join(SETTINGS_FILE_NAME)
}

/// Read settings from `dir`, failing on a missing or malformed file
pub fn load_settings_strict(dir: &Path) -> Result<HistorySettings> {
    let path = settings_path(dir);
    let data = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read settings file: {:?}", path))?;
    let settings: HistorySettings = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse settings file: {:?}", path))?;
    Ok(settings.normalized())
}

/// Read settings from `dir`, falling back to defaults
pub fn load_settings(dir: &Path) -> HistorySettings {
    if !settings_path(dir).exists() {
        return HistorySettings::default();
    }

    match load_settings_strict(dir) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(error = %e, "Using default history settings");
            HistorySettings::default()
        }
    }
}

pub fn save_settings(dir: &Path, settings: &HistorySettings) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create settings directory: {:?}", dir))?;
    }

    let path = settings_path(dir);
    let data = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
    fs::write(&path, data).with_context(|| format!("Failed to write settings file: {:?}", path))?;

    tracing::debug!(file = ?path, "Saved history settings");
    Ok(())
}
