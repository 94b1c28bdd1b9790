/// Viewer settings, persisted between sessions
///
/// These values tune how the viewport maps distance to size and labels.
/// They are serialized to JSON in the user's config directory; a missing or
/// corrupt file silently falls back to defaults.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::classify;

/// Tunable viewport parameters
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    /// Stars farther than this many light-years render at minimum size
    pub max_render_distance: f64,

    /// Name labels are drawn only inside this distance (light-years)
    pub label_distance: f64,

    /// Labels switch to a bold face inside this distance (light-years)
    pub bold_label_distance: f64,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            max_render_distance: classify::DEFAULT_MAX_RENDER_DISTANCE,
            label_distance: classify::DEFAULT_LABEL_DISTANCE,
            bold_label_distance: 10.0,
        }
    }
}

impl ViewSettings {
    /// Convert to JSON string for storage
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Where the settings file lives:
    /// - Linux: ~/.config/star-atlas/settings.json
    /// - macOS: ~/Library/Application Support/star-atlas/settings.json
    /// - Windows: %APPDATA%\star-atlas\settings.json
    fn settings_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("star-atlas");
        path.push("settings.json");
        Some(path)
    }

    /// Load saved settings, falling back to defaults on any failure
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => Self::from_json(&json).unwrap_or_else(|e| {
                eprintln!("⚠️  Ignoring corrupt settings file: {}", e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist settings to disk, best effort
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else {
            return;
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("⚠️  Could not create settings directory: {}", e);
                return;
            }
        }
        match self.to_json() {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    eprintln!("⚠️  Could not save settings: {}", e);
                }
            }
            Err(e) => eprintln!("⚠️  Could not serialize settings: {}", e),
        }
    }
}
