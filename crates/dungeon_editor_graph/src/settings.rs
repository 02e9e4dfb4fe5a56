// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor settings shared by every graph a session edits.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "dungeon_editor.ron";

/// Tunables for the edit engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Most corridors a single node may lead to
    pub max_child_corridors: usize,
    /// Size given to new nodes
    pub node_size: [f32; 2],
    /// Where the entrance goes when a graph gets its first node
    pub entrance_position: [f32; 2],
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            max_child_corridors: 3,
            node_size: [160.0, 75.0],
            entrance_position: [200.0, 200.0],
        }
    }
}

impl EditorSettings {
    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        let settings = ron::from_str(&contents)?;
        tracing::debug!("Loaded editor settings from {:?}", path);
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!("No settings at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Error reading or writing settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// File IO failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be encoded
    #[error("Encode error: {0}")]
    Encode(#[from] ron::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = EditorSettings::default();
        assert_eq!(settings.max_child_corridors, 3);
        assert_eq!(settings.node_size, [160.0, 75.0]);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: EditorSettings = ron::from_str("(max_child_corridors: 1)").unwrap();
        assert_eq!(settings.max_child_corridors, 1);
        assert_eq!(settings.entrance_position, [200.0, 200.0]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);

        let settings = EditorSettings {
            max_child_corridors: 5,
            ..EditorSettings::default()
        };
        settings.save(&path).unwrap();

        assert_eq!(EditorSettings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = EditorSettings::load_or_default(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(loaded, EditorSettings::default());
    }
}
