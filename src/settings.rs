use crate::model::PinSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Durable workbench state. Every field degrades to its default when the
/// stored value is missing or malformed; start-up never fails on storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub input_folder: Option<PathBuf>,
    pub output_folder: Option<PathBuf>,
    pub tag_root_folder: Option<PathBuf>,
    pub pinned_tags: PinSet,
}

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_location() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::at(base.join("dicomforge").join("settings.json"))
    }

    pub fn load(&self) -> Settings {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                log::info!(
                    "no settings at {} ({err}), starting from defaults",
                    self.path.display()
                );
                return Settings::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!(
                    "malformed settings at {} ({err}), starting from defaults",
                    self.path.display()
                );
                Settings::default()
            }
        }
    }

    /// Write-through persistence; failures are logged, never surfaced as
    /// errors, since stored state is best-effort by contract.
    pub fn save(&self, settings: &Settings) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                log::warn!("unable to create {} ({err})", parent.display());
                return;
            }
        }

        match serde_json::to_string_pretty(settings) {
            Ok(json) => {
                if let Err(err) = fs::write(&self.path, json) {
                    log::warn!("unable to write {} ({err})", self.path.display());
                }
            }
            Err(err) => log::warn!("unable to encode settings ({err})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TagId, DEFAULT_PINS};

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("settings.json"));

        let settings = store.load();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.pinned_tags.len(), DEFAULT_PINS.len());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        let settings = SettingsStore::at(path).load();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn saved_settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("nested").join("settings.json"));

        let mut settings = Settings::default();
        settings.input_folder = Some(PathBuf::from("/data/dicom"));
        settings.pinned_tags.toggle(TagId::new(0x0008, 0x0060));
        store.save(&settings);

        assert_eq!(store.load(), settings);
    }

    #[test]
    fn partial_json_keeps_field_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"inputFolder":"/data/in"}"#).unwrap();

        let settings = SettingsStore::at(path).load();
        assert_eq!(settings.input_folder, Some(PathBuf::from("/data/in")));
        assert_eq!(settings.pinned_tags, PinSet::default());
    }

    #[test]
    fn unpinned_everything_survives_a_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("settings.json"));

        let mut settings = Settings::default();
        for id in DEFAULT_PINS {
            settings.pinned_tags.toggle(id);
        }
        assert!(settings.pinned_tags.is_empty());
        store.save(&settings);

        // An explicitly empty pin set must not resurrect the defaults.
        assert!(store.load().pinned_tags.is_empty());
    }
}
