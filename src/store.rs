use std::{fs, path::PathBuf};

use anyhow::{Context, Result};

use crate::settings::DictationSettings;

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<DictationSettings> {
        if !self.path.exists() {
            return Ok(DictationSettings::default());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed reading settings file {}", self.path.display()))?;
        let settings: DictationSettings =
            serde_json::from_str(&raw).context("failed parsing settings json")?;
        settings
            .validate()
            .with_context(|| format!("invalid settings in {}", self.path.display()))?;
        Ok(settings)
    }

    pub fn save(&self, settings: &DictationSettings) -> Result<()> {
        let Some(parent) = self.path.parent() else {
            anyhow::bail!("settings path has no parent")
        };
        fs::create_dir_all(parent)?;
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::HostProfile;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::new(dir.path().join("missing.json"));
        let settings = store.load().expect("load defaults");
        assert_eq!(settings.silence_timeout_ms, 1500);
        assert_eq!(settings.locale, "en-US");
        assert_eq!(
            settings.capability_names,
            vec!["SpeechRecognition", "webkitSpeechRecognition"]
        );
    }

    #[test]
    fn save_then_load_keeps_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::new(dir.path().join("nested/settings.json"));
        let settings = DictationSettings {
            silence_timeout_ms: 2500,
            profile: HostProfile::VoiceAssistant,
            ..Default::default()
        };
        store.save(&settings).expect("save");
        assert_eq!(store.load().expect("load"), settings);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"profile":"organizer-note","locale":"en-GB"}"#).expect("write");
        let settings = SettingsStore::new(path).load().expect("load");
        assert_eq!(settings.profile, HostProfile::OrganizerNote);
        assert_eq!(settings.locale, "en-GB");
        assert_eq!(settings.silence_timeout_ms, 1500);
        assert_eq!(settings.routes.len(), 6);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"silenceTimeoutMs":0}"#).expect("write");
        let err = SettingsStore::new(path).load().expect_err("invalid");
        assert!(format!("{err:#}").contains("silenceTimeoutMs"));
    }

    #[test]
    fn malformed_json_reports_context() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").expect("write");
        let err = SettingsStore::new(path).load().expect_err("malformed");
        assert!(err.to_string().contains("failed parsing settings json"));
    }
}
