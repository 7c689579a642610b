use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    adapter::CAPABILITY_NAMES,
    recognizer::{RecognitionConfig, DEFAULT_LOCALE},
    router::{default_rules, RouteRule},
    watchdog::DEFAULT_SILENCE_TIMEOUT,
};

/// Which view hosts the dictation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HostProfile {
    #[default]
    EmailDescription,
    OrganizerNote,
    VoiceAssistant,
}

impl HostProfile {
    /// The email description and the assistant start every session from an
    /// empty input; organizer notes keep what was already written.
    pub fn clears_on_start(&self) -> bool {
        matches!(self, HostProfile::EmailDescription | HostProfile::VoiceAssistant)
    }

    pub fn routes_keywords(&self) -> bool {
        matches!(self, HostProfile::VoiceAssistant)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DictationSettings {
    pub locale: String,
    pub silence_timeout_ms: u64,
    pub capability_names: Vec<String>,
    pub profile: HostProfile,
    pub routes: Vec<RouteRule>,
}

impl DictationSettings {
    pub fn silence_timeout(&self) -> Duration {
        Duration::from_millis(self.silence_timeout_ms)
    }

    pub fn recognition_config(&self) -> RecognitionConfig {
        RecognitionConfig::with_locale(self.locale.clone())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.silence_timeout_ms == 0 {
            anyhow::bail!("silenceTimeoutMs must be greater than zero");
        }
        if self.capability_names.is_empty() {
            anyhow::bail!("capabilityNames must list at least one capability");
        }
        if self.locale.trim().is_empty() {
            anyhow::bail!("locale must not be empty");
        }
        Ok(())
    }
}

impl Default for DictationSettings {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            silence_timeout_ms: DEFAULT_SILENCE_TIMEOUT.as_millis() as u64,
            capability_names: CAPABILITY_NAMES.iter().map(|name| name.to_string()).collect(),
            profile: HostProfile::default(),
            routes: default_rules(),
        }
    }
}
