use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Listening,
    /// Held only while the stop path runs.
    Stopping,
}

impl SessionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "Idle",
            SessionStatus::Listening => "Listening",
            SessionStatus::Stopping => "Stopping",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentEvent {
    Interim(String),
    Final(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictationSession {
    pub committed_text: String,
    pub pending_interim_text: String,
}

impl DictationSession {
    /// Appends a settled fragment to the host buffer with a single separating space.
    pub fn commit_final(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            if !self.committed_text.is_empty() && !self.committed_text.ends_with(' ') {
                self.committed_text.push(' ');
            }
            self.committed_text.push_str(text);
        }
        self.pending_interim_text.clear();
    }

    /// The platform sends the full current guess, never a delta.
    pub fn replace_interim(&mut self, text: &str) {
        self.pending_interim_text.clear();
        self.pending_interim_text.push_str(text);
    }

    pub fn clear_interim(&mut self) {
        self.pending_interim_text.clear();
    }

    pub fn clear(&mut self) {
        self.committed_text.clear();
        self.pending_interim_text.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: &'static str,
    pub listening: bool,
    pub supported: bool,
    pub committed_text: String,
    pub interim_text: String,
    pub sound_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
