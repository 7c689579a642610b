use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::Result;
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOCALE: &str = "en-US";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    pub continuous: bool,
    pub interim_results: bool,
    pub locale: String,
}

impl RecognitionConfig {
    pub fn with_locale(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            ..Self::default()
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            continuous: true,
            interim_results: true,
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResult {
    pub is_final: bool,
    pub alternatives: Vec<String>,
}

impl RecognitionResult {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            is_final: false,
            alternatives: vec![text.into()],
        }
    }

    pub fn settled(text: impl Into<String>) -> Self {
        Self {
            is_final: true,
            alternatives: vec![text.into()],
        }
    }

    /// Only the top alternative is ever used.
    pub fn transcript(&self) -> &str {
        self.alternatives.first().map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultBatch {
    /// First result in `results` that changed since the previous callback.
    #[serde(default)]
    pub result_index: usize,
    pub results: Vec<RecognitionResult>,
}

/// Callbacks the platform recognizer delivers while a session is live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlatformEvent {
    Result(ResultBatch),
    Error { error: String },
    SoundStart,
    SoundEnd,
    End,
}

pub type EventSink = Sender<PlatformEvent>;

pub trait RecognitionBackend: Send {
    fn start(&mut self, config: &RecognitionConfig) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
}

/// Looks up a recognition capability by its global name.
pub trait CapabilityRegistry {
    fn instantiate(&self, name: &str, events: EventSink) -> Option<Box<dyn RecognitionBackend>>;
}

/// A driver that panicked mid-script must not wedge later calls.
fn lock_or_recover<'a, T>(lock: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        tracing::debug!(context, "scripted state poisoned; recovering");
        poisoned.into_inner()
    })
}

#[derive(Default)]
struct ScriptedState {
    sink: Option<EventSink>,
    running: bool,
    start_calls: usize,
    stop_calls: usize,
    start_failures: VecDeque<String>,
    last_config: Option<RecognitionConfig>,
}

/// In-process recognizer whose callbacks are pushed by a driver.
#[derive(Clone, Default)]
pub struct ScriptedRecognizer {
    state: Arc<Mutex<ScriptedState>>,
}

impl ScriptedRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn attach(&self, sink: EventSink) {
        lock_or_recover(&self.state, "scripted recognizer attach").sink = Some(sink);
    }

    /// Delivers a platform callback. Returns false when nothing is attached.
    pub fn emit(&self, event: PlatformEvent) -> bool {
        let mut state = lock_or_recover(&self.state, "scripted recognizer emit");
        if event == PlatformEvent::End {
            state.running = false;
        }
        match &state.sink {
            Some(sink) => sink.send(event).is_ok(),
            None => false,
        }
    }

    pub fn emit_interim(&self, text: &str) -> bool {
        self.emit(PlatformEvent::Result(ResultBatch {
            result_index: 0,
            results: vec![RecognitionResult::interim(text)],
        }))
    }

    pub fn emit_final(&self, text: &str) -> bool {
        self.emit(PlatformEvent::Result(ResultBatch {
            result_index: 0,
            results: vec![RecognitionResult::settled(text)],
        }))
    }

    pub fn fail_next_start(&self, reason: impl Into<String>) {
        lock_or_recover(&self.state, "scripted recognizer fail_next_start")
            .start_failures
            .push_back(reason.into());
    }

    pub fn is_running(&self) -> bool {
        lock_or_recover(&self.state, "scripted recognizer is_running").running
    }

    pub fn start_calls(&self) -> usize {
        lock_or_recover(&self.state, "scripted recognizer start_calls").start_calls
    }

    pub fn stop_calls(&self) -> usize {
        lock_or_recover(&self.state, "scripted recognizer stop_calls").stop_calls
    }

    pub fn last_config(&self) -> Option<RecognitionConfig> {
        lock_or_recover(&self.state, "scripted recognizer last_config")
            .last_config
            .clone()
    }
}

impl RecognitionBackend for ScriptedRecognizer {
    fn start(&mut self, config: &RecognitionConfig) -> Result<()> {
        let mut state = lock_or_recover(&self.state, "scripted recognizer start");
        state.start_calls += 1;
        if let Some(reason) = state.start_failures.pop_front() {
            anyhow::bail!(reason);
        }
        if state.running {
            anyhow::bail!("recognition has already started");
        }
        state.running = true;
        state.last_config = Some(config.clone());
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut state = lock_or_recover(&self.state, "scripted recognizer stop");
        state.stop_calls += 1;
        state.running = false;
        Ok(())
    }
}

/// Registry offering a [`ScriptedRecognizer`] under a fixed set of names.
#[derive(Clone, Default)]
pub struct ScriptedCapabilities {
    available: Vec<String>,
    recognizer: ScriptedRecognizer,
}

impl ScriptedCapabilities {
    pub fn new(recognizer: ScriptedRecognizer, available: &[&str]) -> Self {
        Self {
            available: available.iter().map(|name| name.to_string()).collect(),
            recognizer,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

impl CapabilityRegistry for ScriptedCapabilities {
    fn instantiate(&self, name: &str, events: EventSink) -> Option<Box<dyn RecognitionBackend>> {
        if !self.available.iter().any(|available| available == name) {
            return None;
        }
        self.recognizer.attach(events);
        Some(Box::new(self.recognizer.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn platform_events_use_tagged_json() {
        let raw = r#"[
            {"type":"result","resultIndex":1,"results":[
                {"isFinal":true,"alternatives":["hello"]},
                {"isFinal":false,"alternatives":["wor","word"]}
            ]},
            {"type":"error","error":"not-allowed"},
            {"type":"end"}
        ]"#;
        let events: Vec<PlatformEvent> = serde_json::from_str(raw).expect("parse events");
        assert_eq!(
            events,
            vec![
                PlatformEvent::Result(ResultBatch {
                    result_index: 1,
                    results: vec![
                        RecognitionResult::settled("hello"),
                        RecognitionResult {
                            is_final: false,
                            alternatives: vec!["wor".to_string(), "word".to_string()],
                        },
                    ],
                }),
                PlatformEvent::Error {
                    error: "not-allowed".to_string()
                },
                PlatformEvent::End,
            ]
        );
    }

    #[test]
    fn transcript_uses_first_alternative() {
        let result = RecognitionResult {
            is_final: true,
            alternatives: vec!["first".to_string(), "second".to_string()],
        };
        assert_eq!(result.transcript(), "first");
        let empty = RecognitionResult {
            is_final: true,
            alternatives: Vec::new(),
        };
        assert_eq!(empty.transcript(), "");
    }

    #[test]
    fn scripted_start_fails_once_then_recovers() {
        let mut recognizer = ScriptedRecognizer::new();
        recognizer.fail_next_start("not-allowed");
        let config = RecognitionConfig::default();

        let err = recognizer.start(&config).expect_err("first start fails");
        assert_eq!(err.to_string(), "not-allowed");
        recognizer.start(&config).expect("second start succeeds");
        assert!(recognizer.is_running());
        assert_eq!(recognizer.start_calls(), 2);
        assert_eq!(recognizer.last_config(), Some(config));
    }

    #[test]
    fn scripted_start_rejects_double_start() {
        let mut recognizer = ScriptedRecognizer::new();
        let config = RecognitionConfig::default();
        recognizer.start(&config).expect("start");
        assert!(recognizer.start(&config).is_err());
    }

    #[test]
    fn panicked_driver_does_not_wedge_recognizer() {
        let recognizer = ScriptedRecognizer::new();
        let shared = recognizer.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.state.lock().expect("first lock");
            panic!("driver crashed while holding the state");
        })
        .join();

        recognizer.fail_next_start("busy");
        let mut backend = recognizer.clone();
        assert!(backend.start(&RecognitionConfig::default()).is_err());
        assert_eq!(recognizer.start_calls(), 1);
    }

    #[test]
    fn sound_events_parse_from_json() {
        let events: Vec<PlatformEvent> =
            serde_json::from_str(r#"[{"type":"soundStart"},{"type":"soundEnd"}]"#)
                .expect("parse sound events");
        assert_eq!(events, vec![PlatformEvent::SoundStart, PlatformEvent::SoundEnd]);
    }

    #[test]
    fn registry_only_offers_listed_names() {
        let recognizer = ScriptedRecognizer::new();
        let registry = ScriptedCapabilities::new(recognizer.clone(), &["webkitSpeechRecognition"]);
        let (tx, _rx) = crossbeam_channel::unbounded();

        assert!(registry.instantiate("SpeechRecognition", tx.clone()).is_none());
        assert!(!recognizer.emit(PlatformEvent::End));
        assert!(registry.instantiate("webkitSpeechRecognition", tx).is_some());
        assert!(recognizer.emit(PlatformEvent::End));
    }
}
