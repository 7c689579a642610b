//! Speech capture adapter.
//!
//! Wraps whichever platform recognizer the registry provides and turns its
//! callbacks into [`AdapterEvent`]s. Termination is asynchronous: after
//! [`SpeechCaptureAdapter::stop`] the platform may still deliver a few
//! callbacks before its `End`.

use crossbeam_channel::{unbounded, Receiver};
use tracing::{debug, info, warn};

use crate::{
    error::DictationError,
    model::FragmentEvent,
    recognizer::{CapabilityRegistry, PlatformEvent, RecognitionBackend, RecognitionConfig, ResultBatch},
};

/// Standard name first, vendor-prefixed fallback second.
pub const CAPABILITY_NAMES: [&str; 2] = ["SpeechRecognition", "webkitSpeechRecognition"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterEvent {
    Fragment(FragmentEvent),
    Failed(DictationError),
    /// The platform started or stopped hearing sound.
    Sound(bool),
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Inactive,
    Active,
    Failed,
}

pub struct SpeechCaptureAdapter {
    backend: Box<dyn RecognitionBackend>,
    capability: String,
    config: RecognitionConfig,
    events: Receiver<PlatformEvent>,
    state: AdapterState,
    desired_listening: bool,
}

impl SpeechCaptureAdapter {
    pub fn configure<S: AsRef<str>>(
        registry: &dyn CapabilityRegistry,
        names: &[S],
        config: RecognitionConfig,
    ) -> Result<Self, DictationError> {
        let (tx, rx) = unbounded();
        for name in names {
            let name = name.as_ref();
            if let Some(backend) = registry.instantiate(name, tx.clone()) {
                info!(capability = name, locale = %config.locale, "speech recognition configured");
                return Ok(Self {
                    backend,
                    capability: name.to_string(),
                    config,
                    events: rx,
                    state: AdapterState::Inactive,
                    desired_listening: false,
                });
            }
        }
        warn!("no speech recognition capability available");
        Err(DictationError::UnsupportedCapability)
    }

    pub fn capability(&self) -> &str {
        &self.capability
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    pub fn start(&mut self) -> Result<(), DictationError> {
        self.desired_listening = true;
        match self.backend.start(&self.config) {
            Ok(()) => {
                self.state = AdapterState::Active;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "speech recognition failed to start");
                self.desired_listening = false;
                self.state = AdapterState::Failed;
                Err(DictationError::start_failure(err.to_string()))
            }
        }
    }

    /// Requests termination; the platform confirms later with `End`.
    pub fn stop(&mut self) {
        self.desired_listening = false;
        if let Err(err) = self.backend.stop() {
            warn!(error = %err, "error stopping speech recognition");
        }
    }

    pub fn poll(&mut self) -> Vec<AdapterEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            self.handle(event, &mut out);
        }
        out
    }

    fn handle(&mut self, event: PlatformEvent, out: &mut Vec<AdapterEvent>) {
        match event {
            PlatformEvent::Result(batch) => {
                if !self.desired_listening || self.state != AdapterState::Active {
                    debug!("dropping recognition result after stop");
                    return;
                }
                out.extend(fragments_from_batch(&batch).into_iter().map(AdapterEvent::Fragment));
            }
            PlatformEvent::Error { error } if !self.desired_listening => {
                debug!(reason = %error, "ignoring recognition error after stop");
            }
            PlatformEvent::Error { error } => {
                warn!(reason = %error, "speech recognition error");
                self.desired_listening = false;
                self.state = AdapterState::Failed;
                out.push(AdapterEvent::Failed(DictationError::recognition(error)));
            }
            PlatformEvent::SoundStart | PlatformEvent::SoundEnd
                if !self.desired_listening || self.state != AdapterState::Active => {}
            PlatformEvent::SoundStart => out.push(AdapterEvent::Sound(true)),
            PlatformEvent::SoundEnd => out.push(AdapterEvent::Sound(false)),
            PlatformEvent::End if self.desired_listening => self.restart(out),
            PlatformEvent::End => {
                if self.state == AdapterState::Active {
                    self.state = AdapterState::Inactive;
                }
                debug!("speech recognition ended");
                out.push(AdapterEvent::Ended);
            }
        }
    }

    /// One restart attempt per unexpected termination.
    fn restart(&mut self, out: &mut Vec<AdapterEvent>) {
        match self.backend.start(&self.config) {
            Ok(()) => {
                debug!("speech recognition restarted after unexpected end");
                self.state = AdapterState::Active;
            }
            Err(err) => {
                warn!(error = %err, "error restarting speech recognition");
                self.desired_listening = false;
                self.state = AdapterState::Failed;
                out.push(AdapterEvent::Failed(DictationError::recognition(format!(
                    "session ended unexpectedly and could not restart: {err}"
                ))));
            }
        }
    }
}

/// Splits a result batch into one interim fragment (all pending guesses
/// concatenated) followed by one final fragment per settled result.
///
/// Committing the finals in order joins them with single spaces.
pub fn fragments_from_batch(batch: &ResultBatch) -> Vec<FragmentEvent> {
    let mut interim = String::new();
    let mut finals = Vec::new();

    for result in batch.results.iter().skip(batch.result_index) {
        let transcript = result.transcript();
        if result.is_final {
            let trimmed = transcript.trim();
            if !trimmed.is_empty() {
                finals.push(FragmentEvent::Final(trimmed.to_string()));
            }
        } else {
            interim.push_str(transcript);
        }
    }

    let mut fragments = Vec::with_capacity(finals.len() + 1);
    if !interim.is_empty() {
        fragments.push(FragmentEvent::Interim(interim));
    }
    fragments.extend(finals);
    fragments
}
