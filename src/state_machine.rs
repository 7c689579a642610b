use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    adapter::{AdapterEvent, SpeechCaptureAdapter},
    clock::Clock,
    error::DictationError,
    model::{DictationSession, FragmentEvent, SessionSnapshot, SessionStatus},
    navigator::SectionNavigator,
    recognizer::CapabilityRegistry,
    router::KeywordRouter,
    settings::{DictationSettings, HostProfile},
    watchdog::SilenceWatchdog,
};

struct VoiceRouting {
    router: KeywordRouter,
    navigator: Box<dyn SectionNavigator>,
}

/// Dictation session bound to one host input.
pub struct DictationController {
    status: SessionStatus,
    session: DictationSession,
    adapter: Option<SpeechCaptureAdapter>,
    watchdog: SilenceWatchdog,
    clock: Arc<dyn Clock>,
    profile: HostProfile,
    routing: Option<VoiceRouting>,
    error: Option<DictationError>,
    last_route: Option<String>,
    sound_active: bool,
}

impl DictationController {
    /// Looks up the recognition capability once. Without one, voice input stays disabled.
    pub fn mount(
        registry: &dyn CapabilityRegistry,
        settings: &DictationSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (adapter, error) = match SpeechCaptureAdapter::configure(
            registry,
            settings.capability_names.as_slice(),
            settings.recognition_config(),
        ) {
            Ok(adapter) => (Some(adapter), None),
            Err(err) => (None, Some(err)),
        };

        Self {
            status: SessionStatus::Idle,
            session: DictationSession::default(),
            adapter,
            watchdog: SilenceWatchdog::new(settings.silence_timeout()),
            clock,
            profile: settings.profile,
            routing: None,
            error,
            last_route: None,
            sound_active: false,
        }
    }

    pub fn with_router(mut self, router: KeywordRouter, navigator: Box<dyn SectionNavigator>) -> Self {
        self.routing = Some(VoiceRouting { router, navigator });
        self
    }

    pub fn is_supported(&self) -> bool {
        self.adapter.is_some()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_listening(&self) -> bool {
        self.status == SessionStatus::Listening
    }

    pub fn profile(&self) -> HostProfile {
        self.profile
    }

    pub fn committed_text(&self) -> &str {
        &self.session.committed_text
    }

    pub fn pending_interim_text(&self) -> &str {
        &self.session.pending_interim_text
    }

    pub fn watchdog(&self) -> &SilenceWatchdog {
        &self.watchdog
    }

    pub fn error(&self) -> Option<&DictationError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    pub fn dismiss_error(&mut self) {
        if matches!(self.error, Some(DictationError::UnsupportedCapability)) {
            return;
        }
        self.error = None;
    }

    /// Whether the platform currently hears sound; drives the level indicator.
    pub fn sound_active(&self) -> bool {
        self.sound_active
    }

    /// Section most recently scrolled to by a voice command.
    pub fn last_route(&self) -> Option<&str> {
        self.last_route.as_deref()
    }

    /// The host edited its input directly.
    pub fn set_committed_text(&mut self, text: impl Into<String>) {
        self.session.committed_text = text.into();
    }

    /// The host submitted its input; dictation stops before the text is handed over.
    pub fn take_committed_text(&mut self) -> String {
        self.stop();
        self.session.clear_interim();
        std::mem::take(&mut self.session.committed_text)
    }

    pub fn dismiss_transcript(&mut self) {
        self.session.clear();
    }

    pub fn toggle(&mut self) -> Result<SessionStatus, DictationError> {
        match self.status {
            SessionStatus::Listening => {
                self.stop();
                Ok(self.status)
            }
            SessionStatus::Idle | SessionStatus::Stopping => self.start(),
        }
    }

    fn start(&mut self) -> Result<SessionStatus, DictationError> {
        let Some(adapter) = self.adapter.as_mut() else {
            self.error = Some(DictationError::UnsupportedCapability);
            return Err(DictationError::UnsupportedCapability);
        };

        self.session.clear_interim();
        if self.profile.clears_on_start() {
            self.session.committed_text.clear();
        }
        self.error = None;

        if let Err(err) = adapter.start() {
            self.error = Some(err.clone());
            self.status = SessionStatus::Idle;
            return Err(err);
        }

        self.watchdog.reset(self.clock.now());
        self.status = SessionStatus::Listening;
        info!(profile = ?self.profile, "dictation started");
        Ok(self.status)
    }

    /// Transitions to idle immediately; the platform confirms termination later.
    pub fn stop(&mut self) {
        if self.status != SessionStatus::Listening {
            return;
        }
        self.status = SessionStatus::Stopping;
        self.watchdog.cancel();
        if let Some(adapter) = self.adapter.as_mut() {
            adapter.stop();
        }
        self.session.clear_interim();
        self.sound_active = false;
        self.status = SessionStatus::Idle;
        info!(chars = self.session.committed_text.len(), "dictation stopped");
    }

    /// Checks the silence deadline, then handles queued platform callbacks.
    ///
    /// An expired deadline stops the session first, so callbacks queued after
    /// the quiet interval land on an idle session and are dropped.
    pub fn pump(&mut self) -> usize {
        if self.adapter.is_none() {
            return 0;
        }
        if self.watchdog.poll(self.clock.now()) && self.is_listening() {
            debug!("silence timeout reached");
            self.stop();
        }

        let events = self
            .adapter
            .as_mut()
            .map(SpeechCaptureAdapter::poll)
            .unwrap_or_default();
        let handled = events.len();
        for event in events {
            self.handle_adapter_event(event);
        }
        handled
    }

    fn handle_adapter_event(&mut self, event: AdapterEvent) {
        match event {
            AdapterEvent::Fragment(fragment) => self.handle_fragment(fragment),
            AdapterEvent::Failed(err) => {
                if self.is_listening() {
                    self.watchdog.cancel();
                    self.session.clear_interim();
                    self.sound_active = false;
                    self.status = SessionStatus::Idle;
                }
                info!(error = %err, "dictation ended with error");
                self.error = Some(err);
            }
            AdapterEvent::Sound(active) => {
                self.sound_active = active && self.is_listening();
            }
            AdapterEvent::Ended => {
                self.sound_active = false;
                debug!("recognition session terminated");
            }
        }
    }

    fn handle_fragment(&mut self, fragment: FragmentEvent) {
        if !self.is_listening() {
            debug!("ignoring fragment outside an active session");
            return;
        }
        self.watchdog.reset(self.clock.now());
        match fragment {
            FragmentEvent::Interim(text) => self.session.replace_interim(&text),
            FragmentEvent::Final(text) => {
                debug!(text = %text, "final fragment");
                self.session.commit_final(&text);
                if let Some(routing) = self.routing.as_mut() {
                    if let Some(section) = routing.router.dispatch(&text, routing.navigator.as_mut()) {
                        self.last_route = Some(section);
                    }
                }
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status.label(),
            listening: self.is_listening(),
            supported: self.is_supported(),
            committed_text: self.session.committed_text.clone(),
            interim_text: self.session.pending_interim_text.clone(),
            sound_active: self.sound_active,
            error: self.error_message(),
        }
    }

    /// Stops the platform session and the watchdog regardless of state.
    pub fn teardown(&mut self) {
        self.watchdog.cancel();
        if let Some(adapter) = self.adapter.as_mut() {
            adapter.stop();
        }
        self.session.clear_interim();
        self.sound_active = false;
        self.status = SessionStatus::Idle;
    }
}

impl Drop for DictationController {
    fn drop(&mut self) {
        self.teardown();
    }
}
