//! Voice dictation sessions for the HR helper views.
//!
//! A [`DictationController`] owns one dictation session for one host input:
//! it drives a platform recognizer through [`SpeechCaptureAdapter`], merges
//! interim and final fragments into the host buffer, auto-stops after a quiet
//! interval, and (for the voice assistant) routes spoken keywords to page
//! sections.

pub mod adapter;
pub mod clock;
pub mod error;
pub mod model;
pub mod navigator;
pub mod recognizer;
pub mod replay;
pub mod router;
pub mod settings;
pub mod state_machine;
pub mod store;
pub mod watchdog;

pub use adapter::{AdapterEvent, SpeechCaptureAdapter, CAPABILITY_NAMES};
pub use clock::{Clock, ManualClock};
pub use error::DictationError;
pub use model::{DictationSession, FragmentEvent, SessionSnapshot, SessionStatus};
pub use navigator::{LoggingNavigator, SectionNavigator};
pub use recognizer::{
    CapabilityRegistry, PlatformEvent, RecognitionBackend, RecognitionConfig, RecognitionResult,
    ResultBatch, ScriptedCapabilities, ScriptedRecognizer,
};
pub use router::{KeywordRouter, RouteRule};
pub use settings::{DictationSettings, HostProfile};
pub use state_machine::DictationController;
pub use store::SettingsStore;
pub use watchdog::{SilenceWatchdog, DEFAULT_SILENCE_TIMEOUT};
