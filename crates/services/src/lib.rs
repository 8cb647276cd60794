#![forbid(unsafe_code)]

pub mod app_services;
pub mod capture;
pub mod error;
pub mod flows;
pub mod identity;
mod persistence;
pub mod personalization_store;
pub mod reference;
pub mod session_store;
pub mod speech;
pub mod transcription;

pub use aula_core::Clock;

pub use app_services::{AppServices, Collaborators};
pub use capture::{
    CaptureDevice, CaptureKind, CaptureSession, CapturedMedia, ScriptedCapture,
    ScriptedCaptureDevice,
};
pub use error::{
    AppServicesError, CaptureError, FlowError, ReferenceDataError, SpeechError,
    TranscriptionError, VerificationError,
};
pub use identity::{BiometricVerifier, SimulatedVerifier};
pub use personalization_store::{PERSONALIZATION_KEY, PersonalizationStore};
pub use reference::{HttpReferenceData, MockReferenceData, ReferenceCache, ReferenceDataSource};
pub use session_store::{SESSION_KEY, SessionState, SessionStore};
pub use speech::{LiveSpeech, ScriptedSpeech, SpeechEvent, SpeechFragment, TranscriptBuffer};
pub use transcription::{SimulatedTranscriber, Transcriber};
