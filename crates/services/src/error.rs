//! Shared error types for the services crate.
//!
//! Store mutators never return these: persistence failures are logged and
//! swallowed. These errors belong to collaborator calls and reach the screen
//! layer through the flows.

use thiserror::Error;

use aula_core::model::QuestionnaireError;
use storage::sqlite::SqliteInitError;

use crate::capture::CaptureKind;

/// Errors from a capture device (camera or microphone).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CaptureError {
    #[error("{0} capture is not supported on this device")]
    Unsupported(CaptureKind),
    #[error("permission to use the {0} was denied")]
    PermissionDenied(CaptureKind),
    #[error("capture finished without any data")]
    NoData,
    #[error("capture device failed: {0}")]
    Device(String),
}

impl CaptureError {
    /// Fixed message shown to the user.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            CaptureError::Unsupported(CaptureKind::Audio) => {
                "Your device does not support audio recording."
            }
            CaptureError::Unsupported(CaptureKind::Image) => {
                "Your device does not support the camera."
            }
            CaptureError::PermissionDenied(CaptureKind::Audio) => {
                "Could not access the microphone. Check the permissions."
            }
            CaptureError::PermissionDenied(CaptureKind::Image) => "Could not access the camera.",
            CaptureError::NoData | CaptureError::Device(_) => {
                "Something went wrong while capturing. Please try again."
            }
        }
    }
}

/// Errors from the audio transcription collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TranscriptionError {
    #[error("no audio to transcribe")]
    EmptyAudio,
    #[error("transcription failed: {0}")]
    Failed(String),
}

impl TranscriptionError {
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        "Could not process the audio. Please try again."
    }
}

/// Errors from the live speech recognizer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SpeechError {
    #[error("speech recognition is not supported")]
    Unsupported,
    #[error("speech recognition is already listening")]
    AlreadyListening,
    #[error("speech recognition error: {0}")]
    Recognition(String),
}

impl SpeechError {
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            SpeechError::Unsupported => "Your device does not support speech recognition.",
            SpeechError::AlreadyListening => "Speech recognition is already running.",
            SpeechError::Recognition(_) => "Could not start speech recognition.",
        }
    }
}

/// Errors from biometric identity verification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VerificationError {
    #[error("no face found in capture")]
    NoMatch,
    #[error("verification failed: {0}")]
    Failed(String),
}

impl VerificationError {
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            VerificationError::NoMatch => "We could not recognise you. Please try again.",
            VerificationError::Failed(_) => "Verification failed. Please try again.",
        }
    }
}

/// Errors from a reference-data source (mock or HTTP).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReferenceDataError {
    #[error("{code}: {message}")]
    Api { code: String, message: String },
    #[error("response carried no data")]
    EmptyResponse,
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("invalid reference API address: {0}")]
    InvalidBaseUrl(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors returned by the screen-action flows.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlowError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),
    #[error(transparent)]
    Speech(#[from] SpeechError),
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error(transparent)]
    Questionnaire(#[from] QuestionnaireError),
    #[error("no role selected")]
    NoRoleSelected,
    #[error("nothing was recorded")]
    EmptyTranscript,
}

impl FlowError {
    /// Message the shell shows for a failed action.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            FlowError::Capture(err) => err.user_message().to_string(),
            FlowError::Transcription(err) => err.user_message().to_string(),
            FlowError::Speech(err) => err.user_message().to_string(),
            FlowError::Verification(err) => err.user_message().to_string(),
            FlowError::Questionnaire(err) => err.to_string(),
            FlowError::NoRoleSelected => "Choose student or teacher first.".to_string(),
            FlowError::EmptyTranscript => "Nothing was recorded yet.".to_string(),
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_messages_depend_on_kind() {
        assert_ne!(
            CaptureError::Unsupported(CaptureKind::Audio).user_message(),
            CaptureError::Unsupported(CaptureKind::Image).user_message()
        );
        assert_eq!(
            CaptureError::NoData.user_message(),
            CaptureError::Device("x".into()).user_message()
        );
    }

    #[test]
    fn flow_error_wraps_collaborator_messages() {
        let err = FlowError::from(SpeechError::Unsupported);
        assert_eq!(
            err.user_message(),
            "Your device does not support speech recognition."
        );
    }
}
