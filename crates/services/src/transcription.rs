use std::time::Duration;

use async_trait::async_trait;

use crate::capture::CapturedMedia;
use crate::error::TranscriptionError;

/// Turns a recorded audio blob into answer text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// # Errors
    ///
    /// Returns `TranscriptionError` if the audio is empty or cannot be transcribed.
    async fn transcribe(&self, audio: &CapturedMedia) -> Result<String, TranscriptionError>;
}

/// Returns a fixed transcript after a delay; stands in for a speech-to-text API.
#[derive(Debug, Clone)]
pub struct SimulatedTranscriber {
    transcript: String,
    latency: Duration,
}

pub const SIMULATED_TRANSCRIPT: &str = "Simulated transcription of the recorded audio";

impl SimulatedTranscriber {
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self::with_transcript(SIMULATED_TRANSCRIPT, latency)
    }

    #[must_use]
    pub fn with_transcript(transcript: impl Into<String>, latency: Duration) -> Self {
        Self {
            transcript: transcript.into(),
            latency,
        }
    }
}

#[async_trait]
impl Transcriber for SimulatedTranscriber {
    async fn transcribe(&self, audio: &CapturedMedia) -> Result<String, TranscriptionError> {
        if audio.is_empty() {
            return Err(TranscriptionError::EmptyAudio);
        }
        tokio::time::sleep(self.latency).await;
        Ok(self.transcript.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureKind;

    #[tokio::test]
    async fn empty_audio_is_rejected() {
        let transcriber = SimulatedTranscriber::new(Duration::ZERO);
        let empty = CapturedMedia::new(CaptureKind::Audio, "audio/webm", vec![]);
        assert_eq!(
            transcriber.transcribe(&empty).await,
            Err(TranscriptionError::EmptyAudio)
        );
    }

    #[tokio::test]
    async fn returns_configured_transcript() {
        let transcriber = SimulatedTranscriber::with_transcript("to learn French", Duration::ZERO);
        let audio = CapturedMedia::new(CaptureKind::Audio, "audio/webm", vec![1, 2, 3]);
        assert_eq!(transcriber.transcribe(&audio).await.unwrap(), "to learn French");
    }
}
