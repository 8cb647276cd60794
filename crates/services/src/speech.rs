//! Live speech recognition delivered as a stream of events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::SpeechError;

/// Confidence reported when the recognizer gives none.
pub const DEFAULT_CONFIDENCE: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechFragment {
    pub transcript: String,
    pub confidence: f32,
    pub is_final: bool,
}

impl SpeechFragment {
    #[must_use]
    pub fn new(transcript: impl Into<String>, confidence: Option<f32>, is_final: bool) -> Self {
        Self {
            transcript: transcript.into(),
            confidence: confidence.unwrap_or(DEFAULT_CONFIDENCE),
            is_final,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    Fragment(SpeechFragment),
    Error(String),
    Ended,
}

/// Streaming recognizer.
#[async_trait]
pub trait LiveSpeech: Send + Sync {
    fn is_supported(&self) -> bool;

    fn is_listening(&self) -> bool;

    /// Start listening; events arrive on the returned channel until `Ended`.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Unsupported` without a recognizer and
    /// `SpeechError::AlreadyListening` if a session is active.
    async fn start_listening(&self) -> Result<mpsc::UnboundedReceiver<SpeechEvent>, SpeechError>;

    fn stop_listening(&self);
}

/// Accumulates fragments into the running transcript.
///
/// Final fragments are followed by a space; interim ones are appended as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptBuffer {
    text: String,
}

impl TranscriptBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: &SpeechFragment) {
        self.text.push_str(&fragment.transcript);
        if fragment.is_final {
            self.text.push(' ');
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

/// Drains `events` into a buffer until the recognizer ends.
///
/// # Errors
///
/// Returns `SpeechError::Recognition` on the first error event.
pub async fn collect_transcript(
    mut events: mpsc::UnboundedReceiver<SpeechEvent>,
) -> Result<TranscriptBuffer, SpeechError> {
    let mut buffer = TranscriptBuffer::new();
    while let Some(event) = events.recv().await {
        match event {
            SpeechEvent::Fragment(fragment) => {
                debug!(
                    transcript = %fragment.transcript,
                    confidence = fragment.confidence,
                    is_final = fragment.is_final,
                    "speech fragment"
                );
                buffer.push(&fragment);
            }
            SpeechEvent::Error(message) => {
                warn!(%message, "speech recognition error");
                return Err(SpeechError::Recognition(message));
            }
            SpeechEvent::Ended => break,
        }
    }
    Ok(buffer)
}

/// Recognizer that replays a preset list of events.
///
/// Each listening session owns its flag, so a finished replay never touches
/// a session started after it.
pub struct ScriptedSpeech {
    supported: bool,
    latency: Duration,
    script: Mutex<Vec<SpeechEvent>>,
    session: Mutex<Option<Arc<AtomicBool>>>,
}

impl ScriptedSpeech {
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            supported: true,
            latency,
            script: Mutex::new(Vec::new()),
            session: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new(Duration::ZERO)
        }
    }

    /// Events replayed by the next `start_listening`.
    pub fn set_script(&self, events: Vec<SpeechEvent>) {
        if let Ok(mut guard) = self.script.lock() {
            *guard = events;
        }
    }

    /// Scripts `text` as one final fragment per sentence.
    pub fn say(&self, text: &str) {
        let events = text
            .split_terminator(['.', '?', '!'])
            .map(str::trim)
            .filter(|sentence| !sentence.is_empty())
            .map(|sentence| SpeechEvent::Fragment(SpeechFragment::new(sentence, None, true)))
            .collect();
        self.set_script(events);
    }
}

#[async_trait]
impl LiveSpeech for ScriptedSpeech {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn is_listening(&self) -> bool {
        self.session.lock().is_ok_and(|guard| {
            guard
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::Acquire))
        })
    }

    async fn start_listening(&self) -> Result<mpsc::UnboundedReceiver<SpeechEvent>, SpeechError> {
        if !self.supported {
            return Err(SpeechError::Unsupported);
        }
        let events = self
            .script
            .lock()
            .map(|guard| guard.clone())
            .map_err(|err| SpeechError::Recognition(err.to_string()))?;
        let listening = {
            let mut session = self
                .session
                .lock()
                .map_err(|err| SpeechError::Recognition(err.to_string()))?;
            if session
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::Acquire))
            {
                return Err(SpeechError::AlreadyListening);
            }
            let flag = Arc::new(AtomicBool::new(true));
            *session = Some(Arc::clone(&flag));
            flag
        };
        let (tx, rx) = mpsc::unbounded_channel();
        let latency = self.latency;

        tokio::spawn(async move {
            for event in events {
                tokio::time::sleep(latency).await;
                if !listening.load(Ordering::Acquire) {
                    break;
                }
                let is_error = matches!(event, SpeechEvent::Error(_));
                if tx.send(event).is_err() || is_error {
                    break;
                }
            }
            listening.store(false, Ordering::Release);
            let _ = tx.send(SpeechEvent::Ended);
        });

        Ok(rx)
    }

    fn stop_listening(&self) {
        if let Ok(Some(flag)) = self.session.lock().as_deref() {
            flag.store(false, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_fragments_are_space_separated() {
        let mut buffer = TranscriptBuffer::new();
        buffer.push(&SpeechFragment::new("my name", Some(0.9), false));
        buffer.push(&SpeechFragment::new(" is Ana", None, true));
        buffer.push(&SpeechFragment::new("I like books", None, true));
        assert_eq!(buffer.text(), "my name is Ana I like books ");
    }

    #[test]
    fn missing_confidence_defaults() {
        let fragment = SpeechFragment::new("hola", None, false);
        assert!((fragment.confidence - DEFAULT_CONFIDENCE).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn scripted_speech_replays_sentences() {
        let speech = ScriptedSpeech::new(Duration::ZERO);
        speech.say("My name is Ana. I love reading!");
        let rx = speech.start_listening().await.unwrap();
        let transcript = collect_transcript(rx).await.unwrap();
        assert_eq!(transcript.text(), "My name is Ana I love reading ");
        assert!(!speech.is_listening());
    }

    #[tokio::test]
    async fn error_event_aborts_collection() {
        let speech = ScriptedSpeech::new(Duration::ZERO);
        speech.set_script(vec![
            SpeechEvent::Fragment(SpeechFragment::new("hello", None, true)),
            SpeechEvent::Error("no-speech".into()),
        ]);
        let rx = speech.start_listening().await.unwrap();
        assert_eq!(
            collect_transcript(rx).await,
            Err(SpeechError::Recognition("no-speech".into()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stale_replay_does_not_end_a_newer_session() {
        let speech = ScriptedSpeech::new(Duration::from_millis(10));
        speech.say("One. Two. Three.");

        let first = speech.start_listening().await.unwrap();
        speech.stop_listening();
        let second = speech.start_listening().await.unwrap();

        let stale = collect_transcript(first).await.unwrap();
        assert!(stale.is_blank());
        assert!(speech.is_listening());
        assert_eq!(
            speech.start_listening().await.err(),
            Some(SpeechError::AlreadyListening)
        );

        let transcript = collect_transcript(second).await.unwrap();
        assert_eq!(transcript.text(), "One Two Three ");
        assert!(!speech.is_listening());
    }

    #[tokio::test]
    async fn unsupported_recognizer_refuses_to_start() {
        let speech = ScriptedSpeech::unsupported();
        assert!(!speech.is_supported());
        assert_eq!(
            speech.start_listening().await.err(),
            Some(SpeechError::Unsupported)
        );
    }
}
