//! Camera and microphone capture behind an explicit result channel.
//!
//! `begin` acquires the device, [`CaptureSession::stop`] releases it, and the
//! captured blob (or the failure) arrives once through [`CaptureSession::finish`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::CaptureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureKind {
    Audio,
    Image,
}

impl fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureKind::Audio => f.write_str("microphone"),
            CaptureKind::Image => f.write_str("camera"),
        }
    }
}

/// Opaque captured blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedMedia {
    pub kind: CaptureKind,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl CapturedMedia {
    #[must_use]
    pub fn new(kind: CaptureKind, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            kind,
            mime_type: mime_type.into(),
            bytes,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:<mime>;base64,<payload>`, the form stored as biometric data.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

type CaptureResult = Result<CapturedMedia, CaptureError>;

/// An acquired device that is capturing.
#[derive(Debug)]
pub struct CaptureSession {
    kind: CaptureKind,
    stop: Option<oneshot::Sender<()>>,
    result: oneshot::Receiver<CaptureResult>,
}

impl CaptureSession {
    /// Pairs the stop signal sent to the device with the channel it answers on.
    #[must_use]
    pub fn new(
        kind: CaptureKind,
        stop: oneshot::Sender<()>,
        result: oneshot::Receiver<CaptureResult>,
    ) -> Self {
        Self {
            kind,
            stop: Some(stop),
            result,
        }
    }

    #[must_use]
    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    /// Stops capturing and releases the device. Calling it again does nothing.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    /// Stops (if still running) and waits for the captured blob.
    ///
    /// # Errors
    ///
    /// Returns the device's `CaptureError`, or `CaptureError::Device` if the
    /// device went away without answering.
    pub async fn finish(mut self) -> CaptureResult {
        self.stop();
        self.result
            .await
            .map_err(|_| CaptureError::Device("capture ended without a result".into()))?
    }
}

/// Camera/microphone adapter.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Acquire the device for `kind` and start capturing.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::Unsupported` or `CaptureError::PermissionDenied`
    /// when the device cannot be acquired.
    async fn begin(&self, kind: CaptureKind) -> Result<CaptureSession, CaptureError>;
}

/// What a [`ScriptedCaptureDevice`] does for one kind of capture.
#[derive(Debug, Clone)]
pub enum ScriptedCapture {
    Unsupported,
    Denied,
    Produce(CapturedMedia),
    Fail(CaptureError),
}

/// Device that answers with preset blobs after a fixed delay.
#[derive(Debug, Clone)]
pub struct ScriptedCaptureDevice {
    audio: ScriptedCapture,
    image: ScriptedCapture,
    latency: Duration,
}

impl ScriptedCaptureDevice {
    /// Produces a short sample for both kinds.
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            audio: ScriptedCapture::Produce(CapturedMedia::new(
                CaptureKind::Audio,
                "audio/webm;codecs=opus",
                b"OggS-sample-audio".to_vec(),
            )),
            image: ScriptedCapture::Produce(CapturedMedia::new(
                CaptureKind::Image,
                "image/jpeg",
                b"\xFF\xD8\xFF\xE0sample-frame".to_vec(),
            )),
            latency,
        }
    }

    #[must_use]
    pub fn with_audio(mut self, script: ScriptedCapture) -> Self {
        self.audio = script;
        self
    }

    #[must_use]
    pub fn with_image(mut self, script: ScriptedCapture) -> Self {
        self.image = script;
        self
    }
}

#[async_trait]
impl CaptureDevice for ScriptedCaptureDevice {
    async fn begin(&self, kind: CaptureKind) -> Result<CaptureSession, CaptureError> {
        let script = match kind {
            CaptureKind::Audio => &self.audio,
            CaptureKind::Image => &self.image,
        };
        let outcome = match script {
            ScriptedCapture::Unsupported => return Err(CaptureError::Unsupported(kind)),
            ScriptedCapture::Denied => return Err(CaptureError::PermissionDenied(kind)),
            ScriptedCapture::Produce(media) if media.is_empty() => Err(CaptureError::NoData),
            ScriptedCapture::Produce(media) => Ok(media.clone()),
            ScriptedCapture::Fail(err) => Err(err.clone()),
        };

        let (stop_tx, stop_rx) = oneshot::channel();
        let (result_tx, result_rx) = oneshot::channel();
        let latency = self.latency;
        debug!(%kind, "capture started");
        tokio::spawn(async move {
            // A dropped session counts as a stop.
            let _ = stop_rx.await;
            tokio::time::sleep(latency).await;
            let _ = result_tx.send(outcome);
        });

        Ok(CaptureSession::new(kind, stop_tx, result_rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_device_delivers_blob_after_stop() {
        let device = ScriptedCaptureDevice::new(Duration::ZERO);
        let mut session = device.begin(CaptureKind::Audio).await.unwrap();
        session.stop();
        session.stop();
        let media = session.finish().await.unwrap();
        assert_eq!(media.kind, CaptureKind::Audio);
        assert!(!media.is_empty());
    }

    #[tokio::test]
    async fn unsupported_and_denied_fail_at_begin() {
        let device = ScriptedCaptureDevice::new(Duration::ZERO)
            .with_audio(ScriptedCapture::Unsupported)
            .with_image(ScriptedCapture::Denied);
        assert_eq!(
            device.begin(CaptureKind::Audio).await.err(),
            Some(CaptureError::Unsupported(CaptureKind::Audio))
        );
        assert_eq!(
            device.begin(CaptureKind::Image).await.err(),
            Some(CaptureError::PermissionDenied(CaptureKind::Image))
        );
    }

    #[tokio::test]
    async fn empty_recording_reports_no_data() {
        let device = ScriptedCaptureDevice::new(Duration::ZERO).with_audio(
            ScriptedCapture::Produce(CapturedMedia::new(CaptureKind::Audio, "audio/webm", vec![])),
        );
        let session = device.begin(CaptureKind::Audio).await.unwrap();
        assert_eq!(session.finish().await, Err(CaptureError::NoData));
    }

    #[test]
    fn data_url_is_base64_encoded() {
        let media = CapturedMedia::new(CaptureKind::Image, "image/jpeg", b"hi".to_vec());
        assert_eq!(media.to_data_url(), "data:image/jpeg;base64,aGk=");
    }
}
