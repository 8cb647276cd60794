use std::sync::Arc;
use std::time::Duration;

use aula_core::model::Questionnaire;
use storage::repository::{KeyValueStore, Storage};

use crate::Clock;
use crate::capture::{CaptureDevice, ScriptedCaptureDevice};
use crate::error::AppServicesError;
use crate::identity::{BiometricVerifier, SimulatedVerifier};
use crate::personalization_store::PersonalizationStore;
use crate::reference::{HttpReferenceData, MockReferenceData, ReferenceCache, ReferenceDataSource};
use crate::session_store::SessionStore;
use crate::speech::ScriptedSpeech;
use crate::transcription::{SimulatedTranscriber, Transcriber};

/// External adapters the flows talk to.
#[derive(Clone)]
pub struct Collaborators {
    pub capture: Arc<dyn CaptureDevice>,
    pub transcriber: Arc<dyn Transcriber>,
    /// Kept concrete so a text shell can script what the user says.
    pub speech: Arc<ScriptedSpeech>,
    pub verifier: Arc<dyn BiometricVerifier>,
    pub reference: Arc<dyn ReferenceDataSource>,
}

impl Collaborators {
    /// Simulated devices and the built-in reference catalogue, each answering
    /// after `latency`.
    #[must_use]
    pub fn simulated(latency: Duration, clock: Clock) -> Self {
        Self {
            capture: Arc::new(ScriptedCaptureDevice::new(latency)),
            transcriber: Arc::new(SimulatedTranscriber::new(latency)),
            speech: Arc::new(ScriptedSpeech::new(latency)),
            verifier: Arc::new(SimulatedVerifier::new(clock, latency)),
            reference: Arc::new(MockReferenceData::new(clock, latency)),
        }
    }

    /// Replace the reference source with the backend at `base_url`.
    #[must_use]
    pub fn with_reference_api(mut self, base_url: &str) -> Self {
        self.reference = Arc::new(HttpReferenceData::new(base_url));
        self
    }
}

/// Assembles storage, stores and collaborators for the shell.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    records: Arc<dyn KeyValueStore>,
    questionnaire: Arc<Questionnaire>,
    collaborators: Collaborators,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        collaborators: Collaborators,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock, collaborators))
    }

    /// Build services over a process-local store.
    #[must_use]
    pub fn in_memory(clock: Clock, collaborators: Collaborators) -> Self {
        Self::from_storage(Storage::in_memory(), clock, collaborators)
    }

    #[must_use]
    pub fn from_storage(storage: Storage, clock: Clock, collaborators: Collaborators) -> Self {
        Self {
            clock,
            records: storage.records,
            questionnaire: Arc::new(Questionnaire::default_catalog()),
            collaborators,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn records(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.records)
    }

    #[must_use]
    pub fn questionnaire(&self) -> Arc<Questionnaire> {
        Arc::clone(&self.questionnaire)
    }

    #[must_use]
    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// Session rehydrated from storage.
    pub async fn load_session(&self) -> SessionStore {
        SessionStore::load(self.records()).await
    }

    /// Personalization answers rehydrated from storage, sized to the catalogue.
    pub async fn load_personalization(&self) -> PersonalizationStore {
        PersonalizationStore::load(self.records(), self.questionnaire.len(), self.clock).await
    }

    #[must_use]
    pub fn reference_cache(&self) -> ReferenceCache {
        ReferenceCache::new(self.records())
    }
}
