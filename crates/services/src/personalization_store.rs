use std::sync::Arc;

use aula_core::Clock;
use aula_core::model::{InputType, PersonalizationAnswer, PersonalizationData, QuestionId};
use storage::repository::KeyValueStore;
use tracing::{debug, info};

use crate::persistence::{load_snapshot, remove_snapshot, save_snapshot};

/// Storage key of the questionnaire answers.
pub const PERSONALIZATION_KEY: &str = "personalization_data";

/// Personalization aggregator: questionnaire answers with completion status.
///
/// Every mutation writes the full [`PersonalizationData`] snapshot. Two
/// derived numbers are deliberately computed differently:
/// `is_complete` counts non-blank answers while
/// [`PersonalizationStore::completion_percentage`] counts stored records.
pub struct PersonalizationStore {
    data: PersonalizationData,
    total_questions: usize,
    clock: Clock,
    records: Arc<dyn KeyValueStore>,
}

impl PersonalizationStore {
    /// Empty store without reading storage. `total_questions = 0` disables completion.
    #[must_use]
    pub fn new(records: Arc<dyn KeyValueStore>, total_questions: usize, clock: Clock) -> Self {
        Self {
            data: PersonalizationData::default(),
            total_questions,
            clock,
            records,
        }
    }

    /// Rehydrates from storage, falling back to empty data.
    pub async fn load(
        records: Arc<dyn KeyValueStore>,
        total_questions: usize,
        clock: Clock,
    ) -> Self {
        let mut store = Self::new(records, total_questions, clock);
        store.reload().await;
        store
    }

    #[must_use]
    pub fn data(&self) -> &PersonalizationData {
        &self.data
    }

    #[must_use]
    pub fn answers(&self) -> &[PersonalizationAnswer] {
        self.data.answers()
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.data.is_complete()
    }

    /// Upserts the answer (position preserved on replace), refreshes completion, persists.
    pub async fn update_answer(
        &mut self,
        question_id: impl Into<QuestionId>,
        answer: impl Into<String>,
        input_type: InputType,
    ) {
        let question_id = question_id.into();
        let was_complete = self.data.is_complete();
        let outcome = self.data.record_answer(
            question_id.clone(),
            answer,
            input_type,
            self.total_questions,
            self.clock.now(),
        );
        debug!(question = %question_id, %input_type, ?outcome, "answer recorded");
        if !was_complete && self.data.is_complete() {
            info!(answers = self.data.len(), "personalization complete");
        }
        self.save().await;
    }

    /// Resets to empty data and deletes the persisted record.
    pub async fn clear_data(&mut self) {
        self.data = PersonalizationData::default();
        remove_snapshot(self.records.as_ref(), PERSONALIZATION_KEY).await;
        info!("personalization cleared");
    }

    /// Writes the current snapshot.
    pub async fn save(&self) {
        save_snapshot(self.records.as_ref(), PERSONALIZATION_KEY, &self.data).await;
    }

    /// Replaces in-memory data with the stored snapshot, if one can be read.
    pub async fn reload(&mut self) {
        if let Some(data) =
            load_snapshot::<PersonalizationData>(self.records.as_ref(), PERSONALIZATION_KEY).await
        {
            debug!(answers = data.len(), "restored personalization");
            self.data = data;
        }
    }

    #[must_use]
    pub fn get_answer(&self, question_id: &str) -> Option<&str> {
        self.data.answer(question_id)
    }

    /// True only for a stored answer whose trimmed text is non-empty.
    #[must_use]
    pub fn is_question_answered(&self, question_id: &str) -> bool {
        self.data.is_answered(question_id)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.data.answered_count()
    }

    /// `round(100 * stored answers / total_questions)`; blank answers count here.
    #[must_use]
    pub fn completion_percentage(&self) -> u32 {
        self.data.completion_percentage(self.total_questions)
    }
}
