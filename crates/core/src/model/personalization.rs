use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::QuestionId;

/// How an answer was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Select,
    Audio,
}

impl InputType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Select => "select",
            InputType::Audio => "audio",
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizationAnswer {
    question_id: QuestionId,
    answer: String,
    input_type: InputType,
}

impl PersonalizationAnswer {
    #[must_use]
    pub fn new(question_id: QuestionId, answer: impl Into<String>, input_type: InputType) -> Self {
        Self {
            question_id,
            answer: answer.into(),
            input_type,
        }
    }

    #[must_use]
    pub fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn input_type(&self) -> InputType {
        self.input_type
    }

    /// A whitespace-only answer is stored but does not count as answered.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.answer.trim().is_empty()
    }
}

/// Whether [`PersonalizationData::upsert`] added a record or replaced one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// Answers to the personalization questionnaire plus completion status.
///
/// Invariants:
/// - at most one answer per question id, kept in first-write order;
/// - `completed_at` is stamped the first time `is_complete` becomes true and
///   only [`PersonalizationData::default`] (a reset) clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizationData {
    #[serde(default)]
    answers: Vec<PersonalizationAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    is_complete: bool,
}

impl PersonalizationData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn answers(&self) -> &[PersonalizationAnswer] {
        &self.answers
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    /// Replaces the answer in place, or appends a new record at the end.
    pub fn upsert(
        &mut self,
        question_id: QuestionId,
        answer: impl Into<String>,
        input_type: InputType,
    ) -> Upsert {
        let answer = answer.into();
        if let Some(existing) = self
            .answers
            .iter_mut()
            .find(|a| a.question_id == question_id)
        {
            existing.answer = answer;
            existing.input_type = input_type;
            return Upsert::Replaced;
        }
        self.answers
            .push(PersonalizationAnswer::new(question_id, answer, input_type));
        Upsert::Inserted
    }

    /// Recomputes `is_complete` against `total_questions` (0 disables the check).
    ///
    /// Returns true when this call is the one that stamped `completed_at`.
    pub fn refresh_completion(&mut self, total_questions: usize, now: DateTime<Utc>) -> bool {
        self.is_complete = total_questions > 0 && self.answered_count() >= total_questions;
        if self.is_complete && self.completed_at.is_none() {
            self.completed_at = Some(now);
            return true;
        }
        false
    }

    /// Upsert followed by a completion refresh.
    pub fn record_answer(
        &mut self,
        question_id: QuestionId,
        answer: impl Into<String>,
        input_type: InputType,
        total_questions: usize,
        now: DateTime<Utc>,
    ) -> Upsert {
        let outcome = self.upsert(question_id, answer, input_type);
        self.refresh_completion(total_questions, now);
        outcome
    }

    #[must_use]
    pub fn get(&self, question_id: &str) -> Option<&PersonalizationAnswer> {
        self.answers
            .iter()
            .find(|a| a.question_id.as_str() == question_id)
    }

    /// Stored answer text, blank answers included.
    #[must_use]
    pub fn answer(&self, question_id: &str) -> Option<&str> {
        self.get(question_id).map(PersonalizationAnswer::answer)
    }

    #[must_use]
    pub fn is_answered(&self, question_id: &str) -> bool {
        self.get(question_id).is_some_and(|a| !a.is_blank())
    }

    /// Number of non-blank answers.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| !a.is_blank()).count()
    }

    /// Number of stored answer records, blank ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// `round(100 * records / total_questions)`, or 0 when `total_questions` is 0.
    ///
    /// Counts raw records, so a blank answer moves the percentage even though it
    /// does not count toward `is_complete`. Not clamped to 100.
    #[must_use]
    pub fn completion_percentage(&self, total_questions: usize) -> u32 {
        if total_questions == 0 {
            return 0;
        }
        let records = self.answers.len() as u64;
        let total = total_questions as u64;
        let rounded = (records * 200 + total) / (total * 2);
        u32::try_from(rounded).unwrap_or(u32::MAX)
    }
}
