use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::personalization::{InputType, PersonalizationData};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionnaireError {
    #[error("unknown question: {0}")]
    UnknownQuestion(String),
    #[error("question {question} expects {expected} input")]
    WrongInputType {
        question: String,
        expected: InputType,
    },
    #[error("'{answer}' is not an option for question {question}")]
    InvalidOption { question: String, answer: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizationQuestion {
    pub id: QuestionId,
    pub question: String,
    #[serde(rename = "type")]
    pub input_type: InputType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl PersonalizationQuestion {
    fn new(id: &str, question: &str, input_type: InputType) -> Self {
        Self {
            id: QuestionId::from(id),
            question: question.to_string(),
            input_type,
            options: Vec::new(),
            required: false,
            placeholder: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(ToString::to_string).collect();
        self
    }

    fn placeholder(mut self, text: &str) -> Self {
        self.placeholder = Some(text.to_string());
        self
    }

    /// Whether an answer entered in `mode` fits this question.
    ///
    /// Free-form questions take typed or spoken answers alike; select
    /// questions only take a chosen option.
    #[must_use]
    pub fn accepts(&self, mode: InputType) -> bool {
        match self.input_type {
            InputType::Select => mode == InputType::Select,
            InputType::Text | InputType::Audio => {
                matches!(mode, InputType::Text | InputType::Audio)
            }
        }
    }
}

/// Ordered list of questions shown on the personalization screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Questionnaire {
    questions: Vec<PersonalizationQuestion>,
}

/// Share of the questionnaire, in percent, that must be answered before finishing.
pub const FINISH_THRESHOLD_PERCENT: usize = 70;

impl Questionnaire {
    #[must_use]
    pub fn new(questions: Vec<PersonalizationQuestion>) -> Self {
        Self { questions }
    }

    /// The built-in seven-question personalization catalogue.
    #[must_use]
    pub fn default_catalog() -> Self {
        Self::new(vec![
            PersonalizationQuestion::new(
                "name",
                "What would you like to be called?",
                InputType::Text,
            )
            .required()
            .placeholder("e.g. Maria, Dr. Gonzalez..."),
            PersonalizationQuestion::new(
                "communication_style",
                "Which communication style do you prefer?",
                InputType::Select,
            )
            .required()
            .options(&[
                "Formal and professional",
                "Casual and friendly",
                "Direct and concise",
                "Detailed and explanatory",
            ]),
            PersonalizationQuestion::new(
                "interests",
                "What are your main interests or hobbies?",
                InputType::Text,
            )
            .placeholder("e.g. reading, sports, technology, cooking..."),
            PersonalizationQuestion::new(
                "goals",
                "What goals do you have, or what would you like help with?",
                InputType::Audio,
            )
            .placeholder("Describe your goals..."),
            PersonalizationQuestion::new(
                "expertise",
                "In which areas do you have experience or knowledge?",
                InputType::Text,
            )
            .placeholder("e.g. marketing, programming, design, medicine..."),
            PersonalizationQuestion::new(
                "learning_style",
                "How do you prefer to receive information?",
                InputType::Select,
            )
            .required()
            .options(&[
                "Practical examples",
                "Step-by-step explanations",
                "General concepts first",
                "Comparisons and analogies",
                "Visual format and diagrams",
            ]),
            PersonalizationQuestion::new(
                "context",
                "Is there anything about your situation we should keep in mind?",
                InputType::Audio,
            )
            .placeholder("Any additional context..."),
        ])
    }

    #[must_use]
    pub fn questions(&self) -> &[PersonalizationQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PersonalizationQuestion> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn find(&self, question_id: &str) -> Option<&PersonalizationQuestion> {
        self.questions.iter().find(|q| q.id.as_str() == question_id)
    }

    /// Catalogue questions with a non-blank answer.
    #[must_use]
    pub fn answered_count(&self, data: &PersonalizationData) -> usize {
        self.questions
            .iter()
            .filter(|q| data.is_answered(q.id.as_str()))
            .count()
    }

    /// Minimum answered questions needed to finish: `ceil(70% of len)`.
    #[must_use]
    pub fn finish_threshold(&self) -> usize {
        (self.questions.len() * FINISH_THRESHOLD_PERCENT).div_ceil(100)
    }

    #[must_use]
    pub fn can_finish(&self, data: &PersonalizationData) -> bool {
        self.answered_count(data) >= self.finish_threshold()
    }

    /// Checks that `answer`, entered in `input_type` mode, fits the question.
    ///
    /// A blank select answer clears the choice and is accepted.
    ///
    /// # Errors
    ///
    /// Returns `QuestionnaireError` if the question is unknown, the entry mode
    /// does not suit it, or a select answer is not one of the options.
    pub fn validate_answer(
        &self,
        question_id: &str,
        answer: &str,
        input_type: InputType,
    ) -> Result<(), QuestionnaireError> {
        let question = self
            .find(question_id)
            .ok_or_else(|| QuestionnaireError::UnknownQuestion(question_id.to_string()))?;
        if !question.accepts(input_type) {
            return Err(QuestionnaireError::WrongInputType {
                question: question_id.to_string(),
                expected: question.input_type,
            });
        }
        if input_type == InputType::Select
            && !answer.is_empty()
            && !question.options.iter().any(|o| o == answer)
        {
            return Err(QuestionnaireError::InvalidOption {
                question: question_id.to_string(),
                answer: answer.to_string(),
            });
        }
        Ok(())
    }
}

/// Position of the personalization screen within the questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionCursor {
    index: usize,
    total: usize,
}

impl QuestionCursor {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self { index: 0, total }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.total
    }

    /// Moves forward; returns false when already on the last question.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Moves back; returns false when already on the first question.
    pub fn previous(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        true
    }
}
