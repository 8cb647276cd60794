//! Read-only reference records shown by the screens (levels, texts, stats).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleText {
    pub id: String,
    pub level_id: String,
    pub slot_no: u32,
    pub content: String,
    pub paragraphs: u32,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentStats {
    pub student_id: String,
    pub total_passages: u32,
    pub completed_passages: u32,
    pub average_score: f64,
    pub last_activity: String,
}

impl StudentStats {
    /// Completed share of passages in percent, 0 when nothing was assigned.
    #[must_use]
    pub fn completion_rate(&self) -> f64 {
        if self.total_passages == 0 {
            return 0.0;
        }
        f64::from(self.completed_passages) * 100.0 / f64::from(self.total_passages)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSummary {
    pub total_students: u32,
    pub total_passages: u32,
    pub total_levels: u32,
    pub average_completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedTextRequest {
    pub level_id: String,
    pub slot_no: u32,
    pub paragraphs: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_rate_handles_empty_assignment() {
        let stats = StudentStats {
            student_id: "student-1".into(),
            total_passages: 0,
            completed_passages: 0,
            average_score: 0.0,
            last_activity: "2024-01-15".into(),
        };
        assert!(stats.completion_rate().abs() < f64::EPSILON);

        let stats = StudentStats {
            total_passages: 15,
            completed_passages: 12,
            ..stats
        };
        assert!((stats.completion_rate() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn level_uses_snake_case_wire_names() {
        let level: Level = serde_json::from_str(
            r#"{"id":"beginner-1","name":"Basics","description":"d","difficulty":"beginner","created_at":"2024-01-01"}"#,
        )
        .unwrap();
        assert_eq!(level.difficulty, Difficulty::Beginner);
    }
}
