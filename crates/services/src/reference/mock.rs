use std::time::Duration;

use async_trait::async_trait;
use aula_core::Clock;
use aula_core::model::{
    Difficulty, ExampleText, GeneratedTextRequest, Level, StudentStats, SystemSummary,
};
use rand::seq::IndexedRandom;

use super::ReferenceDataSource;
use crate::error::ReferenceDataError;

const TOPICS: [&str; 5] = [
    "the importance of education",
    "technology in modern life",
    "caring for the environment",
    "cultural traditions",
    "sport and health",
];

/// Built-in catalogue served after a simulated network delay.
#[derive(Debug, Clone)]
pub struct MockReferenceData {
    clock: Clock,
    latency: Duration,
}

impl MockReferenceData {
    #[must_use]
    pub fn new(clock: Clock, latency: Duration) -> Self {
        Self { clock, latency }
    }

    async fn delay(&self) {
        tokio::time::sleep(self.latency).await;
    }
}

fn level(
    id: &str,
    name: &str,
    description: &str,
    difficulty: Difficulty,
    created_at: &str,
) -> Level {
    Level {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        difficulty,
        created_at: created_at.to_string(),
    }
}

fn mock_levels() -> Vec<Level> {
    vec![
        level(
            "beginner-1",
            "Basic Foundations",
            "Learn the fundamental concepts",
            Difficulty::Beginner,
            "2024-01-01",
        ),
        level(
            "beginner-2",
            "Essential Vocabulary",
            "Build your core vocabulary",
            Difficulty::Beginner,
            "2024-01-02",
        ),
        level(
            "intermediate-1",
            "Practical Conversation",
            "Practise everyday dialogues",
            Difficulty::Intermediate,
            "2024-01-03",
        ),
        level(
            "intermediate-2",
            "Advanced Grammar",
            "Master complex structures",
            Difficulty::Intermediate,
            "2024-01-04",
        ),
        level(
            "advanced-1",
            "Advanced Expression",
            "Develop full fluency",
            Difficulty::Advanced,
            "2024-01-05",
        ),
    ]
}

fn mock_texts() -> Vec<ExampleText> {
    let text = |id: &str, level_id: &str, slot_no, content: &str, paragraphs, created_at: &str| {
        ExampleText {
            id: id.to_string(),
            level_id: level_id.to_string(),
            slot_no,
            content: content.to_string(),
            paragraphs,
            created_at: created_at.to_string(),
        }
    };
    vec![
        text(
            "text-1",
            "beginner-1",
            1,
            "Hola, mi nombre es María. Soy estudiante de español. Me gusta aprender idiomas nuevos porque es muy interesante y útil para mi futuro.\n\nVivo en una ciudad pequeña pero muy bonita. Todos los días voy a la escuela y estudio mucho. Por las tardes, me gusta leer libros y escuchar música.",
            2,
            "2024-01-01",
        ),
        text(
            "text-2",
            "beginner-1",
            2,
            "El clima hoy está muy agradable. El sol brilla y no hay nubes en el cielo. Es un día perfecto para salir al parque y disfrutar de la naturaleza.\n\nLos niños están jugando en el patio mientras sus padres conversan sentados en las bancas. Todo el mundo parece estar feliz y relajado.",
            2,
            "2024-01-01",
        ),
        text(
            "text-3",
            "intermediate-1",
            1,
            "La tecnología ha transformado completamente la manera en que nos comunicamos. Antes, las cartas tardaban semanas en llegar a su destino, pero ahora podemos enviar mensajes instantáneos a cualquier parte del mundo.\n\nSin embargo, algunos expertos argumentan que esta facilidad de comunicación también ha creado nuevos problemas. Las personas pueden sentirse abrumadas por la cantidad constante de información y notificaciones.\n\nEs importante encontrar un equilibrio entre aprovechar las ventajas de la tecnología y mantener tiempo para desconectarse y disfrutar de actividades más tranquilas.",
            3,
            "2024-01-03",
        ),
    ]
}

fn mock_stats() -> Vec<StudentStats> {
    vec![
        StudentStats {
            student_id: "student-1".into(),
            total_passages: 15,
            completed_passages: 12,
            average_score: 87.5,
            last_activity: "2024-01-15".into(),
        },
        StudentStats {
            student_id: "student-2".into(),
            total_passages: 10,
            completed_passages: 8,
            average_score: 92.3,
            last_activity: "2024-01-14".into(),
        },
    ]
}

#[async_trait]
impl ReferenceDataSource for MockReferenceData {
    async fn levels(&self) -> Result<Vec<Level>, ReferenceDataError> {
        self.delay().await;
        Ok(mock_levels())
    }

    async fn example_texts(&self, level_id: &str) -> Result<Vec<ExampleText>, ReferenceDataError> {
        self.delay().await;
        Ok(mock_texts()
            .into_iter()
            .filter(|text| text.level_id == level_id)
            .collect())
    }

    async fn student_stats(&self) -> Result<Vec<StudentStats>, ReferenceDataError> {
        self.delay().await;
        Ok(mock_stats())
    }

    async fn system_summary(&self) -> Result<SystemSummary, ReferenceDataError> {
        self.delay().await;
        Ok(SystemSummary {
            total_students: 25,
            total_passages: 45,
            total_levels: 5,
            average_completion_rate: 78.5,
        })
    }

    async fn generate_text(
        &self,
        request: &GeneratedTextRequest,
    ) -> Result<ExampleText, ReferenceDataError> {
        // Generation is slower than plain reads.
        self.delay().await;
        self.delay().await;

        let topic = match request.topic.as_deref().map(str::trim) {
            Some(topic) if !topic.is_empty() => topic.to_string(),
            _ => TOPICS
                .choose(&mut rand::rng())
                .copied()
                .unwrap_or(TOPICS[0])
                .to_string(),
        };
        let now = self.clock.now();
        Ok(ExampleText {
            id: format!("generated-{}", now.timestamp_millis()),
            level_id: request.level_id.clone(),
            slot_no: request.slot_no,
            content: format!(
                "This is a generated text about {topic}.\n\n\
                 It contains {} paragraphs as requested and is adapted to the selected level.",
                request.paragraphs
            ),
            paragraphs: request.paragraphs,
            created_at: now.to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aula_core::time::fixed_clock;

    fn source() -> MockReferenceData {
        MockReferenceData::new(fixed_clock(), Duration::ZERO)
    }

    #[tokio::test]
    async fn texts_are_filtered_by_level() {
        let texts = source().example_texts("beginner-1").await.unwrap();
        assert_eq!(texts.len(), 2);
        assert!(source().example_texts("advanced-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn catalogue_sizes() {
        assert_eq!(source().levels().await.unwrap().len(), 5);
        assert_eq!(source().student_stats().await.unwrap().len(), 2);
        assert_eq!(source().system_summary().await.unwrap().total_levels, 5);
    }

    #[tokio::test]
    async fn generated_text_uses_requested_topic() {
        let request = GeneratedTextRequest {
            level_id: "beginner-2".into(),
            slot_no: 3,
            paragraphs: 2,
            topic: Some("music".into()),
        };
        let text = source().generate_text(&request).await.unwrap();
        assert!(text.content.contains("about music"));
        assert_eq!(text.level_id, "beginner-2");
        assert_eq!(text.slot_no, 3);
    }

    #[tokio::test]
    async fn generated_text_picks_a_known_topic_when_none_given() {
        let request = GeneratedTextRequest {
            level_id: "beginner-2".into(),
            slot_no: 1,
            paragraphs: 1,
            topic: None,
        };
        let text = source().generate_text(&request).await.unwrap();
        assert!(TOPICS.iter().any(|topic| text.content.contains(topic)));
    }
}
