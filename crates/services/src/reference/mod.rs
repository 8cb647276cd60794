//! Reference data for the screens: levels, example texts, dashboard stats.
//!
//! Navigation, session and personalization never depend on this module.

mod cache;
mod http;
mod mock;

use async_trait::async_trait;
use aula_core::model::{ExampleText, GeneratedTextRequest, Level, StudentStats, SystemSummary};

use crate::error::ReferenceDataError;

pub use cache::ReferenceCache;
pub use http::{ApiResponse, HttpReferenceData};
pub use mock::MockReferenceData;

/// Read-mostly source of reference records.
#[async_trait]
pub trait ReferenceDataSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `ReferenceDataError` if the source cannot be reached.
    async fn levels(&self) -> Result<Vec<Level>, ReferenceDataError>;

    /// # Errors
    ///
    /// Returns `ReferenceDataError` if the source cannot be reached.
    async fn example_texts(&self, level_id: &str) -> Result<Vec<ExampleText>, ReferenceDataError>;

    /// # Errors
    ///
    /// Returns `ReferenceDataError` if the source cannot be reached.
    async fn student_stats(&self) -> Result<Vec<StudentStats>, ReferenceDataError>;

    /// # Errors
    ///
    /// Returns `ReferenceDataError` if the source cannot be reached.
    async fn system_summary(&self) -> Result<SystemSummary, ReferenceDataError>;

    /// Generate a new example text for a level slot.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceDataError` if generation fails.
    async fn generate_text(
        &self,
        request: &GeneratedTextRequest,
    ) -> Result<ExampleText, ReferenceDataError>;
}
