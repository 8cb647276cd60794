use async_trait::async_trait;
use aula_core::model::{ExampleText, GeneratedTextRequest, Level, StudentStats, SystemSummary};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::ReferenceDataSource;
use crate::error::ReferenceDataError;

/// Envelope wrapped around every backend payload.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    /// Unwrap the payload, turning a failure envelope into an error.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceDataError::Api` when `success` is false and
    /// `ReferenceDataError::EmptyResponse` when no data came back.
    pub fn into_data(self) -> Result<T, ReferenceDataError> {
        if !self.success {
            let (code, message) = match self.error {
                Some(body) => (body.code, body.message),
                None => (
                    "UNKNOWN".to_string(),
                    self.message.unwrap_or_else(|| "request failed".to_string()),
                ),
            };
            return Err(ReferenceDataError::Api { code, message });
        }
        self.data.ok_or(ReferenceDataError::EmptyResponse)
    }
}

/// Reference data served by the backend API.
#[derive(Clone)]
pub struct HttpReferenceData {
    client: Client,
    base_url: String,
}

impl HttpReferenceData {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `segments` onto the base address, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ReferenceDataError> {
        let invalid = || ReferenceDataError::InvalidBaseUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ReferenceDataError> {
        if !response.status().is_success() {
            return Err(ReferenceDataError::HttpStatus(response.status()));
        }
        let body: ApiResponse<T> = response.json().await?;
        body.into_data()
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ReferenceDataError> {
        let url = self.endpoint(segments)?;
        debug!(%url, "GET reference data");
        let response = self.client.get(url).send().await?;
        self.read(response).await
    }
}

#[async_trait]
impl ReferenceDataSource for HttpReferenceData {
    async fn levels(&self) -> Result<Vec<Level>, ReferenceDataError> {
        self.get(&["levels"]).await
    }

    async fn example_texts(&self, level_id: &str) -> Result<Vec<ExampleText>, ReferenceDataError> {
        self.get(&["levels", level_id, "example-texts"]).await
    }

    async fn student_stats(&self) -> Result<Vec<StudentStats>, ReferenceDataError> {
        self.get(&["students", "stats"]).await
    }

    async fn system_summary(&self) -> Result<SystemSummary, ReferenceDataError> {
        self.get(&["admin", "system-summary"]).await
    }

    async fn generate_text(
        &self,
        request: &GeneratedTextRequest,
    ) -> Result<ExampleText, ReferenceDataError> {
        let url = self.endpoint(&["ai", "generate-example-text"])?;
        debug!(%url, level = %request.level_id, "POST generate text");
        let response = self.client.post(url).json(request).send().await?;
        self.read(response).await
    }
}
