use std::sync::Arc;

use aula_core::model::{ExampleText, Level, SystemSummary};
use storage::repository::KeyValueStore;
use tracing::{debug, warn};

use super::ReferenceDataSource;
use crate::error::ReferenceDataError;
use crate::persistence::{load_snapshot, remove_snapshot, save_snapshot};

pub const CACHE_PREFIX: &str = "edhack_";
pub const LEVELS_KEY: &str = "edhack_levels";
pub const SUMMARY_KEY: &str = "edhack_system_summary";

fn texts_key(level_id: &str) -> String {
    format!("{CACHE_PREFIX}texts_{level_id}")
}

/// Local copy of reference records, keyed under a shared prefix.
#[derive(Clone)]
pub struct ReferenceCache {
    records: Arc<dyn KeyValueStore>,
}

impl ReferenceCache {
    #[must_use]
    pub fn new(records: Arc<dyn KeyValueStore>) -> Self {
        Self { records }
    }

    pub async fn levels(&self) -> Option<Vec<Level>> {
        load_snapshot(self.records.as_ref(), LEVELS_KEY).await
    }

    pub async fn set_levels(&self, levels: &[Level]) {
        save_snapshot(self.records.as_ref(), LEVELS_KEY, &levels).await;
    }

    pub async fn example_texts(&self, level_id: &str) -> Option<Vec<ExampleText>> {
        load_snapshot(self.records.as_ref(), &texts_key(level_id)).await
    }

    pub async fn set_example_texts(&self, level_id: &str, texts: &[ExampleText]) {
        save_snapshot(self.records.as_ref(), &texts_key(level_id), &texts).await;
    }

    pub async fn system_summary(&self) -> Option<SystemSummary> {
        load_snapshot(self.records.as_ref(), SUMMARY_KEY).await
    }

    pub async fn set_system_summary(&self, summary: &SystemSummary) {
        save_snapshot(self.records.as_ref(), SUMMARY_KEY, summary).await;
    }

    /// Remove every cached record. Session and personalization data stay.
    pub async fn clear(&self) {
        let keys = match self.records.keys_with_prefix(CACHE_PREFIX).await {
            Ok(keys) => keys,
            Err(err) => {
                warn!(error = %err, "failed to list cached records");
                return;
            }
        };
        for key in &keys {
            remove_snapshot(self.records.as_ref(), key).await;
        }
        debug!(removed = keys.len(), "cleared reference cache");
    }

    /// Serve levels from the cache, falling back to the source and caching the result.
    ///
    /// # Errors
    ///
    /// Returns the source error when nothing is cached and the fetch fails.
    pub async fn levels_cached_or_fetch(
        &self,
        source: &dyn ReferenceDataSource,
    ) -> Result<Vec<Level>, ReferenceDataError> {
        if let Some(levels) = self.levels().await {
            return Ok(levels);
        }
        let levels = source.levels().await?;
        self.set_levels(&levels).await;
        Ok(levels)
    }

    /// # Errors
    ///
    /// Returns the source error when nothing is cached and the fetch fails.
    pub async fn example_texts_cached_or_fetch(
        &self,
        source: &dyn ReferenceDataSource,
        level_id: &str,
    ) -> Result<Vec<ExampleText>, ReferenceDataError> {
        if let Some(texts) = self.example_texts(level_id).await {
            return Ok(texts);
        }
        let texts = source.example_texts(level_id).await?;
        self.set_example_texts(level_id, &texts).await;
        Ok(texts)
    }

    /// # Errors
    ///
    /// Returns the source error when nothing is cached and the fetch fails.
    pub async fn system_summary_cached_or_fetch(
        &self,
        source: &dyn ReferenceDataSource,
    ) -> Result<SystemSummary, ReferenceDataError> {
        if let Some(summary) = self.system_summary().await {
            return Ok(summary);
        }
        let summary = source.system_summary().await?;
        self.set_system_summary(&summary).await;
        Ok(summary)
    }

    /// Adds a freshly generated text to its level's list, loading the list
    /// from `source` first when it is not cached. Nothing is cached if that
    /// load fails.
    pub async fn push_example_text(&self, source: &dyn ReferenceDataSource, text: &ExampleText) {
        let mut texts = match self
            .example_texts_cached_or_fetch(source, &text.level_id)
            .await
        {
            Ok(texts) => texts,
            Err(err) => {
                warn!(level = %text.level_id, error = %err, "generated text left uncached");
                return;
            }
        };
        texts.retain(|existing| existing.id != text.id);
        texts.push(text.clone());
        self.set_example_texts(&text.level_id, &texts).await;
    }
}
