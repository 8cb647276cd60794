//! Best-effort JSON snapshots in the key-value store.
//!
//! Reads treat absent and malformed data the same way (`None`); writes and
//! deletes log failures and never report them to the caller.

use serde::Serialize;
use serde::de::DeserializeOwned;
use storage::repository::KeyValueStore;
use tracing::{debug, warn};

pub(crate) async fn load_snapshot<T: DeserializeOwned>(
    records: &dyn KeyValueStore,
    key: &str,
) -> Option<T> {
    let raw = match records.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "no stored snapshot");
            return None;
        }
        Err(err) => {
            warn!(key, error = %err, "failed to read snapshot");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, error = %err, "discarding malformed snapshot");
            None
        }
    }
}

pub(crate) async fn save_snapshot<T: Serialize>(records: &dyn KeyValueStore, key: &str, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(key, error = %err, "failed to encode snapshot");
            return;
        }
    };
    if let Err(err) = records.put(key, &raw).await {
        warn!(key, error = %err, "failed to write snapshot");
    }
}

pub(crate) async fn remove_snapshot(records: &dyn KeyValueStore, key: &str) {
    if let Err(err) = records.remove(key).await {
        warn!(key, error = %err, "failed to remove snapshot");
    }
}
