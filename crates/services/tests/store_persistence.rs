use std::sync::Arc;

use async_trait::async_trait;
use aula_core::model::{InputType, UserId, UserProfile, UserType};
use aula_core::time::{fixed_clock, fixed_now};
use services::{PERSONALIZATION_KEY, PersonalizationStore, SESSION_KEY, SessionStore};
use storage::repository::{InMemoryStore, KeyValueStore, StorageError};

/// Backend that refuses every call.
struct BrokenStore;

#[async_trait]
impl KeyValueStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn put(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("quota exceeded".into()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}

fn student() -> UserProfile {
    UserProfile::new(
        UserId::new("student-123"),
        "Ana Garcia",
        "ana.garcia@student.example",
        UserType::Student,
        true,
        fixed_now(),
    )
    .with_voice_profile("hola me llamo Ana")
}

#[tokio::test]
async fn session_survives_restart_without_account_flag() {
    let records = InMemoryStore::new();
    let mut session = SessionStore::new(Arc::new(records.clone()));
    session.set_has_account(true);
    session.set_user(student()).await;

    let restored = SessionStore::load(Arc::new(records.clone())).await;
    assert_eq!(restored.current_user(), Some(&student()));
    assert_eq!(restored.user_type(), Some(UserType::Student));
    assert!(!restored.has_account());
}

#[tokio::test]
async fn logout_removes_persisted_profile() {
    let records = InMemoryStore::new();
    let mut session = SessionStore::new(Arc::new(records.clone()));
    session.set_user(student()).await;
    assert!(records.get(SESSION_KEY).await.unwrap().is_some());

    session.logout().await;
    assert_eq!(session.state(), &services::SessionState::default());
    assert!(records.get(SESSION_KEY).await.unwrap().is_none());

    let restored = SessionStore::load(Arc::new(records)).await;
    assert!(!restored.is_authenticated());
    assert_eq!(restored.user_type(), None);
}

#[tokio::test]
async fn corrupt_session_record_loads_empty() {
    let records = InMemoryStore::new();
    records.put(SESSION_KEY, "{not json").await.unwrap();
    let session = SessionStore::load(Arc::new(records)).await;
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn personalization_round_trips_through_storage() {
    let records = InMemoryStore::new();
    let mut store = PersonalizationStore::new(Arc::new(records.clone()), 2, fixed_clock());
    store.update_answer("name", "Ana", InputType::Text).await;
    store
        .update_answer("interests", "Science", InputType::Select)
        .await;
    assert!(store.is_complete());

    let restored = PersonalizationStore::load(Arc::new(records), 2, fixed_clock()).await;
    assert_eq!(restored.data(), store.data());
    assert_eq!(restored.get_answer("interests"), Some("Science"));
    assert_eq!(restored.completion_percentage(), 100);
}

#[tokio::test]
async fn persisted_answers_use_camel_case_keys() {
    let records = InMemoryStore::new();
    let mut store = PersonalizationStore::new(Arc::new(records.clone()), 1, fixed_clock());
    store.update_answer("name", "Ana", InputType::Text).await;

    let raw = records.get(PERSONALIZATION_KEY).await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["answers"][0]["questionId"], "name");
    assert_eq!(value["answers"][0]["inputType"], "text");
    assert_eq!(value["isComplete"], true);
    assert!(value["completedAt"].is_string());
}

#[tokio::test]
async fn corrupt_personalization_record_loads_empty() {
    let records = InMemoryStore::new();
    records
        .put(PERSONALIZATION_KEY, r#"{"answers": 7}"#)
        .await
        .unwrap();
    let store = PersonalizationStore::load(Arc::new(records), 7, fixed_clock()).await;
    assert!(store.answers().is_empty());
    assert!(!store.is_complete());
    assert_eq!(store.completion_percentage(), 0);
}

#[tokio::test]
async fn storage_failures_do_not_block_state_changes() {
    let mut session = SessionStore::load(Arc::new(BrokenStore)).await;
    assert!(!session.is_authenticated());
    session.set_user(student()).await;
    assert_eq!(session.user_type(), Some(UserType::Student));
    session.logout().await;
    assert!(!session.is_authenticated());

    let mut store = PersonalizationStore::load(Arc::new(BrokenStore), 1, fixed_clock()).await;
    store.update_answer("name", "Ana", InputType::Text).await;
    assert!(store.is_complete());
    store.clear_data().await;
    assert!(store.answers().is_empty());
}
