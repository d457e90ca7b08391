use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::ApplicationRecord;
use crate::store::{ApplicationStore, Mutator};

/// Process-local reference backing. The map mutex makes every operation,
/// including the read-modify-write in `update`, atomic per store.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<Uuid, ApplicationRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn create(&self, record: ApplicationRecord) -> Result<ApplicationRecord> {
        let mut records = self.records.lock().expect("application store mutex poisoned");
        if records.contains_key(&record.id) {
            return Err(Error::Conflict(format!(
                "Application {} already exists",
                record.id
            )));
        }
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<ApplicationRecord> {
        let records = self.records.lock().expect("application store mutex poisoned");
        records
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))
    }

    async fn update(&self, id: Uuid, mutate: Mutator<'_>) -> Result<ApplicationRecord> {
        let mut records = self.records.lock().expect("application store mutex poisoned");
        let current = records
            .get(&id)
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))?;

        let mut next = current.clone();
        mutate(&mut next)?;
        records.insert(id, next.clone());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::ApplicationStatus;
    use chrono::Utc;

    fn record() -> ApplicationRecord {
        ApplicationRecord {
            id: Uuid::new_v4(),
            application_type: "staff".to_string(),
            applicant_id: "1000".to_string(),
            applicant_display_name: "steve".to_string(),
            avatar_url: String::new(),
            minecraft_username: "Steve".to_string(),
            minecraft_uuid: "8667ba71b85a4004af54457a9734eed7".to_string(),
            answers: HashMap::new(),
            status: ApplicationStatus::Submitted,
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
            notification_message_id: None,
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = MemoryStore::new();
        let created = store.create(record()).await.unwrap();
        let fetched = store.get(created.id).await.unwrap();
        assert_eq!(fetched.minecraft_username, "Steve");
    }

    #[tokio::test]
    async fn duplicate_id_is_a_conflict() {
        let store = MemoryStore::new();
        let rec = store.create(record()).await.unwrap();
        let err = store.create(rec).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn update_of_missing_id_is_not_found() {
        let store = MemoryStore::new();
        let err = store.update(Uuid::new_v4(), &|_| Ok(())).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn failed_mutator_leaves_the_record_untouched() {
        let store = MemoryStore::new();
        let rec = store.create(record()).await.unwrap();

        let err = store
            .update(rec.id, &|r| {
                r.status = ApplicationStatus::Accepted;
                Err(Error::InvalidTransition("nope".to_string()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));

        let fetched = store.get(rec.id).await.unwrap();
        assert_eq!(fetched.status, ApplicationStatus::Submitted);
    }
}
