//! Volatile [`RequestStore`] kept in process memory.
//!
//! Applies the same conditional transitions as the Postgres repository.
//! Contents are lost on restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use skyqueue_core::request::{RequestStatus, StoredResult};
use skyqueue_core::types::DbId;
use tokio::sync::RwLock;

use super::RequestStore;
use crate::models::weather_request::WeatherRequest;
use crate::repositories::weather_request_repo::clamp_limit;

#[derive(Default)]
struct Inner {
    next_id: DbId,
    records: BTreeMap<DbId, WeatherRequest>,
}

/// In-memory request store.
#[derive(Default)]
pub struct MemoryRequestStore {
    inner: RwLock<Inner>,
}

impl MemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Move a record to `to` and apply `update`, if the record exists and
    /// its current status has a legal edge to `to`.
    async fn transition<F>(&self, id: DbId, to: RequestStatus, update: F) -> Option<WeatherRequest>
    where
        F: FnOnce(&mut WeatherRequest),
    {
        let mut inner = self.inner.write().await;
        let record = inner.records.get_mut(&id)?;
        let current = record.status().ok()?;
        if !current.can_transition_to(to) {
            return None;
        }
        record.status = to.as_str().to_string();
        update(record);
        record.updated_at = Utc::now();
        Some(record.clone())
    }
}

#[async_trait]
impl RequestStore for MemoryRequestStore {
    async fn create(&self, location: &str) -> Result<WeatherRequest, sqlx::Error> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let now = Utc::now();
        let record = WeatherRequest {
            id: inner.next_id,
            location: location.to_string(),
            status: RequestStatus::Pending.as_str().to_string(),
            raw_json: None,
            formatted_data: None,
            temperature: None,
            condition: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        };
        inner.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<WeatherRequest>, sqlx::Error> {
        Ok(self.inner.read().await.records.get(&id).cloned())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<WeatherRequest>, sqlx::Error> {
        let inner = self.inner.read().await;
        // IDs are assigned in creation order.
        Ok(inner
            .records
            .values()
            .rev()
            .take(clamp_limit(limit) as usize)
            .cloned()
            .collect())
    }

    async fn list_pending_ids(&self, limit: i64) -> Result<Vec<DbId>, sqlx::Error> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .values()
            .filter(|r| r.status == RequestStatus::Pending.as_str())
            .map(|r| r.id)
            .take(clamp_limit(limit) as usize)
            .collect())
    }

    async fn claim(&self, id: DbId) -> Result<Option<WeatherRequest>, sqlx::Error> {
        Ok(self
            .transition(id, RequestStatus::Processing, |r| {
                r.error_message = None;
            })
            .await)
    }

    async fn complete(&self, id: DbId, result: &StoredResult) -> Result<bool, sqlx::Error> {
        Ok(self
            .transition(id, RequestStatus::Completed, |r| {
                r.raw_json = Some(result.raw_json.clone());
                r.formatted_data = Some(result.formatted_data.clone());
                r.temperature = result.temperature.clone();
                r.condition = Some(result.condition.clone());
            })
            .await
            .is_some())
    }

    async fn fail(&self, id: DbId, message: &str) -> Result<bool, sqlx::Error> {
        Ok(self
            .transition(id, RequestStatus::Failed, |r| {
                r.error_message = Some(message.to_string());
            })
            .await
            .is_some())
    }

    async fn health_check(&self) -> Result<(), sqlx::Error> {
        Ok(())
    }
}
