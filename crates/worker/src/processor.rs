//! Drives a single weather request from `pending` to a terminal state.

use std::sync::Arc;

use skyqueue_core::types::DbId;
use skyqueue_db::store::RequestStore;
use skyqueue_weather::{FetchedWeather, WeatherSource};

/// What a call to [`RequestProcessor::process`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The fetch succeeded and the result was stored.
    Completed,
    /// The fetch failed and the failure was recorded on the request.
    Failed,
    /// The request could not be claimed (missing, or already claimed by
    /// another task), or it left `processing` before the result was written.
    Skipped,
}

/// Processes weather requests against an injected store and weather source.
pub struct RequestProcessor {
    store: Arc<dyn RequestStore>,
    source: Arc<dyn WeatherSource>,
}

impl RequestProcessor {
    pub fn new(store: Arc<dyn RequestStore>, source: Arc<dyn WeatherSource>) -> Self {
        Self { store, source }
    }

    /// Name of the configured weather source.
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Claim, fetch, and record the outcome for one request.
    ///
    /// Fetch failures never surface as `Err`: they are written to the record
    /// as `failed`. If the result cannot be stored, the record is failed with
    /// the store error instead. `Err` means even that write failed.
    pub async fn process(&self, id: DbId) -> Result<ProcessOutcome, sqlx::Error> {
        let Some(record) = self.store.claim(id).await? else {
            tracing::info!(request_id = id, "Weather request not claimable, skipping");
            return Ok(ProcessOutcome::Skipped);
        };

        tracing::info!(
            request_id = id,
            location = %record.location,
            source = self.source.name(),
            "Processing weather request",
        );

        let fetched = self
            .source
            .fetch(&record.location)
            .await
            .and_then(FetchedWeather::into_stored);

        let result = match fetched {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(request_id = id, error = %e, "Weather fetch failed");
                return self.record_failure(id, &e.to_string()).await;
            }
        };

        match self.store.complete(id, &result).await {
            Ok(true) => {
                tracing::info!(
                    request_id = id,
                    temperature = result.temperature.as_deref().unwrap_or("n/a"),
                    condition = %result.condition,
                    "Weather request completed",
                );
                Ok(ProcessOutcome::Completed)
            }
            Ok(false) => {
                tracing::warn!(request_id = id, "Request left processing before completion");
                Ok(ProcessOutcome::Skipped)
            }
            Err(e) => {
                tracing::error!(request_id = id, error = %e, "Failed to store weather result");
                self.record_failure(id, &format!("Failed to store weather result: {e}"))
                    .await
            }
        }
    }

    /// Move a claimed request to `failed` with `reason`.
    ///
    /// Also used by the dispatcher when a processing task dies before
    /// writing an outcome.
    pub async fn record_failure(&self, id: DbId, reason: &str) -> Result<ProcessOutcome, sqlx::Error> {
        if !self.store.fail(id, reason).await? {
            tracing::warn!(request_id = id, "Request left processing before failure");
            return Ok(ProcessOutcome::Skipped);
        }
        Ok(ProcessOutcome::Failed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use skyqueue_core::request::RequestState;
    use skyqueue_core::request::StoredResult;
    use skyqueue_db::models::weather_request::WeatherRequest;
    use skyqueue_db::store::MemoryRequestStore;
    use skyqueue_weather::{FetchError, SimulatedSource};

    use super::*;

    /// Source that always answers with the given HTTP status.
    struct StatusSource(u16);

    #[async_trait]
    impl WeatherSource for StatusSource {
        fn name(&self) -> &'static str {
            "status"
        }

        async fn fetch(&self, _location: &str) -> Result<FetchedWeather, FetchError> {
            Err(FetchError::Status {
                status: self.0,
                body: String::new(),
            })
        }
    }

    /// Simulated source that counts calls.
    #[derive(Default)]
    struct CountingSource(AtomicUsize);

    #[async_trait]
    impl WeatherSource for CountingSource {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn fetch(&self, location: &str) -> Result<FetchedWeather, FetchError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            SimulatedSource.fetch(location).await
        }
    }

    /// Memory store whose completion write always errors.
    #[derive(Default)]
    struct BrokenCompleteStore(MemoryRequestStore);

    #[async_trait]
    impl RequestStore for BrokenCompleteStore {
        async fn create(&self, location: &str) -> Result<WeatherRequest, sqlx::Error> {
            self.0.create(location).await
        }

        async fn find_by_id(&self, id: DbId) -> Result<Option<WeatherRequest>, sqlx::Error> {
            self.0.find_by_id(id).await
        }

        async fn list_recent(&self, limit: i64) -> Result<Vec<WeatherRequest>, sqlx::Error> {
            self.0.list_recent(limit).await
        }

        async fn list_pending_ids(&self, limit: i64) -> Result<Vec<DbId>, sqlx::Error> {
            self.0.list_pending_ids(limit).await
        }

        async fn claim(&self, id: DbId) -> Result<Option<WeatherRequest>, sqlx::Error> {
            self.0.claim(id).await
        }

        async fn complete(&self, _id: DbId, _result: &StoredResult) -> Result<bool, sqlx::Error> {
            Err(sqlx::Error::PoolTimedOut)
        }

        async fn fail(&self, id: DbId, message: &str) -> Result<bool, sqlx::Error> {
            self.0.fail(id, message).await
        }

        async fn health_check(&self) -> Result<(), sqlx::Error> {
            Ok(())
        }
    }

    fn processor(
        store: &Arc<MemoryRequestStore>,
        source: Arc<dyn WeatherSource>,
    ) -> RequestProcessor {
        RequestProcessor::new(Arc::clone(store) as Arc<dyn RequestStore>, source)
    }

    #[tokio::test]
    async fn simulated_fetch_completes_request() {
        let store = Arc::new(MemoryRequestStore::new());
        let id = store.create("London").await.unwrap().id;

        let outcome = processor(&store, Arc::new(SimulatedSource))
            .process(id)
            .await
            .unwrap();
        assert_eq!(outcome, ProcessOutcome::Completed);

        let record = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(record.status, "completed");
        assert_eq!(record.temperature.as_deref(), Some("20°C"));
        assert!(record.condition.as_deref().unwrap().contains("simulated"));
        assert!(record.raw_json.as_deref().unwrap().contains("London"));
        assert!(record.formatted_data.as_deref().unwrap().contains("simulated"));
        assert!(record.error_message.is_none());
    }

    #[tokio::test]
    async fn provider_error_fails_request() {
        let store = Arc::new(MemoryRequestStore::new());
        let id = store.create("London").await.unwrap().id;

        let outcome = processor(&store, Arc::new(StatusSource(500)))
            .process(id)
            .await
            .unwrap();
        assert_eq!(outcome, ProcessOutcome::Failed);

        let record = store.find_by_id(id).await.unwrap().unwrap();
        match record.state().unwrap() {
            RequestState::Failed { reason } => assert!(reason.contains("500")),
            other => panic!("expected failed state, got {other:?}"),
        }
        assert!(record.raw_json.is_none());
        assert!(record.formatted_data.is_none());
        assert!(record.temperature.is_none());
    }

    #[tokio::test]
    async fn processing_never_leaves_record_in_processing() {
        let store = Arc::new(MemoryRequestStore::new());
        let ok = store.create("Paris").await.unwrap().id;
        let bad = store.create("Atlantis").await.unwrap().id;

        processor(&store, Arc::new(SimulatedSource)).process(ok).await.unwrap();
        processor(&store, Arc::new(StatusSource(404))).process(bad).await.unwrap();

        for id in [ok, bad] {
            let status = store.find_by_id(id).await.unwrap().unwrap().status().unwrap();
            assert!(status.is_terminal(), "request {id} ended in {status}");
        }
    }

    #[tokio::test]
    async fn duplicate_dispatch_processes_once() {
        let store = Arc::new(MemoryRequestStore::new());
        let id = store.create("London").await.unwrap().id;
        let source = Arc::new(CountingSource::default());
        let processor = processor(&store, Arc::clone(&source) as Arc<dyn WeatherSource>);

        let (a, b) = tokio::join!(processor.process(id), processor.process(id));
        let mut outcomes = [a.unwrap(), b.unwrap()];
        outcomes.sort_by_key(|o| *o == ProcessOutcome::Skipped);

        assert_eq!(outcomes, [ProcessOutcome::Completed, ProcessOutcome::Skipped]);
        assert_eq!(source.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_record_is_skipped() {
        let store = Arc::new(MemoryRequestStore::new());
        let outcome = processor(&store, Arc::new(SimulatedSource))
            .process(42)
            .await
            .unwrap();
        assert_eq!(outcome, ProcessOutcome::Skipped);
    }

    #[tokio::test]
    async fn terminal_record_is_not_reprocessed() {
        let store = Arc::new(MemoryRequestStore::new());
        let id = store.create("London").await.unwrap().id;
        let processor = processor(&store, Arc::new(StatusSource(500)));

        assert_eq!(processor.process(id).await.unwrap(), ProcessOutcome::Failed);
        assert_eq!(processor.process(id).await.unwrap(), ProcessOutcome::Skipped);
    }

    #[tokio::test]
    async fn store_error_on_completion_fails_request() {
        let store = Arc::new(BrokenCompleteStore::default());
        let id = store.create("London").await.unwrap().id;

        let outcome = RequestProcessor::new(
            Arc::clone(&store) as Arc<dyn RequestStore>,
            Arc::new(SimulatedSource),
        )
        .process(id)
        .await
        .unwrap();
        assert_eq!(outcome, ProcessOutcome::Failed);

        let record = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(record.status, "failed");
        assert!(record
            .error_message
            .as_deref()
            .unwrap()
            .contains("Failed to store weather result"));
        assert!(record.raw_json.is_none());
    }
}
