//! In-process job queue and dispatcher.
//!
//! The web layer pushes record IDs through a [`JobQueue`]; a single
//! [`Dispatcher`] task drains the channel and spawns one processing task per
//! ID. A semaphore bounds how many run at once. An ID that is already queued
//! or running is dropped; the claim in the store guards anything that slips
//! past (e.g. another worker process).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use skyqueue_core::types::DbId;
use skyqueue_db::store::RequestStore;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{self, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::processor::RequestProcessor;

/// Upper bound on IDs re-enqueued by a single recovery pass.
pub const RECOVERY_BATCH: i64 = 100;

/// Errors from enqueueing a job.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The dispatcher has stopped and dropped its receiver.
    #[error("Job queue is closed")]
    Closed,
}

/// Sending half of the job queue. Cheap to clone.
#[derive(Clone)]
pub struct JobQueue {
    tx: Option<mpsc::UnboundedSender<DbId>>,
}

/// Receiving half of the job queue, consumed by [`Dispatcher::run`].
pub struct JobReceiver {
    rx: mpsc::UnboundedReceiver<DbId>,
}

impl JobQueue {
    /// Create a connected queue/receiver pair.
    pub fn channel() -> (JobQueue, JobReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (JobQueue { tx: Some(tx) }, JobReceiver { rx })
    }

    /// A queue with no in-process dispatcher.
    ///
    /// Enqueue is a no-op; a standalone worker picks pending records up
    /// from the shared database instead.
    pub fn external() -> Self {
        JobQueue { tx: None }
    }

    /// Queue a record for processing.
    pub fn enqueue(&self, id: DbId) -> Result<(), QueueError> {
        match &self.tx {
            Some(tx) => tx.send(id).map_err(|_| QueueError::Closed),
            None => {
                tracing::debug!(request_id = id, "Deferring weather request to external worker");
                Ok(())
            }
        }
    }
}

/// Re-enqueue every record still `pending` in the store.
///
/// Used at startup to pick up work queued before a restart, and by the
/// standalone worker's poll loop. Returns the number of IDs enqueued.
pub async fn recover_pending(
    store: &dyn RequestStore,
    queue: &JobQueue,
) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
    let ids = store.list_pending_ids(RECOVERY_BATCH).await?;
    for id in &ids {
        queue.enqueue(*id)?;
    }
    Ok(ids.len())
}

/// Runs processing tasks for IDs arriving on the queue.
pub struct Dispatcher {
    processor: Arc<RequestProcessor>,
    permits: Arc<Semaphore>,
    concurrency: usize,
}

impl Dispatcher {
    /// Create a dispatcher running at most `concurrency` tasks at once.
    pub fn new(processor: Arc<RequestProcessor>, concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            processor,
            permits: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        }
    }

    /// Run until `cancel` fires or every [`JobQueue`] is dropped, then wait
    /// for in-flight tasks to finish.
    pub async fn run(self, mut receiver: JobReceiver, cancel: CancellationToken) {
        let mut running = Running::default();

        tracing::info!(
            concurrency = self.concurrency,
            source = self.processor.source_name(),
            "Job dispatcher started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Job dispatcher shutting down");
                    break;
                }
                next = receiver.rx.recv() => match next {
                    Some(id) => {
                        if running.in_flight.insert(id) {
                            self.spawn_process(&mut running, id);
                        } else {
                            tracing::debug!(request_id = id, "Already in flight, ignoring");
                        }
                    }
                    None => {
                        tracing::info!("Job queue closed, dispatcher stopping");
                        break;
                    }
                },
                Some(joined) = running.tasks.join_next_with_id(), if !running.tasks.is_empty() => {
                    self.reap(&mut running, joined);
                }
            }
        }

        let remaining = running.tasks.len();
        if remaining > 0 {
            tracing::info!(remaining, "Waiting for in-flight weather requests");
        }
        while let Some(joined) = running.tasks.join_next_with_id().await {
            self.reap(&mut running, joined);
        }
        tracing::info!("Job dispatcher stopped");
    }

    fn spawn_process(&self, running: &mut Running, id: DbId) {
        let processor = Arc::clone(&self.processor);
        let permits = Arc::clone(&self.permits);

        let handle = running.tasks.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return id;
            };
            match processor.process(id).await {
                Ok(outcome) => {
                    tracing::debug!(request_id = id, ?outcome, "Weather request processed");
                }
                Err(e) => {
                    tracing::error!(
                        request_id = id,
                        error = %e,
                        "Failed to record weather request outcome",
                    );
                }
            }
            id
        });
        running.owners.insert(handle.id(), id);
    }

    /// Record a failure for a request whose task died mid-processing.
    fn spawn_abandon(&self, running: &mut Running, id: DbId) {
        let processor = Arc::clone(&self.processor);

        let handle = running.tasks.spawn(async move {
            if let Err(e) = processor
                .record_failure(id, "Weather request processing aborted unexpectedly.")
                .await
            {
                tracing::error!(request_id = id, error = %e, "Failed to fail aborted weather request");
            }
            id
        });
        running.owners.insert(handle.id(), id);
    }

    fn reap(&self, running: &mut Running, joined: Result<(task::Id, DbId), task::JoinError>) {
        match joined {
            Ok((task_id, id)) => {
                running.owners.remove(&task_id);
                running.in_flight.remove(&id);
            }
            Err(e) => {
                let Some(id) = running.owners.remove(&e.id()) else {
                    tracing::error!(error = %e, "Untracked dispatcher task failed");
                    return;
                };
                if e.is_panic() {
                    tracing::error!(request_id = id, error = %e, "Weather request task panicked");
                    // `id` stays in flight until the failure write is reaped.
                    self.spawn_abandon(running, id);
                } else {
                    running.in_flight.remove(&id);
                }
            }
        }
    }
}

/// Tasks owned by a running [`Dispatcher`].
#[derive(Default)]
struct Running {
    tasks: JoinSet<DbId>,
    /// Request id handled by each live task.
    owners: HashMap<task::Id, DbId>,
    /// Request ids queued or running; duplicates are dropped.
    in_flight: HashSet<DbId>,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use skyqueue_db::store::MemoryRequestStore;
    use skyqueue_weather::SimulatedSource;

    use super::*;

    async fn wait_until_terminal(store: &MemoryRequestStore, id: DbId) -> String {
        for _ in 0..200 {
            let record = store.find_by_id(id).await.unwrap().unwrap();
            if record.status().unwrap().is_terminal() {
                return record.status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("request {id} did not reach a terminal state");
    }

    fn start(store: &Arc<MemoryRequestStore>) -> (JobQueue, CancellationToken, tokio::task::JoinHandle<()>) {
        let processor = Arc::new(RequestProcessor::new(
            Arc::clone(store) as Arc<dyn RequestStore>,
            Arc::new(SimulatedSource),
        ));
        let (queue, receiver) = JobQueue::channel();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(Dispatcher::new(processor, 2).run(receiver, cancel.clone()));
        (queue, cancel, handle)
    }

    #[tokio::test]
    async fn enqueued_requests_are_processed() {
        let store = Arc::new(MemoryRequestStore::new());
        let (queue, cancel, handle) = start(&store);

        let mut ids = Vec::new();
        for city in ["London", "Tokyo", "Lima", "Oslo"] {
            let id = store.create(city).await.unwrap().id;
            queue.enqueue(id).unwrap();
            ids.push(id);
        }

        for id in ids {
            assert_eq!(wait_until_terminal(&store, id).await, "completed");
        }

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn recover_pending_enqueues_waiting_records() {
        let store = Arc::new(MemoryRequestStore::new());
        let a = store.create("London").await.unwrap().id;
        let b = store.create("Paris").await.unwrap().id;
        let (queue, cancel, handle) = start(&store);

        let recovered = recover_pending(store.as_ref(), &queue).await.unwrap();
        assert_eq!(recovered, 2);

        assert_eq!(wait_until_terminal(&store, a).await, "completed");
        assert_eq!(wait_until_terminal(&store, b).await, "completed");

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn dispatcher_stops_when_queue_dropped() {
        let store = Arc::new(MemoryRequestStore::new());
        let (queue, _cancel, handle) = start(&store);

        drop(queue);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("dispatcher should stop")
            .unwrap();
    }

    #[tokio::test]
    async fn enqueue_after_dispatcher_stopped_is_closed() {
        let (queue, receiver) = JobQueue::channel();
        drop(receiver);
        assert_matches!(queue.enqueue(1), Err(QueueError::Closed));
    }

    #[test]
    fn external_queue_accepts_without_dispatcher() {
        assert!(JobQueue::external().enqueue(1).is_ok());
    }

    #[tokio::test]
    async fn panicked_task_fails_request_and_frees_id() {
        use async_trait::async_trait;
        use skyqueue_weather::{FetchError, FetchedWeather, WeatherSource};

        struct PanickingSource;

        #[async_trait]
        impl WeatherSource for PanickingSource {
            fn name(&self) -> &'static str {
                "panicking"
            }

            async fn fetch(&self, _location: &str) -> Result<FetchedWeather, FetchError> {
                panic!("provider blew up");
            }
        }

        let store = Arc::new(MemoryRequestStore::new());
        let processor = Arc::new(RequestProcessor::new(
            Arc::clone(&store) as Arc<dyn RequestStore>,
            Arc::new(PanickingSource),
        ));
        let (queue, receiver) = JobQueue::channel();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(Dispatcher::new(processor, 1).run(receiver, cancel.clone()));

        let id = store.create("London").await.unwrap().id;
        queue.enqueue(id).unwrap();
        assert_eq!(wait_until_terminal(&store, id).await, "failed");

        let record = store.find_by_id(id).await.unwrap().unwrap();
        assert!(record.error_message.unwrap().contains("aborted"));

        // A fresh request is still dispatched after the panic.
        let next = store.create("Paris").await.unwrap().id;
        queue.enqueue(next).unwrap();
        assert_eq!(wait_until_terminal(&store, next).await, "failed");

        cancel.cancel();
        handle.await.unwrap();
    }
}
