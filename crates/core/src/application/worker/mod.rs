// Worker - payrun job execution loop

pub mod constants;
mod shutdown;

pub use constants::*;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::application::context::ExecutionContextFactory;
use crate::application::queue::{Dequeued, JobQueue};
use crate::domain::{NotificationEvent, PayrunJob, QueueItem};
use crate::error::Result;
use crate::port::{NotificationDispatcher, PayrunProcessor, TimeProvider};

/// Disposition of one held queue item
enum ItemOutcome {
    Processed,
    ShutdownRequested,
}

/// Worker supervises one payrun job at a time
///
/// The loop is resilient: every failure is contained at single-job
/// granularity and only the shutdown signal ends it. Exit is terminal for
/// this instance; restarting requires a new worker.
pub struct Worker {
    queue: Arc<JobQueue>,
    context_factory: ExecutionContextFactory,
    processor: Arc<dyn PayrunProcessor>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    time_provider: Arc<dyn TimeProvider>,
}

impl Worker {
    pub fn new(
        queue: Arc<JobQueue>,
        context_factory: ExecutionContextFactory,
        processor: Arc<dyn PayrunProcessor>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            queue,
            context_factory,
            processor,
            dispatcher,
            time_provider,
        }
    }

    /// Run the worker loop with graceful shutdown support
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<()> {
        info!("Payrun worker started");
        loop {
            let item = match self.queue.dequeue(&mut shutdown).await {
                Dequeued::Item(item) => item,
                Dequeued::Shutdown => {
                    info!("Payrun worker shutting down, queued items left undelivered");
                    break;
                }
            };

            match self.process_item(item, &mut shutdown).await {
                ItemOutcome::Processed => {}
                ItemOutcome::ShutdownRequested => break,
            }
        }
        info!("Payrun worker stopped");
        Ok(())
    }

    /// Supervise one held item to a terminal disposition
    async fn process_item(&self, item: QueueItem, shutdown: &mut ShutdownToken) -> ItemOutcome {
        info!(
            tenant_id = %item.tenant_id,
            job_id = %item.job_id,
            payrun_id = %item.payrun_id,
            "Processing payrun job"
        );

        let ctx = self.context_factory.create();
        let processor = Arc::clone(&self.processor);
        let tenant = item.tenant.clone();
        let payrun_id = item.payrun_id.clone();
        let invocation = item.invocation.clone();

        // The computation runs in its own task so a panicking processor
        // cannot take the loop down.
        let handle = tokio::spawn(async move {
            processor
                .process(&ctx, &tenant, &payrun_id, &invocation)
                .await
        });

        tokio::select! {
            // A finished computation wins over a simultaneous shutdown signal
            biased;

            result = handle => {
                match result {
                    Ok(Ok(job)) => {
                        // Processor already finalized the job record
                        info!(job_id = %job.id, status = %job.status, "Payrun job finished");
                        self.notify(&item, &job).await;
                    }
                    Ok(Err(fault)) => {
                        warn!(job_id = %item.job_id, error = %fault, "Payrun processor fault");
                        if let Some(job) = self.abort_job(&item, &fault.to_string()).await {
                            self.notify(&item, &job).await;
                        }
                    }
                    Err(join_err) => {
                        let reason = panic_message(join_err);
                        error!(job_id = %item.job_id, panic = %reason, "Payrun processor panicked");
                        if let Some(job) = self.abort_job(&item, &reason).await {
                            self.notify(&item, &job).await;
                        }
                    }
                }
                ItemOutcome::Processed
            }
            _ = shutdown.wait() => {
                // The detached computation is not interrupted; only the job
                // record is aborted before exit.
                warn!(job_id = %item.job_id, "Shutdown signal with payrun job in flight");
                if let Some(job) = self.abort_job(&item, SHUTDOWN_ABORT_REASON).await {
                    self.notify(&item, &job).await;
                }
                ItemOutcome::ShutdownRequested
            }
        }
    }

    /// Best-effort compensating abort of the held item's job record
    ///
    /// Missing or already-final jobs are left untouched (idempotent). Returns
    /// the terminal job snapshot when one is known, so notification can still
    /// fire; every failure inside this path is logged and swallowed.
    async fn abort_job(&self, item: &QueueItem, reason: &str) -> Option<PayrunJob> {
        let ctx = self.context_factory.create();

        match ctx.job_store.get(&item.tenant_id, &item.job_id).await {
            Ok(Some(mut job)) => {
                if job.status.is_final() {
                    // Processor finalized concurrently; do not overwrite
                    return Some(job);
                }
                job.abort(self.time_provider.now_millis(), reason);
                if let Err(e) = ctx.job_store.update(&item.tenant_id, &job).await {
                    warn!(job_id = %item.job_id, error = %e, "Failed to persist payrun job abort");
                    return None;
                }
                warn!(job_id = %item.job_id, reason = %reason, "Payrun job aborted");
                Some(job)
            }
            Ok(None) => {
                warn!(job_id = %item.job_id, "Payrun job missing during abort");
                None
            }
            Err(e) => {
                warn!(job_id = %item.job_id, error = %e, "Failed to load payrun job during abort");
                None
            }
        }
    }

    /// Single best-effort notification attempt for a terminal job
    async fn notify(&self, item: &QueueItem, job: &PayrunJob) {
        let user_id = &item.invocation.user_id;
        let event = match NotificationEvent::from_job(job, user_id.clone()) {
            Ok(event) => event,
            Err(e) => {
                error!(job_id = %job.id, error = %e, "Failed to serialize payrun job snapshot");
                return;
            }
        };

        if let Err(e) = self.dispatcher.send(&item.tenant_id, &event, user_id).await {
            warn!(job_id = %job.id, error = %e, "Payrun job notification failed");
        }
    }
}

/// Extract a human-readable reason from a joined task failure
fn panic_message(err: tokio::task::JoinError) -> String {
    if err.is_panic() {
        let panic = err.into_panic();
        if let Some(s) = panic.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            PANIC_ABORT_REASON.to_string()
        }
    } else {
        "payrun task cancelled".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::context::{ComputationSettings, EngineRegistry};
    use crate::domain::{JobInvocation, JobStatus, NotificationAction, PayrunJob, Tenant};
    use crate::port::job_store::mocks::InMemoryJobStore;
    use crate::port::notification::mocks::RecordingDispatcher;
    use crate::port::payrun_processor::mocks::MockPayrunProcessor;
    use crate::port::time_provider::FixedTimeProvider;
    use crate::port::JobStore;
    use std::time::Duration;

    struct Harness {
        queue: Arc<JobQueue>,
        store: Arc<InMemoryJobStore>,
        dispatcher: Arc<RecordingDispatcher>,
        worker: Worker,
    }

    fn harness(processor: MockPayrunProcessor, dispatcher: RecordingDispatcher) -> Harness {
        let queue = Arc::new(JobQueue::new());
        let store = Arc::new(InMemoryJobStore::new());
        let dispatcher = Arc::new(dispatcher);
        let time_provider = Arc::new(FixedTimeProvider(5000));

        let registry = Arc::new(EngineRegistry {
            job_store: store.clone(),
            time_provider: time_provider.clone(),
            settings: ComputationSettings::default(),
        });

        let worker = Worker::new(
            queue.clone(),
            ExecutionContextFactory::new(registry),
            Arc::new(processor),
            dispatcher.clone(),
            time_provider,
        );

        Harness {
            queue,
            store,
            dispatcher,
            worker,
        }
    }

    async fn seed_job(store: &InMemoryJobStore, job_id: &str) -> QueueItem {
        let job = PayrunJob::new(job_id, "tenant-1", "payrun-1", 1000);
        store.insert(&"tenant-1".to_string(), &job).await.unwrap();

        QueueItem::new(
            Tenant::new("tenant-1", "acme"),
            JobInvocation {
                job_id: job_id.to_string(),
                payrun_id: "payrun-1".to_string(),
                user_id: "user-1".to_string(),
                period_date: 1_700_000_000_000,
                evaluation_date: None,
                reason: None,
                forecast: None,
                attributes: None,
            },
        )
    }

    /// Drive the worker until the queue drains, then shut it down
    async fn run_until_drained(h: &Harness) {
        let (tx, token) = shutdown_channel();
        let worker_fut = h.worker.run(token);
        tokio::pin!(worker_fut);

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            tokio::select! {
                result = &mut worker_fut => {
                    result.unwrap();
                    break;
                }
                _ = tokio::time::sleep(Duration::from_millis(50)) => {
                    if h.queue.is_empty() || tokio::time::Instant::now() > deadline {
                        tx.shutdown();
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn test_processor_fault_aborts_job_and_notifies() {
        let h = harness(
            MockPayrunProcessor::new_fault("division by zero in collector X"),
            RecordingDispatcher::new(),
        );
        let item = seed_job(&h.store, "job-7").await;
        h.queue.enqueue(item);

        run_until_drained(&h).await;

        let job = h
            .store
            .get(&"tenant-1".to_string(), &"job-7".to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(job.status, JobStatus::Abort);
        assert_eq!(
            job.error_message.as_deref(),
            Some("division by zero in collector X")
        );
        assert!(job.finished_at.is_some());

        let events = h.dispatcher.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].1.action, NotificationAction::JobProcess);
        assert_eq!(events[0].2, "user-1");
    }

    #[tokio::test]
    async fn test_completed_job_dispatches_finish_without_abort_write() {
        let h = harness(
            MockPayrunProcessor::new_complete(),
            RecordingDispatcher::new(),
        );
        let item = seed_job(&h.store, "job-8").await;
        h.queue.enqueue(item);

        run_until_drained(&h).await;

        let job = h
            .store
            .get(&"tenant-1".to_string(), &"job-8".to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(job.status, JobStatus::Complete);

        // Single write from the processor finalization, none from the abort path
        assert_eq!(h.store.update_count(), 1);

        let events = h.dispatcher.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].1.action, NotificationAction::JobFinish);
    }

    #[tokio::test]
    async fn test_panicking_processor_does_not_stop_loop() {
        let h = harness(
            MockPayrunProcessor::new_panicking("collector exploded"),
            RecordingDispatcher::new(),
        );
        let first = seed_job(&h.store, "job-1").await;
        let second = seed_job(&h.store, "job-2").await;
        h.queue.enqueue(first);
        h.queue.enqueue(second);

        run_until_drained(&h).await;

        for job_id in ["job-1", "job-2"] {
            let job = h
                .store
                .get(&"tenant-1".to_string(), &job_id.to_string())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(job.status, JobStatus::Abort);
            assert_eq!(job.error_message.as_deref(), Some("collector exploded"));
        }
        assert_eq!(h.dispatcher.event_count(), 2);
    }

    #[tokio::test]
    async fn test_failing_dispatcher_never_affects_job_status() {
        let h = harness(
            MockPayrunProcessor::new_complete(),
            RecordingDispatcher::new_failing(),
        );
        let item = seed_job(&h.store, "job-3").await;
        h.queue.enqueue(item);

        run_until_drained(&h).await;

        let job = h
            .store
            .get(&"tenant-1".to_string(), &"job-3".to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(job.status, JobStatus::Complete);
        assert_eq!(h.dispatcher.event_count(), 0);
    }

    #[tokio::test]
    async fn test_abort_swallows_store_faults() {
        let h = harness(
            MockPayrunProcessor::new_fault("boom"),
            RecordingDispatcher::new(),
        );
        let item = seed_job(&h.store, "job-4").await;
        h.store.set_fail_reads(true);
        h.queue.enqueue(item);

        // Must drain without panicking or erroring despite the dead store
        run_until_drained(&h).await;
        assert_eq!(h.dispatcher.event_count(), 0);
    }
}
