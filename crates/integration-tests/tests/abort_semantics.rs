// Abort Semantics Tests
// Idempotence and terminal monotonicity of the compensating abort path

use payrun_core::application::{
    shutdown_channel, ComputationSettings, EngineRegistry, ExecutionContextFactory, JobQueue,
    Worker,
};
use payrun_core::domain::{
    JobInvocation, JobStatus, NotificationAction, PayrunJob, QueueItem, Tenant,
};
use payrun_core::port::job_store::mocks::InMemoryJobStore;
use payrun_core::port::notification::mocks::RecordingDispatcher;
use payrun_core::port::payrun_processor::mocks::MockPayrunProcessor;
use payrun_core::port::time_provider::FixedTimeProvider;
use payrun_core::port::{JobStore, NotificationDispatcher, PayrunProcessor, TimeProvider};
use std::sync::Arc;
use std::time::Duration;

struct Rig {
    queue: Arc<JobQueue>,
    store: Arc<InMemoryJobStore>,
    dispatcher: Arc<RecordingDispatcher>,
    worker: Worker,
}

fn rig(processor: Arc<dyn PayrunProcessor>) -> Rig {
    let queue = Arc::new(JobQueue::new());
    let store = Arc::new(InMemoryJobStore::new());
    let dispatcher = Arc::new(RecordingDispatcher::new());
    let time_provider: Arc<dyn TimeProvider> = Arc::new(FixedTimeProvider(7000));

    let registry = Arc::new(EngineRegistry {
        job_store: store.clone() as Arc<dyn JobStore>,
        time_provider: time_provider.clone(),
        settings: ComputationSettings::default(),
    });

    let worker = Worker::new(
        queue.clone(),
        ExecutionContextFactory::new(registry),
        processor,
        dispatcher.clone() as Arc<dyn NotificationDispatcher>,
        time_provider,
    );

    Rig {
        queue,
        store,
        dispatcher,
        worker,
    }
}

fn item_for(job_id: &str) -> QueueItem {
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
async fn run_until_drained(queue: &JobQueue, worker: Worker) {
    let (tx, token) = shutdown_channel();
    let handle = tokio::spawn(async move { worker.run(token).await });

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !queue.is_empty() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "queue did not drain"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.shutdown();

    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_abort_is_idempotent_for_already_aborted_job() {
    let r = rig(Arc::new(MockPayrunProcessor::new_fault("boom")));
    let tenant_id = "tenant-1".to_string();

    let job = PayrunJob::new("job-1", "tenant-1", "payrun-1", 1000);
    r.store.insert(&tenant_id, &job).await.unwrap();

    // The same job is (abnormally) enqueued twice; the second pass finds it
    // already Abort and must not write again.
    r.queue.enqueue(item_for("job-1"));
    r.queue.enqueue(item_for("job-1"));

    let worker = r.worker;
    run_until_drained(r.queue.as_ref(), worker).await;

    let stored = r
        .store
        .get(&tenant_id, &"job-1".to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, JobStatus::Abort);
    assert_eq!(stored.error_message.as_deref(), Some("boom"));

    // Exactly one abort write for two abort-path invocations
    assert_eq!(r.store.update_count(), 1);
}

#[tokio::test]
async fn test_abort_never_overwrites_completed_job() {
    // Processor hangs; the job record is finalized Complete behind its back,
    // then shutdown triggers the abort path.
    let r = rig(Arc::new(MockPayrunProcessor::new_pending()));
    let tenant_id = "tenant-1".to_string();

    let mut job = PayrunJob::new("job-1", "tenant-1", "payrun-1", 1000);
    r.store.insert(&tenant_id, &job).await.unwrap();
    r.queue.enqueue(item_for("job-1"));

    let (tx, token) = shutdown_channel();
    let worker = r.worker;
    let handle = tokio::spawn(async move { worker.run(token).await });

    // Wait for the item to be held
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !r.queue.is_empty() {
        assert!(tokio::time::Instant::now() < deadline, "item never held");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // Concurrent finalization at t0
    job.complete(2000, Some("finalized".to_string())).unwrap();
    r.store.update(&tenant_id, &job).await.unwrap();

    // Abort path at t1 > t0
    tx.shutdown();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    let stored = r
        .store
        .get(&tenant_id, &"job-1".to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, JobStatus::Complete);
    assert_eq!(stored.message.as_deref(), Some("finalized"));

    // Only the finalization write happened
    assert_eq!(r.store.update_count(), 1);

    // The terminal job is still announced, as a finish event
    let events = r.dispatcher.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].1.action, NotificationAction::JobFinish);
}

#[tokio::test]
async fn test_missing_job_abort_is_silent() {
    // No job record exists for the queue item; the abort path must no-op
    // without notification and the worker must keep running.
    let r = rig(Arc::new(MockPayrunProcessor::new_fault("boom")));

    r.queue.enqueue(item_for("ghost"));

    let worker = r.worker;
    run_until_drained(r.queue.as_ref(), worker).await;

    assert_eq!(r.store.update_count(), 0);
    assert_eq!(r.dispatcher.event_count(), 0);
}
