// Job Queue - concurrency-safe hand-off between producers and workers

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::Notify;

use crate::application::worker::ShutdownToken;
use crate::domain::QueueItem;

/// Outcome of a blocking dequeue
#[derive(Debug)]
pub enum Dequeued {
    Item(QueueItem),
    /// The shutdown signal fired before an item arrived
    Shutdown,
}

/// Unbounded MPMC FIFO queue of payrun jobs
///
/// `enqueue` never blocks and never drops. `dequeue` blocks until an item is
/// available or the shutdown signal fires. An item is popped under the lock,
/// so it is delivered to exactly one concurrent dequeuer.
#[derive(Default)]
pub struct JobQueue {
    items: Mutex<VecDeque<QueueItem>>,
    notify: Notify,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, item: QueueItem) {
        self.items.lock().unwrap().push_back(item);
        self.notify.notify_one();
    }

    /// Block until an item is available or `shutdown` fires
    pub async fn dequeue(&self, shutdown: &mut ShutdownToken) -> Dequeued {
        loop {
            // Register the waiter before checking the queue, so an enqueue
            // racing with the empty-check cannot be missed.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            // The signal wins over available items: after shutdown no new
            // item is ever handed out, queued entries stay undelivered.
            if shutdown.is_shutdown() {
                return Dequeued::Shutdown;
            }
            if let Some(item) = self.items.lock().unwrap().pop_front() {
                return Dequeued::Item(item);
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = shutdown.wait() => return Dequeued::Shutdown,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().unwrap().is_empty()
    }
}
