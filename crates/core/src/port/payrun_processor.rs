// Payrun Processor Port
// Abstraction over the payroll computation; opaque to the pipeline

use crate::application::context::ExecutionContext;
use crate::domain::{JobInvocation, PayrunId, PayrunJob, Tenant};
use async_trait::async_trait;
use thiserror::Error;

/// Execution faults raised by the processor
#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("{0}")]
    Computation(String),

    #[error("Store fault: {0}")]
    Store(String),

    #[error("Computation timeout after {0}ms")]
    Timeout(i64),
}

/// Payrun Processor trait
///
/// Performs the payroll computation for one job and returns the job record
/// carrying its final status. The processor owns the `Process` transition
/// and the success-path finalization; the worker only compensates on fault.
#[async_trait]
pub trait PayrunProcessor: Send + Sync {
    async fn process(
        &self,
        ctx: &ExecutionContext,
        tenant: &Tenant,
        payrun_id: &PayrunId,
        invocation: &JobInvocation,
    ) -> Result<PayrunJob, ProcessorError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock processor behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Finalize the job as Complete through the context's store
        Complete,
        /// Raise an execution fault with message
        Fault(String),
        /// Panic with message (for panic containment testing)
        Panic(String),
        /// Never return (for shutdown-while-in-flight testing)
        Pending,
    }

    /// Mock Payrun Processor for testing
    pub struct MockPayrunProcessor {
        behavior: Arc<Mutex<MockBehavior>>,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockPayrunProcessor {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn new_complete() -> Self {
            Self::new(MockBehavior::Complete)
        }

        pub fn new_fault(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fault(message.into()))
        }

        pub fn new_panicking(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Panic(message.into()))
        }

        pub fn new_pending() -> Self {
            Self::new(MockBehavior::Pending)
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl PayrunProcessor for MockPayrunProcessor {
        async fn process(
            &self,
            ctx: &ExecutionContext,
            tenant: &Tenant,
            _payrun_id: &PayrunId,
            invocation: &JobInvocation,
        ) -> Result<PayrunJob, ProcessorError> {
            *self.call_count.lock().unwrap() += 1;

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockBehavior::Complete => {
                    let tenant_id = tenant.id.clone();
                    let mut job = ctx
                        .job_store
                        .get(&tenant_id, &invocation.job_id)
                        .await
                        .map_err(|e| ProcessorError::Store(e.to_string()))?
                        .ok_or_else(|| {
                            ProcessorError::Store(format!("Job {} not found", invocation.job_id))
                        })?;
                    let now = ctx.time_provider.now_millis();
                    job.complete(now, Some("mock payrun result".to_string()))
                        .map_err(|e| ProcessorError::Computation(e.to_string()))?;
                    ctx.job_store
                        .update(&tenant_id, &job)
                        .await
                        .map_err(|e| ProcessorError::Store(e.to_string()))?;
                    Ok(job)
                }
                MockBehavior::Fault(msg) => Err(ProcessorError::Computation(msg)),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for containment testing
                }
                MockBehavior::Pending => std::future::pending().await,
            }
        }
    }
}
