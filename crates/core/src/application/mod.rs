// Application Layer - Use Cases and the Execution Pipeline

pub mod context;
pub mod queue;
pub mod start_payrun;
pub mod worker;

// Re-exports
pub use context::{ComputationSettings, EngineRegistry, ExecutionContext, ExecutionContextFactory};
pub use queue::{Dequeued, JobQueue};
pub use start_payrun::StartPayrunRequest;
pub use worker::{shutdown_channel, ShutdownSender, ShutdownToken, Worker};
