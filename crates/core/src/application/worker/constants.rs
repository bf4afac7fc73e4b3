// Worker constants (no magic values)

/// Abort reason recorded when the shutdown signal interrupts a held job
pub const SHUTDOWN_ABORT_REASON: &str = "service shutdown";

/// Fallback abort reason when a panicking processor yields no message
pub const PANIC_ABORT_REASON: &str = "payrun processor panicked";

/// Default number of worker loops spawned by the daemon
pub const DEFAULT_WORKER_COUNT: usize = 1;
