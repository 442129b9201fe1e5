//! Core logging types: step entries, status, and the [`Log`] trait.

/// Pipeline step result for summary reporting.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Human-readable step name.
    pub name: String,
    /// Final status of the step.
    pub status: TaskStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a completed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Step completed successfully.
    Ok,
    /// Step did not apply to this run (e.g., no VCS requested).
    NotApplicable,
    /// Step was skipped (e.g., tool not found).
    Skipped,
    /// Step encountered an error and aborted the run.
    Failed,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) is the production implementation; tests
/// may substitute their own to capture messages.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record a step result for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}
