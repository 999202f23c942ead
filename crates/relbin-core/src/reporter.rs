//! Reporter trait for dependency injection
//!
//! This trait allows the provisioner to report progress and problems
//! without being coupled to the host's output channel. The package manager
//! invoking us owns the terminal; we only hand it lines of text.

/// Sink for human-readable provisioning messages.
pub trait Reporter: Send + Sync {
    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a success message.
    fn success(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn success(&self, msg: &str) {
        (**self).success(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn info(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warning(&self, _: &str) {}
}

/// Routes messages to `tracing`, leaving formatting to the installed subscriber.
#[derive(Debug, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }
    fn success(&self, msg: &str) {
        tracing::info!(status = "ok", "{msg}");
    }
    fn warning(&self, msg: &str) {
        tracing::warn!("{msg}");
    }
}
