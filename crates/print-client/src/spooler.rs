//! The OS print-spooler seam.

use crate::PrintError;

/// An OS print spooler: a catalog of named queues that accept raw jobs.
///
/// Implementations must not cache the catalog; [`crate::PrinterDispatch`]
/// relies on every call to `queue_names` reflecting the current state.
pub trait PrintSpooler: Send + Sync {
    /// Names of all queues currently known to the spooler.
    fn queue_names(&self) -> Result<Vec<String>, PrintError>;

    /// Submit `payload` unmodified as one job to `queue`.
    fn submit(&self, queue: &str, payload: &[u8]) -> Result<JobReceipt, PrintError>;
}

/// Acknowledgement that the spooler accepted a job.
///
/// Acceptance only means the job is queued; it says nothing about whether
/// the label was printed.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct JobReceipt {
    /// Queue the job was submitted to.
    pub printer: String,
    /// Spooler job identifier, when the spooler reports one.
    pub job_id: Option<String>,
    /// Payload size in bytes.
    pub bytes: usize,
}

impl JobReceipt {
    /// Receipt for `bytes` accepted by `printer`.
    pub fn new(printer: impl Into<String>, job_id: Option<String>, bytes: usize) -> Self {
        Self {
            printer: printer.into(),
            job_id,
            bytes,
        }
    }
}
