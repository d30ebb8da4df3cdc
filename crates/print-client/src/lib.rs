//! Asset label print client: deliver device programs to named OS print queues.
//!
//! [`PrinterDispatch`] resolves a queue by exact name against a fresh
//! spooler catalog on every call, checks the program is ASCII, and hands it
//! to the spooler as one raw job. The default spooler is CUPS
//! ([`CupsSpooler`]); anything implementing [`PrintSpooler`] can stand in.
//!
//! Nothing here retries. A failed submission is reported to the caller,
//! which decides whether resending is safe.
mod config;
mod cups;
mod error;
mod spooler;

pub use config::DispatchConfig;
pub use cups::CupsSpooler;
pub use error::{BatchError, PrintError};
pub use spooler::{JobReceipt, PrintSpooler};

use std::collections::BTreeSet;
use std::ops::ControlFlow;

// ── Dispatch ────────────────────────────────────────────────────────────

/// Sends programs to print queues by name.
#[derive(Debug, Clone)]
pub struct PrinterDispatch<S> {
    spooler: S,
}

impl PrinterDispatch<CupsSpooler> {
    /// Dispatch through the CUPS command-line tools.
    pub fn cups(config: DispatchConfig) -> Self {
        Self::new(CupsSpooler::new(config))
    }
}

impl<S: PrintSpooler> PrinterDispatch<S> {
    /// Dispatch through `spooler`.
    pub fn new(spooler: S) -> Self {
        Self { spooler }
    }

    /// The underlying spooler.
    pub fn spooler(&self) -> &S {
        &self.spooler
    }

    /// Names of all print queues currently known to the OS.
    ///
    /// Duplicates collapse; an empty catalog is an empty set.
    pub fn list_printers(&self) -> Result<BTreeSet<String>, PrintError> {
        Ok(self.spooler.queue_names()?.into_iter().collect())
    }

    /// Send `program` as one raw job to the queue named exactly `name`.
    ///
    /// The catalog is re-read on every call. The lookup happens before the
    /// payload is inspected, so an unknown printer is reported even when the
    /// program is also invalid.
    pub fn send(&self, name: &str, program: &str) -> Result<JobReceipt, PrintError> {
        let queues = self.spooler.queue_names()?;
        if !queues.iter().any(|q| q == name) {
            log::warn!("printer not found: {name}");
            return Err(PrintError::PrinterNotFound {
                name: name.to_string(),
            });
        }

        let payload = ascii_payload(program)?;
        let receipt = self.spooler.submit(name, payload)?;
        match &receipt.job_id {
            Some(id) => log::info!("sent {} byte(s) to {name} as job {id}", receipt.bytes),
            None => log::info!("sent {} byte(s) to {name}", receipt.bytes),
        }
        Ok(receipt)
    }

    /// Send `copies` identical jobs to `name`, one submission per copy.
    ///
    /// `on_progress` runs after each accepted copy and may return
    /// `ControlFlow::Break(())` to stop early. The first failure ends the
    /// batch; [`BatchError::sent`] says how many copies were already queued.
    pub fn send_copies<F>(
        &self,
        name: &str,
        program: &str,
        copies: usize,
        mut on_progress: F,
    ) -> Result<BatchResult, BatchError>
    where
        F: FnMut(BatchProgress<'_>) -> ControlFlow<(), ()>,
    {
        let mut receipts = Vec::with_capacity(copies);
        for i in 0..copies {
            let receipt = self.send(name, program).map_err(|error| BatchError {
                sent: i,
                total: copies,
                error,
            })?;
            receipts.push(receipt);

            let progress = BatchProgress {
                sent: i + 1,
                total: copies,
                receipt: receipts.last(),
            };
            if let ControlFlow::Break(()) = on_progress(progress) {
                break;
            }
        }

        Ok(BatchResult {
            total: copies,
            receipts,
        })
    }
}

/// Borrow the program as bytes, rejecting anything outside ASCII.
fn ascii_payload(program: &str) -> Result<&[u8], PrintError> {
    let bytes = program.as_bytes();
    match bytes.iter().position(|b| !b.is_ascii()) {
        Some(offset) => Err(PrintError::NonAsciiPayload {
            offset,
            byte: bytes[offset],
        }),
        None => Ok(bytes),
    }
}

// ── Batch types ─────────────────────────────────────────────────────────

/// Progress report for a multi-copy dispatch.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress<'a> {
    /// Copies accepted so far.
    pub sent: usize,
    /// Copies requested.
    pub total: usize,
    /// Receipt for the copy just accepted.
    pub receipt: Option<&'a JobReceipt>,
}

/// Result of a multi-copy dispatch.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BatchResult {
    /// Copies requested.
    pub total: usize,
    /// One receipt per accepted copy.
    pub receipts: Vec<JobReceipt>,
}

impl BatchResult {
    /// Copies accepted by the spooler.
    pub fn sent(&self) -> usize {
        self.receipts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockSpooler {
        queues: Mutex<Vec<String>>,
        jobs: Mutex<Vec<(String, Vec<u8>)>>,
        catalog_reads: Mutex<usize>,
        fail_submit: bool,
    }

    impl MockSpooler {
        fn with_queues(names: &[&str]) -> Self {
            Self {
                queues: Mutex::new(names.iter().map(|s| s.to_string()).collect()),
                ..Default::default()
            }
        }
    }

    impl PrintSpooler for MockSpooler {
        fn queue_names(&self) -> Result<Vec<String>, PrintError> {
            *self.catalog_reads.lock().unwrap() += 1;
            Ok(self.queues.lock().unwrap().clone())
        }

        fn submit(&self, queue: &str, payload: &[u8]) -> Result<JobReceipt, PrintError> {
            if self.fail_submit {
                return Err(PrintError::SubmissionFailure {
                    printer: queue.into(),
                    source: io::Error::other("queue stopped"),
                });
            }
            let mut jobs = self.jobs.lock().unwrap();
            jobs.push((queue.to_string(), payload.to_vec()));
            Ok(JobReceipt::new(
                queue,
                Some(format!("{queue}-{}", jobs.len())),
                payload.len(),
            ))
        }
    }

    #[test]
    fn list_collapses_duplicates() {
        let dispatch = PrinterDispatch::new(MockSpooler::with_queues(&["B", "A", "B"]));
        let names: Vec<_> = dispatch.list_printers().unwrap().into_iter().collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn send_requires_exact_name() {
        let dispatch = PrinterDispatch::new(MockSpooler::with_queues(&["Zebra_GX420d"]));
        for name in ["zebra_gx420d", "Zebra", "Zebra_GX420d ", ""] {
            let err = dispatch.send(name, "^XA^XZ").unwrap_err();
            assert!(err.is_printer_not_found(), "{name:?}");
        }
        assert!(dispatch.spooler().jobs.lock().unwrap().is_empty());
    }

    #[test]
    fn send_submits_program_unmodified() {
        let dispatch = PrinterDispatch::new(MockSpooler::with_queues(&["Q"]));
        let receipt = dispatch.send("Q", "^XA^FDx^FS^XZ").unwrap();
        assert_eq!(receipt.bytes, 14);
        assert_eq!(receipt.job_id.as_deref(), Some("Q-1"));
        let jobs = dispatch.spooler().jobs.lock().unwrap();
        assert_eq!(jobs.as_slice(), [("Q".to_string(), b"^XA^FDx^FS^XZ".to_vec())]);
    }

    #[test]
    fn catalog_is_reread_each_send() {
        let dispatch = PrinterDispatch::new(MockSpooler::with_queues(&["Q"]));
        dispatch.send("Q", "^XA^XZ").unwrap();
        dispatch.spooler().queues.lock().unwrap().clear();
        assert!(dispatch.send("Q", "^XA^XZ").unwrap_err().is_printer_not_found());
        assert_eq!(*dispatch.spooler().catalog_reads.lock().unwrap(), 2);
    }

    #[test]
    fn unknown_printer_reported_before_non_ascii() {
        let dispatch = PrinterDispatch::new(MockSpooler::with_queues(&["Q"]));
        assert!(dispatch.send("missing", "^FDé").unwrap_err().is_printer_not_found());
        match dispatch.send("Q", "^FDé") {
            Err(PrintError::NonAsciiPayload { offset, byte }) => {
                assert_eq!(offset, 3);
                assert_eq!(byte, 0xC3);
            }
            other => panic!("expected NonAsciiPayload, got {other:?}"),
        }
        assert!(dispatch.spooler().jobs.lock().unwrap().is_empty());
    }

    #[test]
    fn copies_are_separate_jobs() {
        let dispatch = PrinterDispatch::new(MockSpooler::with_queues(&["Q"]));
        let mut seen = Vec::new();
        let result = dispatch
            .send_copies("Q", "^XA^XZ", 3, |p| {
                seen.push((p.sent, p.total));
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(result.sent(), 3);
        assert_eq!(seen, [(1, 3), (2, 3), (3, 3)]);
        assert_eq!(dispatch.spooler().jobs.lock().unwrap().len(), 3);
    }

    #[test]
    fn copies_stop_on_break() {
        let dispatch = PrinterDispatch::new(MockSpooler::with_queues(&["Q"]));
        let result = dispatch
            .send_copies("Q", "^XA^XZ", 5, |p| {
                if p.sent == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();
        assert_eq!(result.sent(), 2);
        assert_eq!(result.total, 5);
    }

    #[test]
    fn copies_report_failure_without_retry() {
        let spooler = MockSpooler {
            fail_submit: true,
            ..MockSpooler::with_queues(&["Q"])
        };
        let dispatch = PrinterDispatch::new(spooler);
        let err = dispatch
            .send_copies("Q", "^XA^XZ", 4, |_| ControlFlow::Continue(()))
            .unwrap_err();
        assert_eq!(err.sent, 0);
        assert_eq!(err.total, 4);
        assert!(matches!(err.error, PrintError::SubmissionFailure { .. }));
        assert_eq!(*dispatch.spooler().catalog_reads.lock().unwrap(), 1);
    }

    #[test]
    fn zero_copies_sends_nothing() {
        let dispatch = PrinterDispatch::new(MockSpooler::with_queues(&["Q"]));
        let result = dispatch
            .send_copies("Q", "^XA^XZ", 0, |_| ControlFlow::Continue(()))
            .unwrap();
        assert_eq!(result.sent(), 0);
        assert_eq!(*dispatch.spooler().catalog_reads.lock().unwrap(), 0);
    }
}
