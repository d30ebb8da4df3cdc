//! Typed error types for print dispatch.

use std::io;

/// Print dispatch failures.
///
/// None of these are retried by this crate: a submitted job may already be
/// on paper, so any retry policy belongs to the caller.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    /// No print queue has exactly this name.
    #[error("printer not found: {name}")]
    PrinterNotFound {
        /// The requested queue name.
        name: String,
    },

    /// The OS print-queue catalog could not be read.
    #[error("print queue catalog unavailable")]
    CatalogUnavailable {
        /// The underlying spawn or spooler error.
        #[source]
        source: io::Error,
    },

    /// The spooler rejected or failed to accept the job.
    #[error("submission to {printer} failed")]
    SubmissionFailure {
        /// The target queue.
        printer: String,
        /// The underlying transport or spooler error.
        #[source]
        source: io::Error,
    },

    /// The program contains a byte outside the ASCII range.
    #[error("payload is not ASCII: byte 0x{byte:02X} at offset {offset}")]
    NonAsciiPayload {
        /// Byte offset in the program.
        offset: usize,
        /// The offending byte.
        byte: u8,
    },

    /// An invalid configuration was provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PrintError {
    /// Returns `true` for [`PrintError::PrinterNotFound`].
    pub fn is_printer_not_found(&self) -> bool {
        matches!(self, PrintError::PrinterNotFound { .. })
    }
}

/// A multi-copy dispatch stopped early because one submission failed.
#[derive(Debug, thiserror::Error)]
#[error("stopped after {sent} of {total} copies")]
pub struct BatchError {
    /// Copies accepted by the spooler before the failure.
    pub sent: usize,
    /// Copies requested.
    pub total: usize,
    /// The failure that stopped the batch.
    #[source]
    pub error: PrintError,
}
