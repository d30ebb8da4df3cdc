//! Output rendering for the `assetlabel` CLI.
//!
//! Device programs always go to stdout verbatim so they can be piped. Every
//! other result is either human-oriented text or a single JSON document,
//! chosen by [`Format`].

use std::io::{self, IsTerminal};

use asset_label_core::{CompileError, TemplateError};
use asset_label_print_client::{BatchError, BatchResult, PrintError};
use serde::Serialize;

// ── Output format ───────────────────────────────────────────────────────

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Plain text for terminals.
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, else pretty for a TTY and JSON for pipes.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a list of names: one per line, or a JSON object `{ key: [...] }`.
pub(crate) fn print_names<'a>(
    format: Format,
    key: &str,
    names: impl IntoIterator<Item = &'a String>,
) -> anyhow::Result<()> {
    let names: Vec<&String> = names.into_iter().collect();
    match format {
        Format::Json => print_json(&serde_json::json!({ key: names })),
        Format::Pretty => {
            for name in names {
                println!("{name}");
            }
            Ok(())
        }
    }
}

// ── Dispatch results ────────────────────────────────────────────────────

/// Report accepted jobs. Pretty output goes to stderr so stdout stays empty.
pub(crate) fn print_dispatch(format: Format, printer: &str, result: &BatchResult) -> anyhow::Result<()> {
    match format {
        Format::Json => print_json(&serde_json::json!({
            "success": true,
            "printer": printer,
            "copies": result.total,
            "receipts": result.receipts,
        })),
        Format::Pretty => {
            for receipt in &result.receipts {
                match &receipt.job_id {
                    Some(id) => eprintln!("sent {} bytes to {printer} (job {id})", receipt.bytes),
                    None => eprintln!("sent {} bytes to {printer}", receipt.bytes),
                }
            }
            if result.sent() < result.total {
                eprintln!("stopped after {} of {} copies", result.sent(), result.total);
            }
            Ok(())
        }
    }
}

// ── Errors ──────────────────────────────────────────────────────────────

/// Stable error code for the JSON error envelope.
pub(crate) fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<BatchError>() {
            return print_error_code(&e.error);
        }
        if let Some(e) = cause.downcast_ref::<PrintError>() {
            return print_error_code(e);
        }
        if cause.is::<CompileError>() {
            return "compile_failed";
        }
        if let Some(TemplateError::NotFound(_)) = cause.downcast_ref::<TemplateError>() {
            return "template_not_found";
        }
    }
    "command_failed"
}

fn print_error_code(err: &PrintError) -> &'static str {
    match err {
        PrintError::PrinterNotFound { .. } => "printer_not_found",
        PrintError::NonAsciiPayload { .. } => "non_ascii_payload",
        PrintError::CatalogUnavailable { .. } => "catalog_unavailable",
        PrintError::InvalidConfig(_) => "invalid_config",
        _ => "submission_failed",
    }
}

/// Report a failed command: a JSON envelope on stdout, or `error: ...` on
/// stderr with the full cause chain.
pub(crate) fn render_error(format: Format, err: &anyhow::Error) {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "success": false,
                "error": error_code(err),
                "message": format!("{err:#}"),
            });
            match serde_json::to_string_pretty(&out) {
                Ok(s) => println!("{s}"),
                Err(_) => eprintln!("error: {err:#}"),
            }
        }
        Format::Pretty => eprintln!("error: {err:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn explicit_format_wins() {
        assert_eq!(Format::resolve_or_detect(Some("json")), Format::Json);
        assert_eq!(Format::resolve_or_detect(Some("pretty")), Format::Pretty);
    }

    #[test]
    fn error_codes_follow_the_cause_chain() {
        let err = anyhow::Error::new(PrintError::PrinterNotFound { name: "Q".into() })
            .context("sending label");
        assert_eq!(error_code(&err), "printer_not_found");

        let err: anyhow::Result<()> = Err(CompileError::MissingField {
            name: "sku".into(),
        })
        .context("compiling");
        assert_eq!(error_code(&err.unwrap_err()), "compile_failed");

        assert_eq!(error_code(&anyhow::anyhow!("boom")), "command_failed");
    }

    #[test]
    fn batch_errors_report_the_inner_code() {
        let err = anyhow::Error::new(BatchError {
            sent: 1,
            total: 3,
            error: PrintError::NonAsciiPayload { offset: 0, byte: 0xFF },
        });
        assert_eq!(error_code(&err), "non_ascii_payload");
    }
}
