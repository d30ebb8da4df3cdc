//! CUPS spooler: lists queues with `lpstat` and submits raw jobs with `lp`.
//!
//! Jobs are sent with `-o raw` so the scheduler passes the bytes straight to
//! the device without filtering. Both commands block until the scheduler
//! answers; neither waits for the label to be printed.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use crate::{DispatchConfig, JobReceipt, PrintError, PrintSpooler};

/// Spooler backed by the CUPS command-line tools.
#[derive(Debug, Clone, Default)]
pub struct CupsSpooler {
    config: DispatchConfig,
}

impl CupsSpooler {
    /// Create a spooler with the given command settings.
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    fn command(&self, program: &str) -> Result<Command, PrintError> {
        if program.trim().is_empty() {
            return Err(PrintError::InvalidConfig("spooler program name is empty".into()));
        }
        let mut cmd = Command::new(program);
        // Catalog messages and request ids are only recognized in English.
        cmd.env("LC_ALL", "C");
        if let Some(server) = &self.config.server {
            cmd.args(["-h", server]);
        }
        Ok(cmd)
    }

    /// Argument list passed to `lp` (after any `-h server`).
    fn lp_args<'a>(&'a self, queue: &'a str) -> Vec<&'a str> {
        let mut args = vec!["-d", queue, "-o", "raw"];
        if let Some(title) = &self.config.job_title {
            args.extend(["-t", title.as_str()]);
        }
        // Read the job from stdin.
        args.push("-");
        args
    }
}

impl PrintSpooler for CupsSpooler {
    fn queue_names(&self) -> Result<Vec<String>, PrintError> {
        let program = &self.config.lpstat_program;
        log::debug!("listing print queues via {program} -e");
        let output = self
            .command(program)?
            .arg("-e")
            .stdin(Stdio::null())
            .output()
            .map_err(|source| PrintError::CatalogUnavailable { source })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if output.status.success() {
            return Ok(parse_queue_list(&stdout));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_empty_catalog_message(&stderr) {
            return Ok(Vec::new());
        }
        Err(PrintError::CatalogUnavailable {
            source: io::Error::other(command_failure(program, output.status, &stderr)),
        })
    }

    fn submit(&self, queue: &str, payload: &[u8]) -> Result<JobReceipt, PrintError> {
        let program = &self.config.lp_program;
        let args = self.lp_args(queue);
        log::debug!("submitting {} byte(s) via {program} {}", payload.len(), args.join(" "));
        if self.config.trace_io {
            log::trace!("payload: {}", String::from_utf8_lossy(payload));
        }

        let fail = |source| PrintError::SubmissionFailure {
            printer: queue.to_string(),
            source,
        };

        let mut child = self
            .command(program)?
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(fail)?;

        // Dropping stdin closes the pipe so lp sees EOF.
        let write_result = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(payload).and_then(|()| stdin.flush()),
            None => Err(io::Error::other("lp stdin was not captured")),
        };
        let output = child.wait_with_output().map_err(fail)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(io::Error::other(command_failure(
                program,
                output.status,
                &stderr,
            ))));
        }
        write_result.map_err(fail)?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(JobReceipt {
            printer: queue.to_string(),
            job_id: parse_request_id(&stdout),
            bytes: payload.len(),
        })
    }
}

/// One queue name per non-empty line (`lpstat -e`).
fn parse_queue_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// `lpstat` exits non-zero when no destinations exist at all.
fn is_empty_catalog_message(stderr: &str) -> bool {
    stderr.contains("No destinations added")
}

/// Job id from `request id is Zebra_GX420d-42 (1 file(s))`.
fn parse_request_id(stdout: &str) -> Option<String> {
    let rest = stdout.split("request id is ").nth(1)?;
    rest.split_whitespace().next().map(str::to_string)
}

fn command_failure(program: &str, status: std::process::ExitStatus, stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("{program} exited with {status}")
    } else {
        format!("{program} exited with {status}: {stderr}")
    }
}
