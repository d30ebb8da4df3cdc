//! Configuration types for print dispatch.

/// Spooler command settings.
///
/// Defaults call `lpstat` and `lp` from `PATH` against the local CUPS
/// scheduler.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct DispatchConfig {
    /// Program used to list print queues.
    pub lpstat_program: String,
    /// Program used to submit jobs.
    pub lp_program: String,
    /// CUPS server (`host[:port]`); `None` uses the scheduler default.
    pub server: Option<String>,
    /// Job title shown in the queue.
    pub job_title: Option<String>,
    /// Log submitted payloads at `trace` level.
    pub trace_io: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            lpstat_program: "lpstat".into(),
            lp_program: "lp".into(),
            server: None,
            job_title: None,
            trace_io: false,
        }
    }
}

impl DispatchConfig {
    /// Override the queue-listing program.
    pub fn with_lpstat(mut self, program: impl Into<String>) -> Self {
        self.lpstat_program = program.into();
        self
    }

    /// Override the submission program.
    pub fn with_lp(mut self, program: impl Into<String>) -> Self {
        self.lp_program = program.into();
        self
    }

    /// Target a specific CUPS server.
    pub fn with_server(mut self, server: Option<String>) -> Self {
        self.server = server;
        self
    }

    /// Set the job title.
    pub fn with_job_title(mut self, title: Option<String>) -> Self {
        self.job_title = title;
        self
    }

    /// Enable payload tracing.
    pub fn with_trace_io(mut self, trace_io: bool) -> Self {
        self.trace_io = trace_io;
        self
    }
}
