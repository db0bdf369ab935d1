//! Telemetry initialization, launch span helpers and the failure monitoring sink.

use std::time::Instant;

use anyhow::Result;
use serde::Serialize;
use tracing::{error, info, info_span, Span};
use tracing_subscriber::{fmt, EnvFilter};

use crate::lib::errors::LauncherError;

/// Initialize `tracing`. `RUST_LOG` wins; otherwise `--verbose` selects debug over info.
pub fn init_tracing(verbose: bool) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_file(verbose)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}

fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Span helper recording the lifetime of the launched notebook process.
pub struct LaunchSpan {
    span: Span,
    started_at: Instant,
}

impl LaunchSpan {
    pub fn start(program: &str, pid: Option<u32>) -> Self {
        let span = info_span!(
            target: "notebook_launcher::process",
            "notebook_process",
            program,
            pid
        );
        Self {
            span,
            started_at: Instant::now(),
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Close the span while recording how the process ended.
    pub fn finish(self, exit_code: i32, forwarded_signal: Option<i32>) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        let _entered = self.span.enter();
        info!(
            target: "notebook_launcher::process",
            exit_code,
            forwarded_signal,
            elapsed_ms,
            "Notebook process exited"
        );
    }
}

/// Payload describing the launch about to happen. Never carries the token value.
#[derive(Debug, Serialize)]
pub struct LaunchTelemetry<'a> {
    pub root: &'a str,
    pub freshly_cloned: bool,
    pub notebook_path: &'a str,
    pub mode: &'a str,
    pub strategy: &'a str,
    pub host: &'a str,
    pub port: u16,
    pub auth: &'a str,
    pub command: &'a str,
}

/// Emit the resolved launch to `tracing`.
pub fn emit_launch(telemetry: &LaunchTelemetry<'_>) {
    info!(
        target: "notebook_launcher::command",
        root = telemetry.root,
        freshly_cloned = telemetry.freshly_cloned,
        notebook_path = telemetry.notebook_path,
        mode = telemetry.mode,
        strategy = telemetry.strategy,
        host = telemetry.host,
        port = telemetry.port,
        auth = telemetry.auth,
        command = telemetry.command,
        "Launching notebook"
    );
}

/// Receives terminal failures. Implementations must not influence control flow.
pub trait FailureSink {
    fn capture(&self, error: &LauncherError);
}

/// Sink that forwards failures to the `notebook_launcher::monitoring` log target,
/// where a log shipper or error monitoring agent can pick them up.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFailureSink;

impl FailureSink for TracingFailureSink {
    fn capture(&self, error: &LauncherError) {
        let report = error.report();
        error!(
            target: "notebook_launcher::monitoring",
            code = report.code,
            details = %report.details,
            reason = %error,
            "Launch failed"
        );
    }
}
