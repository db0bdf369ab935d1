//! Run the launch command as a child process and forward termination signals to it.
use std::{
    io,
    os::unix::process::ExitStatusExt,
    process::ExitStatus,
};

use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::{info, warn};

use super::LaunchCommand;
use crate::lib::{errors::LauncherError, telemetry::LaunchSpan};

/// How the notebook process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub exit_code: i32,
    /// Last signal forwarded to the child, if any.
    pub forwarded_signal: Option<i32>,
}

/// Termination signals the launcher relays to the child.
struct ForwardedSignals {
    terminate: Signal,
    interrupt: Signal,
    hangup: Signal,
    quit: Signal,
}

impl ForwardedSignals {
    fn install() -> io::Result<Self> {
        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            interrupt: signal(SignalKind::interrupt())?,
            hangup: signal(SignalKind::hangup())?,
            quit: signal(SignalKind::quit())?,
        })
    }

    async fn next(&mut self) -> libc::c_int {
        tokio::select! {
            _ = self.terminate.recv() => libc::SIGTERM,
            _ = self.interrupt.recv() => libc::SIGINT,
            _ = self.hangup.recv() => libc::SIGHUP,
            _ = self.quit.recv() => libc::SIGQUIT,
        }
    }
}

/// Spawn `command`, wait for it to exit and return its exit code.
///
/// Signal handlers are installed before the spawn so a shutdown request can never
/// slip between the two. The child runs in its own process group, so signals sent to
/// the launcher's group (a terminal Ctrl-C) reach it only once, through the launcher.
/// Every received signal is forwarded to the child and the launcher keeps waiting;
/// the child decides when to exit. If this future is dropped before the child exits,
/// `kill_on_drop` takes the child down with it.
pub async fn launch(command: &LaunchCommand) -> Result<LaunchOutcome, LauncherError> {
    let launch_error = |source: io::Error| LauncherError::Launch {
        program: command.program.clone(),
        source,
    };

    let mut signals = ForwardedSignals::install().map_err(launch_error)?;
    let mut child = command.to_command().spawn().map_err(launch_error)?;
    let pid = child.id();
    let span = LaunchSpan::start(&command.program, pid);
    info!(
        target: "notebook_launcher::process",
        parent: span.span(),
        pid,
        "Notebook process started"
    );

    let mut forwarded_signal = None;
    let status = loop {
        tokio::select! {
            status = child.wait() => break status,
            signal = signals.next() => {
                forward_signal(pid, signal);
                forwarded_signal = Some(signal);
            }
        }
    }
    .map_err(launch_error)?;

    let exit_code = exit_code(status);
    span.finish(exit_code, forwarded_signal);
    Ok(LaunchOutcome {
        exit_code,
        forwarded_signal,
    })
}

fn forward_signal(pid: Option<u32>, signal: libc::c_int) {
    let Some(pid) = pid else {
        return;
    };
    info!(
        target: "notebook_launcher::process",
        pid,
        signal,
        "Forwarding signal to notebook process"
    );
    // SAFETY: kill(2) has no memory-safety preconditions.
    let result = unsafe { libc::kill(pid as libc::pid_t, signal) };
    if result != 0 {
        warn!(
            target: "notebook_launcher::process",
            pid,
            signal,
            reason = %io::Error::last_os_error(),
            "Failed to forward signal"
        );
    }
}

/// Exit code of the child; a child killed by signal N maps to `128 + N`.
fn exit_code(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}
