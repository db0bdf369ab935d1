use std::{env, process::ExitCode};

use anyhow::Error;

use crate::{
    cli::{
        resolve_config_path, resolve_launch_config, ConfigSource, ProcessEnv, RunArgs,
        CONFIG_PATH_ENV,
    },
    launcher::{launch, prepare_launch, GitCloner, PreparedLaunch, RepositoryCloner},
    lib::{
        errors::{ErrorReport, LauncherError, RESOLUTION_FAILURE_EXIT_CODE},
        telemetry::{FailureSink, TracingFailureSink},
    },
    settings::{self, FileSettings},
};

/// Bundles a terminal error message with an exit code and optional structured report.
#[derive(Debug)]
pub struct RuntimeExit {
    message: String,
    code: u8,
    error_report: Option<ErrorReport>,
}

impl RuntimeExit {
    /// Wrap a launcher failure, handing it to `sink` first.
    pub fn from_launcher_error(error: LauncherError, sink: &dyn FailureSink) -> Self {
        sink.capture(&error);
        Self {
            message: error.to_string(),
            code: error.exit_code(),
            error_report: Some(error.report()),
        }
    }

    pub fn from_error(err: impl Into<Error>) -> Self {
        let err = err.into();
        Self {
            message: format!("{err:?}"),
            code: RESOLUTION_FAILURE_EXIT_CODE,
            error_report: None,
        }
    }

    /// Print the failure to stderr and return the process exit code.
    pub fn report(self) -> ExitCode {
        if let Some(report) = &self.error_report {
            match serde_json::to_string(report) {
                Ok(serialized) => eprintln!("{serialized}"),
                Err(_) => eprintln!("{}", self.message),
            }
        } else {
            eprintln!("{}", self.message);
        }
        ExitCode::from(self.code)
    }

    pub fn code(&self) -> u8 {
        self.code
    }

    pub fn error_report(&self) -> Option<&ErrorReport> {
        self.error_report.as_ref()
    }
}

/// Resolve, prepare and launch the notebook; the child's exit code becomes ours.
pub async fn run_notebook(args: RunArgs) -> Result<ExitCode, RuntimeExit> {
    let sink = TracingFailureSink;
    let prepared = prepare(
        &args,
        &ProcessEnv,
        env::var(CONFIG_PATH_ENV).ok(),
        &GitCloner::default(),
    )
    .map_err(|err| RuntimeExit::from_launcher_error(err, &sink))?;

    let outcome = launch(&prepared.command)
        .await
        .map_err(|err| RuntimeExit::from_launcher_error(err, &sink))?;
    Ok(ExitCode::from(exit_status_byte(outcome.exit_code)))
}

fn prepare(
    args: &RunArgs,
    env: &dyn ConfigSource,
    config_env: Option<String>,
    cloner: &dyn RepositoryCloner,
) -> Result<PreparedLaunch, LauncherError> {
    let file = match resolve_config_path(args.config_override.clone(), config_env)? {
        Some(path) => Some(FileSettings::load_from_path(path)?),
        None => {
            settings::telemetry::log_no_file();
            None
        }
    };

    let mut sources: Vec<&dyn ConfigSource> = vec![args as &dyn ConfigSource, env];
    if let Some(file) = &file {
        sources.push(file);
    }
    let config = resolve_launch_config(&sources)?;
    prepare_launch(&config, cloner)
}

/// Exit statuses are a single byte on unix.
fn exit_status_byte(code: i32) -> u8 {
    (code & 0xff) as u8
}
