//! Entry point for the notebook launcher.
use std::process::ExitCode;

use clap::Parser;
use notebook_launcher::{
    cli::{LauncherArgs, LauncherCommand},
    lib::telemetry,
    runtime::{self, RuntimeExit},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match bootstrap().await {
        Ok(code) => code,
        Err(exit) => exit.report(),
    }
}

async fn bootstrap() -> Result<ExitCode, RuntimeExit> {
    let args = LauncherArgs::parse();
    telemetry::init_tracing(args.verbose).map_err(RuntimeExit::from_error)?;

    match args.command {
        LauncherCommand::Run(run) => runtime::run_notebook(run).await,
    }
}
