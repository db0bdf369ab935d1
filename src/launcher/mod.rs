//! Launch pipeline: acquire the notebook root, pick a dependency strategy, build the
//! command and run it.
pub mod command;
pub mod dependencies;
pub mod process;
pub mod source;

pub use command::{build_launch_command, LaunchCommand};
pub use dependencies::{select_strategy, DependencyStrategy};
pub use process::{launch, LaunchOutcome};
pub use source::{acquire_root, CloneError, GitCloner, RepositoryCloner, ResolvedRoot};

use crate::{
    cli::LaunchConfig,
    lib::{
        errors::LauncherError,
        telemetry::{emit_launch, LaunchTelemetry},
    },
};

/// Everything needed to start the notebook, resolved but not yet running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedLaunch {
    pub root: ResolvedRoot,
    pub strategy: DependencyStrategy,
    pub command: LaunchCommand,
}

impl PreparedLaunch {
    fn emit(&self, config: &LaunchConfig) {
        let root = self.root.path.display().to_string();
        let command = self.command.redacted();
        emit_launch(&LaunchTelemetry {
            root: &root,
            freshly_cloned: self.root.freshly_cloned,
            notebook_path: &config.notebook_path,
            mode: config.mode.as_str(),
            strategy: self.strategy.as_str(),
            host: &config.host,
            port: config.port,
            auth: if self.command.is_protected() {
                "token"
            } else {
                "none"
            },
            command: &command,
        });
    }
}

/// Run every step that precedes the process launch. Fails fast on the first error;
/// nothing is retried.
pub fn prepare_launch(
    config: &LaunchConfig,
    cloner: &dyn RepositoryCloner,
) -> Result<PreparedLaunch, LauncherError> {
    let root = acquire_root(config, cloner)?;
    let strategy = select_strategy(config.requirements_path.as_deref(), &root)?;
    let command = build_launch_command(config, &root, &strategy);

    let prepared = PreparedLaunch {
        root,
        strategy,
        command,
    };
    prepared.emit(config);
    Ok(prepared)
}
