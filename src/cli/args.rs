//! CLI argument definitions.
//!
//! Every `run` flag is taken as a plain string so that an empty flag falls through to
//! the environment exactly like an absent one; typing and validation happen in
//! [`resolve_launch_config`](super::resolve_launch_config).
use clap::{Args, Parser, Subcommand};

use super::{ConfigKey, ConfigSource};

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    author,
    version,
    about = "Launch a marimo notebook from a mounted directory or a git repository",
    long_about = None
)]
pub struct LauncherArgs {
    /// Log at debug level instead of info.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: LauncherCommand,
}

/// Top-level commands.
#[derive(Debug, Clone, Subcommand)]
pub enum LauncherCommand {
    /// Launch a notebook in 'run' or 'edit' mode.
    Run(RunArgs),
}

/// Arguments for `run`.
#[derive(Debug, Clone, Default, Args)]
#[command(
    after_help = "Each flag falls back to its environment variable, then to the config file, then to the default."
)]
pub struct RunArgs {
    /// Path to a mounted / existing notebook directory (env: NOTEBOOK_MOUNT).
    #[arg(long, value_name = "DIR")]
    pub mount: Option<String>,
    /// Git repository URL containing the notebook (env: NOTEBOOK_REPOSITORY).
    #[arg(long = "repo", value_name = "URL")]
    pub repository: Option<String>,
    /// Branch to check out after cloning (env: NOTEBOOK_REPOSITORY_BRANCH).
    #[arg(long = "repo-branch", value_name = "BRANCH")]
    pub repository_branch: Option<String>,
    /// Notebook path relative to the notebook directory [default: notebook.py] (env: NOTEBOOK_PATH).
    #[arg(long = "path", value_name = "PATH")]
    pub notebook_path: Option<String>,
    /// Requirements file relative to the notebook directory (env: NOTEBOOK_REQUIREMENTS).
    #[arg(long, value_name = "FILE")]
    pub requirements: Option<String>,
    /// Launch mode, `run` or `edit` [default: run] (env: NOTEBOOK_MODE).
    #[arg(long, value_name = "MODE")]
    pub mode: Option<String>,
    /// Host interface to bind [default: 0.0.0.0] (env: NOTEBOOK_HOST).
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,
    /// Port to bind [default: 2718] (env: NOTEBOOK_PORT).
    #[arg(long, value_name = "PORT")]
    pub port: Option<String>,
    /// Access token required by the notebook server; omit to run without auth (env: NOTEBOOK_TOKEN).
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,
    /// URL prefix the notebook server is mounted under (env: NOTEBOOK_BASE_URL).
    #[arg(long = "base-url", value_name = "PREFIX")]
    pub base_url: Option<String>,
    /// Working directory for repository clones [default: <tmp>/notebook-clone] (env: NOTEBOOK_CLONE_DIR).
    #[arg(long = "clone-dir", value_name = "DIR")]
    pub clone_dir: Option<String>,
    /// Optional TOML config file with a [notebook] table (env: NOTEBOOK_CONFIG_PATH).
    #[arg(long = "config", value_name = "FILE")]
    pub config_override: Option<String>,
}

impl ConfigSource for RunArgs {
    fn name(&self) -> &'static str {
        "flags"
    }

    fn lookup(&self, key: ConfigKey) -> Option<String> {
        let value = match key {
            ConfigKey::Mount => &self.mount,
            ConfigKey::Repository => &self.repository,
            ConfigKey::RepositoryBranch => &self.repository_branch,
            ConfigKey::NotebookPath => &self.notebook_path,
            ConfigKey::Requirements => &self.requirements,
            ConfigKey::Mode => &self.mode,
            ConfigKey::Host => &self.host,
            ConfigKey::Port => &self.port,
            ConfigKey::Token => &self.token,
            ConfigKey::BaseUrl => &self.base_url,
            ConfigKey::CloneDir => &self.clone_dir,
        };
        value.clone()
    }
}
