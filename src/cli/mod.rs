//! CLI entrypoint module structure.
use std::path::PathBuf;

use crate::lib::{errors::LauncherError, paths};

pub mod args;
pub mod profile;

pub use args::{LauncherArgs, LauncherCommand, RunArgs};
pub use profile::{
    default_clone_dir, resolve_launch_config, ConfigKey, ConfigSource, LaunchConfig, LaunchMode,
    MapEnv, NotebookSource, ProcessEnv, DEFAULT_HOST, DEFAULT_NOTEBOOK_PATH, DEFAULT_PORT,
};

/// Environment variable naming the optional config file.
pub const CONFIG_PATH_ENV: &str = "NOTEBOOK_CONFIG_PATH";

/// Resolve the config file path in the order: CLI override → env var → none.
pub fn resolve_config_path(
    override_path: Option<String>,
    env_path: Option<String>,
) -> Result<Option<PathBuf>, LauncherError> {
    let Some(raw) = override_path
        .filter(|value| !value.trim().is_empty())
        .or_else(|| env_path.filter(|value| !value.trim().is_empty()))
    else {
        return Ok(None);
    };

    paths::absolutize(&PathBuf::from(raw.trim()))
        .map(Some)
        .map_err(|err| LauncherError::Configuration {
            field: "config",
            message: format!("failed to obtain current directory: {err}"),
        })
}
