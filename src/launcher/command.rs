//! Build the `uv run marimo` invocation for a resolved notebook.

use std::{collections::BTreeMap, path::PathBuf, process::Stdio};

use tokio::process::Command;

use super::{DependencyStrategy, ResolvedRoot};
use crate::cli::LaunchConfig;

pub const TOOL_PROGRAM: &str = "uv";
/// Isolation flag telling marimo to install the notebook's inline dependencies.
pub const INLINE_ISOLATION_FLAG: &str = "--sandbox";
/// `uv run` flag pointing at an external requirements file.
pub const REQUIREMENTS_FLAG: &str = "--with-requirements";
/// Explicit marker for a server that accepts unauthenticated access.
pub const NO_AUTH_FLAG: &str = "--no-token";
pub const TOKEN_FLAG: &str = "--token";
pub const TOKEN_PASSWORD_FLAG: &str = "--token-password";
pub const BASE_URL_FLAG: &str = "--base-url";
const REDACTED: &str = "***";

/// Fully resolved process invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub current_dir: PathBuf,
}

impl LaunchCommand {
    /// True when the command carries a token, false when it carries the no-auth marker.
    pub fn is_protected(&self) -> bool {
        self.args.iter().any(|arg| arg == TOKEN_PASSWORD_FLAG)
    }

    /// Render the command for logs with the token value masked.
    pub fn redacted(&self) -> String {
        let mut rendered = vec![quote(&self.program)];
        let mut mask_next = false;
        for arg in &self.args {
            if mask_next {
                rendered.push(REDACTED.to_string());
                mask_next = false;
                continue;
            }
            mask_next = arg == TOKEN_PASSWORD_FLAG;
            rendered.push(quote(arg));
        }
        rendered.join(" ")
    }

    /// Process builder inheriting stdio. The child is killed if the handle is dropped
    /// before it has been waited on.
    ///
    /// The child leads its own process group, so a terminal Ctrl-C reaches it only
    /// through the launcher's forwarding and is delivered exactly once.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.kill_on_drop(true);
        command.process_group(0);
        command.current_dir(&self.current_dir);
        command.args(&self.args);
        command.envs(&self.env);
        command
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        command
    }
}

fn quote(arg: &str) -> String {
    if !arg.is_empty() && !arg.chars().any(char::is_whitespace) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Assemble the launch command. Pure: the same inputs always give the same command.
pub fn build_launch_command(
    config: &LaunchConfig,
    root: &ResolvedRoot,
    strategy: &DependencyStrategy,
) -> LaunchCommand {
    let mut args = vec!["run".to_string()];

    if let DependencyStrategy::ExternalFile(requirements) = strategy {
        args.push(REQUIREMENTS_FLAG.to_string());
        args.push(requirements.to_string_lossy().into_owned());
    }

    args.extend([
        "marimo".to_string(),
        config.mode.as_str().to_string(),
        "--headless".to_string(),
        "--host".to_string(),
        config.host.clone(),
        "--port".to_string(),
        config.port.to_string(),
    ]);

    if *strategy == DependencyStrategy::Inline {
        args.push(INLINE_ISOLATION_FLAG.to_string());
    }

    match &config.token {
        Some(token) => args.extend([
            TOKEN_FLAG.to_string(),
            TOKEN_PASSWORD_FLAG.to_string(),
            token.clone(),
        ]),
        None => args.push(NO_AUTH_FLAG.to_string()),
    }

    if let Some(base_url) = &config.base_url {
        args.push(BASE_URL_FLAG.to_string());
        args.push(base_url.clone());
    }

    args.push(config.notebook_path.clone());

    LaunchCommand {
        program: TOOL_PROGRAM.to_string(),
        args,
        env: BTreeMap::from([("PYTHONUNBUFFERED".to_string(), "1".to_string())]),
        current_dir: root.path.clone(),
    }
}
