//! Notebook root acquisition: validate a mounted directory or clone a repository.
use std::{
    fs, io,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    cli::{LaunchConfig, NotebookSource},
    lib::{errors::LauncherError, paths},
};

const STDERR_EXCERPT_LINES: usize = 5;
/// Written into every checkout the launcher creates. Only directories carrying it are
/// ever cleared.
pub const CLONE_MARKER_FILE: &str = ".notebook-launcher-clone";

/// Concrete local directory holding the notebook.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedRoot {
    /// Absolute path, known to exist when the root is handed out.
    pub path: PathBuf,
    /// True when the directory was populated by a clone during this invocation.
    pub freshly_cloned: bool,
}

/// Failure reasons for a clone operation.
#[derive(Debug, Error)]
pub enum CloneError {
    #[error("failed to run git: {0}")]
    Spawn(#[source] io::Error),
    #[error("git clone exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// Version-control clone used for repository sources.
pub trait RepositoryCloner {
    fn clone_repository(
        &self,
        url: &str,
        branch: Option<&str>,
        destination: &Path,
    ) -> Result<(), CloneError>;
}

/// Cloner that shells out to `git`.
#[derive(Debug, Clone)]
pub struct GitCloner {
    program: PathBuf,
}

impl GitCloner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GitCloner {
    fn default() -> Self {
        Self::new("git")
    }
}

impl RepositoryCloner for GitCloner {
    fn clone_repository(
        &self,
        url: &str,
        branch: Option<&str>,
        destination: &Path,
    ) -> Result<(), CloneError> {
        let mut command = Command::new(&self.program);
        command.arg("clone");
        if let Some(branch) = branch {
            command.arg("--branch").arg(branch);
        }
        command
            .arg("--")
            .arg(url)
            .arg(destination)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null());

        let output = command.output().map_err(CloneError::Spawn)?;
        if output.status.success() {
            return Ok(());
        }

        Err(CloneError::Failed {
            status: output.status.to_string(),
            stderr: stderr_excerpt(&output.stderr),
        })
    }
}

fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let start = lines.len().saturating_sub(STDERR_EXCERPT_LINES);
    lines[start..].join("; ")
}

/// Produce the notebook root for `config` and check that the notebook file is in it.
pub fn acquire_root(
    config: &LaunchConfig,
    cloner: &dyn RepositoryCloner,
) -> Result<ResolvedRoot, LauncherError> {
    let root = match &config.source {
        NotebookSource::Mount(mount) => validate_mount(mount)?,
        NotebookSource::Repository { url, branch } => {
            clone_into(url, branch.as_deref(), &config.clone_dir, cloner)?
        }
    };

    let notebook = root.path.join(&config.notebook_path);
    if !notebook.exists() {
        return Err(LauncherError::NotFound {
            what: "notebook file",
            path: notebook,
        });
    }

    Ok(root)
}

fn validate_mount(mount: &Path) -> Result<ResolvedRoot, LauncherError> {
    let path = absolute(mount, "mount")?;
    if !path.is_dir() {
        return Err(LauncherError::NotFound {
            what: "mount directory",
            path,
        });
    }

    info!(
        target: "notebook_launcher::source",
        path = %path.display(),
        "Using mounted notebook directory"
    );
    Ok(ResolvedRoot {
        path,
        freshly_cloned: false,
    })
}

fn clone_into(
    url: &str,
    branch: Option<&str>,
    clone_dir: &Path,
    cloner: &dyn RepositoryCloner,
) -> Result<ResolvedRoot, LauncherError> {
    let acquisition_error = |message: String| LauncherError::Acquisition {
        url: url.to_string(),
        branch: branch.map(str::to_string),
        message,
    };

    let destination = absolute(clone_dir, "clone_dir")?;
    prepare_clone_dir(&destination).map_err(acquisition_error)?;

    info!(
        target: "notebook_launcher::source",
        url,
        branch = branch.unwrap_or("<default>"),
        destination = %destination.display(),
        "Cloning notebook repository"
    );
    cloner
        .clone_repository(url, branch, &destination)
        .map_err(|err| acquisition_error(err.to_string()))?;

    if !destination.is_dir() {
        return Err(acquisition_error(format!(
            "clone finished but {} does not exist",
            destination.display()
        )));
    }
    let marker = destination.join(CLONE_MARKER_FILE);
    fs::write(&marker, url.as_bytes()).map_err(|err| {
        acquisition_error(format!("failed to write {}: {err}", marker.display()))
    })?;

    Ok(ResolvedRoot {
        path: destination,
        freshly_cloned: true,
    })
}

/// Clear the clone directory left by a previous run. Only empty directories and
/// checkouts carrying [`CLONE_MARKER_FILE`] are removed; anything else is refused,
/// including other git working trees.
fn prepare_clone_dir(destination: &Path) -> Result<(), String> {
    if destination.exists() {
        if !destination.is_dir() {
            return Err(format!(
                "refusing to replace {}: it is not a directory",
                destination.display()
            ));
        }
        let is_empty = fs::read_dir(destination)
            .map_err(|err| format!("failed to read {}: {err}", destination.display()))?
            .next()
            .is_none();
        if !is_empty && !destination.join(CLONE_MARKER_FILE).is_file() {
            return Err(format!(
                "refusing to clear {}: it is not empty and has no {CLONE_MARKER_FILE}",
                destination.display()
            ));
        }
        warn!(
            target: "notebook_launcher::source",
            destination = %destination.display(),
            "Clearing clone directory from a previous run"
        );
        fs::remove_dir_all(destination)
            .map_err(|err| format!("failed to clear {}: {err}", destination.display()))?;
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create {}: {err}", parent.display()))?;
    }
    Ok(())
}

fn absolute(path: &Path, field: &'static str) -> Result<PathBuf, LauncherError> {
    paths::absolutize(path).map_err(|err| LauncherError::Configuration {
        field,
        message: format!("failed to obtain current directory: {err}"),
    })
}
