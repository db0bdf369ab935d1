//! Dependency strategy selection.
use std::path::{Path, PathBuf};

use tracing::info;

use super::ResolvedRoot;
use crate::lib::errors::LauncherError;

/// How the notebook's Python dependencies are provided to the launched tool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencyStrategy {
    /// The notebook's inline script metadata is installed in an isolated sandbox.
    Inline,
    /// An external requirements file, already checked to exist.
    ExternalFile(PathBuf),
}

impl DependencyStrategy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DependencyStrategy::Inline => "inline",
            DependencyStrategy::ExternalFile(_) => "external_file",
        }
    }
}

/// Pick the dependency strategy. An explicitly requested requirements file that does
/// not exist is an error, never a fallback to inline.
pub fn select_strategy(
    requirements_path: Option<&Path>,
    root: &ResolvedRoot,
) -> Result<DependencyStrategy, LauncherError> {
    let Some(requirements) = requirements_path else {
        info!(
            target: "notebook_launcher::deps",
            "No requirements file configured; using inline notebook dependencies"
        );
        return Ok(DependencyStrategy::Inline);
    };

    let resolved = root.path.join(requirements);
    if !resolved.is_file() {
        return Err(LauncherError::NotFound {
            what: "requirements file",
            path: resolved,
        });
    }

    info!(
        target: "notebook_launcher::deps",
        path = %resolved.display(),
        "Using requirements file"
    );
    Ok(DependencyStrategy::ExternalFile(resolved))
}
