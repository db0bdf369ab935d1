use std::{io, path::PathBuf};

use config::ConfigError as ConfigLoaderError;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Exit code used for every failure that happens before the notebook process starts.
pub const RESOLUTION_FAILURE_EXIT_CODE: u8 = 1;
/// Exit code used when the notebook tool binary cannot be found.
pub const LAUNCH_NOT_FOUND_EXIT_CODE: u8 = 127;
/// Exit code used when the notebook tool exists but cannot be started.
pub const LAUNCH_FAILURE_EXIT_CODE: u8 = 126;

/// Errors that can occur while loading or validating the launcher configuration file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to build (read) the configuration file.
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Failed to deserialize TOML into a struct.
    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Field failed validation.
    #[error("Configuration file {path} has invalid `{field}`: {message}")]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        message: String,
    },
}

impl SettingsError {
    /// Helper to wrap `config::ConfigError` as a read failure.
    pub fn from_read_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::FileRead { path, source }
    }

    /// Helper to wrap `config::ConfigError` as a parse failure.
    pub fn from_parse_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::Parse { path, source }
    }
}

/// Terminal failures of a single launch invocation. None of them are retried.
#[derive(Debug, Error)]
pub enum LauncherError {
    /// Missing or invalid configuration (no notebook source, bad mode, bad port...).
    #[error("invalid configuration for `{field}`: {message}")]
    Configuration { field: &'static str, message: String },
    /// An expected filesystem entry is absent.
    #[error("{what} not found: {path}")]
    NotFound { what: &'static str, path: PathBuf },
    /// The notebook repository could not be cloned.
    #[error("failed to clone {url} ({}): {message}", describe_branch(.branch))]
    Acquisition {
        url: String,
        branch: Option<String>,
        message: String,
    },
    /// The notebook tool could not be started at all.
    #[error("failed to start `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
}

fn describe_branch(branch: &Option<String>) -> String {
    match branch {
        Some(branch) => format!("branch `{branch}`"),
        None => "default branch".to_string(),
    }
}

impl From<SettingsError> for LauncherError {
    fn from(value: SettingsError) -> Self {
        LauncherError::Configuration {
            field: "config",
            message: value.to_string(),
        }
    }
}

/// Stable code and remediation hint attached to a failure kind.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ErrorDescriptor {
    pub code: &'static str,
    pub remediation: &'static str,
}

impl ErrorDescriptor {
    pub const fn new(code: &'static str, remediation: &'static str) -> Self {
        Self { code, remediation }
    }
}

pub const CONFIGURATION_ERROR: ErrorDescriptor = ErrorDescriptor::new(
    "CONFIGURATION_ERROR",
    "Set --mount/NOTEBOOK_MOUNT or --repo/NOTEBOOK_REPOSITORY and check the reported field.",
);
pub const NOT_FOUND_ERROR: ErrorDescriptor = ErrorDescriptor::new(
    "NOT_FOUND",
    "Check that the path exists relative to the notebook directory (--path, --requirements, --mount).",
);
pub const ACQUISITION_ERROR: ErrorDescriptor = ErrorDescriptor::new(
    "ACQUISITION_FAILED",
    "Verify the repository URL, branch name and credentials, and that the network is reachable.",
);
pub const LAUNCH_ERROR: ErrorDescriptor = ErrorDescriptor::new(
    "LAUNCH_FAILED",
    "Make sure `uv` is installed and executable on PATH inside the container.",
);

/// One-line JSON payload written to stderr for terminal failures.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub code: &'static str,
    pub message: String,
    pub remediation: &'static str,
    pub details: Value,
}

impl LauncherError {
    pub fn descriptor(&self) -> &'static ErrorDescriptor {
        match self {
            LauncherError::Configuration { .. } => &CONFIGURATION_ERROR,
            LauncherError::NotFound { .. } => &NOT_FOUND_ERROR,
            LauncherError::Acquisition { .. } => &ACQUISITION_ERROR,
            LauncherError::Launch { .. } => &LAUNCH_ERROR,
        }
    }

    /// Structured context identifying what to fix.
    pub fn details(&self) -> Value {
        match self {
            LauncherError::Configuration { field, .. } => json!({ "field": field }),
            LauncherError::NotFound { what, path } => {
                json!({ "what": what, "path": path.to_string_lossy() })
            }
            LauncherError::Acquisition { url, branch, .. } => {
                json!({ "url": url, "branch": branch })
            }
            LauncherError::Launch { program, source } => {
                json!({ "program": program, "io_error": format!("{:?}", source.kind()) })
            }
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            LauncherError::Launch { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                LAUNCH_NOT_FOUND_EXIT_CODE
            }
            LauncherError::Launch { .. } => LAUNCH_FAILURE_EXIT_CODE,
            _ => RESOLUTION_FAILURE_EXIT_CODE,
        }
    }

    pub fn report(&self) -> ErrorReport {
        let descriptor = self.descriptor();
        ErrorReport {
            code: descriptor.code,
            message: self.to_string(),
            remediation: descriptor.remediation,
            details: self.details(),
        }
    }
}
