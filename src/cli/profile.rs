//! LaunchConfig and flag → environment → config file → default resolution.
use std::{
    collections::BTreeMap,
    env,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use tracing::{debug, warn};

use crate::lib::{errors::LauncherError, paths};

pub const DEFAULT_NOTEBOOK_PATH: &str = "notebook.py";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 2718;
const DEFAULT_CLONE_DIR_NAME: &str = "notebook-clone";

/// Every configurable field, with its flag, environment variable and file key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    Mount,
    Repository,
    RepositoryBranch,
    NotebookPath,
    Requirements,
    Mode,
    Host,
    Port,
    Token,
    BaseUrl,
    CloneDir,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 11] = [
        ConfigKey::Mount,
        ConfigKey::Repository,
        ConfigKey::RepositoryBranch,
        ConfigKey::NotebookPath,
        ConfigKey::Requirements,
        ConfigKey::Mode,
        ConfigKey::Host,
        ConfigKey::Port,
        ConfigKey::Token,
        ConfigKey::BaseUrl,
        ConfigKey::CloneDir,
    ];

    pub const fn env_var(self) -> &'static str {
        match self {
            ConfigKey::Mount => "NOTEBOOK_MOUNT",
            ConfigKey::Repository => "NOTEBOOK_REPOSITORY",
            ConfigKey::RepositoryBranch => "NOTEBOOK_REPOSITORY_BRANCH",
            ConfigKey::NotebookPath => "NOTEBOOK_PATH",
            ConfigKey::Requirements => "NOTEBOOK_REQUIREMENTS",
            ConfigKey::Mode => "NOTEBOOK_MODE",
            ConfigKey::Host => "NOTEBOOK_HOST",
            ConfigKey::Port => "NOTEBOOK_PORT",
            ConfigKey::Token => "NOTEBOOK_TOKEN",
            ConfigKey::BaseUrl => "NOTEBOOK_BASE_URL",
            ConfigKey::CloneDir => "NOTEBOOK_CLONE_DIR",
        }
    }

    pub const fn flag(self) -> &'static str {
        match self {
            ConfigKey::Mount => "--mount",
            ConfigKey::Repository => "--repo",
            ConfigKey::RepositoryBranch => "--repo-branch",
            ConfigKey::NotebookPath => "--path",
            ConfigKey::Requirements => "--requirements",
            ConfigKey::Mode => "--mode",
            ConfigKey::Host => "--host",
            ConfigKey::Port => "--port",
            ConfigKey::Token => "--token",
            ConfigKey::BaseUrl => "--base-url",
            ConfigKey::CloneDir => "--clone-dir",
        }
    }

    /// Field name used in error details and as the `[notebook]` key of the config file.
    pub const fn field(self) -> &'static str {
        match self {
            ConfigKey::Mount => "mount",
            ConfigKey::Repository => "repository",
            ConfigKey::RepositoryBranch => "repository_branch",
            ConfigKey::NotebookPath => "path",
            ConfigKey::Requirements => "requirements",
            ConfigKey::Mode => "mode",
            ConfigKey::Host => "host",
            ConfigKey::Port => "port",
            ConfigKey::Token => "token",
            ConfigKey::BaseUrl => "base_url",
            ConfigKey::CloneDir => "clone_dir",
        }
    }
}

/// A place configuration values can come from (flags, environment, a file...).
pub trait ConfigSource {
    fn name(&self) -> &'static str;
    fn lookup(&self, key: ConfigKey) -> Option<String>;
}

/// Source backed by the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl ConfigSource for ProcessEnv {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn lookup(&self, key: ConfigKey) -> Option<String> {
        env::var(key.env_var()).ok()
    }
}

/// In-memory source keyed by environment variable name.
#[derive(Debug, Clone)]
pub struct MapEnv {
    name: &'static str,
    values: BTreeMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::named("environment")
    }

    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, var: &str, value: &str) -> Self {
        self.values.insert(var.to_string(), value.to_string());
        self
    }

    pub fn set(mut self, key: ConfigKey, value: &str) -> Self {
        self.values.insert(key.env_var().to_string(), value.to_string());
        self
    }
}

impl Default for MapEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for MapEnv {
    fn name(&self) -> &'static str {
        self.name
    }

    fn lookup(&self, key: ConfigKey) -> Option<String> {
        self.values.get(key.env_var()).cloned()
    }
}

/// Launch mode of the notebook tool.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash, Default)]
pub enum LaunchMode {
    /// Serve the notebook as a read-only app.
    #[default]
    Run,
    /// Open the notebook for interactive editing.
    Edit,
}

impl LaunchMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LaunchMode::Run => "run",
            LaunchMode::Edit => "edit",
        }
    }
}

/// Where the notebook content comes from. Mount wins when both are configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NotebookSource {
    Mount(PathBuf),
    Repository { url: String, branch: Option<String> },
}

/// Immutable configuration for one launch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LaunchConfig {
    pub source: NotebookSource,
    pub notebook_path: String,
    pub requirements_path: Option<PathBuf>,
    pub mode: LaunchMode,
    pub host: String,
    pub port: u16,
    pub token: Option<String>,
    pub base_url: Option<String>,
    pub clone_dir: PathBuf,
}

/// Default working directory for repository clones; the same on every run.
pub fn default_clone_dir() -> PathBuf {
    env::temp_dir().join(DEFAULT_CLONE_DIR_NAME)
}

/// Resolve a `LaunchConfig` from sources ordered by precedence (first wins).
pub fn resolve_launch_config(sources: &[&dyn ConfigSource]) -> Result<LaunchConfig, LauncherError> {
    let layers = Layers { sources };

    let mount = layers.value(ConfigKey::Mount).map(PathBuf::from);
    let repository = layers.value(ConfigKey::Repository);
    let branch = layers.value(ConfigKey::RepositoryBranch);

    let source = match (mount, repository) {
        (Some(mount), repository) => {
            if let Some(url) = repository {
                warn!(
                    target: "notebook_launcher::config",
                    mount = %mount.display(),
                    repository = %url,
                    "Both a mount and a repository were configured; using the mount"
                );
            }
            NotebookSource::Mount(mount)
        }
        (None, Some(url)) => NotebookSource::Repository { url, branch },
        (None, None) => {
            return Err(LauncherError::Configuration {
                field: "mount",
                message: format!(
                    "either {}/{} or {}/{} must be provided",
                    ConfigKey::Mount.flag(),
                    ConfigKey::Mount.env_var(),
                    ConfigKey::Repository.flag(),
                    ConfigKey::Repository.env_var()
                ),
            })
        }
    };

    let notebook_path = layers
        .value(ConfigKey::NotebookPath)
        .unwrap_or_else(|| DEFAULT_NOTEBOOK_PATH.to_string());
    if !paths::is_nonempty_relative(Path::new(&notebook_path)) {
        return Err(LauncherError::Configuration {
            field: ConfigKey::NotebookPath.field(),
            message: format!(
                "notebook path must be relative to the notebook directory, got `{notebook_path}`"
            ),
        });
    }

    let mode = match layers.value(ConfigKey::Mode) {
        Some(raw) => parse_mode(&raw)?,
        None => LaunchMode::default(),
    };
    let port = match layers.value(ConfigKey::Port) {
        Some(raw) => parse_port(&raw)?,
        None => DEFAULT_PORT,
    };

    Ok(LaunchConfig {
        source,
        notebook_path,
        requirements_path: layers.value(ConfigKey::Requirements).map(PathBuf::from),
        mode,
        host: layers
            .value(ConfigKey::Host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port,
        token: layers.value(ConfigKey::Token),
        base_url: layers.value(ConfigKey::BaseUrl),
        clone_dir: layers
            .value(ConfigKey::CloneDir)
            .map(PathBuf::from)
            .unwrap_or_else(default_clone_dir),
    })
}

struct Layers<'a> {
    sources: &'a [&'a dyn ConfigSource],
}

impl Layers<'_> {
    /// First non-blank value across sources, returned as given.
    fn value(&self, key: ConfigKey) -> Option<String> {
        self.sources.iter().find_map(|source| {
            let value = source.lookup(key)?;
            if value.trim().is_empty() {
                return None;
            }
            let shown = if key == ConfigKey::Token {
                "<redacted>"
            } else {
                value.as_str()
            };
            debug!(
                target: "notebook_launcher::config",
                field = key.field(),
                source = source.name(),
                value = shown,
                "Resolved configuration field"
            );
            Some(value)
        })
    }
}

fn parse_mode(raw: &str) -> Result<LaunchMode, LauncherError> {
    <LaunchMode as ValueEnum>::from_str(raw.trim(), true).map_err(|_| LauncherError::Configuration {
        field: ConfigKey::Mode.field(),
        message: format!("unsupported mode `{raw}`; expected `run` or `edit`"),
    })
}

fn parse_port(raw: &str) -> Result<u16, LauncherError> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(LauncherError::Configuration {
            field: ConfigKey::Port.field(),
            message: format!("`{raw}` is not a port in the range 1-65535"),
        }),
    }
}
