//! Load and validate the optional launcher configuration file.
//!
//! The file is the lowest-precedence configuration layer: flags and environment
//! variables override anything it sets.
use std::{collections::BTreeMap, path::PathBuf};

use serde::Deserialize;
use tracing::{error, info};

use crate::{
    cli::{ConfigKey, ConfigSource},
    lib::errors::SettingsError,
};

pub mod telemetry;

/// Values read from the `[notebook]` table of a config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSettings {
    values: BTreeMap<ConfigKey, String>,
    pub source_path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    notebook: Option<RawNotebookSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNotebookSection {
    mount: Option<String>,
    repository: Option<String>,
    repository_branch: Option<String>,
    path: Option<String>,
    requirements: Option<String>,
    mode: Option<String>,
    host: Option<String>,
    port: Option<i64>,
    token: Option<String>,
    base_url: Option<String>,
    clone_dir: Option<String>,
}

impl FileSettings {
    /// Load settings from a specific path.
    pub fn load_from_path(path: PathBuf) -> Result<Self, SettingsError> {
        info!(
            target: "notebook_launcher::config",
            path = %path.display(),
            "Starting configuration file load"
        );

        let builder = config::Config::builder().add_source(config::File::from(path.clone()));
        let document = builder.build().map_err(|err| {
            let error = SettingsError::from_read_error(path.clone(), err);
            error!(
                target: "notebook_launcher::config",
                path = %path.display(),
                reason = %error,
                "Failed to read configuration file"
            );
            error
        })?;

        let raw: RawSettings = document.try_deserialize().map_err(|err| {
            let error = SettingsError::from_parse_error(path.clone(), err);
            error!(
                target: "notebook_launcher::config",
                path = %path.display(),
                reason = %error,
                "Failed to parse configuration file"
            );
            error
        })?;

        let settings = Self::from_raw(raw, path.clone()).map_err(|err| {
            error!(
                target: "notebook_launcher::config",
                path = %path.display(),
                reason = %err,
                "Failed to validate configuration file"
            );
            err
        })?;

        telemetry::log_loaded(&settings);
        Ok(settings)
    }

    fn from_raw(raw: RawSettings, path: PathBuf) -> Result<Self, SettingsError> {
        let section = raw.notebook.unwrap_or_default();
        let port = section
            .port
            .map(|port| validate_port(port, &path))
            .transpose()?;

        let entries = [
            (ConfigKey::Mount, section.mount),
            (ConfigKey::Repository, section.repository),
            (ConfigKey::RepositoryBranch, section.repository_branch),
            (ConfigKey::NotebookPath, section.path),
            (ConfigKey::Requirements, section.requirements),
            (ConfigKey::Mode, section.mode),
            (ConfigKey::Host, section.host),
            (ConfigKey::Port, port.map(|port| port.to_string())),
            (ConfigKey::Token, section.token),
            (ConfigKey::BaseUrl, section.base_url),
            (ConfigKey::CloneDir, section.clone_dir),
        ];
        let values = entries
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
            .collect();

        Ok(Self {
            values,
            source_path: path,
        })
    }

    /// Number of fields the file sets.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigSource for FileSettings {
    fn name(&self) -> &'static str {
        "config file"
    }

    fn lookup(&self, key: ConfigKey) -> Option<String> {
        self.values.get(&key).cloned()
    }
}

fn validate_port(port: i64, path: &std::path::Path) -> Result<u16, SettingsError> {
    match u16::try_from(port) {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(SettingsError::InvalidField {
            path: path.to_path_buf(),
            field: "notebook.port",
            message: "Use a port in the range 1-65535".into(),
        }),
    }
}
