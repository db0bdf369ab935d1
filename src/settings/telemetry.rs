use tracing::{debug, info};

use super::FileSettings;
use crate::cli::CONFIG_PATH_ENV;

pub fn log_no_file() {
    debug!(
        target: "notebook_launcher::config",
        env = CONFIG_PATH_ENV,
        "No configuration file given; using flags, environment and defaults"
    );
}

pub fn log_loaded(settings: &FileSettings) {
    info!(
        target: "notebook_launcher::config",
        path = %settings.source_path.display(),
        fields = settings.len(),
        "Configuration file loaded successfully"
    );
}
