use std::{
    env, fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use anyhow::{Context, Result};
use notebook_launcher::cli::{ConfigKey, CONFIG_PATH_ENV};
use serde_json::Value;
use tempfile::TempDir;

pub const BINARY_PATH: &str = env!("CARGO_BIN_EXE_notebook-launcher");

/// Stand-in `uv` that records its argv and working directory, then exits with
/// `$FAKE_UV_EXIT`.
pub const RECORDING_UV: &str = r#"#!/bin/sh
printf '%s\n' "$@" > "$FAKE_UV_DIR/args"
pwd > "$FAKE_UV_DIR/cwd"
exit "${FAKE_UV_EXIT:-0}"
"#;

/// Stand-in `uv` that waits until it receives SIGTERM and then exits with 143.
pub const LONG_RUNNING_UV: &str = r#"#!/bin/sh
trap 'echo term > "$FAKE_UV_DIR/signal"; exit 143' TERM
touch "$FAKE_UV_DIR/ready"
while :; do
  sleep 1
done
"#;

/// Directory holding a fake `uv` executable plus the files it writes.
pub struct FakeUv {
    dir: TempDir,
}

impl FakeUv {
    pub fn install(script: &str) -> Result<Self> {
        let dir = tempfile::tempdir().context("failed to create fake uv directory")?;
        let program = dir.path().join("uv");
        fs::write(&program, script).context("failed to write fake uv")?;
        fs::set_permissions(&program, fs::Permissions::from_mode(0o755))
            .context("failed to mark fake uv executable")?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// `PATH` with the fake `uv` first so `git` and `sh` stay reachable.
    pub fn path_env(&self) -> String {
        let inherited = env::var("PATH").unwrap_or_default();
        format!("{}:{inherited}", self.dir.path().display())
    }

    pub fn recorded_args(&self) -> Option<Vec<String>> {
        fs::read_to_string(self.dir.path().join("args"))
            .ok()
            .map(|text| text.lines().map(str::to_string).collect())
    }

    pub fn recorded_cwd(&self) -> Option<PathBuf> {
        fs::read_to_string(self.dir.path().join("cwd"))
            .ok()
            .map(|text| PathBuf::from(text.trim()))
    }

    pub fn was_invoked(&self) -> bool {
        self.dir.path().join("args").exists() || self.dir.path().join("ready").exists()
    }
}

/// Launcher command with every `NOTEBOOK_*` variable cleared and the fake `uv` on PATH.
pub fn launcher_command(fake_uv: &FakeUv) -> Command {
    let mut command = Command::new(BINARY_PATH);
    for key in ConfigKey::ALL {
        command.env_remove(key.env_var());
    }
    command
        .env_remove(CONFIG_PATH_ENV)
        .env_remove("RUST_LOG")
        .env("PATH", fake_uv.path_env())
        .env("FAKE_UV_DIR", fake_uv.dir());
    command
}

pub fn fixture(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(relative)
}

/// The structured error line the launcher prints on terminal failures.
pub fn error_report(output: &Output) -> Option<Value> {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .filter(|line| line.starts_with('{'))
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .find(|value| value.get("code").is_some())
}
