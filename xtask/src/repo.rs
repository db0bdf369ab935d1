use std::env;
use std::path::{Path, PathBuf};

pub fn repo_root() -> anyhow::Result<PathBuf> {
    let mut dir = env::current_dir()?;
    loop {
        if looks_like_repo_root(&dir) {
            return Ok(dir);
        }
        if !dir.pop() {
            anyhow::bail!("failed to find repository root (no workspace Cargo.toml found)");
        }
    }
}

/// The workspace root is the manifest that lists `xtask` as a member.
fn looks_like_repo_root(dir: &Path) -> bool {
    std::fs::read_to_string(dir.join("Cargo.toml"))
        .map(|manifest| manifest.contains("[workspace]"))
        .unwrap_or(false)
}
