use crate::repo;
use anyhow::Result;
use std::path::Path;
use std::process::{Command, Stdio};

/// Directories the integration tests mount as notebook roots.
const REQUIRED_FIXTURES: [&str; 2] = [
    "tests/fixtures/inline_deps/notebook.py",
    "tests/fixtures/static_deps_reqs_txt/requirements.txt",
];

pub fn run(skip_release: bool) -> Result<()> {
    let root = repo::repo_root()?;
    check_fixtures(&root)?;
    run_step(&root, "cargo fetch", &["fetch"])?;
    run_step(&root, "cargo check", &["check"])?;
    run_step(&root, "cargo test --all", &["test", "--all"])?;
    run_step(&root, "cargo fmt -- --check", &["fmt", "--", "--check"])?;
    run_step(
        &root,
        "cargo clippy -- -D warnings",
        &["clippy", "--", "-D", "warnings"],
    )?;
    run_step(
        &root,
        "notebook-launcher run --help",
        &["run", "--quiet", "--", "run", "--help"],
    )?;
    if !skip_release {
        run_step(&root, "cargo build --release", &["build", "--release"])?;
    }
    Ok(())
}

fn check_fixtures(root: &Path) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_FIXTURES
        .into_iter()
        .filter(|fixture| !root.join(fixture).is_file())
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("missing test fixtures: {}", missing.join(", "));
    }
    Ok(())
}

fn run_step(root: &Path, label: &str, args: &[&str]) -> Result<()> {
    eprintln!("==> {label}");
    let status = Command::new("cargo")
        .args(args)
        .current_dir(root)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        anyhow::bail!("{label} failed (status {status})");
    }
    Ok(())
}
