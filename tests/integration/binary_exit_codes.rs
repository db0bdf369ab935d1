use std::fs;

use anyhow::Result;

use crate::common::{error_report, fixture, launcher_command, FakeUv, RECORDING_UV};

#[test]
fn child_exit_code_becomes_launcher_exit_code() -> Result<()> {
    let uv = FakeUv::install(RECORDING_UV)?;

    let output = launcher_command(&uv)
        .args(["run", "--mount"])
        .arg(fixture("inline_deps"))
        .env("FAKE_UV_EXIT", "3")
        .output()?;

    assert_eq!(output.status.code(), Some(3), "{output:?}");
    let args = uv.recorded_args().expect("fake uv should have run");
    assert_eq!(&args[..3], &["run", "marimo", "run"]);
    assert!(args.iter().any(|arg| arg == "--sandbox"), "{args:?}");
    assert!(args.iter().any(|arg| arg == "--no-token"), "{args:?}");
    assert_eq!(args.last().map(String::as_str), Some("notebook.py"));
    assert_eq!(
        fs::canonicalize(uv.recorded_cwd().expect("cwd recorded"))?,
        fs::canonicalize(fixture("inline_deps"))?
    );
    Ok(())
}

#[test]
fn environment_configures_edit_mode_with_token() -> Result<()> {
    let uv = FakeUv::install(RECORDING_UV)?;

    let output = launcher_command(&uv)
        .arg("run")
        .env("NOTEBOOK_MOUNT", fixture("static_deps_reqs_txt"))
        .env("NOTEBOOK_REQUIREMENTS", "requirements.txt")
        .env("NOTEBOOK_MODE", "edit")
        .env("NOTEBOOK_TOKEN", "secret")
        .output()?;

    assert_eq!(output.status.code(), Some(0), "{output:?}");
    let args = uv.recorded_args().expect("fake uv should have run");
    assert_eq!(&args[..2], &["run", "--with-requirements"]);
    assert!(args.iter().any(|arg| arg == "edit"), "{args:?}");
    assert!(!args.iter().any(|arg| arg == "--sandbox"), "{args:?}");
    assert!(!String::from_utf8_lossy(&output.stderr).contains("secret"));
    Ok(())
}

#[test]
fn missing_mount_exits_one_with_not_found_report() -> Result<()> {
    let uv = FakeUv::install(RECORDING_UV)?;
    let temp = tempfile::tempdir()?;

    let output = launcher_command(&uv)
        .args(["run", "--mount"])
        .arg(temp.path().join("does-not-exist"))
        .output()?;

    assert_eq!(output.status.code(), Some(1), "{output:?}");
    let report = error_report(&output).expect("structured error on stderr");
    assert_eq!(report["code"], "NOT_FOUND");
    assert_eq!(report["details"]["what"], "mount directory");
    assert!(!uv.was_invoked());
    Ok(())
}

#[test]
fn unreachable_repository_never_launches() -> Result<()> {
    let uv = FakeUv::install(RECORDING_UV)?;
    let temp = tempfile::tempdir()?;

    let output = launcher_command(&uv)
        .args(["run", "--repo"])
        .arg(temp.path().join("no-such-repo"))
        .arg("--clone-dir")
        .arg(temp.path().join("clone"))
        .output()?;

    assert_eq!(output.status.code(), Some(1), "{output:?}");
    let report = error_report(&output).expect("structured error on stderr");
    assert_eq!(report["code"], "ACQUISITION_FAILED");
    assert!(!uv.was_invoked());
    Ok(())
}

#[test]
fn missing_source_exits_one_with_configuration_report() -> Result<()> {
    let uv = FakeUv::install(RECORDING_UV)?;

    let output = launcher_command(&uv).arg("run").output()?;

    assert_eq!(output.status.code(), Some(1), "{output:?}");
    let report = error_report(&output).expect("structured error on stderr");
    assert_eq!(report["code"], "CONFIGURATION_ERROR");
    assert_eq!(report["details"]["field"], "mount");
    Ok(())
}

#[test]
fn invalid_mode_exits_one() -> Result<()> {
    let uv = FakeUv::install(RECORDING_UV)?;

    let output = launcher_command(&uv)
        .args(["run", "--mode", "present", "--mount"])
        .arg(fixture("inline_deps"))
        .output()?;

    assert_eq!(output.status.code(), Some(1), "{output:?}");
    assert!(!uv.was_invoked());
    Ok(())
}

#[test]
fn missing_uv_binary_exits_127() -> Result<()> {
    let uv = FakeUv::install(RECORDING_UV)?;
    let empty = tempfile::tempdir()?;

    let output = launcher_command(&uv)
        .env("PATH", empty.path())
        .args(["run", "--mount"])
        .arg(fixture("inline_deps"))
        .output()?;

    assert_eq!(output.status.code(), Some(127), "{output:?}");
    let report = error_report(&output).expect("structured error on stderr");
    assert_eq!(report["code"], "LAUNCH_FAILED");
    Ok(())
}

#[test]
fn missing_subcommand_is_a_usage_error() -> Result<()> {
    let uv = FakeUv::install(RECORDING_UV)?;

    let output = launcher_command(&uv).output()?;

    assert_eq!(output.status.code(), Some(2), "{output:?}");
    Ok(())
}
