use std::path::PathBuf;

use notebook_launcher::{
    cli::{resolve_launch_config, ConfigKey, ConfigSource, MapEnv},
    launcher::{prepare_launch, DependencyStrategy, GitCloner},
    lib::errors::LauncherError,
};

use crate::common::fixture;

fn resolve(sources: &[&dyn ConfigSource]) -> Result<Vec<String>, LauncherError> {
    let config = resolve_launch_config(sources)?;
    Ok(prepare_launch(&config, &GitCloner::default())?.command.args)
}

#[test]
fn environment_only_inline_notebook() {
    let env = MapEnv::named("env").set(
        ConfigKey::Mount,
        &fixture("inline_deps").display().to_string(),
    );

    let args = resolve(&[&env]).expect("inline fixture resolves");

    assert_eq!(
        args,
        vec![
            "run",
            "marimo",
            "run",
            "--headless",
            "--host",
            "0.0.0.0",
            "--port",
            "2718",
            "--sandbox",
            "--no-token",
            "notebook.py",
        ]
    );
}

#[test]
fn flags_override_environment_for_requirements_scenario() {
    let flags = MapEnv::named("flags")
        .set(
            ConfigKey::Mount,
            &fixture("static_deps_reqs_txt").display().to_string(),
        )
        .set(ConfigKey::Port, "9000");
    let env = MapEnv::named("env")
        .set(ConfigKey::Mount, "/does/not/exist")
        .set(ConfigKey::Port, "8000")
        .set(ConfigKey::Requirements, "requirements.txt");

    let config = resolve_launch_config(&[&flags, &env]).expect("config resolves");
    let prepared = prepare_launch(&config, &GitCloner::default()).expect("fixture resolves");

    assert_eq!(
        prepared.strategy,
        DependencyStrategy::ExternalFile(
            fixture("static_deps_reqs_txt").join(PathBuf::from("requirements.txt"))
        )
    );
    assert!(prepared
        .command
        .args
        .windows(2)
        .any(|pair| pair[0] == "--port" && pair[1] == "9000"));
}

#[test]
fn missing_notebook_in_mount_is_not_found() {
    let env = MapEnv::named("env")
        .set(
            ConfigKey::Mount,
            &fixture("inline_deps").display().to_string(),
        )
        .set(ConfigKey::NotebookPath, "bad-notebook.py");

    let error = resolve(&[&env]).expect_err("notebook is missing");

    match error {
        LauncherError::NotFound { what, path } => {
            assert_eq!(what, "notebook file");
            assert_eq!(path, fixture("inline_deps").join("bad-notebook.py"));
        }
        other => panic!("Unexpected error: {other:?}"),
    }
}
