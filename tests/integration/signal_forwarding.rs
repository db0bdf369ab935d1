use std::{
    process::Stdio,
    thread,
    time::{Duration, Instant},
};

use anyhow::{bail, Result};

use crate::common::{fixture, launcher_command, FakeUv, LONG_RUNNING_UV};

const DEADLINE: Duration = Duration::from_secs(15);

#[test]
fn sigterm_is_forwarded_and_child_exit_code_propagates() -> Result<()> {
    let uv = FakeUv::install(LONG_RUNNING_UV)?;
    let mut launcher = launcher_command(&uv)
        .args(["run", "--mount"])
        .arg(fixture("inline_deps"))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    let started = Instant::now();
    while !uv.dir().join("ready").exists() {
        if started.elapsed() > DEADLINE {
            let _ = launcher.kill();
            bail!("fake uv never became ready");
        }
        thread::sleep(Duration::from_millis(50));
    }

    // SAFETY: kill(2) has no memory-safety preconditions.
    let sent = unsafe { libc::kill(launcher.id() as libc::pid_t, libc::SIGTERM) };
    assert_eq!(sent, 0);

    let status = loop {
        if let Some(status) = launcher.try_wait()? {
            break status;
        }
        if started.elapsed() > DEADLINE {
            let _ = launcher.kill();
            bail!("launcher did not exit after SIGTERM");
        }
        thread::sleep(Duration::from_millis(50));
    };

    assert_eq!(status.code(), Some(143), "{status:?}");
    assert!(
        uv.dir().join("signal").exists(),
        "the child should have handled the forwarded SIGTERM"
    );
    Ok(())
}
