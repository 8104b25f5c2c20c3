//! Process invocation for engine and builder stages.
//!
//! Stage output is inherited so engine diagnostics stream straight to the
//! terminal or CI log. Only the stack export/import helpers pipe stdio.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::error::{DeployError, Result};
use crate::invocation::Invocation;
use crate::shutdown::{Shutdown, Signal};

/// Executes invocations and reports their exit codes.
#[allow(async_fn_in_trait)]
pub trait Runner {
    /// Run to completion and return the exit code. A shutdown request while
    /// the process runs stops it and yields [`DeployError::Interrupted`].
    async fn run(&mut self, invocation: &Invocation, shutdown: &mut Shutdown) -> Result<i32>;
}

/// Runs invocations as real child processes.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    kill_grace: Duration,
}

impl ProcessRunner {
    pub fn new(kill_grace: Duration) -> Self {
        Self { kill_grace }
    }

    /// Forward SIGTERM, give the child `kill_grace` to wind down, then kill it.
    async fn stop(&self, child: &mut Child, signal: Signal) {
        warn!(
            %signal,
            grace_secs = self.kill_grace.as_secs(),
            "shutdown requested, stopping running stage"
        );
        if let Some(pid) = child.id() {
            terminate(pid).await;
        }
        if tokio::time::timeout(self.kill_grace, child.wait())
            .await
            .is_err()
        {
            warn!("stage did not exit within the grace period, killing it");
            let _ = child.kill().await;
        }
    }
}

impl Runner for ProcessRunner {
    async fn run(&mut self, invocation: &Invocation, shutdown: &mut Shutdown) -> Result<i32> {
        if let Some(signal) = shutdown.requested() {
            return Err(DeployError::Interrupted(signal));
        }

        let mut cmd = command(invocation)?;
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        info!(stage = %invocation.stage, command = %invocation, "running");
        let mut child = cmd.spawn().map_err(|source| DeployError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        let status = tokio::select! {
            status = child.wait() => status?,
            signal = shutdown.wait() => {
                self.stop(&mut child, signal).await;
                return Err(DeployError::Interrupted(signal));
            }
        };

        let code = exit_code(status);
        debug!(stage = %invocation.stage, exit_code = code, "stage exited");
        Ok(code)
    }
}

/// Run `invocation` and return its stdout. A non-zero exit is a stage failure.
pub async fn capture(invocation: &Invocation) -> Result<Vec<u8>> {
    let mut cmd = command(invocation)?;
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());

    info!(stage = %invocation.stage, command = %invocation, "running");
    let output = cmd.output().await.map_err(|source| DeployError::Spawn {
        program: invocation.program.clone(),
        source,
    })?;
    check(invocation, output.status)?;
    Ok(output.stdout)
}

/// Run `invocation` with `input` on its stdin.
pub async fn feed(invocation: &Invocation, input: &[u8]) -> Result<()> {
    let mut cmd = command(invocation)?;
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    info!(stage = %invocation.stage, command = %invocation, "running");
    let mut child = cmd.spawn().map_err(|source| DeployError::Spawn {
        program: invocation.program.clone(),
        source,
    })?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input).await?;
        stdin.shutdown().await?;
    }
    let status = child.wait().await?;
    check(invocation, status)
}

fn command(invocation: &Invocation) -> Result<Command> {
    let program = resolve_program(&invocation.program, &invocation.cwd)?;
    let mut cmd = Command::new(program);
    cmd.args(&invocation.args)
        .current_dir(&invocation.cwd)
        .kill_on_drop(true);
    Ok(cmd)
}

/// Programs containing a path separator resolve against the invocation's
/// working directory; bare names are looked up on `PATH`.
fn resolve_program(program: &str, cwd: &Path) -> Result<PathBuf> {
    if program.contains('/') || program.contains(std::path::MAIN_SEPARATOR) {
        let candidate = cwd.join(program);
        return std::fs::canonicalize(&candidate)
            .ok()
            .filter(|p| p.is_file())
            .ok_or_else(|| DeployError::ToolNotFound(program.to_string()));
    }
    which::which(program).map_err(|_| DeployError::ToolNotFound(program.to_string()))
}

fn check(invocation: &Invocation, status: ExitStatus) -> Result<()> {
    match exit_code(status) {
        0 => Ok(()),
        code => Err(DeployError::StageFailed {
            stage: invocation.stage,
            code,
        }),
    }
}

/// Exit code of a finished process; termination by signal maps to `128 + signo`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signo) = status.signal() {
            return 128 + signo;
        }
    }
    1
}

#[cfg(unix)]
async fn terminate(pid: u32) {
    let _ = Command::new("kill")
        .arg("-TERM")
        .arg(pid.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
}

#[cfg(not(unix))]
async fn terminate(_pid: u32) {}
