use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::config::Config;
use crate::enforcement::{self, capability::ScreenedCommand};
use crate::error::SkillError;

/// Raw `bash` parameters as the agent sends them.
#[derive(Debug, Default, Deserialize)]
struct BashParams {
    command: Option<String>,
    timeout: Option<u64>,
    workdir: Option<PathBuf>,
}

/// A bash request with every default applied.
#[derive(Debug)]
pub struct CommandRequest {
    pub command: String,
    /// Seconds. Defaults to `Config::default_timeout` (30).
    pub timeout: u64,
    /// Defaults to `Config::default_workdir` (`/tmp`). Not checked until spawn.
    pub workdir: PathBuf,
}

impl CommandRequest {
    pub fn from_params(params: serde_json::Value, config: &Config) -> Result<Self, SkillError> {
        let params: BashParams = super::parse_params("bash", params)?;
        let timeout = params.timeout.unwrap_or(config.default_timeout);
        if timeout == 0 {
            return Err(SkillError::Validation(
                "timeout must be a positive number of seconds".to_owned(),
            ));
        }
        Ok(Self {
            command: params.command.unwrap_or_default(),
            timeout,
            workdir: params
                .workdir
                .unwrap_or_else(|| config.default_workdir.clone()),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub command: String,
}

/// Screen `request` against the denylist, then run it.
pub async fn execute(request: CommandRequest, config: &Config) -> Result<CommandResult, SkillError> {
    let screened = enforcement::screen(&request.command, &config.policy)?;
    run(screened, request.timeout, &request.workdir).await
}

/// Run a screened command through `sh -c` in `workdir`, capturing stdout and
/// stderr separately. The child is killed once `timeout_secs` elapse.
pub async fn run(
    command: ScreenedCommand,
    timeout_secs: u64,
    workdir: &Path,
) -> Result<CommandResult, SkillError> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command.as_str())
        .current_dir(workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(execution_failed)?;

    tracing::debug!(pid = child.id(), workdir = %workdir.display(), "spawned");

    let (Some(mut stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return Err(SkillError::Execution(
            "Command execution failed: output pipes not captured".to_owned(),
        ));
    };

    let finished = tokio::time::timeout(Duration::from_secs(timeout_secs), async {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let (out_read, err_read, status) = tokio::join!(
            stdout.read_to_end(&mut out),
            stderr.read_to_end(&mut err),
            child.wait()
        );
        out_read?;
        err_read?;
        Ok::<_, std::io::Error>((out, err, status?))
    })
    .await;

    let (out, err, status) = match finished {
        Ok(result) => result.map_err(execution_failed)?,
        Err(_) => {
            let _ = child.kill().await;
            tracing::debug!(timeout_secs, "killed after timeout");
            return Err(SkillError::Timeout {
                secs: timeout_secs,
            });
        }
    };

    let exit_code = exit_code(status);
    tracing::debug!(exit_code, "exited");

    Ok(CommandResult {
        stdout: String::from_utf8_lossy(&out).into_owned(),
        stderr: String::from_utf8_lossy(&err).into_owned(),
        exit_code,
        command: command.as_str().to_owned(),
    })
}

fn execution_failed(e: std::io::Error) -> SkillError {
    SkillError::Execution(format!("Command execution failed: {e}"))
}

/// Exit code as the shell reports it; signal deaths become `-signal`.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}
