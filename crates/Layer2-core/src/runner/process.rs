//! StreamingRunner - 에이전트 프로세스를 띄우고 stdout을 실시간으로 해석

use super::{AgentRunner, RunOutput, StreamCollector};
use crate::command::PromptCommand;
use crate::stream::decode;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{ChildStderr, Command};
use tokio::task::JoinHandle;
use toolbridge_foundation::{BridgeConfig, Error, Result, DEFAULT_TIMEOUT_SECS};
use tracing::{debug, error, info, warn};

/// 실제 프로세스 실행기
#[derive(Debug, Clone)]
pub struct StreamingRunner {
    timeout: Duration,
}

impl Default for StreamingRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl StreamingRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(Duration::from_secs(config.timeout_secs))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 실행할 프로세스 구성
    ///
    /// 파이프가 들어간 stdin 형식은 셸을 거치고, 인자 형식은 셸 없이 직접
    /// 실행한다.
    fn command_for(command: &PromptCommand, working_dir: &Path) -> Result<Command> {
        let mut cmd = if command.needs_shell() {
            let (shell, shell_arg) = if cfg!(windows) {
                ("cmd", "/C")
            } else {
                ("sh", "-c")
            };
            let mut cmd = Command::new(shell);
            cmd.arg(shell_arg).arg(&command.line);
            cmd
        } else {
            let argv = shlex::split(&command.line).ok_or_else(|| {
                Error::CommandConstruction(format!("Unbalanced quoting in: {}", command.line))
            })?;
            let (program, args) = argv
                .split_first()
                .ok_or_else(|| Error::CommandConstruction("Empty command line".to_string()))?;
            let mut cmd = Command::new(program);
            cmd.args(args);
            cmd
        };

        cmd.current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // 셸과 파이프 뒤의 에이전트를 한 그룹으로 묶어 함께 종료
        #[cfg(unix)]
        cmd.process_group(0);
        Ok(cmd)
    }
}

/// 프로세스 그룹 전체에 SIGKILL
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        debug!("killpg({}) failed: {}", pid, e);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}

/// stderr 전체를 백그라운드에서 수집
fn drain_stderr(stderr: Option<ChildStderr>) -> JoinHandle<String> {
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut stderr) = stderr {
            if let Err(e) = stderr.read_to_end(&mut buf).await {
                debug!("stderr read interrupted: {}", e);
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

#[async_trait]
impl AgentRunner for StreamingRunner {
    async fn run(
        &self,
        command: &PromptCommand,
        working_dir: &Path,
        tool_name: &str,
    ) -> Result<RunOutput> {
        info!(
            tool = %tool_name,
            mode = ?command.mode,
            "Starting agent in {}",
            working_dir.display()
        );
        debug!(tool = %tool_name, "Command: {}", command.line);

        let mut child = Self::command_for(command, working_dir)?
            .spawn()
            .map_err(|e| {
                error!(tool = %tool_name, "Failed to spawn agent: {}", e);
                Error::ProcessSpawn(e.to_string())
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::ProcessSpawn("stdout was not captured".to_string()))?;
        let stderr_handle = drain_stderr(child.stderr.take());

        let streaming = async {
            let mut collector = StreamCollector::new();
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        for event in decode(&line) {
                            if let Some(log) = event.log_line() {
                                debug!(tool = %tool_name, "{}", log);
                            }
                            collector.push(event);
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!(tool = %tool_name, "Stopped reading agent output: {}", e);
                        break;
                    }
                }
            }
            let status = child.wait().await;
            (collector, status)
        };

        let outcome = tokio::time::timeout(self.timeout, streaming).await;

        let (collector, status) = match outcome {
            Ok(done) => done,
            Err(_) => {
                if let Some(pid) = child.id() {
                    kill_process_group(pid);
                }
                if let Err(e) = child.kill().await {
                    warn!(tool = %tool_name, "Failed to kill timed out agent: {}", e);
                }
                stderr_handle.abort();
                error!(
                    tool = %tool_name,
                    "Agent timed out after {:.0}s",
                    self.timeout.as_secs_f64()
                );
                return Err(Error::ProcessTimeout(self.timeout.as_secs()));
            }
        };

        let status = status?;
        let stderr = stderr_handle.await.unwrap_or_default();

        if status.success() {
            info!(
                tool = %tool_name,
                events = collector.event_count(),
                "Agent finished"
            );
            return Ok(collector.finish());
        }

        // 시그널로 종료되면 코드가 없다
        let code = status.code().unwrap_or(-1);
        error!(tool = %tool_name, "Agent exited with code {}", code);
        if !stderr.trim().is_empty() {
            debug!(tool = %tool_name, "stderr: {}", stderr.trim());
        }
        Err(Error::process_exit(code, stderr.trim()))
    }
}

// ============================================================================
// 테스트
// ============================================================================
