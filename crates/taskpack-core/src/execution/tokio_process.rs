use std::sync::Mutex;
use std::time::SystemTime;

use tokio::io::AsyncReadExt;

use crate::execution::{
    CommandSpec, ExecutionResult, ProcessExecutor, ProcessExitStatus, ProcessOutput,
    ProcessWaitFuture, RunningProcess,
};
use crate::models::{CoreError, CoreErrorKind};

pub struct TokioProcessExecutor;

impl ProcessExecutor for TokioProcessExecutor {
    fn spawn(&self, command: CommandSpec) -> ExecutionResult<Box<dyn RunningProcess>> {
        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args);

        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(std::process::Stdio::null());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        let child = cmd.spawn().map_err(|error| {
            process_failure(format!(
                "failed to spawn {}: {error}",
                command.program.display()
            ))
        })?;

        let pid = child.id();

        Ok(Box::new(TokioRunningProcess {
            child: Mutex::new(Some(child)),
            pid,
            started_at: SystemTime::now(),
        }))
    }
}

struct TokioRunningProcess {
    child: Mutex<Option<tokio::process::Child>>,
    pid: Option<u32>,
    started_at: SystemTime,
}

impl RunningProcess for TokioRunningProcess {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn wait(self: Box<Self>) -> ProcessWaitFuture {
        let child = self.child.into_inner().ok().flatten();
        let started_at = self.started_at;

        Box::pin(async move {
            let mut child = child
                .ok_or_else(|| process_failure("child process already consumed".to_string()))?;

            // Drain both pipes concurrently so a chatty child cannot fill one and block.
            let mut stdout_pipe = child.stdout.take();
            let mut stderr_pipe = child.stderr.take();
            let stdout_reader = tokio::spawn(async move {
                let mut buffer = Vec::new();
                if let Some(handle) = stdout_pipe.as_mut() {
                    let _ = handle.read_to_end(&mut buffer).await;
                }
                buffer
            });
            let stderr_reader = tokio::spawn(async move {
                let mut buffer = Vec::new();
                if let Some(handle) = stderr_pipe.as_mut() {
                    let _ = handle.read_to_end(&mut buffer).await;
                }
                buffer
            });

            let status = child.wait().await.map_err(|error| {
                process_failure(format!("failed to wait for process: {error}"))
            })?;

            let stdout = stdout_reader.await.unwrap_or_default();
            let stderr = stderr_reader.await.unwrap_or_default();

            let status = match status.code() {
                Some(code) => ProcessExitStatus::ExitCode(code),
                None => ProcessExitStatus::Terminated,
            };

            Ok(ProcessOutput {
                status,
                stdout,
                stderr,
                started_at,
                finished_at: SystemTime::now(),
            })
        })
    }
}

fn process_failure(message: String) -> CoreError {
    CoreError::new(CoreErrorKind::ExternalTool, message)
}
