use std::io::{Read, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

use crate::foundation::error::{PlotError, PlotResult};

/// An external encoder with piped stdin and a background stderr drain.
///
/// The child is always reaped: [`PipedChild::finish`] closes stdin and waits; dropping an
/// unfinished child kills it first.
pub struct PipedChild {
    command_line: String,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
}

/// How an external encoder ended.
#[derive(Debug)]
pub struct ProcessOutcome {
    pub command_line: String,
    pub status: ExitStatus,
    pub stderr: String,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// `Ok` on a zero exit status, otherwise an encoding error carrying code and stderr.
    pub fn into_result(self) -> PlotResult<()> {
        if self.status.success() {
            return Ok(());
        }
        Err(PlotError::encoding(
            self.command_line,
            self.status.code(),
            self.stderr,
        ))
    }
}

impl PipedChild {
    pub fn spawn(mut cmd: Command) -> PlotResult<Self> {
        let command_line = command_line(&cmd);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            PlotError::encoding(&command_line, None, format!("failed to spawn: {e}"))
        })?;

        let stdin = child.stdin.take();
        let stderr = child.stderr.take();
        let stderr_drain = stderr.map(|mut stderr| {
            std::thread::spawn(move || {
                let mut bytes = Vec::new();
                stderr.read_to_end(&mut bytes)?;
                Ok(bytes)
            })
        });

        Ok(Self {
            command_line,
            child: Some(child),
            stdin,
            stderr_drain,
        })
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn stdin(&mut self) -> Option<&mut ChildStdin> {
        self.stdin.as_mut()
    }

    /// Close stdin, wait for exit and collect stderr.
    pub fn finish(mut self) -> PlotResult<ProcessOutcome> {
        drop(self.stdin.take());
        let Some(mut child) = self.child.take() else {
            return Err(PlotError::encoding(
                &self.command_line,
                None,
                "process already reaped",
            ));
        };

        let status = child.wait().map_err(|e| {
            PlotError::encoding(&self.command_line, None, format!("failed to wait: {e}"))
        })?;
        let stderr = match self.stderr_drain.take() {
            Some(handle) => match handle.join() {
                Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
                Ok(Err(e)) => format!("<stderr read failed: {e}>"),
                Err(_) => "<stderr drain thread panicked>".to_string(),
            },
            None => String::new(),
        };

        Ok(ProcessOutcome {
            command_line: std::mem::take(&mut self.command_line),
            status,
            stderr,
        })
    }
}

impl Drop for PipedChild {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }
}

/// Run `cmd`, hand its stdin to `feed`, then wait for it to exit.
///
/// A non-zero exit wins over a broken pipe: the encoder's own stderr explains more than
/// the write failure does.
pub fn run_piped<F>(cmd: Command, feed: F) -> PlotResult<()>
where
    F: FnOnce(&mut ChildStdin) -> std::io::Result<()>,
{
    let mut child = PipedChild::spawn(cmd)?;
    let write_result = match child.stdin() {
        Some(stdin) => feed(&mut *stdin).and_then(|()| stdin.flush()),
        None => Ok(()),
    };
    let outcome = child.finish()?;
    if !outcome.success() {
        return outcome.into_result();
    }
    write_result.map_err(|e| {
        PlotError::encoding(
            outcome.command_line,
            outcome.status.code(),
            format!("failed to write to stdin: {e}"),
        )
    })
}

/// Render `cmd` the way it would be typed in a shell, for error messages and logs.
pub fn command_line(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|s| s.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Return `true` when `program -version` can be run from `PATH`.
pub fn is_tool_on_path(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
