//! External command execution
//!
//! Every package-manager, mount and inspection call goes through the
//! [`CommandRunner`] trait so the pipeline can be driven by a scripted runner
//! in tests. Commands run to completion with no timeout.

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};
use std::process::{Command, Stdio};

use crate::error::SetupError;
use crate::run_log::RunLog;

/// A single external command: program, arguments and optional stdin payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<Vec<u8>>,
    /// Capture stdout/stderr; when false they go straight to the console
    pub capture: bool,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            stdin: None,
            capture: true,
        }
    }

    /// Stream output live instead of capturing it, for long-running commands
    /// whose output is only for the operator
    pub fn streamed(mut self) -> Self {
        self.capture = false;
        self
    }

    /// Feed `input` to the command's stdin
    pub fn with_stdin(mut self, input: Vec<u8>) -> Self {
        self.stdin = Some(input);
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Exit status and captured output of a finished command.
///
/// Output of streamed invocations is never captured and stays empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was terminated by a signal
    pub code: Option<i32>,
    /// Raw stdout; may be binary (e.g. a fetched signing key)
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn stdout_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }
}

/// Runs external commands on behalf of the setup steps
pub trait CommandRunner {
    /// Run `inv` to completion. `Err` means the process could not be spawned.
    fn run(&mut self, inv: &Invocation) -> io::Result<CommandOutput>;
}

/// Runs `inv` and turns spawn failures and non-zero exits into [`SetupError`]
pub fn run_checked<R: CommandRunner + ?Sized>(
    runner: &mut R,
    inv: &Invocation,
) -> Result<CommandOutput, SetupError> {
    let output = runner.run(inv).map_err(|source| SetupError::Spawn {
        command: inv.to_string(),
        source,
    })?;

    if !output.success() {
        return Err(SetupError::CommandFailed {
            command: inv.to_string(),
            code: output.code,
        });
    }

    Ok(output)
}

/// Runs commands on the host with `std::process::Command`
pub struct SystemRunner {
    log: Option<RunLog>,
}

impl SystemRunner {
    pub fn new(log: Option<RunLog>) -> Self {
        Self { log }
    }

    /// The run log, if one is being written
    pub fn run_log(&self) -> Option<&RunLog> {
        self.log.as_ref()
    }
}

impl CommandRunner for SystemRunner {
    fn run(&mut self, inv: &Invocation) -> io::Result<CommandOutput> {
        println!("▶ {}", inv);
        log::debug!("Spawning: {}", inv);
        if let Some(ref log) = self.log {
            log.info(&format!("$ {}", inv));
        }

        let mut cmd = Command::new(&inv.program);
        cmd.args(&inv.args);
        if inv.capture {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }
        if inv.stdin.is_some() {
            cmd.stdin(Stdio::piped());
        } else {
            cmd.stdin(Stdio::null());
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                if let Some(ref log) = self.log {
                    log.error(&format!("Failed to spawn {}: {}", inv.program, e));
                }
                return Err(e);
            }
        };

        if let Some(ref input) = inv.stdin {
            if let Some(mut stdin) = child.stdin.take() {
                // A child that exits without reading all input still reports its own status
                match stdin.write_all(input) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                        log::debug!("{} closed stdin early", inv.program);
                    }
                    Err(e) => {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(e);
                    }
                }
                // stdin is dropped here so the child sees EOF
            }
        }

        let output = child.wait_with_output()?;
        let result = CommandOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        // Binary output (keys) is not echoed
        let stdout_text = std::str::from_utf8(&result.stdout).ok();
        if inv.capture {
            if let Some(text) = stdout_text {
                print!("{}", text);
            }
            eprint!("{}", result.stderr);
            io::stdout().flush().ok();
        }

        if let Some(ref log) = self.log {
            if !inv.capture {
                log.info("  (output streamed to console)");
            } else {
                match stdout_text {
                    Some(text) => log.log_stdout(text),
                    None => log.info(&format!(
                        "  stdout: <{} bytes of binary output>",
                        result.stdout.len()
                    )),
                }
                log.log_stderr(&result.stderr);
            }
            match result.code {
                Some(code) => log.info(&format!("exit status {}", code)),
                None => log.warn("terminated by signal"),
            }
        }

        Ok(result)
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeRunner;
    use super::*;

    #[test]
    fn test_invocation_display() {
        let inv = Invocation::new("apt-get", ["install", "-y", "gcsfuse"]);
        assert_eq!(inv.to_string(), "apt-get install -y gcsfuse");
    }

    #[test]
    fn test_run_checked_success() {
        let mut runner = FakeRunner::new().stdout("lsb_release", "jammy\n");
        let out = run_checked(&mut runner, &Invocation::new("lsb_release", ["-c", "-s"])).unwrap();
        assert_eq!(out.stdout_text(), "jammy\n");
    }

    #[test]
    fn test_run_checked_non_zero_exit() {
        let mut runner = FakeRunner::new().exit("yum", 1);
        let err = run_checked(&mut runner, &Invocation::new("yum", ["install", "-y", "gcsfuse"]))
            .unwrap_err();
        match err {
            SetupError::CommandFailed { command, code } => {
                assert_eq!(command, "yum install -y gcsfuse");
                assert_eq!(code, Some(1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_run_checked_spawn_failure() {
        let mut runner = FakeRunner::new().missing("gcsfuse");
        let err = run_checked(&mut runner, &Invocation::new("gcsfuse", ["--version"])).unwrap_err();
        assert!(matches!(err, SetupError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_output_and_stdin() {
        let mut runner = SystemRunner::new(None);
        let inv = Invocation::new("cat", Vec::<String>::new()).with_stdin(b"hello".to_vec());
        let out = runner.run(&inv).unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, b"hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_exit_code() {
        let mut runner = SystemRunner::new(None);
        let out = runner.run(&Invocation::new("sh", ["-c", "exit 3"])).unwrap();
        assert_eq!(out.code, Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn test_child_exit_status_survives_unread_stdin() {
        let mut runner = SystemRunner::new(None);
        let inv = Invocation::new("sh", ["-c", "exit 5"]).with_stdin(vec![b'k'; 4 * 1024 * 1024]);

        let out = runner.run(&inv).unwrap();
        assert_eq!(out.code, Some(5));

        let err = run_checked(&mut runner, &inv).unwrap_err();
        assert_eq!(err.exit_code(), 5);
    }

    #[cfg(unix)]
    #[test]
    fn test_streamed_command_keeps_exit_code() {
        let mut runner = SystemRunner::new(None);
        let inv = Invocation::new("sh", ["-c", "echo streaming; exit 4"]).streamed();

        let out = runner.run(&inv).unwrap();
        assert_eq!(out.code, Some(4));
        assert!(out.stdout.is_empty());
    }

    #[test]
    fn test_system_runner_spawn_error() {
        let mut runner = SystemRunner::new(None);
        let result = runner.run(&Invocation::new(
            "gcsmount-definitely-not-a-real-command",
            Vec::<String>::new(),
        ));
        assert!(result.is_err());
    }
}
