//! Command runner abstraction for shelling out to package managers.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::console::Console;
use crate::platform;

/// Default timeout for package-manager invocations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Timeout for cheap probes (`command -v`, `sudo -n true`, pings).
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
/// Failure modes of a single external command invocation.
pub enum CommandError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` timed out after {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },
    #[error("`{command}` exited with status {status}")]
    Failed {
        command: String,
        status: i32,
        stderr: String,
    },
}

/// Runner interface for invoking external commands.
pub trait Runner: Send + Sync {
    /// Execute a command, enforcing `timeout`, and return its captured output.
    fn output(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output, CommandError>;
}

struct RealRunner;

impl Runner for RealRunner {
    fn output(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output, CommandError> {
        let command = render_command(program, args);
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                command: command.clone(),
                source,
            })?;

        // Drain the pipes on their own threads; a child that fills a pipe
        // buffer would otherwise never reach try_wait completion.
        let stdout = spawn_drain(child.stdout.take());
        let stderr = spawn_drain(child.stderr.take());

        let status = wait_with_deadline(&mut child, &command, timeout)?;
        Ok(Output {
            status,
            stdout: join_drain(stdout),
            stderr: join_drain(stderr),
        })
    }
}

fn wait_with_deadline(
    child: &mut Child,
    command: &str,
    timeout: Duration,
) -> Result<ExitStatus, CommandError> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(CommandError::Timeout {
                        command: command.to_string(),
                        timeout,
                    });
                }
                thread::sleep(Duration::from_millis(50));
            }
            Err(source) => {
                return Err(CommandError::Spawn {
                    command: command.to_string(),
                    source,
                });
            }
        }
    }
}

fn spawn_drain<R: Read + Send + 'static>(reader: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    reader.map(|mut reader| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = reader.read_to_end(&mut buf);
            buf
        })
    })
}

fn join_drain(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

fn render_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

static RUNNER: OnceLock<RwLock<Arc<dyn Runner>>> = OnceLock::new();
static TEST_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn runner_lock() -> &'static RwLock<Arc<dyn Runner>> {
    RUNNER.get_or_init(|| RwLock::new(Arc::new(RealRunner)))
}

/// Run a command and capture its output.
pub fn run_output(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<Output, CommandError> {
    let runner = runner_lock().read().expect("runner lock poisoned");
    runner.output(program, args, timeout)
}

/// Run a command and return its exit status.
pub fn run_status(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<ExitStatus, CommandError> {
    Ok(run_output(program, args, timeout)?.status)
}

/// Check if a command is present on PATH. Probe failures count as absent.
pub fn command_exists(command: &str) -> bool {
    let status = if platform::is_windows() {
        run_status("where", &[command], PROBE_TIMEOUT)
    } else {
        let probe = format!("command -v {}", command);
        run_status("sh", &["-c", &probe], PROBE_TIMEOUT)
    };
    status.map(|status| status.success()).unwrap_or(false)
}

/// Guard that restores the previous runner when dropped.
pub struct RunnerGuard {
    previous: Arc<dyn Runner>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

impl Drop for RunnerGuard {
    fn drop(&mut self) {
        let mut runner = runner_lock().write().expect("runner lock poisoned");
        *runner = self.previous.clone();
    }
}

/// Override the runner for tests; restores on guard drop.
pub fn set_runner_for_tests(runner: Arc<dyn Runner>) -> RunnerGuard {
    let lock = TEST_LOCK.get_or_init(|| Mutex::new(()));
    let guard = lock.lock().expect("runner test lock poisoned");
    let previous = {
        let mut slot = runner_lock().write().expect("runner lock poisoned");
        let previous = slot.clone();
        *slot = runner;
        previous
    };
    RunnerGuard {
        previous,
        _lock: guard,
    }
}

/// Captured result of one command invocation, decoded to text.
#[derive(Debug, Clone)]
pub struct CmdOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    /// True when the command exited with status zero.
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

#[derive(Clone, Copy, Debug)]
/// Dry-run-aware command front end handed to each updater.
pub struct CommandRunner {
    console: Console,
    dry_run: bool,
}

impl CommandRunner {
    pub fn new(console: Console, dry_run: bool) -> Self {
        Self { console, dry_run }
    }

    /// The console handle this runner reports through.
    pub fn console(&self) -> Console {
        self.console
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run a command; a non-zero exit becomes `CommandError::Failed`.
    pub fn run(&self, program: &str, args: &[&str]) -> Result<CmdOutput, CommandError> {
        self.run_with(program, args, true, DEFAULT_TIMEOUT)
    }

    /// Run a command, returning non-zero exits to the caller for inspection.
    pub fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<CmdOutput, CommandError> {
        self.run_with(program, args, false, DEFAULT_TIMEOUT)
    }

    /// Full form: explicit success check and timeout.
    pub fn run_with(
        &self,
        program: &str,
        args: &[&str],
        check: bool,
        timeout: Duration,
    ) -> Result<CmdOutput, CommandError> {
        let command = render_command(program, args);
        if self.dry_run {
            self.console.info(&format!("[dry-run] {command}"));
            return Ok(CmdOutput {
                status: 0,
                stdout: String::new(),
                stderr: String::new(),
            });
        }

        let output = match run_output(program, args, timeout) {
            Ok(output) => output,
            Err(err) => {
                self.console.error(&format!("command error: {err}"));
                return Err(err);
            }
        };
        let result = CmdOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if check && !result.success() {
            self.console.error(&format!("command failed: {command}"));
            let stderr = result.stderr.trim();
            if !stderr.is_empty() {
                self.console.error(&format!("stderr: {stderr}"));
            }
            return Err(CommandError::Failed {
                command,
                status: result.status,
                stderr: result.stderr,
            });
        }
        Ok(result)
    }

    /// Check if a command is present on PATH.
    pub fn command_exists(&self, command: &str) -> bool {
        command_exists(command)
    }
}
