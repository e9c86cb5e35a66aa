//! Running ecosystem listing tools.
//!
//! Strategies never spawn processes themselves; they go through a
//! [`CommandRunner`] so tests can substitute canned output. The system
//! runner kills a tool still running after its timeout
//! ([`DEFAULT_TOOL_TIMEOUT`] unless set).

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::DiscoveryError;

/// How long a listing tool may run before it is killed.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(120);

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Runs an external program and returns its standard output.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<String, DiscoveryError>;
}

/// Runs programs with `std::process::Command`, killing any that outlive
/// the timeout.
#[derive(Debug, Clone, Copy)]
pub struct SystemCommandRunner {
    timeout: Duration,
}

impl SystemCommandRunner {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for SystemCommandRunner {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_TOOL_TIMEOUT)
    }
}

impl CommandRunner for SystemCommandRunner {
    /// A non-zero exit with output on stdout is still returned: `npm ls`
    /// exits 1 over unmet peer dependencies while listing everything else.
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<String, DiscoveryError> {
        let command_error = |reason: String| DiscoveryError::Command {
            program: program.to_string(),
            reason,
        };

        let mut child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| command_error(e.to_string()))?;

        // Drained concurrently: a full pipe would stall the child.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = wait_with_deadline(&mut child, self.timeout)
            .map_err(|e| command_error(e.to_string()))?;
        let Some(status) = status else {
            tracing::warn!(program, timeout = ?self.timeout, "listing tool timed out; killed");
            return Err(command_error(format!(
                "timed out after {}s",
                self.timeout.as_secs_f64()
            )));
        };

        let stdout = String::from_utf8(join(stdout)).map_err(|e| DiscoveryError::Parse {
            program: program.to_string(),
            reason: e.to_string(),
        })?;

        if !status.success() {
            if stdout.trim().is_empty() {
                let stderr = join(stderr);
                let stderr = String::from_utf8_lossy(&stderr);
                return Err(command_error(format!("{status}: {}", stderr.trim())));
            }
            tracing::debug!(program, status = %status, "listing tool exited non-zero; using its output");
        }
        Ok(stdout)
    }
}

/// Waits for `child` until `timeout` passes. `Ok(None)` means the child
/// was killed at the deadline.
fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
) -> std::io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            // The child may exit between `try_wait` and `kill`.
            let _ = child.kill();
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn join(handle: Option<thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}
