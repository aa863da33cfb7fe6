//! Spawning external programs and waiting for them against a deadline.
//!
//! A child moves through `spawning -> running -> {exited | signaled | timed out}`.
//! While it runs, the supervisor polls it with [`Child::try_wait`] every
//! [`SupervisionConfig::poll_interval`]. Once [`SupervisionConfig::timeout`] has
//! elapsed since spawn, the child is killed with a signal it cannot catch and
//! reaped with a final blocking wait, so no zombie is left behind.

use crate::command::{EXIT_SIGNAL_BASE, EXIT_TIMED_OUT, ExitCode};
use log::{debug, info, trace, warn};
use std::fmt;
use std::io;
use std::path::Path;
use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Wall-clock budget a child gets from spawn before it is killed.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Delay between two liveness checks of a running child.
///
/// Shorter intervals kill overdue children sooner at the cost of more wakeups.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Deadline and polling cadence applied to supervised programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisionConfig {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl SupervisionConfig {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }
}

impl Default for SupervisionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// Terminal state of a supervised child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The child exited on its own with this status code.
    Exited(i32),
    /// The child was terminated by this signal, not by the supervisor.
    Signaled(i32),
    /// The child outlived its deadline and was killed and reaped.
    TimedOut { after: Duration },
}

impl ProcessOutcome {
    /// Shell-style status: the exit code, 128 + signal, or 124 for a timeout.
    pub fn exit_code(&self) -> ExitCode {
        match *self {
            ProcessOutcome::Exited(code) => code,
            ProcessOutcome::Signaled(signal) => EXIT_SIGNAL_BASE + signal,
            ProcessOutcome::TimedOut { .. } => EXIT_TIMED_OUT,
        }
    }
}

impl fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessOutcome::Exited(code) => write!(f, "exited with status {code}"),
            ProcessOutcome::Signaled(signal) => write!(f, "terminated by signal {signal}"),
            ProcessOutcome::TimedOut { after } => {
                write!(f, "timed out after {}s, killed", after.as_secs_f64())
            }
        }
    }
}

/// Liveness of a child as last observed by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Finished(ProcessOutcome),
    /// The OS could not report the child's status.
    LookupFailed,
}

/// What the supervisor observed about one child, once it is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessReport {
    pub pid: u32,
    /// Time from spawn until the child was reaped.
    pub elapsed: Duration,
    pub outcome: ProcessOutcome,
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{0}: command not found")]
    NotFound(String),

    #[error("{program}: failed to execute: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program}: lost track of process {pid}: {source}")]
    Wait {
        program: String,
        pid: u32,
        #[source]
        source: io::Error,
    },
}

/// One spawned child, owned by the supervisor until it has been reaped.
///
/// Dropping a handle whose child is still running kills and reaps it.
#[derive(Debug)]
pub struct ProcessHandle {
    program: String,
    child: Child,
    pid: u32,
    started: Instant,
    state: ProcessState,
}

impl ProcessHandle {
    /// Start `program` with `args`, inheriting the standard streams.
    ///
    /// `name` is what the user typed. It becomes the child's `argv[0]` on Unix
    /// and labels every message about the child.
    pub fn spawn(program: &Path, name: &str, args: &[&str]) -> Result<Self, ProcessError> {
        let mut command = Command::new(program);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.arg0(name);
        }
        let child = command
            .args(args)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: name.to_owned(),
                source,
            })?;
        let pid = child.id();
        info!("spawned '{name}' from {} (pid {pid})", program.display());
        Ok(Self {
            program: name.to_owned(),
            child,
            pid,
            started: Instant::now(),
            state: ProcessState::Running,
        })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Non-blocking status check. Returns the outcome once the child is gone.
    pub fn poll(&mut self) -> Result<Option<ProcessOutcome>, ProcessError> {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                let outcome = outcome_from_status(status);
                self.state = ProcessState::Finished(outcome);
                Ok(Some(outcome))
            }
            Ok(None) => Ok(None),
            Err(source) => {
                self.state = ProcessState::LookupFailed;
                warn!(
                    "could not query '{}' (pid {}): {source}",
                    self.program, self.pid
                );
                // Best effort: the child may still be alive.
                self.kill_and_reap();
                Err(ProcessError::Wait {
                    program: self.program.clone(),
                    pid: self.pid,
                    source,
                })
            }
        }
    }

    /// Wait for the child, killing it if it is still running once the deadline passes.
    pub fn wait_with_deadline(
        mut self,
        config: &SupervisionConfig,
    ) -> Result<ProcessReport, ProcessError> {
        let deadline = self.started + config.timeout;
        loop {
            if let Some(outcome) = self.poll()? {
                return Ok(self.report(outcome));
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            trace!("pid {} still running", self.pid);
            thread::sleep(config.poll_interval.min(deadline - now));
        }

        info!(
            "'{}' (pid {}) exceeded {:?}, killing it",
            self.program, self.pid, config.timeout
        );
        self.kill_and_reap();
        let outcome = ProcessOutcome::TimedOut {
            after: config.timeout,
        };
        self.state = ProcessState::Finished(outcome);
        Ok(self.report(outcome))
    }

    fn report(&self, outcome: ProcessOutcome) -> ProcessReport {
        let report = ProcessReport {
            pid: self.pid,
            elapsed: self.started.elapsed(),
            outcome,
        };
        debug!("'{}' (pid {}) {outcome}", self.program, self.pid);
        report
    }

    /// SIGKILL on Unix, then a blocking wait so the process table entry is released.
    fn kill_and_reap(&mut self) {
        if let Err(err) = self.child.kill() {
            // Fails only if the child has already been reaped.
            debug!("kill of pid {} failed: {err}", self.pid);
        }
        match self.child.wait() {
            Ok(status) => debug!("reaped pid {} ({status})", self.pid),
            Err(err) => warn!("failed to reap pid {}: {err}", self.pid),
        }
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if self.state == ProcessState::Running {
            self.kill_and_reap();
        }
    }
}

/// Spawn `program` as `name` and supervise it until it finishes or is killed at the deadline.
pub fn supervise(
    program: &Path,
    name: &str,
    args: &[&str],
    config: &SupervisionConfig,
) -> Result<ProcessReport, ProcessError> {
    ProcessHandle::spawn(program, name, args)?.wait_with_deadline(config)
}

#[cfg(unix)]
fn outcome_from_status(status: ExitStatus) -> ProcessOutcome {
    use std::os::unix::process::ExitStatusExt;
    match (status.code(), status.signal()) {
        (Some(code), _) => ProcessOutcome::Exited(code),
        (None, Some(signal)) => ProcessOutcome::Signaled(signal),
        (None, None) => ProcessOutcome::Exited(-1),
    }
}

#[cfg(not(unix))]
fn outcome_from_status(status: ExitStatus) -> ProcessOutcome {
    ProcessOutcome::Exited(status.code().unwrap_or(-1))
}
