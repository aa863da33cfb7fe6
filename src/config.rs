//! Command-line options of the `sword-shell` binary.

use crate::interpreter::DEFAULT_PROMPT;
use crate::supervisor::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, SupervisionConfig};
use anyhow::{Result, ensure};
use argh::FromArgs;
use std::time::Duration;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_owned()
}

#[derive(FromArgs, Debug)]
/// Interactive command interpreter with built-in `fib` and `caesar` commands.
/// External programs are killed once they run past the timeout.
pub struct ShellOptions {
    #[argh(option, default = "default_timeout_ms()")]
    /// milliseconds an external program may run before it is killed (default 5000)
    pub timeout_ms: u64,

    #[argh(option, default = "default_poll_interval_ms()")]
    /// milliseconds between two checks of a running program (default 100)
    pub poll_interval_ms: u64,

    #[argh(option, default = "default_prompt()")]
    /// prompt printed before each line
    pub prompt: String,

    #[argh(switch, short = 'v')]
    /// log debug diagnostics to stderr
    pub verbose: bool,
}

impl ShellOptions {
    /// Supervision limits described by these options.
    pub fn supervision(&self) -> Result<SupervisionConfig> {
        ensure!(self.timeout_ms > 0, "--timeout-ms must be greater than zero");
        ensure!(
            self.poll_interval_ms > 0,
            "--poll-interval-ms must be greater than zero"
        );
        Ok(SupervisionConfig::new(
            Duration::from_millis(self.timeout_ms),
            Duration::from_millis(self.poll_interval_ms),
        ))
    }

    /// Log filter used unless `RUST_LOG` overrides it.
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "warn" }
    }
}
