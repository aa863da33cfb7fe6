use crate::env::Environment;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Reported when a built-in rejects its arguments or fails to compute a result.
pub const EXIT_FAILURE: ExitCode = 1;

/// Reported when an external program was killed because it ran past its deadline.
pub const EXIT_TIMED_OUT: ExitCode = 124;

/// Reported when a program was found but the OS refused to start it.
///
/// Never produced by the child itself: spawn failures are detected in the parent.
pub const EXIT_CANNOT_EXECUTE: ExitCode = 126;

/// Reported when a program name could not be resolved to an executable file.
pub const EXIT_NOT_FOUND: ExitCode = 127;

/// Base added to a terminating signal number, e.g. 137 for SIGKILL.
pub const EXIT_SIGNAL_BASE: ExitCode = 128;

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command, writing any textual result to `stdout`.
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
