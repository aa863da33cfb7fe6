use crate::algorithms::{self, CaesarError, FIB_OVERFLOW};
use crate::command::{CommandFactory, EXIT_FAILURE, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::Result;
use log::debug;
use regex::Regex;
use std::io::Write;
use std::sync::LazyLock;
use thiserror::Error;

/// Optional sign followed by decimal digits, nothing else.
static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("integer pattern is valid"));

/// Failures of built-in commands. The messages are shown to the user verbatim.
#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("Usage: fib <n>")]
    FibUsage,
    #[error("Invalid input. Usage: fib <n>")]
    FibInvalid,
    #[error("Error: Fibonacci number too large.")]
    FibTooLarge,
    #[error("Invalid input. Usage: caesar <shift> <text>")]
    CaesarInvalid,
    #[error("Error: Memory allocation failed.")]
    OutOfMemory(#[source] CaesarError),
}

/// Built-in commands known to the shell at compile time.
///
/// Builtins validate their own arguments and run directly in-process without
/// spawning a child process.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "fib" or "caesar".
    fn name() -> &'static str;

    /// Validates the arguments that follow the command name.
    fn from_args(args: &[&str]) -> Result<Self, BuiltinError>;

    /// Executes the command using the provided output stream and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match <T as BuiltinCommand>::execute(*self, stdout, env) {
            Ok(x) => Ok(x),
            Err(e) => {
                debug!("{} failed: {e:#}", T::name());
                writeln!(stdout, "{e}")?;
                Ok(EXIT_FAILURE)
            }
        }
    }
}

/// Stands in for a builtin whose arguments were rejected.
struct InvalidArgs {
    error: BuiltinError,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        writeln!(stdout, "{}", self.error)?;
        Ok(EXIT_FAILURE)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(args) {
                Ok(cmd) => Box::new(cmd),
                Err(error) => Box::new(InvalidArgs { error }),
            })
        } else {
            None
        }
    }
}

/// Parse a base-10 integer with an optional sign, rejecting trailing garbage
/// and values outside the `i64` range.
pub(crate) fn parse_integer(text: &str) -> Option<i64> {
    if !INTEGER.is_match(text) {
        debug!("{text:?} is not a decimal integer");
        return None;
    }
    match text.parse() {
        Ok(value) => Some(value),
        Err(err) => {
            debug!("{text:?} is out of range: {err}");
            None
        }
    }
}

/// Print the n-th Fibonacci number.
#[derive(Debug, PartialEq, Eq)]
pub struct Fib {
    pub n: u64,
}

impl BuiltinCommand for Fib {
    fn name() -> &'static str {
        "fib"
    }

    fn from_args(args: &[&str]) -> Result<Self, BuiltinError> {
        let [arg] = args else {
            return Err(BuiltinError::FibUsage);
        };
        let n = parse_integer(arg)
            .and_then(|n| u64::try_from(n).ok())
            .ok_or(BuiltinError::FibInvalid)?;
        Ok(Self { n })
    }

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        let value = algorithms::compute_fibonacci(self.n);
        if value == FIB_OVERFLOW {
            return Err(BuiltinError::FibTooLarge.into());
        }
        writeln!(stdout, "{value}")?;
        Ok(0)
    }
}

/// Caesar-encrypt the words after the shift and print them on one line.
#[derive(Debug, PartialEq, Eq)]
pub struct Caesar {
    pub shift: i32,
    pub words: Vec<String>,
}

impl BuiltinCommand for Caesar {
    fn name() -> &'static str {
        "caesar"
    }

    fn from_args(args: &[&str]) -> Result<Self, BuiltinError> {
        let [shift, words @ ..] = args else {
            return Err(BuiltinError::CaesarInvalid);
        };
        if words.is_empty() {
            return Err(BuiltinError::CaesarInvalid);
        }
        let shift = parse_integer(shift)
            .and_then(|shift| i32::try_from(shift).ok())
            .ok_or(BuiltinError::CaesarInvalid)?;
        debug!("caesar with shift {shift}");
        Ok(Self {
            shift,
            words: words.iter().map(|word| (*word).to_owned()).collect(),
        })
    }

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        let encrypted = algorithms::caesar_encrypt(i64::from(self.shift), &self.words)
            .map_err(BuiltinError::OutOfMemory)?;
        writeln!(stdout, "{encrypted}")?;
        Ok(0)
    }
}

/// Leave the interpreter. Arguments are accepted and ignored.
#[derive(Debug, PartialEq, Eq)]
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn from_args(args: &[&str]) -> Result<Self, BuiltinError> {
        if !args.is_empty() {
            debug!("exit ignores its {} argument(s)", args.len());
        }
        Ok(Self)
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(0)
    }
}
