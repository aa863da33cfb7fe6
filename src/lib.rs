//! A small line-oriented command interpreter with supervised external programs.
//!
//! Each input line is split into an argument vector and dispatched either to a
//! built-in implemented in Rust (`fib`, `caesar`, `exit`) or to an external
//! program. External programs run under a supervisor that polls them against a
//! wall-clock deadline and kills and reaps them once the deadline passes, so a
//! misbehaving child can never wedge the interpreter.
//!
//! The main entry point is [`Interpreter`]. The public modules [`command`],
//! [`env`] and [`supervisor`] expose the traits and types needed to plug in
//! new commands or to run a program under supervision directly.

pub mod algorithms;
mod builtin;
pub mod command;
pub mod config;
pub mod env;
mod external;
pub mod input;
pub mod io_adapters;
mod interpreter;
pub mod lexer;
pub mod supervisor;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;

pub use config::ShellOptions;
pub use io_adapters::{MemWriter, ScriptedLines};
