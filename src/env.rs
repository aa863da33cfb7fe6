use crate::supervisor::SupervisionConfig;
use std::env as stdenv;
use std::ffi::OsString;

/// Mutable state shared by the interpreter and the commands it runs.
///
/// The environment contains:
/// - `search_path`: the `PATH` used to resolve external program names.
/// - `supervision`: deadline and poll interval applied to external programs.
/// - `should_exit`: a flag that the run loop checks to know when to terminate.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Directories searched for bare program names, in `PATH` syntax.
    pub search_path: Option<OsString>,
    /// Limits applied to every external program.
    pub supervision: SupervisionConfig,
    /// When set to true, indicates that the run loop should exit.
    pub should_exit: bool,
}

impl Environment {
    /// Capture `PATH` from the current process and use default supervision limits.
    pub fn new() -> Self {
        Self::with_supervision(SupervisionConfig::default())
    }

    pub fn with_supervision(supervision: SupervisionConfig) -> Self {
        Self {
            search_path: stdenv::var_os("PATH"),
            supervision,
            should_exit: false,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
