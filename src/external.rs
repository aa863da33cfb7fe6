use crate::command::{
    CommandFactory, EXIT_CANNOT_EXECUTE, EXIT_FAILURE, EXIT_NOT_FOUND, ExecutableCommand, ExitCode,
};
use crate::env::Environment;
use crate::interpreter::Factory;
use crate::supervisor::{self, ProcessError, ProcessOutcome};
use anyhow::Result;
use log::debug;
use std::ffi::OsStr;
use std::io::Write;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Command that is not a builtin: a program run under the supervisor.
pub struct ExternalCommand {
    name: String,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(name: String, args: Vec<String>) -> Self {
        Self { name, args }
    }
}

/// Catch-all: every name that no builtin claimed is treated as a program.
impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        Some(Box::new(ExternalCommand::new(
            name.to_owned(),
            args.iter().map(|arg| (*arg).to_owned()).collect(),
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        // The child writes straight to the inherited stdout.
        stdout.flush()?;

        let program = resolve_program(env.search_path.as_deref(), &self.name)
            .ok_or_else(|| ProcessError::NotFound(self.name.clone()));
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        let result = program.and_then(|path| {
            supervisor::supervise(&path, &self.name, &args, &env.supervision)
        });

        match result {
            Ok(report) => {
                debug!(
                    "'{}' (pid {}) {} after {:?}",
                    self.name, report.pid, report.outcome, report.elapsed
                );
                if !matches!(report.outcome, ProcessOutcome::Exited(_)) {
                    writeln!(stdout, "{}: {}", self.name, report.outcome)?;
                }
                Ok(report.outcome.exit_code())
            }
            Err(err) => {
                writeln!(stdout, "{err}")?;
                Ok(exit_code_for(&err))
            }
        }
    }
}

/// Reserved statuses keep "could not start" apart from anything the child could exit with.
fn exit_code_for(err: &ProcessError) -> ExitCode {
    match err {
        ProcessError::NotFound(_) => EXIT_NOT_FOUND,
        ProcessError::Spawn { .. } => EXIT_CANNOT_EXECUTE,
        ProcessError::Wait { .. } => EXIT_FAILURE,
    }
}

/// Resolve a program name the way a typical shell would.
///
/// - A name containing a path separator is used as is, relative to the working directory.
/// - A bare name is looked up in each directory of `search_path`. The first
///   executable match wins, so a non-executable file earlier on the path does
///   not shadow a program further along.
/// - Empty names and directories never resolve.
pub fn resolve_program(search_path: Option<&OsStr>, name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    if name.contains(MAIN_SEPARATOR) || name.contains('/') {
        let path = Path::new(name);
        return path.is_file().then(|| path.to_path_buf());
    }
    std::env::split_paths(search_path?)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

/// A regular file with at least one execute bit set.
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn osstr(s: &str) -> Option<&OsStr> {
        Some(OsStr::new(s))
    }

    #[test]
    #[cfg(unix)]
    fn test_absolute_existing_program() {
        let found = resolve_program(osstr("/nowhere"), "/bin/sh");
        assert_eq!(found.as_deref(), Some(Path::new("/bin/sh")));
    }

    #[test]
    #[cfg(unix)]
    fn test_absolute_missing_program() {
        assert_eq!(resolve_program(osstr("/bin"), "/bin/nonexisting"), None);
    }

    #[test]
    #[cfg(unix)]
    fn test_bare_name_is_searched_in_order() {
        let found = resolve_program(osstr("/does/not/exist:/bin"), "sh")
            .expect("Expected to find 'sh' in /bin via PATH search");
        assert_eq!(found, Path::new("/bin/sh"));
    }

    #[test]
    #[cfg(unix)]
    fn test_bare_name_without_search_path() {
        assert_eq!(resolve_program(None, "sh"), None);
    }

    #[test]
    #[cfg(unix)]
    fn test_directories_do_not_resolve() {
        assert_eq!(resolve_program(osstr("/"), "bin"), None);
        assert_eq!(resolve_program(osstr("/bin"), "/bin"), None);
    }

    #[test]
    #[cfg(unix)]
    fn test_non_executable_file_does_not_shadow_a_later_program() {
        use std::os::unix::fs::PermissionsExt;

        let root =
            std::env::temp_dir().join(format!("sword_shell_shadow_{}", std::process::id()));
        let (first, second) = (root.join("first"), root.join("second"));
        for (dir, mode) in [(&first, 0o644), (&second, 0o755)] {
            std::fs::create_dir_all(dir).unwrap();
            let tool = dir.join("tool");
            std::fs::write(&tool, "#!/bin/sh\n").unwrap();
            std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(mode)).unwrap();
        }
        let search_path = std::env::join_paths([&first, &second]).unwrap();

        let found = resolve_program(Some(&search_path), "tool");
        let only_first = resolve_program(Some(first.as_os_str()), "tool");
        let _ = std::fs::remove_dir_all(&root);

        assert_eq!(found, Some(second.join("tool")));
        assert_eq!(only_first, None);
    }

    #[test]
    #[cfg(unix)]
    fn test_program_receives_the_typed_name_as_argv0() {
        let mut env = Environment::new();
        let mut out: Vec<u8> = Vec::new();
        let cmd = Box::new(ExternalCommand::new(
            "sh".into(),
            vec!["-c".into(), r#"test "$0" = sh"#.into()],
        ));
        assert_eq!(cmd.execute(&mut out, &mut env).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty_name_is_none() {
        assert_eq!(resolve_program(None, ""), None);
    }

    #[test]
    #[cfg(unix)]
    fn test_unknown_program_reports_not_found() {
        let mut env = Environment::new();
        let mut out: Vec<u8> = Vec::new();
        let cmd = Box::new(ExternalCommand::new(
            "sword-shell-no-such-program".into(),
            Vec::new(),
        ));
        let code = cmd.execute(&mut out, &mut env).unwrap();
        assert_eq!(code, EXIT_NOT_FOUND);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "sword-shell-no-such-program: command not found\n"
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_non_executable_file_reports_cannot_execute() {
        let path =
            std::env::temp_dir().join(format!("sword_shell_noexec_{}", std::process::id()));
        std::fs::write(&path, "not a program\n").unwrap();

        let mut env = Environment::new();
        let mut out: Vec<u8> = Vec::new();
        let cmd = Box::new(ExternalCommand::new(
            path.to_string_lossy().into_owned(),
            Vec::new(),
        ));
        let code = cmd.execute(&mut out, &mut env).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(code, EXIT_CANNOT_EXECUTE);
        assert!(String::from_utf8(out).unwrap().contains("failed to execute"));
    }

    #[test]
    #[cfg(unix)]
    fn test_exit_status_is_passed_through_silently() {
        let mut env = Environment::new();
        let mut out: Vec<u8> = Vec::new();
        let cmd = Box::new(ExternalCommand::new(
            "sh".into(),
            vec!["-c".into(), "exit 7".into()],
        ));
        assert_eq!(cmd.execute(&mut out, &mut env).unwrap(), 7);
        assert!(out.is_empty());
    }
}
