use crate::command::{CommandFactory, EXIT_FAILURE, ExitCode};
use crate::env::Environment;
use crate::input::{Editor, LineSource};
use crate::lexer;
use crate::supervisor::SupervisionConfig;
use log::{debug, error};
use std::io::Write;

/// Prompt shown before every line.
pub const DEFAULT_PROMPT: &str = "sword-shell> ";

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate: builtins and the external launcher.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A line-oriented interpreter that runs built-ins in-process and external
/// programs under a supervisor.
///
/// The interpreter maintains an [`Environment`] and a list of [`CommandFactory`] objects
/// that are queried in order to create commands by name. See [`Default`] for the
/// factories included out of the box.
///
/// Example
/// ```
/// use sword_shell::Interpreter;
/// let mut sh = Interpreter::default();
/// let mut out: Vec<u8> = Vec::new();
/// let code = sh.run("fib", &["10"], &mut out).unwrap();
/// assert_eq!(code, 0);
/// assert_eq!(out, b"55\n");
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
    prompt: String,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            commands,
            prompt: DEFAULT_PROMPT.to_owned(),
        }
    }

    /// Replace the deadline and poll interval applied to external programs.
    pub fn with_supervision(mut self, supervision: SupervisionConfig) -> Self {
        self.env.supervision = supervision;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Whether `exit` has been executed.
    pub fn should_exit(&self) -> bool {
        self.env.should_exit
    }

    /// Run a single command invocation by name with arguments.
    ///
    /// The first factory that recognizes `name` wins. Returns the command's exit
    /// code, or an error if no factory knows the command or its output cannot be
    /// written.
    pub fn run(
        &mut self,
        name: &str,
        args: &[&str],
        stdout: &mut dyn Write,
    ) -> anyhow::Result<ExitCode> {
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.env, name, args) {
                return cmd.execute(stdout, &mut self.env);
            }
        }
        Err(anyhow::anyhow!("command not found: {}", name))
    }

    /// Tokenize and run one line. Returns `None` for a blank line.
    pub fn execute_line(
        &mut self,
        line: &str,
        stdout: &mut dyn Write,
    ) -> anyhow::Result<Option<ExitCode>> {
        let argv = match lexer::split_into_tokens(line) {
            Ok(argv) => argv,
            Err(err) => {
                writeln!(stdout, "Error: {err}.")?;
                return Ok(Some(EXIT_FAILURE));
            }
        };
        let Some(name) = argv.command() else {
            return Ok(None);
        };
        debug!("dispatching {name:?} with {} argument(s)", argv.args().len());
        self.run(name, argv.args(), stdout).map(Some)
    }

    /// Read, dispatch and report until `exit`, end of input, or a read failure.
    ///
    /// Command failures are reported to `stdout` and never end the loop. Only a
    /// failure to write to `stdout` is returned as an error.
    pub fn run_loop(
        &mut self,
        input: &mut dyn LineSource,
        stdout: &mut dyn Write,
    ) -> anyhow::Result<()> {
        while !self.env.should_exit {
            stdout.flush()?;
            let line = match input.read_line(&self.prompt) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("end of input");
                    writeln!(stdout)?;
                    break;
                }
                Err(err) => {
                    error!("failed to read input: {err:#}");
                    writeln!(stdout)?;
                    break;
                }
            };

            match self.execute_line(&line, stdout) {
                Ok(Some(code)) => debug!("exit code {code}"),
                Ok(None) => {}
                Err(err) => {
                    error!("{err:#}");
                    writeln!(stdout, "Error: {err}")?;
                }
            }
        }
        writeln!(stdout, "Exiting sword-shell.")?;
        Ok(())
    }

    /// Interactive loop on the terminal.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        let mut editor = Editor::new()?;
        self.run_loop(&mut editor, &mut std::io::stdout())
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `fib`, `caesar`, `exit`
    /// - external command launcher, consulted last
    fn default() -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(vec![
            Box::new(Factory::<Fib>::default()),
            Box::new(Factory::<Caesar>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}
