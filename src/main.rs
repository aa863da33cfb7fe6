use log::error;
use sword_shell::{Interpreter, ShellOptions};

fn main() -> anyhow::Result<()> {
    let options: ShellOptions = argh::from_env();
    let env = env_logger::Env::default().default_filter_or(options.log_level());
    env_logger::Builder::from_env(env).init();

    let mut shell = Interpreter::default()
        .with_supervision(options.supervision()?)
        .with_prompt(options.prompt);
    if let Err(err) = shell.repl() {
        // The session is over either way; the interpreter itself still exits cleanly.
        error!("{err:#}");
    }
    Ok(())
}
