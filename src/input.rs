//! Where the run loop gets its lines from.

use anyhow::Result;
use log::info;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// A source of input lines for the run loop.
pub trait LineSource {
    /// Show `prompt` and read one line without its trailing newline.
    ///
    /// Returns `Ok(None)` once input is exhausted. An `Err` means no further
    /// input can be read.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Interactive line editor on the controlling terminal, or plain reads from piped stdin.
///
/// History is never recorded.
pub struct Editor {
    inner: DefaultEditor,
}

impl Editor {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            inner: DefaultEditor::new()?,
        })
    }
}

impl LineSource for Editor {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.inner.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Interrupted) => {
                info!("interrupted at the prompt");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}
