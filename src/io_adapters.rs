use crate::input::LineSource;
use anyhow::{Result, bail};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{Result as IoResult, Write};
use std::rc::Rc;

/// Memory-backed writer for capturing what the interpreter prints.
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    /// Public constructor.
    pub fn new() -> Self {
        Self {
            buf: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Convenience: create writer and return (writer, rc_handle).
    pub fn with_handle() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let mw = MemWriter::new();
        let rc = mw.buf.clone();
        (mw, rc)
    }

    /// Everything written so far, decoded lossily.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }
}

impl Default for MemWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

/// Pre-recorded input lines, handed out one per prompt.
#[derive(Debug, Default)]
pub struct ScriptedLines {
    lines: VecDeque<String>,
    prompts: Vec<String>,
    fail_when_exhausted: bool,
}

impl ScriptedLines {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Report a read error instead of end-of-input once the script runs out.
    pub fn then_fail(mut self) -> Self {
        self.fail_when_exhausted = true;
        self
    }

    /// Prompts shown so far, one per read attempt.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineSource for ScriptedLines {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_owned());
        match self.lines.pop_front() {
            Some(line) => Ok(Some(line)),
            None if self.fail_when_exhausted => bail!("input stream is gone"),
            None => Ok(None),
        }
    }
}
