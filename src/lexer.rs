//! A module implementing lexical analysis (tokenization) of one input line.
//!
//! Tokens are runs of non-separator characters. There is no quoting or escaping:
//! `"a b"` yields the two tokens `"a` and `b"`. Tokens borrow from the line, so an
//! [`ArgVector`] cannot outlive the buffer it was split from.

use thiserror::Error;

/// Upper bound on the number of tokens in one argument vector, command included.
pub const MAX_ARGS: usize = 100;

/// Errors that can occur during the lexical analysis process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexingError {
    /// The line holds more tokens than an argument vector may carry.
    #[error("too many arguments (limit is {max})")]
    TooManyArguments { max: usize },
}

/// Ordered tokens of one line: index 0 is the command name, the rest are its arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgVector<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> ArgVector<'a> {
    /// Number of tokens, command name included.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The command name, or `None` for a blank line.
    pub fn command(&self) -> Option<&'a str> {
        self.tokens.first().copied()
    }

    /// Everything after the command name.
    pub fn args(&self) -> &[&'a str] {
        self.tokens.get(1..).unwrap_or_default()
    }

    pub fn as_slice(&self) -> &[&'a str] {
        &self.tokens
    }
}

fn is_separator(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n' | '\x0b' | '\x0c')
}

/// Split `line` into an argument vector.
///
/// Consecutive separators collapse, so leading, trailing and repeated whitespace
/// never produce empty tokens. A blank line yields an empty vector, which callers
/// treat as "nothing to do".
///
/// # Errors
/// Returns [`LexingError::TooManyArguments`] instead of truncating when the line
/// holds more than [`MAX_ARGS`] tokens.
pub fn split_into_tokens(line: &str) -> Result<ArgVector<'_>, LexingError> {
    let mut tokens = Vec::new();
    for token in line.split(is_separator).filter(|token| !token.is_empty()) {
        if tokens.len() == MAX_ARGS {
            return Err(LexingError::TooManyArguments { max: MAX_ARGS });
        }
        tokens.push(token);
    }
    Ok(ArgVector { tokens })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_yield_no_tokens() {
        for line in ["", "  ", "\t", " \t \n"] {
            let argv = split_into_tokens(line).unwrap();
            assert!(argv.is_empty(), "expected no tokens for {line:?}");
            assert_eq!(argv.command(), None);
            assert!(argv.args().is_empty());
        }
    }

    #[test]
    fn test_punctuation_stays_inside_tokens() {
        let argv = split_into_tokens("caesar 3 Hello, World!").unwrap();
        assert_eq!(argv.len(), 4);
        assert_eq!(argv.as_slice(), &["caesar", "3", "Hello,", "World!"]);
        assert_eq!(argv.command(), Some("caesar"));
        assert_eq!(argv.args(), &["3", "Hello,", "World!"]);
    }

    #[test]
    fn test_mixed_whitespace_collapses() {
        let argv = split_into_tokens("  fib\t\t10  \n").unwrap();
        assert_eq!(argv.as_slice(), &["fib", "10"]);
    }

    #[test]
    fn test_quotes_are_not_special() {
        let argv = split_into_tokens("echo \"a b\"").unwrap();
        assert_eq!(argv.as_slice(), &["echo", "\"a", "b\""]);
    }

    #[test]
    fn test_command_without_arguments() {
        let argv = split_into_tokens("exit").unwrap();
        assert_eq!(argv.command(), Some("exit"));
        assert!(argv.args().is_empty());
    }

    #[test]
    fn test_exactly_max_tokens_is_accepted() {
        let line = vec!["x"; MAX_ARGS].join(" ");
        assert_eq!(split_into_tokens(&line).unwrap().len(), MAX_ARGS);
    }

    #[test]
    fn test_overlong_lines_are_rejected_not_truncated() {
        let line = vec!["x"; MAX_ARGS + 1].join(" ");
        assert_eq!(
            split_into_tokens(&line),
            Err(LexingError::TooManyArguments { max: MAX_ARGS })
        );
    }
}
