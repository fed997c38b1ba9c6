use std::fmt;

/// The coarse category a [`ParseError`] falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A lexical malformation: an unterminated string, a bad escape, an
    /// unrecognised character.
    Lexical,
    /// A token was valid on its own but not where the grammar expected
    /// it.
    Syntax,
    /// A long-bracket string or comment, or a block comment, that never
    /// closed before end-of-file.
    Unterminated,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParseErrorKind::Lexical => "lexical",
            ParseErrorKind::Syntax => "syntax",
            ParseErrorKind::Unterminated => "unterminated",
        };
        f.write_str(s)
    }
}

/// A structured parse error carrying a 1-based line/column and a short
/// message.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} error at {line}:{column}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: u32, column: u32, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            column,
            message: message.into(),
        }
    }
}
