//! Error types for jparse parsing.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for jparse parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Format a location suffix for error messages. Line and column are 1-based.
    pub fn loc_suffix(&self, line: usize, column: usize) -> String {
        match &self.filename {
            Some(name) => format!(" at {}:{} of <{}>", line, column, name),
            None => format!(" at {}:{}", line, column),
        }
    }
}

/// The reason a grammar rule stopped matching.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyntaxKind {
    /// No alternative matched; names what the grammar wanted.
    Expected(String),
    /// A string was opened with one delimiter and never closed by it, while
    /// a different quote character appeared in its body.
    MismatchedQuotes,
    /// A string reached end of line or end of input without its delimiter.
    UnterminatedString,
    /// A backslash escape the string grammar does not know.
    UnrecognizedEscape(String),
    /// A `\u` escape naming a code point that is not a character (lone surrogate).
    BadCodePoint(u32),
    /// The grammar finished but input remains.
    TrailingGarbage,
    /// A reserved command word in a position where it is not allowed.
    UnexpectedKeyword(String),
    /// Numeric text that cannot be represented.
    InvalidNumber(String),
}

impl SyntaxKind {
    /// Returns `true` for failures that are about character decoding rather
    /// than grammar structure.
    pub fn is_encoding(&self) -> bool {
        matches!(self, SyntaxKind::BadCodePoint(_))
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxKind::Expected(what) => write!(f, "Expected {}", what),
            SyntaxKind::MismatchedQuotes => write!(f, "Mismatched quotes"),
            SyntaxKind::UnterminatedString => write!(f, "Unterminated string"),
            SyntaxKind::UnrecognizedEscape(esc) => write!(f, "Unrecognized escape \"{}\"", esc),
            SyntaxKind::BadCodePoint(cp) => {
                write!(f, "Cannot decode \\u{:04X} to a character", cp)
            }
            SyntaxKind::TrailingGarbage => write!(f, "Unexpected trailing content"),
            SyntaxKind::UnexpectedKeyword(word) => write!(f, "Unexpected keyword \"{}\"", word),
            SyntaxKind::InvalidNumber(text) => write!(f, "Invalid number \"{}\"", text),
        }
    }
}

/// A located syntax failure.
///
/// `offset` is a byte offset into the original (uncommented) text; `line` and
/// `column` are 1-based, the column counted in characters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxError {
    pub kind: SyntaxKind,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub snippet: String,
    pub filename: Option<String>,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctx = ParseContext {
            filename: self.filename.clone(),
        };
        write!(f, "{}{}", self.kind, ctx.loc_suffix(self.line, self.column))
    }
}

/// Coarse classification of a [`ParseError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Encoding,
    Io,
}

/// Error type for jparse parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    /// A grammar rule could not match.
    #[error("{0}")]
    Syntax(SyntaxError),

    /// An escape sequence could not be decoded to a character.
    #[error("{0}")]
    Encoding(SyntaxError),

    /// The source file is missing or unreadable.
    #[error("Cannot read <{}>: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ParseError {
    /// Wrap a located failure, routing decoding failures to `Encoding`.
    pub fn from_syntax(err: SyntaxError) -> Self {
        if err.kind.is_encoding() {
            ParseError::Encoding(err)
        } else {
            ParseError::Syntax(err)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Syntax(_) => ErrorKind::Syntax,
            ParseError::Encoding(_) => ErrorKind::Encoding,
            ParseError::Io { .. } => ErrorKind::Io,
        }
    }

    /// The located failure, if this is not an I/O error.
    pub fn syntax(&self) -> Option<&SyntaxError> {
        match self {
            ParseError::Syntax(e) | ParseError::Encoding(e) => Some(e),
            ParseError::Io { .. } => None,
        }
    }

    /// The message followed by the source snippet, for display to a user.
    pub fn report(&self) -> String {
        match self.syntax() {
            Some(e) if !e.snippet.is_empty() => format!("{}\n{}", self, e.snippet),
            _ => self.to_string(),
        }
    }
}
