//! jparse: a lenient JSON reader and a small command-line language.
//!
//! The value grammar is a superset of JSON meant for hand-written
//! configuration:
//!
//! - whole-line `#` comments,
//! - single-, double- and triple-quoted strings,
//! - unquoted object keys,
//! - `True`/`False`/`None` alongside `true`/`false`/`null`.
//!
//! Object keys that are reserved words (see [`RESERVED_KEYS`]) are renamed to
//! `key_N` so the tree can be used with attribute-style access.
//!
//! The command grammar parses lines such as
//! `open socket 10.0.0.1 --port 8080 retries=3` into a [`Command`].
//!
//! # Parsing Pipeline
//!
//! 1. **Source**: comment lines are blanked, keeping line numbers intact.
//!
//! 2. **Grammar**: parser combinators run the top rule over the stripped
//!    text. Failures are plain values carrying a byte offset.
//!
//! 3. **Location**: on failure the offset is mapped back to a line, column
//!    and snippet of the original text.

mod combinator;
mod command;
mod composite;
mod encode;
mod error;
mod grammar;
mod keywords;
mod reader;
mod scalar;
mod source;
mod value;

pub use command::{Command, Noun, Verb};
pub use encode::{to_json, Format};
pub use error::{ErrorKind, ParseContext, ParseError, Result, SyntaxError, SyntaxKind};
pub use grammar::Grammar;
pub use keywords::{global_counter, AtomicCounter, KeyCounter, KeywordSet, RESERVED_KEYS};
pub use reader::Reader;
pub use source::{count_lines, strip_comments, Location};
pub use value::{Map, Value};

use std::path::Path;

/// Parse a document from a string.
///
/// # Example
///
/// ```
/// use libjparse::{parse, Value};
///
/// let value = parse("{port: 8080, hosts: ['a', 'b']}").unwrap();
/// assert_eq!(value.get("port"), Some(&Value::Int(8080)));
/// ```
pub fn parse(input: &str) -> Result<Value> {
    parse_with_filename(input, None)
}

/// Parse a document from a string with a filename for error messages.
pub fn parse_with_filename(input: &str, filename: Option<&str>) -> Result<Value> {
    Reader::new().filename(filename).parse(input)
}

/// Read and parse a document from a file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Value> {
    Reader::new().parse_file(path)
}

/// Parse one command line.
///
/// ```
/// use libjparse::{parse_command, Verb};
///
/// let cmd = parse_command("open socket host1 22").unwrap().unwrap();
/// assert_eq!(cmd.verb, Some(Verb::Open));
/// assert!(parse_command("# nothing here").unwrap().is_none());
/// ```
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    Reader::new().parse_command(line)
}
