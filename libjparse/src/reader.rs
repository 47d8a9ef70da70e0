//! The parse driver: prepares the source, runs a grammar rule and turns a
//! failure into a located [`ParseError`].

use crate::combinator::{Failure, State};
use crate::command::Command;
use crate::error::{ParseContext, ParseError, Result, SyntaxError};
use crate::grammar::{Grammar, Rules};
use crate::keywords::{global_counter, KeyCounter};
use crate::source::Source;
use crate::value::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Parses documents and command lines with a fixed grammar and counter.
///
/// `Reader::new()` uses the shared grammar and the process-wide counter.
/// Tests that need predictable reserved-key suffixes inject their own counter
/// with [`Reader::with_grammar`].
#[derive(Clone)]
pub struct Reader<'g> {
    grammar: &'g Grammar,
    counter: &'g dyn KeyCounter,
    ctx: ParseContext,
}

impl Reader<'static> {
    pub fn new() -> Self {
        Self::with_grammar(Grammar::shared(), global_counter())
    }
}

impl Default for Reader<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'g> Reader<'g> {
    pub fn with_grammar(grammar: &'g Grammar, counter: &'g dyn KeyCounter) -> Self {
        Self {
            grammar,
            counter,
            ctx: ParseContext::default(),
        }
    }

    /// Name the source in error messages.
    pub fn filename(mut self, name: Option<&str>) -> Self {
        self.ctx = ParseContext::new(name);
        self
    }

    /// Parse one document. Whole-line `#` comments are ignored.
    pub fn parse(&self, text: &str) -> Result<Value> {
        let source = Source::new(text);
        let rules = self.rules();
        match rules.document(State::new(source.stripped())) {
            Ok((value, _)) => {
                debug!(bytes = text.len(), filename = ?self.ctx.filename, "parsed document");
                Ok(value)
            }
            Err(failure) => Err(self.locate(&source, failure)),
        }
    }

    /// Read and parse a file. Unless a filename was already set, errors name
    /// the file.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if self.ctx.filename.is_some() {
            return self.parse(&text);
        }
        let name = path.display().to_string();
        self.clone().filename(Some(&name)).parse(&text)
    }

    /// Parse one command line. Blank and comment-only lines give `Ok(None)`.
    pub fn parse_command(&self, line: &str) -> Result<Option<Command>> {
        let source = Source::verbatim(line);
        let rules = self.rules();
        match rules.command_line(State::new(source.stripped())) {
            Ok((command, _)) => {
                debug!(?command, "parsed command");
                Ok(command)
            }
            Err(failure) => Err(self.locate(&source, failure)),
        }
    }

    fn rules(&self) -> Rules<'g> {
        Rules::new(self.grammar, self.counter)
    }

    fn locate(&self, source: &Source<'_>, failure: Failure) -> ParseError {
        let loc = source.locate(failure.offset);
        let err = SyntaxError {
            snippet: source.snippet(loc),
            kind: failure.kind,
            offset: loc.offset,
            line: loc.line,
            column: loc.column,
            filename: self.ctx.filename.clone(),
        };
        debug!(error = %err, "parse failed");
        ParseError::from_syntax(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, SyntaxKind};
    use crate::keywords::AtomicCounter;
    use std::io::Write;

    #[test]
    fn test_comments_are_ignored() {
        let v = Reader::new()
            .parse("# config\n{\n  # the port\n  port: 80\n}\n")
            .unwrap();
        assert_eq!(v.get("port"), Some(&Value::Int(80)));
    }

    #[test]
    fn test_error_location_skips_comments() {
        let err = Reader::new()
            .parse("# header\n# more\n[1, 2,]")
            .unwrap_err();
        let syntax = err.syntax().unwrap();
        assert_eq!((syntax.line, syntax.column), (3, 7));
        assert_eq!(syntax.offset, 22);
        assert_eq!(err.to_string(), "Expected value at 3:7");
        assert!(err.report().ends_with("   3 | [1, 2,]\n     |       ^"));
    }

    #[test]
    fn test_filename_in_message() {
        let err = Reader::new()
            .filename(Some("conf.jp"))
            .parse("{a: }")
            .unwrap_err();
        assert_eq!(err.to_string(), "Expected value at 1:5 of <conf.jp>");
    }

    #[test]
    fn test_encoding_errors_are_classified() {
        let err = Reader::new().parse(r#""\ud800""#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
        let err = Reader::new().parse(r#""\x""#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(
            err.syntax().unwrap().kind,
            SyntaxKind::UnrecognizedEscape("\\x".into())
        );
    }

    #[test]
    fn test_injected_counter() {
        let grammar = Grammar::new();
        let counter = AtomicCounter::starting_at(100);
        let reader = Reader::with_grammar(&grammar, &counter);
        let v = reader.parse("{for: 1}").unwrap();
        assert!(v.get("for_100").is_some());
        let v = reader.parse("{for: 1}").unwrap();
        assert!(v.get("for_101").is_some());
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# settings\n{{retries: 3}}").unwrap();
        let v = Reader::new().parse_file(file.path()).unwrap();
        assert_eq!(v.get("retries"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_parse_file_names_the_file_in_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1,").unwrap();
        let err = Reader::new().parse_file(file.path()).unwrap_err();
        let name = file.path().display().to_string();
        assert!(err.to_string().ends_with(&format!(" of <{}>", name)));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Reader::new()
            .parse_file(dir.path().join("absent.jp"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().starts_with("Cannot read <"));
    }

    #[test]
    fn test_command_error_location() {
        let err = Reader::new().parse_command("open close").unwrap_err();
        assert_eq!(err.to_string(), "Unexpected keyword \"close\" at 1:6");
    }
}
