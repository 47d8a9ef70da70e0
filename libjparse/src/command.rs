//! The command-line grammar.
//!
//! A command line is a sequence of whitespace-separated words:
//!
//! ```text
//! open socket 10.0.0.1 --port 8080 retries=3   # comment
//! ```
//!
//! An optional verb comes first, optionally followed directly by a noun.
//! After that come positional arguments (any value, or a bare word),
//! `--name value` options and `name=value` assignments in any order. Options
//! and assignments both land in [`Command::options`].

use crate::combinator::{
    alt, attempt, choice, end_of_input, label, left, lexeme, many, map, not_followed_by, optional,
    pair, pattern, right, tag, value, whitespace, Failure, Outcome, Parser, State,
};
use crate::error::SyntaxKind;
use crate::grammar::Rules;
use crate::scalar::identifier;
use crate::value::{Map, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[^\n]*").expect("comment pattern"));
static BARE_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[^\s#=\[\]{},"']+"#).expect("bare word pattern"));

/// What a command does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    Open,
    Close,
    Run,
    Log,
}

impl Verb {
    pub const ALL: [Verb; 4] = [Verb::Open, Verb::Close, Verb::Run, Verb::Log];

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Open => "open",
            Verb::Close => "close",
            Verb::Run => "run",
            Verb::Log => "log",
        }
    }

    pub fn from_word(word: &str) -> Option<Verb> {
        Verb::ALL.into_iter().find(|v| v.as_str() == word)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a command acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Noun {
    Socket,
    Session,
    Transport,
}

impl Noun {
    pub const ALL: [Noun; 3] = [Noun::Socket, Noun::Session, Noun::Transport];

    pub fn as_str(self) -> &'static str {
        match self {
            Noun::Socket => "socket",
            Noun::Session => "session",
            Noun::Transport => "transport",
        }
    }

    pub fn from_word(word: &str) -> Option<Noun> {
        Noun::ALL.into_iter().find(|n| n.as_str() == word)
    }
}

impl fmt::Display for Noun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed command line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Command {
    pub verb: Option<Verb>,
    pub noun: Option<Noun>,
    pub args: Vec<Value>,
    pub options: Map,
}

impl Command {
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    /// The command as a plain tree:
    /// `{verb: ..., noun: ..., args: [...], options: {...}}`.
    pub fn to_value(&self) -> Value {
        let word = |w: Option<&'static str>| w.map_or(Value::Null, Value::from);
        let mut out = Map::new();
        out.insert("verb".into(), word(self.verb.map(Verb::as_str)));
        out.insert("noun".into(), word(self.noun.map(Noun::as_str)));
        out.insert("args".into(), Value::Array(self.args.clone()));
        out.insert("options".into(), Value::Object(self.options.clone()));
        Value::Object(out)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Comment,
    Verb(Verb),
    Noun(Noun),
    Option(String, Value),
    Arg(Value),
}

impl Rules<'_> {
    /// A full command line. Blank and comment-only lines yield `None`.
    pub(crate) fn command_line<'a>(&self, s: State<'a>) -> Outcome<'a, Option<Command>> {
        let ((), s) = whitespace(s)?;
        let located = |s: State<'a>| {
            let start = s.offset();
            self.token(s).map(|(token, rest)| ((start, token), rest))
        };
        let (tokens, rest) = many(located).parse(s)?;
        let ((), rest) = end_of_input(rest)?;
        Ok((assemble(tokens)?, rest))
    }

    fn token<'a>(&self, s: State<'a>) -> Outcome<'a, Token> {
        let comment = value(|s: State<'a>| pattern(s, &COMMENT, "comment"), Token::Comment);
        let verb = |s: State<'a>| self.verb(s);
        let noun = |s: State<'a>| self.noun(s);
        let option = |s: State<'a>| self.option(s);
        let assignment = |s: State<'a>| self.assignment(s);
        let argument = map(|s: State<'a>| self.argument(s), Token::Arg);
        let any = move |s: State<'a>| {
            choice(
                s,
                &[&comment, &verb, &noun, &option, &assignment, &argument],
            )
        };
        lexeme(label(any, "command word")).parse(s)
    }

    /// An identifier that makes up a whole word: `log` but not `log.txt`
    /// or the left side of `log=1`.
    fn word<'a>(&self, s: State<'a>) -> Outcome<'a, &'a str> {
        not_followed_by(identifier, |c| !ends_word(c), "word").parse(s)
    }

    fn verb<'a>(&self, s: State<'a>) -> Outcome<'a, Token> {
        let (word, rest) = self.word(s)?;
        match Verb::from_word(word) {
            Some(verb) => Ok((Token::Verb(verb), rest)),
            None => Err(Failure::expected(s.offset(), "verb")),
        }
    }

    fn noun<'a>(&self, s: State<'a>) -> Outcome<'a, Token> {
        let (word, rest) = self.word(s)?;
        match Noun::from_word(word) {
            Some(noun) => Ok((Token::Noun(noun), rest)),
            None => Err(Failure::expected(s.offset(), "noun")),
        }
    }

    /// `--name value` or `--name=value`.
    fn option<'a>(&self, s: State<'a>) -> Outcome<'a, Token> {
        let name = right(tag("--"), lexeme(identifier));
        let argument = right(optional(lexeme(tag("="))), |s: State<'a>| self.argument(s));
        let ((name, arg), rest) = pair(name, argument).parse(s)?;
        self.check_option_name(name, s.offset() + 2)?;
        Ok((Token::Option(name.to_string(), arg), rest))
    }

    /// `name=value`, with no space before the `=`.
    fn assignment<'a>(&self, s: State<'a>) -> Outcome<'a, Token> {
        let name = attempt(left(identifier, lexeme(tag("="))));
        let ((name, arg), rest) = pair(name, |s: State<'a>| self.argument(s)).parse(s)?;
        self.check_option_name(name, s.offset())?;
        Ok((Token::Option(name.to_string(), arg), rest))
    }

    /// A positional argument: any value, else a bare word taken as a string.
    /// A value only counts when it fills the whole word, so `true.x` is the
    /// bare word `"true.x"`.
    fn argument<'a>(&self, s: State<'a>) -> Outcome<'a, Value> {
        let structured = |s: State<'a>| {
            let (arg, rest) = self.value(s)?;
            let consumed = &rest.input()[s.offset()..rest.offset()];
            let whole = consumed.ends_with(char::is_whitespace)
                || rest.peek().map_or(true, ends_word);
            if whole {
                Ok((arg, rest))
            } else {
                Err(Failure::expected(s.offset(), "argument"))
            }
        };
        let bare = lexeme(map(
            |s: State<'a>| pattern(s, &BARE_WORD, "word"),
            |w: &str| Value::String(w.to_string()),
        ));
        label(alt(structured, bare), "argument").parse(s)
    }

    fn check_option_name(&self, name: &str, offset: usize) -> Result<(), Failure> {
        if self.grammar.command_words().contains(name) {
            Err(Failure::fatal(
                offset,
                SyntaxKind::UnexpectedKeyword(name.to_string()),
            ))
        } else {
            Ok(())
        }
    }
}

/// Characters that may directly follow a complete word.
fn ends_word(c: char) -> bool {
    c.is_whitespace() || c == '#'
}

/// Check word order and build the command. A verb may only come first and a
/// noun may only come directly after the verb.
fn assemble(tokens: Vec<(usize, Token)>) -> Result<Option<Command>, Failure> {
    let mut command = Command::default();
    let mut position = 0;
    for (offset, token) in tokens {
        match token {
            Token::Comment => continue,
            Token::Verb(verb) => {
                if position != 0 {
                    return Err(unexpected(offset, verb.as_str()));
                }
                command.verb = Some(verb);
            }
            Token::Noun(noun) => {
                if position != 1 || command.verb.is_none() {
                    return Err(unexpected(offset, noun.as_str()));
                }
                command.noun = Some(noun);
            }
            Token::Option(name, arg) => {
                command.options.insert(name, arg);
            }
            Token::Arg(arg) => command.args.push(arg),
        }
        position += 1;
    }
    Ok((position > 0).then_some(command))
}

fn unexpected(offset: usize, word: &str) -> Failure {
    Failure::fatal(offset, SyntaxKind::UnexpectedKeyword(word.to_string()))
}
