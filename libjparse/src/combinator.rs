//! Primitive parsers and combinators.
//!
//! A parser is any `Fn(State<'a>) -> Outcome<'a, T>`: it either succeeds with
//! a result and the state after the consumed text, or returns a [`Failure`]
//! value. Nothing here unwinds or keeps state between calls.
//!
//! Alternation follows the usual rule for predictive parsers: the next
//! alternative is only tried when the previous one failed *without consuming
//! input*. A failure that happens after input was consumed is `committed`
//! and propagates straight to the caller.

use crate::error::SyntaxKind;
use regex::Regex;

/// Input text plus the current byte offset into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct State<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> State<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, offset: 0 }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The unconsumed input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.offset..]
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.input.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Move forward `n` bytes. `n` must land on a character boundary.
    pub fn advance(self, n: usize) -> Self {
        Self {
            input: self.input,
            offset: self.offset + n,
        }
    }
}

/// Why and where a parser stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub offset: usize,
    pub kind: SyntaxKind,
    pub committed: bool,
}

impl Failure {
    /// An uncommitted failure naming what was expected.
    pub fn expected(offset: usize, what: impl Into<String>) -> Self {
        Self {
            offset,
            kind: SyntaxKind::Expected(what.into()),
            committed: false,
        }
    }

    /// A committed failure: alternation will not try siblings.
    pub fn fatal(offset: usize, kind: SyntaxKind) -> Self {
        Self {
            offset,
            kind,
            committed: true,
        }
    }

    fn commit_if(mut self, consumed: bool) -> Self {
        self.committed |= consumed;
        self
    }

    pub(crate) fn commit(self) -> Self {
        self.commit_if(true)
    }

    /// Keep whichever of two uncommitted failures got further, merging the
    /// expectations when they stopped at the same place.
    fn merge(self, other: Failure) -> Failure {
        if other.offset > self.offset {
            return other;
        }
        if other.offset < self.offset {
            return self;
        }
        match (self.kind, other.kind) {
            (SyntaxKind::Expected(a), SyntaxKind::Expected(b)) if a != b => {
                Failure::expected(self.offset, format!("{} or {}", a, b))
            }
            (kind, _) => Failure {
                offset: self.offset,
                kind,
                committed: false,
            },
        }
    }
}

/// The result of running a parser.
pub type Outcome<'a, T> = Result<(T, State<'a>), Failure>;

/// Anything that can run against a [`State`].
pub trait Parser<'a, T> {
    fn parse(&self, state: State<'a>) -> Outcome<'a, T>;
}

impl<'a, T, F> Parser<'a, T> for F
where
    F: Fn(State<'a>) -> Outcome<'a, T>,
{
    fn parse(&self, state: State<'a>) -> Outcome<'a, T> {
        self(state)
    }
}

// ============================================================================
// Primitives
// ============================================================================

/// Consume `text` exactly.
pub fn literal<'a>(state: State<'a>, text: &str) -> Outcome<'a, &'a str> {
    if state.rest().starts_with(text) {
        let matched = &state.rest()[..text.len()];
        Ok((matched, state.advance(text.len())))
    } else {
        Err(Failure::expected(state.offset(), format!("\"{}\"", text)))
    }
}

/// Consume the match of `re` at the current offset. The pattern must be
/// anchored with `^`.
pub fn pattern<'a>(state: State<'a>, re: &Regex, what: &str) -> Outcome<'a, &'a str> {
    match re.find(state.rest()) {
        Some(m) if m.start() == 0 && !m.as_str().is_empty() => {
            Ok((m.as_str(), state.advance(m.end())))
        }
        _ => Err(Failure::expected(state.offset(), what)),
    }
}

/// Consume zero or more whitespace characters, newlines included.
pub fn whitespace(state: State<'_>) -> Outcome<'_, ()> {
    let rest = state.rest();
    let skipped = rest.len() - rest.trim_start().len();
    Ok(((), state.advance(skipped)))
}

/// Succeed only when no input remains.
pub fn end_of_input(state: State<'_>) -> Outcome<'_, ()> {
    if state.is_at_end() {
        Ok(((), state))
    } else {
        Err(Failure {
            offset: state.offset(),
            kind: SyntaxKind::TrailingGarbage,
            committed: false,
        })
    }
}

/// A parser for a fixed piece of text.
pub fn tag<'a>(text: &'static str) -> impl Parser<'a, &'a str> {
    move |s: State<'a>| literal(s, text)
}

// ============================================================================
// Combinators
// ============================================================================

/// Run `p`, then discard any whitespace that follows it.
pub fn lexeme<'a, T>(p: impl Parser<'a, T>) -> impl Parser<'a, T> {
    move |s: State<'a>| {
        let (value, rest) = p.parse(s)?;
        let ((), rest) = whitespace(rest)?;
        Ok((value, rest))
    }
}

pub fn map<'a, T, U>(p: impl Parser<'a, T>, f: impl Fn(T) -> U) -> impl Parser<'a, U> {
    move |s: State<'a>| p.parse(s).map(|(value, rest)| (f(value), rest))
}

/// Run `p` and replace its result with a clone of `value`.
pub fn value<'a, T, U: Clone>(p: impl Parser<'a, T>, value: U) -> impl Parser<'a, U> {
    move |s: State<'a>| p.parse(s).map(|(_, rest)| (value.clone(), rest))
}

/// Run `first` then `second`, keeping both results.
pub fn pair<'a, A, B>(
    first: impl Parser<'a, A>,
    second: impl Parser<'a, B>,
) -> impl Parser<'a, (A, B)> {
    move |s: State<'a>| {
        let (a, mid) = first.parse(s)?;
        match second.parse(mid) {
            Ok((b, rest)) => Ok(((a, b), rest)),
            Err(failure) => Err(failure.commit_if(mid.offset() > s.offset())),
        }
    }
}

/// Run both, keep the first result.
pub fn left<'a, A, B>(first: impl Parser<'a, A>, second: impl Parser<'a, B>) -> impl Parser<'a, A> {
    map(pair(first, second), |(a, _)| a)
}

/// Run both, keep the second result.
pub fn right<'a, A, B>(
    first: impl Parser<'a, A>,
    second: impl Parser<'a, B>,
) -> impl Parser<'a, B> {
    map(pair(first, second), |(_, b)| b)
}

/// Ordered choice between two parsers.
pub fn alt<'a, T>(first: impl Parser<'a, T>, second: impl Parser<'a, T>) -> impl Parser<'a, T> {
    move |s: State<'a>| choice(s, &[&first, &second])
}

/// Try each alternative in order; the first success wins.
pub fn choice<'a, T>(state: State<'a>, alternatives: &[&dyn Parser<'a, T>]) -> Outcome<'a, T> {
    let mut best: Option<Failure> = None;
    for p in alternatives {
        match p.parse(state) {
            Ok(done) => return Ok(done),
            Err(failure) if failure.committed => return Err(failure),
            Err(failure) => {
                best = Some(match best {
                    Some(prev) => prev.merge(failure),
                    None => failure,
                });
            }
        }
    }
    Err(best.unwrap_or_else(|| Failure::expected(state.offset(), "input")))
}

/// Zero or more repetitions of `p`. Stops at the first uncommitted failure,
/// or when `p` succeeds without consuming anything.
pub fn many<'a, T>(p: impl Parser<'a, T>) -> impl Parser<'a, Vec<T>> {
    move |s: State<'a>| {
        let mut items = Vec::new();
        let mut cur = s;
        loop {
            match p.parse(cur) {
                Ok((item, next)) => {
                    let progressed = next.offset() > cur.offset();
                    items.push(item);
                    cur = next;
                    if !progressed {
                        return Ok((items, cur));
                    }
                }
                Err(failure) if failure.committed => return Err(failure),
                Err(_) => return Ok((items, cur)),
            }
        }
    }
}

/// Zero or more `p` separated by `sep`. Once a separator is consumed another
/// item is required, so a trailing separator is an error.
pub fn sep_by<'a, T, S>(p: impl Parser<'a, T>, sep: impl Parser<'a, S>) -> impl Parser<'a, Vec<T>> {
    move |s: State<'a>| {
        let mut items = Vec::new();
        let mut cur = match p.parse(s) {
            Ok((item, next)) => {
                items.push(item);
                next
            }
            Err(failure) if failure.committed => return Err(failure),
            Err(_) => return Ok((items, s)),
        };
        loop {
            let after_sep = match sep.parse(cur) {
                Ok((_, next)) => next,
                Err(failure) if failure.committed => return Err(failure),
                Err(_) => return Ok((items, cur)),
            };
            match p.parse(after_sep) {
                Ok((item, next)) => {
                    items.push(item);
                    cur = next;
                }
                Err(failure) => return Err(failure.commit_if(true)),
            }
        }
    }
}

/// `Some` on success, `None` on an uncommitted failure.
pub fn optional<'a, T>(p: impl Parser<'a, T>) -> impl Parser<'a, Option<T>> {
    move |s: State<'a>| match p.parse(s) {
        Ok((value, rest)) => Ok((Some(value), rest)),
        Err(failure) if failure.committed => Err(failure),
        Err(_) => Ok((None, s)),
    }
}

/// Turn any failure of `p` into an uncommitted one at the starting offset,
/// so alternation can backtrack over it.
pub fn attempt<'a, T>(p: impl Parser<'a, T>) -> impl Parser<'a, T> {
    move |s: State<'a>| {
        p.parse(s).map_err(|failure| Failure {
            offset: s.offset(),
            kind: failure.kind,
            committed: false,
        })
    }
}

/// Replace the expectation of an uncommitted failure at the starting offset
/// with `what`.
pub fn label<'a, T>(p: impl Parser<'a, T>, what: &'static str) -> impl Parser<'a, T> {
    move |s: State<'a>| {
        p.parse(s).map_err(|failure| {
            if failure.committed || failure.offset != s.offset() {
                failure
            } else {
                Failure::expected(s.offset(), what)
            }
        })
    }
}

/// Fail without consuming when the next character satisfies `pred`.
pub fn not_followed_by<'a, T>(
    p: impl Parser<'a, T>,
    pred: impl Fn(char) -> bool,
    what: &'static str,
) -> impl Parser<'a, T> {
    move |s: State<'a>| {
        let (value, rest) = p.parse(s)?;
        match rest.peek() {
            Some(c) if pred(c) => Err(Failure::expected(s.offset(), what)),
            _ => Ok((value, rest)),
        }
    }
}
