//! The value grammar: documents, arrays and objects.

use crate::combinator::{
    alt, choice, end_of_input, label, left, lexeme, map, pair, sep_by, tag, whitespace, Failure,
    Outcome, Parser, State,
};
use crate::grammar::Rules;
use crate::scalar::{boolean, float, identifier, integer, null, quoted_string};
use crate::value::{Map, Value};
use std::collections::HashSet;
use tracing::trace;

impl Rules<'_> {
    /// A whole document: optional leading whitespace, at most one value, then
    /// end of input. A document with no value is `null`.
    pub(crate) fn document<'a>(&self, s: State<'a>) -> Outcome<'a, Value> {
        let ((), s) = whitespace(s)?;
        if s.is_at_end() {
            return Ok((Value::Null, s));
        }
        let (value, rest) = self.value(s)?;
        let ((), rest) = end_of_input(rest)?;
        Ok((value, rest))
    }

    /// Any value, followed by optional whitespace.
    ///
    /// Alternatives are tried in a fixed order: string, integer, float,
    /// object, array, boolean, null.
    pub(crate) fn value<'a>(&self, s: State<'a>) -> Outcome<'a, Value> {
        let string = map(quoted_string, Value::String);
        let object = |s: State<'a>| self.object(s);
        let array = |s: State<'a>| self.array(s);
        let any = move |s: State<'a>| {
            choice(
                s,
                &[&string, &integer, &float, &object, &array, &boolean, &null],
            )
        };
        lexeme(label(any, "value")).parse(s)
    }

    pub(crate) fn array<'a>(&self, s: State<'a>) -> Outcome<'a, Value> {
        let (_, inner) = lexeme(tag("[")).parse(s)?;
        let items = sep_by(|s: State<'a>| self.value(s), lexeme(tag(",")));
        let (items, rest) = items.parse(inner).map_err(Failure::commit)?;
        let what = if items.is_empty() {
            "value or \"]\""
        } else {
            "\",\" or \"]\""
        };
        let (_, rest) = label(tag("]"), what).parse(rest).map_err(Failure::commit)?;
        Ok((Value::Array(items), rest))
    }

    /// `{ key: value, ... }`. A repeated key keeps its first position and
    /// takes the later value. Reserved keys are renamed once the whole
    /// object is read, so a new name never lands on a key written in it.
    pub(crate) fn object<'a>(&self, s: State<'a>) -> Outcome<'a, Value> {
        let (_, inner) = lexeme(tag("{")).parse(s)?;
        let member = pair(
            left(|s: State<'a>| self.key(s), lexeme(tag(":"))),
            |s: State<'a>| self.value(s),
        );
        let members = sep_by(member, lexeme(tag(",")));
        let (entries, rest) = members.parse(inner).map_err(Failure::commit)?;
        let what = if entries.is_empty() {
            "object key or \"}\""
        } else {
            "\",\" or \"}\""
        };
        let (_, rest) = label(tag("}"), what).parse(rest).map_err(Failure::commit)?;

        let reserved = self.grammar.reserved_keys();
        let written: HashSet<String> = entries
            .iter()
            .filter(|(key, _)| !reserved.contains(key))
            .map(|(key, _)| key.clone())
            .collect();
        let mut object = Map::with_capacity(entries.len());
        for (key, value) in entries {
            let key = if reserved.contains(&key) {
                self.unreserve(&key, |name| written.contains(name) || object.contains_key(name))
            } else {
                key
            };
            object.insert(key, value);
        }
        Ok((Value::Object(object), rest))
    }

    /// An object key: a quoted string or a bare identifier.
    pub(crate) fn key<'a>(&self, s: State<'a>) -> Outcome<'a, String> {
        let bare = map(identifier, |name: &str| name.to_string());
        lexeme(label(alt(quoted_string, bare), "object key")).parse(s)
    }

    /// `key_N` with the next counter value for which `in_use` is false.
    fn unreserve(&self, key: &str, in_use: impl Fn(&str) -> bool) -> String {
        loop {
            let renamed = format!("{}_{}", key, self.counter.next());
            if !in_use(&renamed) {
                trace!(%key, %renamed, "renamed reserved object key");
                return renamed;
            }
            trace!(%key, %renamed, "suffix already in use");
        }
    }
}
