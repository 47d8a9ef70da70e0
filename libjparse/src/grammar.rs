//! The grammar definition shared by every parse.
//!
//! [`Grammar`] holds the immutable parts (reserved word sets) and is built
//! once. [`Rules`] pairs a grammar with the collision counter for the
//! duration of one parse; the rule methods live in `composite.rs` and
//! `command.rs`.

use crate::command::{Noun, Verb};
use crate::keywords::{KeyCounter, KeywordSet, RESERVED_KEYS};
use once_cell::sync::Lazy;

static SHARED: Lazy<Grammar> = Lazy::new(Grammar::new);

/// Immutable grammar configuration.
#[derive(Clone, Debug)]
pub struct Grammar {
    reserved_keys: KeywordSet,
    command_words: KeywordSet,
}

impl Grammar {
    pub fn new() -> Self {
        let words = Verb::ALL
            .iter()
            .map(|v| v.as_str())
            .chain(Noun::ALL.iter().map(|n| n.as_str()));
        Self {
            reserved_keys: KeywordSet::new(RESERVED_KEYS.iter().copied()),
            command_words: KeywordSet::new(words),
        }
    }

    /// The grammar built with the default word sets, shared process-wide.
    pub fn shared() -> &'static Grammar {
        &SHARED
    }

    /// Replace the set of object keys that get a collision suffix.
    pub fn with_reserved_keys(mut self, keys: KeywordSet) -> Self {
        self.reserved_keys = keys;
        self
    }

    pub fn reserved_keys(&self) -> &KeywordSet {
        &self.reserved_keys
    }

    /// Verbs and nouns of the command language.
    pub fn command_words(&self) -> &KeywordSet {
        &self.command_words
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

/// A grammar plus the counter used while parsing one input.
#[derive(Clone, Copy)]
pub(crate) struct Rules<'g> {
    pub(crate) grammar: &'g Grammar,
    pub(crate) counter: &'g dyn KeyCounter,
}

impl<'g> Rules<'g> {
    pub(crate) fn new(grammar: &'g Grammar, counter: &'g dyn KeyCounter) -> Self {
        Self { grammar, counter }
    }
}
