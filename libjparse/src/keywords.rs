//! Reserved word sets and the key-collision counter.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

/// Words that cannot be used as-is for object keys, because the parsed tree
/// is later accessed with attribute-style lookup in a language that reserves
/// them.
pub const RESERVED_KEYS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// An immutable set of reserved words.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeywordSet {
    words: BTreeSet<String>,
}

impl KeywordSet {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Source of the suffixes appended to reserved object keys.
///
/// This is the only non-deterministic input to an otherwise pure parse.
/// Values must increase monotonically; they need not be contiguous.
pub trait KeyCounter: Send + Sync {
    fn next(&self) -> u64;
}

/// A thread-safe monotonically increasing counter.
#[derive(Debug)]
pub struct AtomicCounter(AtomicU64);

impl AtomicCounter {
    /// A counter whose first value is `start`.
    pub const fn starting_at(start: u64) -> Self {
        Self(AtomicU64::new(start))
    }
}

impl Default for AtomicCounter {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl KeyCounter for AtomicCounter {
    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

static GLOBAL_COUNTER: AtomicCounter = AtomicCounter::starting_at(1);

/// The process-wide counter shared by every parse that does not inject its own.
pub fn global_counter() -> &'static AtomicCounter {
    &GLOBAL_COUNTER
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_keyword_set() {
        let set = KeywordSet::new(RESERVED_KEYS.iter().copied());
        assert_eq!(set.len(), RESERVED_KEYS.len());
        assert!(set.contains("class"));
        assert!(set.contains("None"));
        assert!(!set.contains("none"));
        assert!(!set.contains("host"));
    }

    #[test]
    fn test_counter_is_monotonic() {
        let counter = AtomicCounter::starting_at(10);
        assert_eq!(counter.next(), 10);
        assert_eq!(counter.next(), 11);
    }

    #[test]
    fn test_global_counter_never_repeats() {
        let a = global_counter().next();
        let b = global_counter().next();
        assert!(b > a);
    }

    #[test]
    fn test_counter_across_threads() {
        let counter = Arc::new(AtomicCounter::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let c = Arc::clone(&counter);
                thread::spawn(move || (0..100).map(|_| c.next()).collect::<Vec<_>>())
            })
            .collect();
        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 400);
    }
}
