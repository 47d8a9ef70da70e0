//! Source preparation and error location.
//!
//! Bash-style comment lines are blanked rather than removed, so every line
//! of the stripped text sits at the same line number as in the original.
//! Non-comment lines are kept byte-for-byte, which lets a failure offset in
//! the stripped text be mapped back to a line, column and byte offset in the
//! original text.

use unicode_width::UnicodeWidthChar;

/// Number of characters shown on either side of a failure in a snippet.
const SNIPPET_CONTEXT: usize = 30;

/// Columns a tab occupies in a snippet.
const TAB_WIDTH: usize = 4;

/// A 1-based line/column position plus the byte offset it corresponds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

/// The original text of one parse and its comment-stripped copy.
#[derive(Debug)]
pub struct Source<'a> {
    original: &'a str,
    stripped: String,
    line_starts: Vec<usize>,
}

impl<'a> Source<'a> {
    pub fn new(original: &'a str) -> Self {
        Self {
            original,
            stripped: strip_comments(original),
            line_starts: line_starts(original),
        }
    }

    /// Wrap text that must be parsed as-is (a single command line).
    pub fn verbatim(original: &'a str) -> Self {
        Self {
            original,
            stripped: original.to_string(),
            line_starts: line_starts(original),
        }
    }

    pub fn stripped(&self) -> &str {
        &self.stripped
    }

    /// Map a byte offset in the stripped text to a location in the original.
    pub fn locate(&self, offset: usize) -> Location {
        let offset = offset.min(self.stripped.len());
        let before = &self.stripped[..offset];
        let line_idx = before.matches('\n').count();
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let in_line = &before[line_start..];

        // A blanked comment line has no content; clamp into the original line.
        let orig_start = self.line_starts[line_idx.min(self.line_starts.len() - 1)];
        let orig_line = line_text(self.original, orig_start);
        let byte_in_line = in_line.len().min(orig_line.len());

        Location {
            offset: orig_start + byte_in_line,
            line: line_idx + 1,
            column: in_line.chars().count() + 1,
        }
    }

    /// Render the original line around `loc` with a caret under the column.
    /// Tabs are expanded and wide characters counted at their display width
    /// so the caret lines up in a terminal.
    pub fn snippet(&self, loc: Location) -> String {
        let start = self.line_starts[(loc.line - 1).min(self.line_starts.len() - 1)];
        let line = line_text(self.original, start).trim_end_matches('\r');
        let chars: Vec<char> = line.chars().collect();
        let col = (loc.column - 1).min(chars.len());

        let from = col.saturating_sub(SNIPPET_CONTEXT);
        let to = (col + SNIPPET_CONTEXT + 1).min(chars.len());
        let window: String = chars[from..to]
            .iter()
            .map(|&c| if c == '\t' { " ".repeat(TAB_WIDTH) } else { c.to_string() })
            .collect();
        let pad: usize = chars[from..col].iter().map(|&c| display_width(c)).sum();
        let lead = if from > 0 { "..." } else { "" };
        let tail = if to < chars.len() { "..." } else { "" };

        format!(
            "{:>4} | {}{}{}\n     | {}^",
            loc.line,
            lead,
            window,
            tail,
            " ".repeat(lead.len() + pad)
        )
    }
}

/// Replace each `#` comment line (leading whitespace permitted) with an
/// empty line.
pub fn strip_comments(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.trim_start().starts_with('#') {
                ""
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Count lines the way `strip_comments` sees them: one more than the number
/// of newlines.
pub fn count_lines(text: &str) -> usize {
    text.split('\n').count()
}

fn display_width(c: char) -> usize {
    if c == '\t' {
        TAB_WIDTH
    } else {
        c.width().unwrap_or(0)
    }
}

fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

fn line_text(text: &str, start: usize) -> &str {
    let rest = &text[start..];
    match rest.find('\n') {
        Some(end) => &rest[..end],
        None => rest,
    }
}
