//! Scalar value parsers: numbers, quoted strings, booleans and null.

use crate::combinator::{
    alt, label, not_followed_by, pattern, value, Failure, Outcome, Parser, State,
};
use crate::error::SyntaxKind;
use crate::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]?[0-9]+").expect("integer pattern"));
static FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[-+]?(?:[0-9]+\.[0-9]*(?:[eE][-+]?[0-9]+)?|\.[0-9]+(?:[eE][-+]?[0-9]+)?|[0-9]+[eE][-+]?[0-9]+)",
    )
    .expect("float pattern")
});
static TRUE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:true|True)\b").expect("true pattern"));
static FALSE_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:false|False)\b").expect("false pattern"));
static NULL_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:null|None)\b").expect("null pattern"));
static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][-_A-Za-z0-9]*").expect("identifier pattern"));

const TRIPLE_QUOTE: &str = "\"\"\"";

/// Characters that, directly after a digit run, mean the digits belong to
/// some longer token.
fn continues_number(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | '+' | ':' | '/')
}

/// An optionally signed digit run with no fraction or exponent.
pub fn integer<'a>(s: State<'a>) -> Outcome<'a, Value> {
    let digits = |s: State<'a>| pattern(s, &INTEGER, "integer");
    let (text, rest) = not_followed_by(digits, continues_number, "integer").parse(s)?;
    match text.parse::<i64>() {
        Ok(n) => Ok((Value::Int(n), rest)),
        Err(_) => Err(Failure::fatal(
            s.offset(),
            SyntaxKind::InvalidNumber(text.to_string()),
        )),
    }
}

/// A number with a decimal point, an exponent, or both.
pub fn float<'a>(s: State<'a>) -> Outcome<'a, Value> {
    let digits = |s: State<'a>| pattern(s, &FLOAT, "float");
    let (text, rest) = not_followed_by(digits, continues_number, "float").parse(s)?;
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok((Value::Float(f), rest)),
        _ => Err(Failure::fatal(
            s.offset(),
            SyntaxKind::InvalidNumber(text.to_string()),
        )),
    }
}

pub fn boolean<'a>(s: State<'a>) -> Outcome<'a, Value> {
    let yes = value(|s: State<'a>| pattern(s, &TRUE_WORD, "true"), Value::Bool(true));
    let no = value(|s: State<'a>| pattern(s, &FALSE_WORD, "false"), Value::Bool(false));
    label(alt(yes, no), "boolean").parse(s)
}

pub fn null<'a>(s: State<'a>) -> Outcome<'a, Value> {
    value(|s: State<'a>| pattern(s, &NULL_WORD, "null"), Value::Null).parse(s)
}

/// An unquoted name: a letter followed by letters, digits, `-` or `_`.
pub fn identifier<'a>(s: State<'a>) -> Outcome<'a, &'a str> {
    pattern(s, &IDENTIFIER, "identifier")
}

/// A string delimited by `"`, `'` or `"""`, with escapes decoded.
///
/// Single- and double-quoted strings end at a raw newline; triple-quoted ones
/// may span lines. Failures after the opening delimiter are committed and
/// reported at the opening delimiter, except escape failures, which point at
/// the backslash.
pub fn quoted_string<'a>(s: State<'a>) -> Outcome<'a, String> {
    let rest = s.rest();
    let delim = if rest.starts_with(TRIPLE_QUOTE) {
        TRIPLE_QUOTE
    } else if rest.starts_with('"') {
        "\""
    } else if rest.starts_with('\'') {
        "'"
    } else {
        return Err(Failure::expected(s.offset(), "string"));
    };

    let input = s.input();
    let open = s.offset();
    let mut pos = open + delim.len();
    let mut out = String::new();
    let mut saw_other_quote = false;

    loop {
        let tail = &input[pos..];
        if tail.starts_with(delim) {
            return Ok((out, s.advance(pos + delim.len() - open)));
        }
        let c = match tail.chars().next() {
            Some(c) => c,
            None => return Err(unterminated(open, saw_other_quote)),
        };
        match c {
            '\n' if delim.len() == 1 => return Err(unterminated(open, saw_other_quote)),
            '\\' if tail.len() == 1 => return Err(unterminated(open, saw_other_quote)),
            '\\' => {
                let (decoded, used) = decode_escape(tail).map_err(|kind| Failure::fatal(pos, kind))?;
                out.push(decoded);
                pos += used;
            }
            '"' | '\'' => {
                saw_other_quote = true;
                out.push(c);
                pos += 1;
            }
            _ => {
                out.push(c);
                pos += c.len_utf8();
            }
        }
    }
}

fn unterminated(open: usize, saw_other_quote: bool) -> Failure {
    let kind = if saw_other_quote {
        SyntaxKind::MismatchedQuotes
    } else {
        SyntaxKind::UnterminatedString
    };
    Failure::fatal(open, kind)
}

/// Decode the escape at the start of `tail` (which begins with a backslash).
/// Returns the character and the number of bytes consumed.
fn decode_escape(tail: &str) -> Result<(char, usize), SyntaxKind> {
    let esc = tail[1..].chars().next().unwrap_or('\\');
    let simple = match esc {
        '\\' => Some('\\'),
        '/' => Some('/'),
        '"' => Some('"'),
        '\'' => Some('\''),
        'b' => Some('\u{8}'),
        'f' => Some('\u{c}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        _ => None,
    };
    if let Some(c) = simple {
        return Ok((c, 2));
    }
    if esc != 'u' {
        return Err(SyntaxKind::UnrecognizedEscape(format!("\\{}", esc)));
    }

    let high = hex4(&tail[2..]).ok_or_else(|| {
        SyntaxKind::UnrecognizedEscape(format!("\\u{}", tail[2..].chars().take(4).collect::<String>()))
    })?;
    match high {
        0xD800..=0xDBFF => {
            let low = tail[6..].strip_prefix("\\u").and_then(hex4);
            match low {
                Some(low @ 0xDC00..=0xDFFF) => {
                    let cp = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    char::from_u32(cp)
                        .map(|c| (c, 12))
                        .ok_or(SyntaxKind::BadCodePoint(cp))
                }
                _ => Err(SyntaxKind::BadCodePoint(high)),
            }
        }
        _ => char::from_u32(high)
            .map(|c| (c, 6))
            .ok_or(SyntaxKind::BadCodePoint(high)),
    }
}

/// Four hex digits at the start of `s`.
fn hex4(s: &str) -> Option<u32> {
    let digits = s.get(..4)?;
    if digits.chars().all(|c| c.is_ascii_hexdigit()) {
        u32::from_str_radix(digits, 16).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run<'a, T>(p: impl Parser<'a, T>, input: &'a str) -> Result<(T, &'a str), Failure> {
        p.parse(State::new(input)).map(|(v, rest)| (v, rest.rest()))
    }

    #[test]
    fn test_integer() {
        assert_eq!(run(integer, "42"), Ok((Value::Int(42), "")));
        assert_eq!(run(integer, "-7,"), Ok((Value::Int(-7), ",")));
        assert_eq!(run(integer, "+3]"), Ok((Value::Int(3), "]")));
        assert_eq!(run(integer, "007 "), Ok((Value::Int(7), " ")));
    }

    #[test]
    fn test_integer_yields_to_float() {
        for text in ["1.5", "1e3", "2E-2", "3."] {
            let err = run(integer, text).unwrap_err();
            assert!(!err.committed, "{} must not commit", text);
            assert_eq!(err.offset, 0);
        }
    }

    #[test]
    fn test_integer_rejects_word_continuation() {
        assert!(run(integer, "22abc").is_err());
        assert!(run(integer, "1.2.3.4").is_err());
        assert!(run(integer, "10:30").is_err());
    }

    #[test]
    fn test_integer_overflow() {
        let err = run(integer, "99999999999999999999").unwrap_err();
        assert!(err.committed);
        assert_eq!(
            err.kind,
            SyntaxKind::InvalidNumber("99999999999999999999".into())
        );
    }

    #[test]
    fn test_float() {
        assert_eq!(run(float, "1.5"), Ok((Value::Float(1.5), "")));
        assert_eq!(run(float, "-0.25]"), Ok((Value::Float(-0.25), "]")));
        assert_eq!(run(float, ".5"), Ok((Value::Float(0.5), "")));
        assert_eq!(run(float, "1."), Ok((Value::Float(1.0), "")));
        assert_eq!(run(float, "1e3"), Ok((Value::Float(1000.0), "")));
        assert_eq!(run(float, "6.02E+23"), Ok((Value::Float(6.02e23), "")));
    }

    #[test]
    fn test_float_overflow() {
        let err = run(float, "1e999").unwrap_err();
        assert_eq!(err, Failure::fatal(0, SyntaxKind::InvalidNumber("1e999".into())));
    }

    #[test]
    fn test_float_requires_point_or_exponent() {
        assert!(run(float, "42").is_err());
        assert!(run(float, "1.2.3").is_err());
        assert!(run(float, "1e").is_err());
    }

    #[test]
    fn test_keywords_both_casings() {
        assert_eq!(run(boolean, "true"), Ok((Value::Bool(true), "")));
        assert_eq!(run(boolean, "True"), Ok((Value::Bool(true), "")));
        assert_eq!(run(boolean, "false,"), Ok((Value::Bool(false), ",")));
        assert_eq!(run(boolean, "False"), Ok((Value::Bool(false), "")));
        assert_eq!(run(null, "null"), Ok((Value::Null, "")));
        assert_eq!(run(null, "None}"), Ok((Value::Null, "}")));
    }

    #[test]
    fn test_keywords_need_word_boundary() {
        assert!(run(boolean, "trueish").is_err());
        assert!(run(null, "None_").is_err());
        assert!(run(boolean, "TRUE").is_err());
    }

    #[test]
    fn test_identifier() {
        assert_eq!(run(identifier, "host-name_2: 1"), Ok(("host-name_2", ": 1")));
        assert!(run(identifier, "2host").is_err());
        assert!(run(identifier, "_x").is_err());
    }

    #[test]
    fn test_quoted_string_delimiters() {
        assert_eq!(run(quoted_string, "\"abc\" x"), Ok(("abc".into(), " x")));
        assert_eq!(run(quoted_string, "'abc'"), Ok(("abc".into(), "")));
        assert_eq!(run(quoted_string, "\"\""), Ok((String::new(), "")));
        assert_eq!(
            run(quoted_string, "\"\"\"two\nlines \"quoted\"\"\"\""),
            Ok(("two\nlines \"quoted".into(), "\""))
        );
        assert_eq!(run(quoted_string, "'say \"hi\"'"), Ok(("say \"hi\"".into(), "")));
    }

    #[test]
    fn test_escapes() {
        assert_eq!(run(quoted_string, r#""a\nb""#).unwrap().0, "a\nb");
        assert_eq!(
            run(quoted_string, r#""\\ \/ \b \f \r \t""#).unwrap().0,
            "\\ / \u{8} \u{c} \r \t"
        );
        assert_eq!(run(quoted_string, r#"'it\'s'"#).unwrap().0, "it's");
        assert_eq!(run(quoted_string, r#""say \"hi\"""#).unwrap().0, "say \"hi\"");
        assert_eq!(run(quoted_string, r#""éA""#).unwrap().0, "éA");
        assert_eq!(run(quoted_string, r#""😀""#).unwrap().0, "😀");
    }

    #[test]
    fn test_unrecognized_escape() {
        let err = run(quoted_string, r#""ab\qc""#).unwrap_err();
        assert_eq!(err.kind, SyntaxKind::UnrecognizedEscape("\\q".into()));
        assert_eq!(err.offset, 3);
        assert!(err.committed);

        let err = run(quoted_string, r#""\u12G4""#).unwrap_err();
        assert_eq!(err.kind, SyntaxKind::UnrecognizedEscape("\\u12G4".into()));
    }

    #[test]
    fn test_lone_surrogate() {
        let err = run(quoted_string, r#""\ud800x""#).unwrap_err();
        assert_eq!(err.kind, SyntaxKind::BadCodePoint(0xD800));
        let err = run(quoted_string, r#""\udc00""#).unwrap_err();
        assert_eq!(err.kind, SyntaxKind::BadCodePoint(0xDC00));
    }

    #[test]
    fn test_unterminated_points_at_opening_quote() {
        let err = run(quoted_string, "\"abc").unwrap_err();
        assert_eq!(err, Failure::fatal(0, SyntaxKind::UnterminatedString));

        let err = run(quoted_string, "\"abc\ndef\"").unwrap_err();
        assert_eq!(err.kind, SyntaxKind::UnterminatedString);

        let err = run(quoted_string, "\"abc\\").unwrap_err();
        assert_eq!(err.kind, SyntaxKind::UnterminatedString);
    }

    #[test]
    fn test_mismatched_quotes() {
        let err = run(quoted_string, "\"abc'").unwrap_err();
        assert_eq!(err, Failure::fatal(0, SyntaxKind::MismatchedQuotes));
        let err = run(quoted_string, "'abc\"\n").unwrap_err();
        assert_eq!(err.kind, SyntaxKind::MismatchedQuotes);
        let err = run(quoted_string, "\"\"\"abc\"").unwrap_err();
        assert_eq!(err.kind, SyntaxKind::MismatchedQuotes);
    }

    #[test]
    fn test_not_a_string() {
        let err = run(quoted_string, "abc").unwrap_err();
        assert_eq!(err, Failure::expected(0, "string"));
    }
}
