use std::str::FromStr;

use rust_decimal::Decimal;

use crate::combinator::{char, eof, one_of, satisfy, string, take_while, take_while1, Parser};
use crate::error::ParseError;

/// Characters that open a comment line at the top level of a journal.
pub const COMMENT_CHARS: &str = ";#%|*";

pub fn is_hspace(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Spaces and tabs, possibly none.
pub fn hspace() -> Parser<()> {
    take_while(is_hspace).map(|_| ())
}

pub fn hspace1() -> Parser<()> {
    take_while1(is_hspace, "whitespace").map(|_| ())
}

pub fn newline() -> Parser<()> {
    string("\r\n")
        .map(|_| ())
        .or(char('\n').map(|_| ()))
        .label("newline")
}

/// A newline, or the end of input terminating the last line.
pub fn line_end() -> Parser<()> {
    newline().or(eof()).label("end of line")
}

/// Run `p` and drop the horizontal whitespace after it.
pub fn lexeme<T: 'static>(p: Parser<T>) -> Parser<T> {
    p.then_skip(hspace())
}

/// Run `p`, drop trailing horizontal whitespace and finish the line.
pub fn lexline<T: 'static>(p: Parser<T>) -> Parser<T> {
    lexeme(p).then_skip(line_end())
}

pub fn rest_of_line() -> Parser<String> {
    take_while(|c| !is_line_break(c))
}

/// Two spaces or a tab, then `;`. Distinguishes a trailing note from a
/// single space inside free text.
pub fn note_separator() -> Parser<()> {
    string("  ")
        .map(|_| ())
        .or(char('\t').map(|_| ()))
        .then(hspace())
        .then(char(';'))
        .map(|_| ())
        .attempt()
}

/// `;` followed by the comment text, trimmed.
pub fn note_text() -> Parser<String> {
    char(';')
        .skip_then(rest_of_line())
        .map(|text| text.trim().to_string())
        .label("note")
}

/// A trailing note after a [`lexeme`] already ate the whitespace in front
/// of it. The eaten run must still be two spaces or contain a tab.
pub fn spaced_note_text() -> Parser<String> {
    let separated = Parser::new(|input| {
        let before = input.consumed();
        let gap = &before[before.trim_end_matches(is_hspace).len()..];
        if gap.len() >= 2 || gap.contains('\t') {
            Ok(((), input))
        } else {
            Err(ParseError::new(input.offset(), "note separator"))
        }
    });

    separated.skip_then(note_text())
}

/// A whole top-level comment line.
pub fn comment_line() -> Parser<String> {
    one_of(COMMENT_CHARS)
        .skip_then(lexline(rest_of_line()))
        .map(|text| text.trim().to_string())
        .label("comment")
}

/// Text up to the end of the line or a trailing note, whichever comes first.
/// Trailing whitespace is dropped.
pub fn free_text() -> Parser<String> {
    note_separator()
        .not_followed_by("trailing note")
        .skip_then(satisfy(|c| !is_line_break(c), "text"))
        .many()
        .map(|chars| chars.into_iter().collect::<String>().trim_end().to_string())
}

pub fn digits() -> Parser<String> {
    take_while1(|c| c.is_ascii_digit(), "digit")
}

pub fn natural() -> Parser<u32> {
    digits().try_map("number", |text| text.parse::<u32>())
}

/// Digits with optional `,` thousands separators, separators removed.
pub fn grouped_digits() -> Parser<String> {
    satisfy(|c| c.is_ascii_digit(), "digit")
        .then(take_while(|c| c.is_ascii_digit() || c == ','))
        .map(|(first, rest)| {
            let mut digits = first.to_string();
            digits.extend(rest.chars().filter(|&c| c != ','));
            digits
        })
}

/// `-`? digits (with separators) (`.` digits)?
pub fn decimal() -> Parser<Decimal> {
    let sign = char('-')
        .then_skip(satisfy(|c| c.is_ascii_digit(), "digit").lookahead())
        .attempt()
        .optional();
    let fraction = char('.').skip_then(digits()).attempt().optional();

    sign.then(grouped_digits())
        .then(fraction)
        .try_map("decimal number", |((sign, integer), fraction)| {
            let mut text = String::new();
            if sign.is_some() {
                text.push('-');
            }
            text.push_str(&integer);
            if let Some(fraction) = fraction {
                text.push('.');
                text.push_str(&fraction);
            }
            Decimal::from_str(&text)
        })
        .label("decimal number")
}
