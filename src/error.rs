use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// 1-based line and column of a byte offset inside the parsed text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn locate(src: &str, offset: usize) -> Location {
        let mut offset = offset.min(src.len());
        while !src.is_char_boundary(offset) {
            offset -= 1;
        }

        let before = &src[..offset];
        let line_start = before.rfind('\n').map_or(0, |nl| nl + 1);
        Location {
            line: before.matches('\n').count() + 1,
            column: before[line_start..].chars().count() + 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Grammar mismatch.
///
/// Holds the farthest offset any alternative reached and everything that was
/// expected there. Formatting line/column is left to the caller, see
/// [`ParseError::location`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("expected {} at offset {offset}", expected_list(.expected))]
pub struct ParseError {
    offset: usize,
    expected: BTreeSet<String>,
    consumed: bool,
}

fn expected_list(expected: &BTreeSet<String>) -> String {
    match expected.len() {
        0 => "nothing".to_string(),
        1 => expected.iter().cloned().collect(),
        _ => format!(
            "one of {}",
            expected.iter().cloned().collect::<Vec<_>>().join(", ")
        ),
    }
}

impl ParseError {
    pub(crate) fn new(offset: usize, expected: impl Into<String>) -> ParseError {
        ParseError {
            offset,
            expected: BTreeSet::from([expected.into()]),
            consumed: false,
        }
    }

    /// Byte offset of the failure.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn expected(&self) -> impl Iterator<Item = &str> {
        self.expected.iter().map(String::as_str)
    }

    pub fn location(&self, src: &str) -> Location {
        Location::locate(src, self.offset)
    }

    pub(crate) fn is_consumed(&self) -> bool {
        self.consumed
    }

    pub(crate) fn committed(mut self, consumed: bool) -> ParseError {
        self.consumed |= consumed;
        self
    }

    pub(crate) fn uncommitted(mut self) -> ParseError {
        self.consumed = false;
        self
    }

    /// Combine the failures of two alternatives tried at the same cursor.
    /// The farthest one wins, ties union their expectations, and commitment
    /// follows the alternative tried last.
    pub(crate) fn merge(self, other: ParseError) -> ParseError {
        let consumed = other.consumed;
        let mut merged = match self.offset.cmp(&other.offset) {
            Ordering::Greater => self,
            Ordering::Less => other,
            Ordering::Equal => {
                let mut merged = self;
                merged.expected.extend(other.expected);
                merged
            }
        };
        merged.consumed = consumed;
        merged
    }
}
