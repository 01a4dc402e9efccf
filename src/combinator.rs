//! A small PEG-style combinator engine.
//!
//! Choice is ordered and first match wins. A failure is *committed* once the
//! failing parser consumed input; [`Parser::or`] only tries its right side
//! after an uncommitted failure, and [`Parser::attempt`] is the explicit
//! backtracking point that uncommits one.

use std::sync::{Arc, OnceLock};

use crate::error::ParseError;

/// Cursor over the text being parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Input<'s> {
    src: &'s str,
    offset: usize,
    depth: usize,
}

impl<'s> Input<'s> {
    pub fn new(src: &'s str) -> Input<'s> {
        Input {
            src,
            offset: 0,
            depth: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn source(&self) -> &'s str {
        self.src
    }

    pub fn rest(&self) -> &'s str {
        &self.src[self.offset..]
    }

    pub fn is_empty(&self) -> bool {
        self.offset >= self.src.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(crate) fn advance(self, bytes: usize) -> Input<'s> {
        Input {
            offset: self.offset + bytes,
            ..self
        }
    }

    /// Text before the cursor.
    pub(crate) fn consumed(&self) -> &'s str {
        &self.src[..self.offset]
    }

    /// Text consumed between `start` and this cursor.
    pub(crate) fn since(&self, start: Input<'s>) -> &'s str {
        &self.src[start.offset..self.offset]
    }

    /// Cursor right after the next line feed, or at end of input.
    pub(crate) fn skip_line(self) -> Input<'s> {
        match self.rest().find('\n') {
            Some(nl) => self.advance(nl + 1),
            None => self.advance(self.rest().len()),
        }
    }
}

pub type PResult<'s, T> = Result<(T, Input<'s>), ParseError>;

type ParseFn<T> = dyn Fn(Input<'_>) -> PResult<'_, T> + Send + Sync;

pub struct Parser<T> {
    run: Arc<ParseFn<T>>,
}

impl<T> Clone for Parser<T> {
    fn clone(&self) -> Self {
        Parser {
            run: Arc::clone(&self.run),
        }
    }
}

impl<T: 'static> Parser<T> {
    pub fn new<F>(f: F) -> Parser<T>
    where
        F: Fn(Input<'_>) -> PResult<'_, T> + Send + Sync + 'static,
    {
        Parser { run: Arc::new(f) }
    }

    pub fn parse<'s>(&self, input: Input<'s>) -> PResult<'s, T> {
        (self.run)(input)
    }

    /// Run against the start of `src`, ignoring whatever is left over.
    pub fn parse_str(&self, src: &str) -> Result<T, ParseError> {
        self.parse(Input::new(src)).map(|(value, _)| value)
    }

    pub fn map<U: 'static, F>(self, f: F) -> Parser<U>
    where
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Parser::new(move |input| {
            self.parse(input)
                .map(|(value, rest)| (f(value), rest))
        })
    }

    /// Like [`Parser::map`], but `f` may reject the value. The rejection is
    /// reported at the start of the parsed text as a failure to find
    /// `expected`.
    pub fn try_map<U: 'static, E, F>(self, expected: &str, f: F) -> Parser<U>
    where
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
    {
        let expected = expected.to_string();
        Parser::new(move |input| {
            let (value, rest) = self.parse(input)?;
            match f(value) {
                Ok(mapped) => Ok((mapped, rest)),
                Err(_) => Err(ParseError::new(input.offset(), expected.clone())
                    .committed(rest.offset() > input.offset())),
            }
        })
    }

    pub fn value<U>(self, value: U) -> Parser<U>
    where
        U: Clone + Send + Sync + 'static,
    {
        self.map(move |_| value.clone())
    }

    pub fn then<U: 'static>(self, next: Parser<U>) -> Parser<(T, U)> {
        Parser::new(move |input| {
            let (first, mid) = self.parse(input)?;
            let (second, rest) = next
                .parse(mid)
                .map_err(|err| err.committed(mid.offset() > input.offset()))?;
            Ok(((first, second), rest))
        })
    }

    pub fn skip_then<U: 'static>(self, next: Parser<U>) -> Parser<U> {
        self.then(next).map(|(_, second)| second)
    }

    pub fn then_skip<U: 'static>(self, next: Parser<U>) -> Parser<T> {
        self.then(next).map(|(first, _)| first)
    }

    pub fn or(self, other: Parser<T>) -> Parser<T> {
        Parser::new(move |input| match self.parse(input) {
            Err(err) if !err.is_consumed() => {
                other.parse(input).map_err(|second| err.merge(second))
            }
            result => result,
        })
    }

    pub fn attempt(self) -> Parser<T> {
        Parser::new(move |input| self.parse(input).map_err(ParseError::uncommitted))
    }

    /// Zero or one. Fails only when the parser failed after consuming input.
    pub fn optional(self) -> Parser<Option<T>> {
        Parser::new(move |input| match self.parse(input) {
            Ok((value, rest)) => Ok((Some(value), rest)),
            Err(err) if !err.is_consumed() => Ok((None, input)),
            Err(err) => Err(err),
        })
    }

    /// Greedy repetition. Stops at the first uncommitted failure, or after a
    /// success that consumed nothing.
    pub fn many(self) -> Parser<Vec<T>> {
        Parser::new(move |input| {
            let mut values = Vec::new();
            let mut cursor = input;
            loop {
                match self.parse(cursor) {
                    Ok((_, rest)) if rest.offset() == cursor.offset() => break,
                    Ok((value, rest)) => {
                        values.push(value);
                        cursor = rest;
                    }
                    Err(err) if !err.is_consumed() => break,
                    Err(err) => return Err(err.committed(cursor.offset() > input.offset())),
                }
            }
            Ok((values, cursor))
        })
    }

    pub fn many1(self) -> Parser<Vec<T>> {
        self.clone().then(self.many()).map(|(first, rest)| {
            let mut values = Vec::with_capacity(rest.len() + 1);
            values.push(first);
            values.extend(rest);
            values
        })
    }

    /// Peek: succeed with the value without moving the cursor.
    pub fn lookahead(self) -> Parser<T> {
        Parser::new(move |input| match self.parse(input) {
            Ok((value, _)) => Ok((value, input)),
            Err(err) => Err(err.uncommitted()),
        })
    }

    /// Succeed without consuming when this parser fails at the cursor.
    pub fn not_followed_by(self, what: &str) -> Parser<()> {
        let what = format!("not {}", what);
        Parser::new(move |input| match self.parse(input) {
            Ok(_) => Err(ParseError::new(input.offset(), what.clone())),
            Err(_) => Ok(((), input)),
        })
    }

    /// Name what this parser expects when it fails without getting past the
    /// cursor.
    pub fn label(self, name: &str) -> Parser<T> {
        let name = name.to_string();
        Parser::new(move |input| {
            self.parse(input).map_err(|err| {
                if err.is_consumed() || err.offset() > input.offset() {
                    err
                } else {
                    ParseError::new(input.offset(), name.clone())
                }
            })
        })
    }

    /// Run one nesting level deeper. Past `max` levels the parse fails on
    /// `what` instead of recursing further.
    pub fn nested(self, max: usize, what: &str) -> Parser<T> {
        let what = what.to_string();
        Parser::new(move |input| {
            if input.depth >= max {
                return Err(ParseError::new(input.offset(), what.clone()));
            }
            let inner = Input {
                depth: input.depth + 1,
                ..input
            };
            let (value, rest) = self.parse(inner)?;
            Ok((
                value,
                Input {
                    depth: input.depth,
                    ..rest
                },
            ))
        })
    }

    /// The matched text instead of the parsed value.
    pub fn recognize(self) -> Parser<String> {
        Parser::new(move |input| {
            let (_, rest) = self.parse(input)?;
            Ok((rest.since(input).to_string(), rest))
        })
    }
}

pub fn satisfy<F>(pred: F, what: &str) -> Parser<char>
where
    F: Fn(char) -> bool + Send + Sync + 'static,
{
    let what = what.to_string();
    Parser::new(move |input| match input.peek() {
        Some(c) if pred(c) => Ok((c, input.advance(c.len_utf8()))),
        _ => Err(ParseError::new(input.offset(), what.clone())),
    })
}

pub fn char(expected: char) -> Parser<char> {
    satisfy(move |c| c == expected, &format!("{:?}", expected))
}

pub fn one_of(chars: &str) -> Parser<char> {
    let set = chars.to_string();
    satisfy(move |c| set.contains(c), &format!("one of {:?}", chars))
}

/// Match `expected` literally. Never consumes on failure.
pub fn string(expected: &str) -> Parser<String> {
    let expected = expected.to_string();
    let what = format!("{:?}", expected);
    Parser::new(move |input| {
        if input.rest().starts_with(expected.as_str()) {
            Ok((expected.clone(), input.advance(expected.len())))
        } else {
            Err(ParseError::new(input.offset(), what.clone()))
        }
    })
}

fn prefix_len<F: Fn(char) -> bool>(text: &str, pred: F) -> usize {
    text.find(|c: char| !pred(c)).unwrap_or(text.len())
}

/// Longest run of characters matching `pred`, possibly empty.
pub fn take_while<F>(pred: F) -> Parser<String>
where
    F: Fn(char) -> bool + Send + Sync + 'static,
{
    Parser::new(move |input| {
        let len = prefix_len(input.rest(), &pred);
        Ok((input.rest()[..len].to_string(), input.advance(len)))
    })
}

pub fn take_while1<F>(pred: F, what: &str) -> Parser<String>
where
    F: Fn(char) -> bool + Send + Sync + 'static,
{
    let what = what.to_string();
    Parser::new(move |input| match prefix_len(input.rest(), &pred) {
        0 => Err(ParseError::new(input.offset(), what.clone())),
        len => Ok((input.rest()[..len].to_string(), input.advance(len))),
    })
}

pub fn eof() -> Parser<()> {
    Parser::new(|input| {
        if input.is_empty() {
            Ok(((), input))
        } else {
            Err(ParseError::new(input.offset(), "end of input"))
        }
    })
}

pub fn fail<T: 'static>(what: &str) -> Parser<T> {
    let what = what.to_string();
    Parser::new(move |input| Err(ParseError::new(input.offset(), what.clone())))
}

/// Ordered choice over any number of alternatives.
pub fn choice<T: 'static>(parsers: Vec<Parser<T>>) -> Parser<T> {
    parsers
        .into_iter()
        .reduce(Parser::or)
        .unwrap_or_else(|| fail("no alternatives"))
}

/// `operand (operator operand)*`, folded to the left.
pub fn chain_left<T, O, F>(operand: Parser<T>, operator: Parser<O>, combine: F) -> Parser<T>
where
    T: 'static,
    O: 'static,
    F: Fn(O, T, T) -> T + Send + Sync + 'static,
{
    operand
        .clone()
        .then(operator.then(operand).many())
        .map(move |(first, rest)| {
            rest.into_iter()
                .fold(first, |lhs, (op, rhs)| combine(op, lhs, rhs))
        })
}

/// Build a rule that refers to itself. `build` receives a handle standing in
/// for the finished rule.
pub fn recursive<T, F>(build: F) -> Parser<T>
where
    T: 'static,
    F: FnOnce(Parser<T>) -> Parser<T>,
{
    let slot: Arc<OnceLock<Parser<T>>> = Arc::new(OnceLock::new());

    // the handle holds a weak reference so the finished rule does not own itself
    let weak = Arc::downgrade(&slot);
    let handle = Parser::new(move |input| {
        let slot = weak
            .upgrade()
            .ok_or_else(|| ParseError::new(input.offset(), "recursive rule"))?;
        match slot.get() {
            Some(parser) => parser.parse(input),
            None => Err(ParseError::new(input.offset(), "recursive rule")),
        }
    });

    let _ = slot.set(build(handle));
    Parser::new(move |input| match slot.get() {
        Some(parser) => parser.parse(input),
        None => Err(ParseError::new(input.offset(), "recursive rule")),
    })
}
