use crate::amount::Commodities;
use crate::combinator::{char, Parser};
use crate::expression::{regex_literal, Expression};
use crate::lexical::{lexeme, lexline, line_end, spaced_note_text};
use crate::transaction::{block, reassemble, Note, Posting};

/// What an automated transaction matches against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    /// `= /pattern/` on its own.
    Regex(String),
    Expression(Expression),
}

/// `= <condition>` followed by template postings. The postings are applied
/// to matching transactions downstream; nothing is resolved here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutomatedTransaction {
    pub condition: Condition,
    pub notes: Vec<Note>,
    pub postings: Vec<Posting>,
}

/// A lone regex literal is a [`Condition::Regex`]; anything else on the line,
/// including a regex combined with operators, is an expression.
fn condition(expression: Parser<Expression>) -> Parser<Condition> {
    let line_rest = line_end().or(spaced_note_text().map(|_| ()));
    let lone_regex = lexeme(regex_literal())
        .then_skip(line_rest.lookahead())
        .attempt()
        .map(Condition::Regex);

    lone_regex.or(expression.map(Condition::Expression))
}

pub fn automated_transaction(
    commodities: &Commodities,
    expression: Parser<Expression>,
) -> Parser<AutomatedTransaction> {
    let head = lexeme(char('='))
        .skip_then(condition(expression))
        .then(lexline(spaced_note_text().map(Note::new).optional()));

    head.then(block(commodities))
        .try_map("posting", |((condition, note), lines)| {
            let (notes, postings) = reassemble(note, lines);
            if postings.is_empty() {
                return Err(());
            }

            Ok(AutomatedTransaction {
                condition,
                notes,
                postings,
            })
        })
        .label("automated transaction")
}
