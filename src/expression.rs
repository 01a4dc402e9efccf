//! Condition language of automated transactions.
//!
//! Binary operators only, in five left-associative tiers. From tightest to
//! loosest binding:
//!
//! 1. `*` `/`
//! 2. `+` `-`
//! 3. `==` `!=` `<` `<=` `>` `>=` `=~` `!~`
//! 4. `&&`
//! 5. `||`
//!
//! Operands are amounts, numbers, `/regex/` literals, quoted strings,
//! identifiers and parenthesized expressions.

use crate::amount::{amount, Amount, Commodities};
use crate::combinator::{
    chain_left, char, choice, recursive, string, take_while, take_while1, Parser,
};
use crate::lexical::{decimal, lexeme};
use rust_decimal::Decimal;

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Mul,
    Div,
    Add,
    Sub,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Match,
    NotMatch,
    And,
    Or,
}

/// Operators by tier, tightest first. Inside a tier, symbols that are a
/// prefix of another symbol come last.
const TIERS: [&[Operator]; 5] = [
    &[Operator::Mul, Operator::Div],
    &[Operator::Add, Operator::Sub],
    &[
        Operator::Eq,
        Operator::Ne,
        Operator::Le,
        Operator::Ge,
        Operator::Match,
        Operator::NotMatch,
        Operator::Lt,
        Operator::Gt,
    ],
    &[Operator::And],
    &[Operator::Or],
];

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Match => "=~",
            Operator::NotMatch => "!~",
            Operator::And => "&&",
            Operator::Or => "||",
        }
    }

    /// Tier of the operator, 1 binds tightest.
    pub fn precedence(&self) -> usize {
        TIERS
            .iter()
            .position(|tier| tier.contains(self))
            .map_or(0, |idx| idx + 1)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expression {
    Infix(Operator, Box<Expression>, Box<Expression>),
    Number(Decimal),
    Amount(Amount),
    Identifier(String),
    Regex(String),
    String(String),
}

impl Expression {
    pub fn infix(op: Operator, lhs: Expression, rhs: Expression) -> Expression {
        Expression::Infix(op, Box::new(lhs), Box::new(rhs))
    }
}

/// Fully parenthesized, so the tree shape is visible.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Infix(op, lhs, rhs) => write!(f, "({} {} {})", lhs, op, rhs),
            Expression::Number(number) => write!(f, "{}", number),
            Expression::Amount(amount) => write!(f, "{}", amount),
            Expression::Identifier(name) => f.write_str(name),
            Expression::Regex(pattern) => write!(f, "/{}/", pattern),
            Expression::String(text) => write!(f, "{:?}", text),
        }
    }
}

/// `/…/`, no escapes.
pub fn regex_literal() -> Parser<String> {
    char('/')
        .skip_then(take_while(|c| c != '/' && c != '\n'))
        .then_skip(char('/'))
        .label("regex")
}

fn quoted(quote: char) -> Parser<String> {
    char(quote)
        .skip_then(take_while(move |c| c != quote && c != '\n'))
        .then_skip(char(quote))
}

pub fn string_literal() -> Parser<String> {
    quoted('"').or(quoted('\'')).label("string")
}

pub fn identifier() -> Parser<String> {
    take_while1(|c| c.is_alphanumeric() || c == '_', "identifier")
}

fn primitive(commodities: &Commodities) -> Parser<Expression> {
    choice(vec![
        amount(commodities).map(Expression::Amount),
        decimal().map(Expression::Number),
        regex_literal().map(Expression::Regex),
        string_literal().map(Expression::String),
        identifier().map(Expression::Identifier),
    ])
}

fn operator(tier: &[Operator]) -> Parser<Operator> {
    let alternatives = tier
        .iter()
        .map(|&op| string(op.symbol()).value(op).attempt())
        .collect();
    lexeme(choice(alternatives))
}

/// Deepest parenthesization accepted inside one expression.
pub const MAX_NESTING: usize = 64;

/// The expression rule. Parenthesized operands refer back to the finished
/// rule through [`recursive`], at most [`MAX_NESTING`] levels deep.
pub fn expression(commodities: &Commodities) -> Parser<Expression> {
    let primitive = primitive(commodities);
    recursive(move |expression| {
        let parenthesized = lexeme(char('('))
            .skip_then(expression.nested(MAX_NESTING, "shallower expression nesting"))
            .then_skip(lexeme(char(')')));
        let operand = lexeme(primitive).or(parenthesized);

        TIERS.iter().fold(operand, |operand, tier| {
            chain_left(operand, operator(tier), Expression::infix)
        })
    })
    .label("expression")
}
