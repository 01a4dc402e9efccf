use crate::combinator::{choice, string, Parser};
use crate::lexical::{decimal, lexeme};
use rust_decimal::Decimal;

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Amount {
    pub number: Decimal,
    pub commodity: String,
}

impl Amount {
    pub fn new(number: Decimal, commodity: &str) -> Amount {
        Amount {
            number,
            commodity: commodity.to_string(),
        }
    }

    pub fn number(&self) -> Decimal {
        self.number
    }

    pub fn commodity(&self) -> &str {
        &self.commodity
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.commodity)
    }
}

/// Commodity symbols the amount grammar recognizes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commodities(Vec<String>);

impl Default for Commodities {
    fn default() -> Self {
        Commodities::new(["USD", "EUR", "$"])
    }
}

impl Commodities {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut commodities = Commodities(Vec::new());
        for symbol in symbols {
            commodities = commodities.with(symbol);
        }
        commodities
    }

    pub fn with(mut self, symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        if !symbol.is_empty() && !self.contains(&symbol) {
            self.0.push(symbol);
        }
        self
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.0.iter().any(|s| s == symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// One of the configured symbols. Longer symbols are tried first, so a
/// symbol sharing a prefix with another one still matches in full.
pub fn commodity(commodities: &Commodities) -> Parser<String> {
    let mut symbols: Vec<&str> = commodities.iter().collect();
    symbols.sort_by(|a, b| b.len().cmp(&a.len()));
    choice(symbols.into_iter().map(string).collect()).label("commodity")
}

/// `USD 20.00`, `$20.00` or `20.00 USD`; both orderings give the same value.
pub fn amount(commodities: &Commodities) -> Parser<Amount> {
    let prefixed = lexeme(commodity(commodities))
        .then(decimal())
        .map(|(commodity, number)| Amount { number, commodity })
        .attempt();
    let suffixed = lexeme(decimal())
        .then(commodity(commodities))
        .map(|(number, commodity)| Amount { number, commodity })
        .attempt();

    prefixed.or(suffixed).label("amount")
}
