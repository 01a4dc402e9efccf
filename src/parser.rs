use crate::amount::Commodities;
use crate::combinator::{eof, Input, Parser};
use crate::error::ParseError;
use crate::expression::{expression, Expression};
use crate::ledger::Journal;
use crate::lexical::hspace;
use crate::statement::{blank_line, entry, item, journal, Entry};
use anyhow::Result;
use log::{debug, warn};

/// Knobs of the grammar.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParserConfig {
    pub commodities: Commodities,
}

impl ParserConfig {
    pub fn new() -> ParserConfig {
        Default::default()
    }

    pub fn with_commodity(mut self, symbol: &str) -> ParserConfig {
        self.commodities = self.commodities.with(symbol);
        self
    }

    pub fn with_commodities(mut self, commodities: Commodities) -> ParserConfig {
        self.commodities = commodities;
        self
    }
}

/// The journal grammar, built once and reusable for any number of inputs.
#[derive(Clone)]
pub struct LedgerParser {
    entry: Parser<Entry>,
    item: Parser<Option<Entry>>,
    journal: Parser<Vec<Entry>>,
    expression: Parser<Expression>,
}

impl Default for LedgerParser {
    fn default() -> Self {
        LedgerParser::new(&ParserConfig::default())
    }
}

impl LedgerParser {
    pub fn new(config: &ParserConfig) -> LedgerParser {
        debug!(
            "building ledger grammar for commodities {:?}",
            config.commodities.iter().collect::<Vec<_>>()
        );

        let expression = expression(&config.commodities);
        let entry = entry(&config.commodities, expression.clone());

        LedgerParser {
            item: item(entry.clone()),
            journal: journal(entry.clone()),
            entry,
            expression,
        }
    }

    /// Every entry of `input`; the first malformed one fails the whole parse.
    pub fn parse_entries(&self, input: &str) -> Result<Vec<Entry>, ParseError> {
        let entries = self.journal.parse_str(input)?;
        debug!("parsed {} entries", entries.len());
        Ok(entries)
    }

    /// Exactly one entry, blank lines around it allowed.
    pub fn parse_entry(&self, input: &str) -> Result<Entry, ParseError> {
        blank_line()
            .many()
            .skip_then(self.entry.clone())
            .then_skip(blank_line().many())
            .then_skip(eof())
            .parse_str(input)
    }

    /// A whole expression, nothing after it.
    pub fn parse_expression(&self, input: &str) -> Result<Expression, ParseError> {
        hspace()
            .skip_then(self.expression.clone())
            .then_skip(eof())
            .parse_str(input)
    }

    /// Parse entry by entry. A malformed entry is reported and skipped up to
    /// the next line starting at column 1, then parsing goes on.
    pub fn parse_recovering(&self, input: &str) -> (Vec<Entry>, Vec<ParseError>) {
        let mut entries = Vec::new();
        let mut errors = Vec::new();
        let mut cursor = Input::new(input);

        while !cursor.is_empty() {
            match self.item.parse(cursor) {
                Ok((item, rest)) if rest.offset() > cursor.offset() => {
                    entries.extend(item);
                    cursor = rest;
                }
                Ok(_) => cursor = resynchronize(cursor),
                Err(err) => {
                    warn!(
                        "skipping malformed entry at {}: {}",
                        err.location(input),
                        err
                    );
                    errors.push(err);
                    cursor = resynchronize(cursor);
                }
            }
        }

        debug!(
            "parsed {} entries, skipped {} malformed",
            entries.len(),
            errors.len()
        );
        (entries, errors)
    }
}

/// Skip the current line and the indented lines belonging to it.
fn resynchronize(input: Input<'_>) -> Input<'_> {
    let mut cursor = input.skip_line();
    while matches!(cursor.peek(), Some(' ') | Some('\t')) {
        cursor = cursor.skip_line();
    }
    cursor
}

/// Parse `input` with the default grammar and append the entries to
/// `carried_journal`, or to a new journal.
pub fn parse(input: &str, carried_journal: Option<Journal>) -> Result<Journal> {
    parse_with(input, carried_journal, &ParserConfig::default())
}

pub fn parse_with(
    input: &str,
    carried_journal: Option<Journal>,
    config: &ParserConfig,
) -> Result<Journal> {
    let entries = LedgerParser::new(config)
        .parse_entries(input)
        .map_err(|err| {
            let location = err.location(input);
            anyhow::Error::new(err).context(format!("invalid journal at {}", location))
        })?;

    let mut journal = carried_journal.unwrap_or_default();
    journal.extend(entries);
    Ok(journal)
}

#[cfg(test)]
mod tests {
    use crate::account::AccountDirective;
    use crate::amount::{Amount, Commodities};
    use crate::date::Date;
    use crate::expression::{Expression, Operator};
    use crate::parser::{parse, parse_with, LedgerParser, ParserConfig};
    use crate::statement::Entry;
    use crate::transaction::{Note, Posting, Transaction, TransactionState};
    use crate::ParseError;
    use rust_decimal::Decimal;

    use anyhow::{anyhow, Result};
    use proptest::prelude::*;

    const GROCERY: &str = "2016/06/23 * Grocery store\n    Expenses:Food  20.00 USD\n    Assets:Cash\n";

    fn grocery() -> Transaction {
        Transaction {
            date: Date::new(2016, 6, 23),
            state: Some(TransactionState::Cleared),
            title: "Grocery store".to_string(),
            notes: vec![],
            postings: vec![
                Posting::new(
                    "Expenses:Food",
                    Some(Amount::new(Decimal::new(2000, 2), "USD")),
                ),
                Posting::new("Assets:Cash", None),
            ],
        }
    }

    #[test]
    fn parse_grocery_entry() -> Result<()> {
        let parser = LedgerParser::default();
        assert_eq!(parser.parse_entry(GROCERY)?, Entry::Transaction(grocery()));
        Ok(())
    }

    #[test]
    fn parse_directive_entry() -> Result<()> {
        let parser = LedgerParser::default();
        assert_eq!(
            parser.parse_entry("account Assets:Bank:Checking")?,
            Entry::Account(AccountDirective::new("Assets:Bank:Checking"))
        );
        assert!(parser
            .parse_entry("account Assets:Cash\naccount Assets:Bank\n")
            .is_err());
        Ok(())
    }

    #[test]
    fn parse_expression_entry_point() -> Result<()> {
        let parser = LedgerParser::default();
        assert_eq!(
            parser.parse_expression("  1 + 2 * 3  ")?,
            Expression::infix(
                Operator::Add,
                Expression::Number(Decimal::from(1)),
                Expression::infix(
                    Operator::Mul,
                    Expression::Number(Decimal::from(2)),
                    Expression::Number(Decimal::from(3))
                )
            )
        );
        assert!(parser.parse_expression("1 2").is_err());
        Ok(())
    }

    #[test]
    fn parse_into_journal() -> Result<()> {
        let journal = parse(
            &format!("account Assets:Cash\n\n{}\n; trailing comment\n", GROCERY),
            None,
        )?;
        assert_eq!(journal.len(), 3);
        assert_eq!(journal.transactions().next(), Some(&grocery()));
        assert!(journal.account("Assets:Cash").is_some());
        assert_eq!(
            journal.comments().collect::<Vec<_>>(),
            vec![&Note::new("trailing comment")]
        );
        Ok(())
    }

    #[test]
    fn carried_journal_is_appended() -> Result<()> {
        let journal = parse("account Assets:Cash\n", None)?;
        let journal = parse(GROCERY, Some(journal))?;
        assert_eq!(journal.len(), 2);
        assert!(matches!(journal.entries()[0], Entry::Account(_)));
        assert!(matches!(journal.entries()[1], Entry::Transaction(_)));
        Ok(())
    }

    #[test]
    fn parse_error_carries_location() -> Result<()> {
        let text = "account Assets:Cash\n2016/06/23 * Grocery store\naccount Assets:Bank\n";
        let err = parse(text, None).unwrap_err();
        assert_eq!(
            format!("{}", err),
            "invalid journal at line 3, column 1"
        );

        let cause = err
            .downcast_ref::<ParseError>()
            .ok_or(anyhow!("parse error expected"))?;
        assert_eq!(cause.offset(), 47);
        Ok(())
    }

    #[test]
    fn configured_commodities() -> Result<()> {
        let text = "2021/04/01 * Warung\n    Expenses:Dining  50,000 IDR\n    Assets:Cash\n";
        assert!(parse(text, None).is_err());

        let journal = parse_with(text, None, &ParserConfig::new().with_commodity("IDR"))?;
        let transaction = journal.transactions().next().ok_or(anyhow!("no transaction"))?;
        assert_eq!(
            transaction.postings[0].amount,
            Some(Amount::new(Decimal::from(50_000), "IDR"))
        );

        let only_jpy = ParserConfig::new().with_commodities(Commodities::new(["JPY"]));
        assert!(parse_with(GROCERY, None, &only_jpy).is_err());
        Ok(())
    }

    #[test]
    fn recovering_parse_skips_malformed_entries() {
        let text = "2016/06/23 * Broken\n    Expenses:Food  20.00 IDR\n    Assets:Cash\nnonsense\naccount Assets:Cash\n\n2016/06/24 * Fine\n    Expenses:Food  $5\n    Assets:Cash\n";
        let (entries, errors) = LedgerParser::default().parse_recovering(text);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].location(text).line, 2);
        assert_eq!(errors[1].location(text).line, 4);

        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0],
            Entry::Account(AccountDirective::new("Assets:Cash"))
        );
        match &entries[1] {
            Entry::Transaction(transaction) => assert_eq!(transaction.title, "Fine"),
            other => panic!("unexpected entry {:?}", other),
        }
    }

    #[test]
    fn empty_block_is_rejected() {
        let err = LedgerParser::default()
            .parse_entries("2016/06/23 * Grocery store\n\n")
            .unwrap_err();
        assert_eq!(err.offset(), 27);
    }

    #[test]
    fn deeply_nested_condition_is_an_error() {
        let text = format!(
            "= {}1{}\n    Budget:Food\n",
            "(".repeat(3000),
            ")".repeat(3000)
        );
        let parser = LedgerParser::default();
        let err = parser.parse_entries(&text).unwrap_err();
        assert!(err.expected().any(|e| e == "shallower expression nesting"));

        let (entries, errors) = parser.parse_recovering(&text);
        assert!(entries.is_empty());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn header_note_without_title() -> Result<()> {
        let entry = LedgerParser::default()
            .parse_entry("2016/06/23 *   ; just a note\n    Assets:Cash\n")?;
        match entry {
            Entry::Transaction(transaction) => {
                assert_eq!(transaction.title, "");
                assert_eq!(transaction.notes, vec![Note::new("just a note")]);
            }
            other => panic!("unexpected entry {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn grammar_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LedgerParser>();

        let parser = LedgerParser::default();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let parser = parser.clone();
                std::thread::spawn(move || parser.parse_entries(GROCERY).map(|e| e.len()))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok(1));
        }
    }

    proptest! {
        #[test]
        fn extra_whitespace_does_not_change_the_value(
            after_date in 1usize..4,
            after_state in 1usize..4,
            trailing in 0usize..4,
            indent in 1usize..6,
            separator in 2usize..6,
            blank_lines in 0usize..3,
        ) {
            let pad = |n: usize| " ".repeat(n);
            let text = format!(
                "{blank}2016/06/23{}*{}Grocery store{}\n{}Expenses:Food{}20.00 USD{}\n{}Assets:Cash{}\n{blank}",
                pad(after_date),
                pad(after_state),
                pad(trailing),
                pad(indent),
                pad(separator),
                pad(trailing),
                pad(indent),
                pad(trailing),
                blank = "\n".repeat(blank_lines),
            );
            let parsed = LedgerParser::default().parse_entries(&text);
            prop_assert_eq!(parsed, Ok(vec![Entry::Transaction(grocery())]));
        }
    }
}
