use crate::account::{account_directive, AccountDirective};
use crate::amount::Commodities;
use crate::automated::{automated_transaction, AutomatedTransaction};
use crate::combinator::{choice, eof, Parser};
use crate::expression::Expression;
use crate::lexical::{comment_line, hspace, line_end};
use crate::transaction::{transaction, Note, Transaction};

/// A top-level journal item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    Transaction(Transaction),
    Automated(AutomatedTransaction),
    Account(AccountDirective),
    Comment(Note),
}

impl From<Transaction> for Entry {
    fn from(transaction: Transaction) -> Self {
        Entry::Transaction(transaction)
    }
}

impl From<AutomatedTransaction> for Entry {
    fn from(automated: AutomatedTransaction) -> Self {
        Entry::Automated(automated)
    }
}

impl From<AccountDirective> for Entry {
    fn from(directive: AccountDirective) -> Self {
        Entry::Account(directive)
    }
}

pub(crate) fn blank_line() -> Parser<()> {
    hspace().then(line_end()).map(|_| ()).attempt()
}

pub(crate) fn entry(commodities: &Commodities, expression: Parser<Expression>) -> Parser<Entry> {
    choice(vec![
        comment_line().map(|text| Entry::Comment(Note::new(text))),
        transaction(commodities).map(Entry::Transaction),
        automated_transaction(commodities, expression).map(Entry::Automated),
        account_directive().map(Entry::Account),
    ])
}

/// Blank lines yield `None`.
pub(crate) fn item(entry: Parser<Entry>) -> Parser<Option<Entry>> {
    blank_line().map(|_| None).or(entry.map(Some))
}

pub(crate) fn journal(entry: Parser<Entry>) -> Parser<Vec<Entry>> {
    // retrying the entry at the leftover text only serves to report what it expected
    let end = eof().or(entry.clone().map(|_| ()));

    item(entry)
        .many()
        .then_skip(end)
        .map(|items| items.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use crate::account::AccountDirective;
    use crate::amount::Commodities;
    use crate::expression::expression;
    use crate::statement::{blank_line, entry, journal, Entry};
    use crate::transaction::Note;

    use anyhow::Result;

    fn parse(text: &str) -> Result<Vec<Entry>> {
        let commodities = Commodities::default();
        let entries = journal(entry(&commodities, expression(&commodities))).parse_str(text)?;
        Ok(entries)
    }

    #[test]
    fn blank_lines() {
        assert!(blank_line().parse_str("\n").is_ok());
        assert!(blank_line().parse_str(" \t \r\n").is_ok());
        assert!(blank_line().parse_str("  x\n").is_err());
    }

    #[test]
    fn parse_mixed_journal() -> Result<()> {
        let entries = parse(
            "; opening comment\n\naccount Assets:Cash\n\n2016/06/23 * Grocery store\n    Expenses:Food  20.00 USD\n    Assets:Cash\n\n= /Food/\n    Budget:Food\n# done",
        )?;
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0], Entry::Comment(Note::new("opening comment")));
        assert_eq!(
            entries[1],
            Entry::Account(AccountDirective::new("Assets:Cash"))
        );
        assert!(matches!(entries[2], Entry::Transaction(_)));
        assert!(matches!(entries[3], Entry::Automated(_)));
        assert_eq!(entries[4], Entry::Comment(Note::new("done")));
        Ok(())
    }

    #[test]
    fn empty_journal() -> Result<()> {
        assert!(parse("")?.is_empty());
        assert!(parse("\n\n   \n")?.is_empty());
        Ok(())
    }

    #[test]
    fn stray_line_fails_journal() {
        let text = "account Assets:Cash\nnonsense\n";
        let err = parse(text).unwrap_err();
        let err = err.downcast::<crate::ParseError>().unwrap();
        assert_eq!(err.location(text).line, 2);
        assert!(err.expected().any(|e| e == "end of input"));
        assert!(err.expected().any(|e| e == "transaction"));
        assert!(err.expected().any(|e| e == "account directive"));
    }
}
