use crate::combinator::{char, satisfy, string, Parser};
use crate::lexical::{hspace1, lexeme, lexline, spaced_note_text};
use crate::transaction::Note;

use std::fmt;

/// Colon separated components of an account name, e.g. `Assets:Bank:Checking`
/// gives `["Assets", "Bank", "Checking"]`.
pub fn segments(name: &str) -> Vec<&str> {
    name.split(':').collect()
}

/// Non-whitespace characters and single interior spaces. A double space, a
/// tab or the end of the line ends the name.
pub fn account_name() -> Parser<String> {
    let name_char = satisfy(|c| !c.is_whitespace(), "account name");
    let inner_space = char(' ')
        .then_skip(name_char.clone().lookahead())
        .attempt();

    name_char
        .clone()
        .then(name_char.or(inner_space).many())
        .map(|(first, rest)| {
            let mut name = first.to_string();
            name.extend(rest);
            name
        })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountDirective {
    pub name: String,
    pub note: Option<Note>,
}

impl AccountDirective {
    pub fn new(name: &str) -> AccountDirective {
        AccountDirective {
            name: name.to_string(),
            note: None,
        }
    }

    pub fn segments(&self) -> Vec<&str> {
        segments(&self.name)
    }

    /// Name of the enclosing account, `None` for a top level account.
    pub fn parent(&self) -> Option<&str> {
        self.name.rsplit_once(':').map(|(parent, _)| parent)
    }
}

impl fmt::Display for AccountDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account {}", self.name)
    }
}

/// `account <name>` on a single line, with an optional trailing note.
pub fn account_directive() -> Parser<AccountDirective> {
    let keyword = string("account").then(hspace1()).attempt();

    keyword
        .skip_then(lexeme(account_name()))
        .then(lexline(spaced_note_text().map(Note::new).optional()))
        .map(|(name, note)| AccountDirective { name, note })
        .label("account directive")
}

#[cfg(test)]
mod tests {
    use crate::account::{account_directive, account_name, segments, AccountDirective};
    use crate::combinator::Input;
    use crate::transaction::Note;

    use anyhow::Result;

    #[test]
    fn single_space_stays_in_name() -> Result<()> {
        let (name, rest) = account_name().parse(Input::new("Liabilities:Credit Card  50.00 USD"))?;
        assert_eq!(name, "Liabilities:Credit Card");
        assert_eq!(rest.rest(), "  50.00 USD");
        Ok(())
    }

    #[test]
    fn tab_and_newline_end_name() -> Result<()> {
        let (name, rest) = account_name().parse(Input::new("Credit Card\t50.00 USD"))?;
        assert_eq!(name, "Credit Card");
        assert_eq!(rest.rest(), "\t50.00 USD");

        let (name, rest) = account_name().parse(Input::new("Assets:Cash \nnext"))?;
        assert_eq!(name, "Assets:Cash");
        assert_eq!(rest.rest(), " \nnext");
        Ok(())
    }

    #[test]
    fn name_cannot_start_with_space() {
        assert!(account_name().parse_str(" Assets").is_err());
    }

    #[test]
    fn parse_account_directive() -> Result<()> {
        assert_eq!(
            account_directive().parse_str("account Assets:Bank:Checking")?,
            AccountDirective::new("Assets:Bank:Checking")
        );

        let directive = account_directive().parse_str("account Expenses:Eating Out  ; restaurants\n")?;
        assert_eq!(directive.name, "Expenses:Eating Out");
        assert_eq!(directive.note, Some(Note::new("restaurants")));

        let directive = account_directive().parse_str("account Assets:Cash\t;wallet  \n")?;
        assert_eq!(directive.name, "Assets:Cash");
        assert_eq!(directive.note, Some(Note::new("wallet")));

        // a single space keeps `;` inside the name
        let directive = account_directive().parse_str("account Assets:Cash ;x\n")?;
        assert_eq!(directive.name, "Assets:Cash ;x");
        assert_eq!(directive.note, None);
        Ok(())
    }

    #[test]
    fn keyword_needs_whitespace() {
        let err = account_directive().parse_str("accounts Foo").unwrap_err();
        assert_eq!(err.offset(), 7);
        assert_eq!(err.expected().collect::<Vec<_>>(), vec!["whitespace"]);
        assert!(account_directive().parse_str("account").is_err());
    }

    #[test]
    fn account_hierarchy() {
        let directive = AccountDirective::new("Assets:Bank:Checking");
        assert_eq!(directive.segments(), vec!["Assets", "Bank", "Checking"]);
        assert_eq!(directive.parent(), Some("Assets:Bank"));
        assert_eq!(AccountDirective::new("Equity").parent(), None);
        assert_eq!(segments("Income"), vec!["Income"]);
        assert_eq!(format!("{}", directive), "account Assets:Bank:Checking");
    }
}
