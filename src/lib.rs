//! Ledgerparse - A parser for plain-text double-entry ledger journals
//! ---
//!
//! Journals are made of dated transactions with indented postings, automated
//! transactions keyed on a condition, `account` directives and comment lines.
//! The grammar is built from a small set of parser combinators living in
//! [`combinator`], so every rule is an ordinary value that can be reused,
//! composed and shared across threads.
//!
//! ```
//! let journal = ledgerparse::parse(
//!     "2016/06/23 * Grocery store\n    Expenses:Food  20.00 USD\n    Assets:Cash\n",
//!     None,
//! )
//! .unwrap();
//! assert_eq!(journal.transactions().count(), 1);
//! ```

/// Account names and the `account` directive.
pub mod account;
pub mod amount;
pub mod automated;

/// Parser values and the combinators to build them.
///
/// A failure records whether input was consumed. Alternatives only try the
/// next branch after an unconsumed failure; [`Parser::attempt`][combinator::Parser::attempt]
/// turns a consumed failure back into an unconsumed one.
pub mod combinator;
pub mod date;
mod error;
pub mod expression;

/// Parsed journal representation.
pub mod ledger;
pub mod lexical;

/// Our main parser entrypoints.
pub mod parser;
pub mod statement;
pub mod transaction;

pub use account::AccountDirective;
pub use amount::{Amount, Commodities};
pub use automated::{AutomatedTransaction, Condition};
pub use date::Date;
pub use error::{Location, ParseError};
pub use expression::{Expression, Operator};
pub use ledger::Journal;
pub use parser::{parse, parse_with, LedgerParser, ParserConfig};
pub use statement::Entry;
pub use transaction::{Note, Posting, Transaction, TransactionState};
