use crate::account::account_name;
use crate::amount::{amount, Amount, Commodities};
use crate::combinator::{char, satisfy, Parser};
use crate::date::{date, Date};
use crate::lexical::{
    free_text, hspace, hspace1, lexeme, lexline, line_end, note_separator, note_text,
    spaced_note_text,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionState {
    Cleared, // '*'
    Pending, // '!'
}

impl TransactionState {
    pub fn symbol(&self) -> char {
        match self {
            TransactionState::Cleared => '*',
            TransactionState::Pending => '!',
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Note {
    pub comment: String,
}

impl Note {
    pub fn new(comment: impl Into<String>) -> Note {
        Note {
            comment: comment.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Posting {
    pub account: String,
    /// `None` for the implicit balancing leg.
    pub amount: Option<Amount>,
    pub notes: Vec<Note>,
}

impl Posting {
    pub fn new(account: &str, amount: Option<Amount>) -> Posting {
        Posting {
            account: account.to_string(),
            amount,
            notes: vec![],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub date: Date,
    pub state: Option<TransactionState>,
    pub title: String,
    pub notes: Vec<Note>,
    pub postings: Vec<Posting>,
}

#[derive(Debug, PartialEq)]
pub(crate) struct TxnHeader {
    pub(crate) date: Date,
    pub(crate) state: Option<TransactionState>,
    pub(crate) title: String,
    pub(crate) note: Option<Note>,
}

/// A block line before it is known where it belongs.
#[derive(Debug, PartialEq)]
pub(crate) enum PostingOrNote {
    Posting(Posting),
    Note(Note),
}

fn state() -> Parser<TransactionState> {
    char('*')
        .value(TransactionState::Cleared)
        .or(char('!').value(TransactionState::Pending))
        .label("transaction state")
}

/// `<date> [<state>] <title>[  ; note]`. The title may be empty, so the
/// whitespace after the date and state is left for the note separator to
/// inspect.
pub(crate) fn header() -> Parser<TxnHeader> {
    let marked = hspace1().skip_then(state()).attempt().optional();

    let untitled = note_separator()
        .lookahead()
        .skip_then(hspace())
        .skip_then(note_text())
        .map(|note| (String::new(), Some(Note::new(note))));
    let titled = hspace()
        .skip_then(free_text())
        .then_skip(hspace())
        .then(note_text().map(Note::new).optional());

    date()
        .then(marked)
        .then(lexline(untitled.or(titled)))
        .map(|((date, state), (title, note))| TxnHeader {
            date,
            state,
            title,
            note,
        })
}

/// `<account>[  <amount>][  ; note]`
pub fn posting(commodities: &Commodities) -> Parser<Posting> {
    lexeme(account_name())
        .then(lexeme(amount(commodities)).optional())
        .then(spaced_note_text().map(Note::new).optional())
        .map(|((account, amount), note)| Posting {
            account,
            amount,
            notes: note.into_iter().collect(),
        })
}

fn block_line(commodities: &Commodities) -> Parser<PostingOrNote> {
    // whitespace-only lines are not part of a block
    let indent = hspace1()
        .then(satisfy(|c| !c.is_whitespace(), "posting or note").lookahead())
        .attempt();

    indent
        .skip_then(
            note_text()
                .map(|text| PostingOrNote::Note(Note::new(text)))
                .or(posting(commodities).map(PostingOrNote::Posting)),
        )
        .then_skip(line_end())
        .label("indented posting or note")
}

/// Indented lines under a header, in source order.
pub(crate) fn block(commodities: &Commodities) -> Parser<Vec<PostingOrNote>> {
    block_line(commodities).many1()
}

/// Split block lines into entry-level notes and postings. Notes seen before
/// the first posting belong to the entry, later ones to the posting above
/// them.
pub(crate) fn reassemble(
    header_note: Option<Note>,
    lines: Vec<PostingOrNote>,
) -> (Vec<Note>, Vec<Posting>) {
    let mut notes: Vec<Note> = header_note.into_iter().collect();
    let mut postings: Vec<Posting> = Vec::new();

    for line in lines {
        match line {
            PostingOrNote::Posting(posting) => postings.push(posting),
            PostingOrNote::Note(note) => match postings.last_mut() {
                Some(posting) => posting.notes.push(note),
                None => notes.push(note),
            },
        }
    }

    (notes, postings)
}

pub fn transaction(commodities: &Commodities) -> Parser<Transaction> {
    header()
        .then(block(commodities))
        .try_map("posting", |(header, lines)| {
            let (notes, postings) = reassemble(header.note, lines);
            if postings.is_empty() {
                return Err(());
            }

            Ok(Transaction {
                date: header.date,
                state: header.state,
                title: header.title,
                notes,
                postings,
            })
        })
        .label("transaction")
}
