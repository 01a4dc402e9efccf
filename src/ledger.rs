use crate::{
    account::AccountDirective, automated::AutomatedTransaction, statement::Entry,
    transaction::Note, transaction::Transaction,
};
use indexmap::{IndexMap, IndexSet};
use log::debug;

/// Parsed entries in source order, plus an index of declared accounts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Journal {
    entries: Vec<Entry>,
    accounts: IndexMap<String, AccountDirective>,
}

impl Journal {
    pub fn new() -> Journal {
        Journal {
            entries: Vec::new(),
            accounts: IndexMap::new(),
        }
    }

    /// Append an entry. Account directives are indexed by name; when an
    /// account is declared twice the index keeps the first declaration.
    pub fn push(&mut self, entry: Entry) {
        if let Entry::Account(directive) = &entry {
            if self.accounts.contains_key(&directive.name) {
                debug!(
                    "account `{}' declared again, keeping first declaration",
                    directive.name
                );
            } else {
                self.accounts
                    .insert(directive.name.clone(), directive.clone());
            }
        }
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Transaction(transaction) => Some(transaction),
            _ => None,
        })
    }

    pub fn automated_transactions(&self) -> impl Iterator<Item = &AutomatedTransaction> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Automated(automated) => Some(automated),
            _ => None,
        })
    }

    pub fn comments(&self) -> impl Iterator<Item = &Note> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Comment(note) => Some(note),
            _ => None,
        })
    }

    /// Declared accounts in declaration order.
    pub fn declared_accounts(&self) -> impl Iterator<Item = &AccountDirective> {
        self.accounts.values()
    }

    pub fn account(&self, name: &str) -> Option<&AccountDirective> {
        self.accounts.get(name)
    }

    /// Accounts referenced by transaction postings, in order of first use.
    pub fn used_accounts(&self) -> IndexSet<&str> {
        self.transactions()
            .flat_map(|transaction| transaction.postings.iter())
            .map(|posting| posting.account.as_str())
            .collect()
    }
}

impl Extend<Entry> for Journal {
    fn extend<I: IntoIterator<Item = Entry>>(&mut self, entries: I) {
        for entry in entries {
            self.push(entry);
        }
    }
}

impl FromIterator<Entry> for Journal {
    fn from_iter<I: IntoIterator<Item = Entry>>(entries: I) -> Self {
        let mut journal = Journal::new();
        journal.extend(entries);
        journal
    }
}
