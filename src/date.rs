use chrono::{Datelike, NaiveDate};

use std::fmt;

use crate::combinator::{char, Parser};
use crate::lexical::natural;

/// Calendar date as written in the journal. Values are not range checked, so
/// `2016/13/45` is a valid `Date` that has no [`NaiveDate`] counterpart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    pub year: u32,
    pub month: u32,
    pub day: u32,
}

impl Date {
    pub fn new(year: u32, month: u32, day: u32) -> Date {
        Date { year, month, day }
    }

    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(i32::try_from(self.year).ok()?, self.month, self.day)
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date {
            year: date.year().max(0) as u32,
            month: date.month(),
            day: date.day(),
        }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

fn date_with(separator: char) -> Parser<Date> {
    natural()
        .then_skip(char(separator))
        .then(natural())
        .then_skip(char(separator))
        .then(natural())
        .map(|((year, month), day)| Date::new(year, month, day))
}

/// `YYYY/MM/DD` or `YYYY-MM-DD`; one date never mixes separators.
pub fn date() -> Parser<Date> {
    date_with('/')
        .attempt()
        .or(date_with('-'))
        .label("date")
}
