use std::fmt::Formatter;

use super::row::Row;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Notation(pub String);

impl std::fmt::Display for A1Notation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<A1Notation> for String {
    fn from(a1_notation: A1Notation) -> Self {
        a1_notation.0
    }
}

impl From<String> for A1Notation {
    fn from(s: String) -> Self {
        A1Notation(s)
    }
}

impl AsRef<str> for A1Notation {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub trait ToA1Notation {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation;
}

/// Quotes a sheet title for use in a range, doubling embedded apostrophes.
pub fn quote_sheet_title(sheet_name: &str) -> String {
    format!("'{}'", sheet_name.replace('\'', "''"))
}

/// Every column of the rows from the top of the sheet down to `last`, or the
/// whole sheet when `last` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    pub last: Option<Row>,
}

impl RowSpan {
    /// `cap` of `None` or `0` reads the whole sheet.
    pub fn first_rows(cap: Option<u32>) -> Self {
        RowSpan {
            last: cap.filter(|cap| *cap > 0).map(Row::from_row),
        }
    }
}

impl ToA1Notation for RowSpan {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation {
        let local = self.last.map(|last| format!("{}:{}", Row::FIRST, last));

        match (sheet_name, local) {
            (Some(sheet_name), Some(local)) => {
                A1Notation(format!("{}!{}", quote_sheet_title(sheet_name), local))
            }
            (Some(sheet_name), None) => A1Notation(quote_sheet_title(sheet_name)),
            (None, Some(local)) => A1Notation(local),
            (None, None) => A1Notation("A:ZZZ".to_string()),
        }
    }
}
