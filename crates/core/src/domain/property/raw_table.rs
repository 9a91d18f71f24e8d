use std::sync::Arc;

use thiserror::Error;

use crate::domain::sheets::row::Row;

/// Rows exactly as fetched from the sheet, header included.
pub type SheetRows = Arc<Vec<Vec<String>>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RawTableError {
    #[error("sheet has {found} rows but the header is row {header_row}; at least one data row is required below it")]
    InsufficientRows { found: usize, header_row: Row },
}

/// Fetched sheet rows split into a normalized header and the data rows below it.
///
/// Rows above the header (titles, notes) are ignored. The underlying rows are
/// shared, never copied or modified.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    rows: SheetRows,
    header: Vec<String>,
    header_row: Row,
}

impl RawTable {
    pub fn from_sheet_rows(rows: SheetRows, header_row: Row) -> Result<Self, RawTableError> {
        if rows.len() <= header_row.as_usize() + 1 {
            return Err(RawTableError::InsufficientRows {
                found: rows.len(),
                header_row,
            });
        }

        let header = rows[header_row.as_usize()]
            .iter()
            .map(|cell| normalize_header(cell))
            .collect();

        Ok(RawTable {
            rows,
            header,
            header_row,
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows[self.header_row.as_usize() + 1..]
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    /// The sheet row a data row came from.
    pub fn sheet_row(&self, data_index: usize) -> Row {
        self.header_row + Row::from_index(1 + data_index as u32)
    }
}

fn normalize_header(cell: &str) -> String {
    cell.trim().replace('\n', " ")
}
