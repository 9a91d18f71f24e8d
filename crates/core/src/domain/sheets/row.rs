use std::fmt::Formatter;

/// A spreadsheet row, stored zero-based and shown one-based.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Row {
    index: u32,
}

impl Row {
    pub const FIRST: Row = Row { index: 0 };

    pub fn from_index(index: u32) -> Self {
        Row { index }
    }

    /// Builds a row from its 1-based sheet number. `0` saturates to the first row.
    pub fn from_row(row: u32) -> Self {
        Row {
            index: row.saturating_sub(1),
        }
    }

    /// Returns the row number as it appears in the sheet's left gutter.
    /// # Examples
    /// ```
    /// use property_rank_core::domain::sheets::row::Row;
    /// assert_eq!(Row::from_index(0).number(), 1);
    /// assert_eq!(Row::from_index(10336).number(), 10337);
    /// ```
    pub fn number(&self) -> u32 {
        self.index.saturating_add(1)
    }

    /// Returns the zero-based position, suitable for indexing a `Vec` of fetched rows.
    /// # Examples
    /// ```
    /// use property_rank_core::domain::sheets::row::Row;
    /// let header = Row::from_row(2);
    /// assert_eq!(header.index(), 1);
    /// let first_data = header + Row::from_index(1);
    /// assert_eq!(first_data.number(), 3);
    /// ```
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn as_usize(&self) -> usize {
        self.index as usize
    }
}

impl std::ops::Add for Row {
    type Output = Row;

    fn add(self, rhs: Row) -> Self::Output {
        Row::from_index(self.index.saturating_add(rhs.index))
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl std::fmt::Debug for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Row(index: {}, row: {})", self.index(), self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_addition() {
        let header = Row::from_row(2);
        assert_eq!(header + Row::from_index(3), Row::from_row(5));
    }

    #[test]
    fn test_row_addition_saturates() {
        let row = Row::from_index(u32::MAX);
        assert_eq!(row + Row::from_index(1), Row::from_index(u32::MAX));
    }

    #[test]
    fn test_row_display() {
        assert_eq!(Row::from_index(0).to_string(), "1");
        assert_eq!(Row::FIRST.to_string(), "1");
    }

    #[test]
    fn test_row_debug() {
        let row = Row::from_index(4);
        assert_eq!(format!("{:?}", row), "Row(index: 4, row: 5)");
    }

    #[test]
    fn test_zero_row_saturates_to_first() {
        let row = Row::from_row(0);
        assert_eq!(row, Row::FIRST);
        assert_eq!(row.number(), 1);
    }

    #[test]
    fn test_row_as_usize() {
        assert_eq!(Row::from_row(5).as_usize(), 4);
    }
}
