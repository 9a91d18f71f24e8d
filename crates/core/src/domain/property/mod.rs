pub mod layout;
pub mod parse;
pub mod raw_table;
pub mod record;

pub use layout::{ColumnLayout, YearColumn};
pub use parse::{parse_value, ParseError};
pub use raw_table::{RawTable, RawTableError, SheetRows};
pub use record::PropertyRecord;
