use serde::Serialize;

use super::{
    layout::ColumnLayout,
    parse::{parse_value, ParseError},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyRecord {
    /// Position among the data rows, in sheet order.
    pub row_index: usize,
    pub identifier: String,
    pub zone: Option<String>,
    pub value: f64,
    pub area: Option<f64>,
    pub year: Option<i32>,
}

impl PropertyRecord {
    /// Fails only when the assessed-value cell does not parse; metadata cells
    /// that do not parse are left empty.
    pub fn from_row(
        layout: &ColumnLayout,
        row_index: usize,
        row: &[String],
    ) -> Result<Self, ParseError> {
        let value = parse_value(layout.value_cell(row))?;

        Ok(PropertyRecord {
            row_index,
            identifier: layout.identifier_of(row),
            zone: layout
                .zone_of(row)
                .filter(|zone| !zone.is_empty())
                .map(str::to_string),
            value,
            area: layout.area_cell(row).and_then(|cell| parse_value(cell).ok()),
            year: layout
                .built_year_cell(row)
                .and_then(|cell| cell.parse::<i32>().ok()),
        })
    }
}
