use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("value cell is empty")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
}

/// Parses an assessed-value cell the way the sheet formats them: surrounding
/// whitespace and thousands separators are ignored, and `nan` counts as empty.
pub fn parse_value(cell: &str) -> Result<f64, ParseError> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Err(ParseError::Empty);
    }

    trimmed
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ParseError::NotANumber(trimmed.to_string()))
}
