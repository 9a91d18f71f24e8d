use google_sheets4::api::ValueRange;
use serde_json::Value;
use std::borrow::Cow;

pub trait ValueRangeFactory {
    fn from_single_row<'a, T: Into<Cow<'a, str>> + Clone>(row_values: &[T]) -> Self;
}

fn wrap_value<'a, T: Into<Cow<'a, str>>>(value: T) -> Value {
    Value::String(value.into().into_owned())
}

impl ValueRangeFactory for ValueRange {
    fn from_single_row<'a, T: Into<Cow<'a, str>> + Clone>(row_values: &[T]) -> Self {
        ValueRange {
            major_dimension: Some("ROWS".to_string()),
            range: None,
            values: Some(vec![row_values
                .iter()
                .map(|value| wrap_value(value.clone()))
                .collect()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_value() {
        let value = wrap_value("1");
        assert_eq!(value, Value::String("1".to_string()));
    }

    #[test]
    fn test_from_single_row() {
        let cells = vec![
            "2024-03-01 09:30:00".to_string(),
            "search".to_string(),
            String::new(),
        ];
        let value_range = ValueRange::from_single_row(&cells);
        assert_eq!(
            value_range.major_dimension,
            Some("ROWS".to_string()),
            "Major dimension should be ROWS"
        );
        assert_eq!(value_range.range, None, "Range should be None");
        assert_eq!(
            value_range.values,
            Some(vec![vec![
                Value::String("2024-03-01 09:30:00".to_string()),
                Value::String("search".to_string()),
                Value::String(String::new()),
            ]]),
            "Values should be one row with every cell as a string"
        );
    }
}
