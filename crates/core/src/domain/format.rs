/// Unit the district sheet records assessed values in (100 million won).
pub const DEFAULT_VALUE_UNIT: &str = "억";

/// Formats an assessed value with thousands separators, at most two decimals,
/// and the unit suffix: `1234.5` → `1,234.5억`.
pub fn format_value(value: f64, unit: &str) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let formatted = format!("{:.2}", rounded.abs());
    let (integer, fraction) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');
    let sign = if rounded < 0.0 { "-" } else { "" };

    if fraction.is_empty() {
        format!("{sign}{}{unit}", group_thousands(integer))
    } else {
        format!("{sign}{}.{fraction}{unit}", group_thousands(integer))
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_number() {
        assert_eq!(format_value(300.0, DEFAULT_VALUE_UNIT), "300억");
    }

    #[test]
    fn test_thousands_and_decimals() {
        assert_eq!(format_value(1234.5, "억"), "1,234.5억");
        assert_eq!(format_value(1234567.891, ""), "1,234,567.89");
    }

    #[test]
    fn test_small_and_negative() {
        assert_eq!(format_value(0.0, "억"), "0억");
        assert_eq!(format_value(-1500.25, "원"), "-1,500.25원");
    }
}
