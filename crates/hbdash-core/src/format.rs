//! Compact metric formatting.

use serde_json::Value;

/// Shown for missing values.
pub const PLACEHOLDER: &str = "-";

const MILLION: f64 = 1_000_000.0;
const THOUSAND: f64 = 1_000.0;

/// Format a number with a magnitude suffix and two decimals.
///
/// Thresholds compare the absolute value; the sign is kept.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return PLACEHOLDER.to_string();
    }

    let magnitude = value.abs();
    if magnitude >= MILLION {
        format!("{:.2}M", value / MILLION)
    } else if magnitude >= THOUSAND {
        format!("{:.2}K", value / THOUSAND)
    } else {
        format!("{value:.2}")
    }
}

/// Format a table cell for a headline metric.
///
/// Numbers, booleans and numeric strings get magnitude formatting. Other
/// values fall back to their plain string form.
pub fn format_metric(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => PLACEHOLDER.to_string(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) => format_number(v),
            None => n.to_string(),
        },
        Some(Value::Bool(b)) => format_number(if *b { 1.0 } else { 0.0 }),
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(v) => format_number(v),
            Err(_) => s.clone(),
        },
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_magnitudes() {
        assert_eq!(format_number(1_500_000.0), "1.50M");
        assert_eq!(format_number(2_500.0), "2.50K");
        assert_eq!(format_number(42.0), "42.00");
        assert_eq!(format_number(999.994), "999.99");
        assert_eq!(format_number(1_000.0), "1.00K");
        assert_eq!(format_number(0.0), "0.00");
    }

    #[test]
    fn test_negative_values_are_symmetric() {
        assert_eq!(format_number(-2_500.0), "-2.50K");
        assert_eq!(format_number(-1_500_000.0), "-1.50M");
        assert_eq!(format_number(-42.0), "-42.00");
    }

    #[test]
    fn test_missing_values() {
        assert_eq!(format_metric(None), "-");
        assert_eq!(format_metric(Some(&Value::Null)), "-");
        assert_eq!(format_number(f64::NAN), "-");
    }

    #[test]
    fn test_json_values() {
        assert_eq!(format_metric(Some(&json!(1_500_000))), "1.50M");
        assert_eq!(format_metric(Some(&json!(-2500))), "-2.50K");
        assert_eq!(format_metric(Some(&json!("12345.6"))), "12.35K");
        assert_eq!(format_metric(Some(&json!(true))), "1.00");
    }

    #[test]
    fn test_non_numeric_falls_back_to_string() {
        assert_eq!(format_metric(Some(&json!("n/a"))), "n/a");
        assert_eq!(format_metric(Some(&json!([1, 2]))), "[1,2]");
    }
}
