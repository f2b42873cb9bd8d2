//! Loose value helpers shared by the evaluator, layout and field groups

use serde_json::{Number, Value};

/// Truthiness used for bare-fieldname dependencies and mandatory checks:
/// empty strings, zero, null, `false` and empty lists are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Script-language truthiness: every list and object is truthy.
pub fn js_truthy(value: &Value) -> bool {
    match value {
        Value::Array(_) => true,
        other => is_truthy(other),
    }
}

/// Null, missing or empty string.
pub fn is_null(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

pub fn number(value: f64) -> Value {
    Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Numeric coercion; non-numeric text becomes NaN.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Array(items) if items.is_empty() => 0.0,
        Value::Array(items) if items.len() == 1 => to_number(&items[0]),
        _ => f64::NAN,
    }
}

pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// String form used for concatenation and display.
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(to_display_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Integer conversion tolerant of text and floats (`cint`).
pub fn cint(value: &Value) -> i64 {
    let n = flt(value);
    n.trunc() as i64
}

/// Float conversion that maps anything unparsable to zero (`flt`).
pub fn flt(value: &Value) -> f64 {
    let n = match value {
        Value::String(s) => {
            let cleaned: String = s.chars().filter(|c| *c != ',').collect();
            cleaned.trim().parse::<f64>().unwrap_or(0.0)
        }
        other => to_number(other),
    };
    if n.is_nan() {
        0.0
    } else {
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!([1])));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(0.5)));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_js_truthy_keeps_empty_list() {
        assert!(js_truthy(&json!([])));
        assert!(!js_truthy(&json!("")));
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(to_number(&json!("  12 ")), 12.0);
        assert!(to_number(&json!("abc")).is_nan());
        assert_eq!(to_number(&json!(true)), 1.0);
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[test]
    fn test_cint_flt() {
        assert_eq!(cint(&json!("12.9")), 12);
        assert_eq!(flt(&json!("1,250.5")), 1250.5);
        assert_eq!(flt(&json!("x")), 0.0);
        assert_eq!(cint(&json!(null)), 0);
    }
}
