//! Cell values and deterministic type coercion

use std::fmt;

use serde::ser::{Serialize, Serializer};

/// A single cell value, tagged as number or text.
///
/// The tag is decided once during ingestion and never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Coerce a raw cell into a value.
    ///
    /// Total: never fails. A non-empty cell that parses as a finite number
    /// becomes `Number`; everything else (including the empty string) stays
    /// `Text` with surrounding whitespace removed.
    pub fn coerce(raw: &str) -> Value {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            if let Ok(n) = trimmed.parse::<f64>() {
                if n.is_finite() {
                    return Value::Number(n);
                }
            }
        }
        Value::Text(trimmed.to_string())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Number(_) => None,
            Value::Text(s) => Some(s),
        }
    }
}

/// Format a number for display: integral values print without a fractional
/// part, so `2.0` renders as `"2"`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Integral numbers serialize as integers so pretty-printed
            // records show `5` rather than `5.0`
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                serializer.serialize_i64(*n as i64)
            }
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_finite_numbers() {
        assert_eq!(Value::coerce("1"), Value::Number(1.0));
        assert_eq!(Value::coerce(" 3.5 "), Value::Number(3.5));
        assert_eq!(Value::coerce("-2e3"), Value::Number(-2000.0));
    }

    #[test]
    fn keeps_non_numbers_as_text() {
        assert_eq!(Value::coerce("x"), Value::Text("x".to_string()));
        assert_eq!(Value::coerce("1.2.3"), Value::Text("1.2.3".to_string()));
        assert_eq!(Value::coerce(""), Value::Text(String::new()));
        assert_eq!(Value::coerce("   "), Value::Text(String::new()));
    }

    #[test]
    fn non_finite_parses_stay_text() {
        assert_eq!(Value::coerce("inf"), Value::Text("inf".to_string()));
        assert_eq!(Value::coerce("NaN"), Value::Text("NaN".to_string()));
    }

    #[test]
    fn display_drops_trailing_zero_fraction() {
        assert_eq!(Value::Number(2.0).to_string(), "2");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
        assert_eq!(Value::Text("abc".to_string()).to_string(), "abc");
    }

    #[test]
    fn integral_values_serialize_as_integers() {
        assert_eq!(serde_json::to_string(&Value::Number(5.0)).unwrap(), "5");
        assert_eq!(serde_json::to_string(&Value::Number(5.1)).unwrap(), "5.1");
        assert_eq!(
            serde_json::to_string(&Value::Text("a".to_string())).unwrap(),
            "\"a\""
        );
    }
}
