//! Typed cell values.
//!
//! Values only exist once coercion has succeeded, so a [`Value`] is never
//! null. Missing cells in a merged table are `Option::<Value>::None`.

use std::fmt;

use chrono::NaiveDate;

/// Output format for dates in persisted files and reports.
pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// A boolean-like or numeric test result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Indicator {
    Boolean(bool),
    Numeric(f64),
}

impl Indicator {
    /// True when the test reported a positive result.
    #[must_use]
    pub fn is_positive(self) -> bool {
        match self {
            Self::Boolean(flag) => flag,
            Self::Numeric(value) => value != 0.0,
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(flag) => write!(f, "{flag}"),
            Self::Numeric(value) => f.write_str(&format_numeric(*value)),
        }
    }
}

/// A non-null, coerced cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Date(NaiveDate),
    Indicator(Indicator),
    Integer(i64),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(*date),
            _ => None,
        }
    }

    pub fn as_indicator(&self) -> Option<Indicator> {
        match self {
            Self::Indicator(indicator) => Some(*indicator),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Date(date) => write!(f, "{}", date.format(OUTPUT_DATE_FORMAT)),
            Self::Indicator(indicator) => write!(f, "{indicator}"),
            Self::Integer(value) => write!(f, "{value}"),
        }
    }
}

/// Formats a floating-point number without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
