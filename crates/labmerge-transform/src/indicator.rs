//! Parsing of test-result indicator cells.

use labmerge_model::Indicator;

/// Parses a boolean-like or numeric test result.
///
/// Accepts `true`/`false`/`yes`/`no` in any case and finite numbers.
pub fn parse_indicator(value: &str) -> Option<Indicator> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "yes" => return Some(Indicator::Boolean(true)),
        "false" | "no" => return Some(Indicator::Boolean(false)),
        _ => {}
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .map(Indicator::Numeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_booleans() {
        assert_eq!(parse_indicator("True"), Some(Indicator::Boolean(true)));
        assert_eq!(parse_indicator("no"), Some(Indicator::Boolean(false)));
    }

    #[test]
    fn parses_numbers() {
        assert_eq!(parse_indicator("1"), Some(Indicator::Numeric(1.0)));
        assert_eq!(parse_indicator(" 0 "), Some(Indicator::Numeric(0.0)));
    }

    #[test]
    fn rejects_other_text() {
        assert_eq!(parse_indicator(""), None);
        assert_eq!(parse_indicator("positive"), None);
        assert_eq!(parse_indicator("NaN"), None);
        assert_eq!(parse_indicator("inf"), None);
    }
}
