//! Polars AnyValue helpers.

use polars::prelude::AnyValue;

/// Converts a text cell to a trimmed String, returning None if it is null or
/// blank. Frames are read with every column typed as String, so other
/// variants only show up through their display form.
pub(crate) fn any_to_string_non_empty(value: AnyValue<'_>) -> Option<String> {
    let text = match value {
        AnyValue::Null => return None,
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    };
    let trimmed = text.trim().trim_matches('\u{feff}');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
