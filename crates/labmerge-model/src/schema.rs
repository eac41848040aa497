//! Canonical schema for lab-result extracts.
//!
//! Every source file is mapped onto the same set of canonical columns. The
//! mapping is fixed for the lifetime of the process: it is built once with
//! [`CanonicalSchemaMap::standard`] and handed to the normalizer by reference.

use std::fmt;

use serde::Serialize;

/// Canonical name of the row key column.
pub const KEY_COLUMN: &str = "id";
/// Canonical name of the e-mail column.
pub const EMAIL_COLUMN: &str = "email";
/// Canonical name of the phone contact column.
pub const CONTACT_COLUMN: &str = "contact";
/// Canonical name of the gender column.
pub const GENDER_COLUMN: &str = "gender";
/// Canonical name of the birth date column.
pub const BIRTH_DATE_COLUMN: &str = "birth_date";
/// Canonical name of the analysis (test) date column.
pub const ANALYSIS_DATE_COLUMN: &str = "analysis_date";
/// Name of the derived age column.
pub const AGE_COLUMN: &str = "age";

/// Columns that always close the merged schema, in this order.
pub const TRAILING_COLUMNS: [&str; 2] = [ANALYSIS_DATE_COLUMN, AGE_COLUMN];

/// Semantic type of a column, enforced when raw text is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Row identity. Kept as text, never coerced.
    Key,
    /// Free text (e-mail, phone).
    Text,
    /// Categorical code (gender).
    Category,
    /// Calendar date parsed with the configured format.
    Date,
    /// Boolean-like or numeric test result.
    Indicator,
    /// Integer derived by the pipeline (age).
    Integer,
    /// Column dropped before it can reach any output.
    Discard,
}

impl FieldKind {
    /// Short lowercase label used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Text => "text",
            Self::Category => "category",
            Self::Date => "date",
            Self::Indicator => "indicator",
            Self::Integer => "integer",
            Self::Discard => "discard",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the canonical map: raw header to canonical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    pub raw: &'static str,
    pub canonical: &'static str,
    pub kind: FieldKind,
}

impl FieldMapping {
    const fn new(raw: &'static str, canonical: &'static str, kind: FieldKind) -> Self {
        Self {
            raw,
            canonical,
            kind,
        }
    }
}

const STANDARD_FIELDS: &[FieldMapping] = &[
    FieldMapping::new("id", KEY_COLUMN, FieldKind::Key),
    FieldMapping::new("first_name", "first_name", FieldKind::Discard),
    FieldMapping::new("last_name", "last_name", FieldKind::Discard),
    FieldMapping::new("email", EMAIL_COLUMN, FieldKind::Text),
    FieldMapping::new("phone", CONTACT_COLUMN, FieldKind::Text),
    FieldMapping::new("gender", GENDER_COLUMN, FieldKind::Category),
    FieldMapping::new("birth", BIRTH_DATE_COLUMN, FieldKind::Date),
    FieldMapping::new("covid", "covid", FieldKind::Indicator),
    FieldMapping::new("dengue", "dengue", FieldKind::Indicator),
    FieldMapping::new("influenza", "influenza", FieldKind::Indicator),
    FieldMapping::new("date", ANALYSIS_DATE_COLUMN, FieldKind::Date),
];

/// How a raw header resolves against the canonical map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub name: &'a str,
    pub kind: FieldKind,
    /// False when the header was not in the map and passes through unchanged.
    pub mapped: bool,
}

/// Fixed mapping from raw source headers to canonical columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalSchemaMap {
    fields: Vec<FieldMapping>,
}

impl Default for CanonicalSchemaMap {
    fn default() -> Self {
        Self::standard()
    }
}

impl CanonicalSchemaMap {
    /// The mapping for the covid / dengue / influenza extracts.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            fields: STANDARD_FIELDS.to_vec(),
        }
    }

    /// All map entries in declaration order.
    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    /// Raw header that carries the row key.
    pub fn key_raw_name(&self) -> &'static str {
        self.fields
            .iter()
            .find(|field| field.kind == FieldKind::Key)
            .map_or(KEY_COLUMN, |field| field.raw)
    }

    /// Looks up a raw header (case-insensitive, surrounding whitespace ignored).
    pub fn lookup(&self, raw: &str) -> Option<&FieldMapping> {
        let raw = raw.trim();
        self.fields
            .iter()
            .find(|field| field.raw.eq_ignore_ascii_case(raw))
    }

    /// Resolves a raw header to its output name and kind.
    ///
    /// Headers missing from the map keep their raw name and are assumed to be
    /// per-source test indicators. The normalizer downgrades such a column to
    /// text when its cells are not test results.
    pub fn resolve<'a>(&self, raw: &'a str) -> Resolved<'a> {
        match self.lookup(raw) {
            Some(field) => Resolved {
                name: field.canonical,
                kind: field.kind,
                mapped: true,
            },
            None => Resolved {
                name: raw.trim(),
                kind: FieldKind::Indicator,
                mapped: false,
            },
        }
    }

    /// Canonical names of the columns every source must provide after renaming.
    pub fn required_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|field| field.kind == FieldKind::Date)
            .map(|field| field.canonical)
    }
}

/// Returns true for names the pipeline derives itself and sources may not supply.
pub fn is_reserved_column(name: &str) -> bool {
    name.eq_ignore_ascii_case(AGE_COLUMN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_headers() {
        let map = CanonicalSchemaMap::standard();
        let resolved = map.resolve("phone");
        assert_eq!(resolved.name, CONTACT_COLUMN);
        assert_eq!(resolved.kind, FieldKind::Text);
        assert!(resolved.mapped);

        assert_eq!(map.resolve(" Birth ").name, BIRTH_DATE_COLUMN);
        assert_eq!(map.resolve("first_name").kind, FieldKind::Discard);
    }

    #[test]
    fn unknown_headers_resolve_as_unmapped_indicators() {
        let map = CanonicalSchemaMap::standard();
        let resolved = map.resolve("malaria");
        assert_eq!(resolved.name, "malaria");
        assert_eq!(resolved.kind, FieldKind::Indicator);
        assert!(!resolved.mapped);
    }

    #[test]
    fn required_columns_are_the_dates() {
        let map = CanonicalSchemaMap::standard();
        let required: Vec<_> = map.required_columns().collect();
        assert_eq!(required, vec![BIRTH_DATE_COLUMN, ANALYSIS_DATE_COLUMN]);
        assert_eq!(map.key_raw_name(), "id");
    }

    #[test]
    fn age_is_reserved() {
        assert!(is_reserved_column("Age"));
        assert!(!is_reserved_column("gender"));
    }
}
