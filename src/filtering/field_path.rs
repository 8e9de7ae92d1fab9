use crate::errors::ListError;

/// Separator between association segments and the field name in a key.
pub const PATH_SEPARATOR: &str = "__";

/// Suffix selecting case-insensitive substring matching.
pub const SEARCH_SUFFIX: &str = "_search";

/// A parsed filter/search/sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    /// Association names in traversal order, outer-to-inner. Empty when the
    /// field belongs to the base entity.
    pub path: Vec<String>,
    /// The targeted column name.
    pub field: String,
    /// Whether the key carried the `_search` suffix.
    pub is_search: bool,
}

impl FieldPath {
    /// Whether the field lives on a joined entity rather than the base one.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        !self.path.is_empty()
    }
}

/// Parse a raw key into a [`FieldPath`].
///
/// The `_search` suffix is stripped first, then the remainder splits on
/// `__`: all segments but the last are the association path, the last is
/// the field name. Pure and total.
///
/// # Errors
///
/// Returns [`ListError::InvalidFieldPath`] when the field name is empty
/// after stripping — a bare `"_search"`, a key ending in `__`, or an empty
/// key. Empty *association* segments (leading or doubled separators) are
/// kept in the path and rejected later as unknown associations.
pub fn parse_field_path(raw_key: &str) -> Result<FieldPath, ListError> {
    let (rest, is_search) = match raw_key.strip_suffix(SEARCH_SUFFIX) {
        Some(stripped) => (stripped, true),
        None => (raw_key, false),
    };

    let mut segments: Vec<&str> = rest.split(PATH_SEPARATOR).collect();
    let field = segments.pop().unwrap_or_default();
    if field.is_empty() {
        return Err(ListError::InvalidFieldPath {
            key: raw_key.to_string(),
        });
    }

    Ok(FieldPath {
        path: segments.iter().map(ToString::to_string).collect(),
        field: field.to_string(),
        is_search,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_entity_field() {
        let parsed = parse_field_path("lifecycle_state").unwrap();
        assert!(parsed.path.is_empty());
        assert_eq!(parsed.field, "lifecycle_state");
        assert!(!parsed.is_search);
    }

    #[test]
    fn search_suffix_is_stripped() {
        let parsed = parse_field_path("name_search").unwrap();
        assert!(parsed.path.is_empty());
        assert_eq!(parsed.field, "name");
        assert!(parsed.is_search);
    }

    #[test]
    fn single_association() {
        let parsed = parse_field_path("tenant__name").unwrap();
        assert_eq!(parsed.path, vec!["tenant".to_string()]);
        assert_eq!(parsed.field, "name");
    }

    #[test]
    fn chained_associations_with_search() {
        let parsed = parse_field_path("compliance__policy__code_search").unwrap();
        assert_eq!(
            parsed.path,
            vec!["compliance".to_string(), "policy".to_string()]
        );
        assert_eq!(parsed.field, "code");
        assert!(parsed.is_search);
    }

    #[test]
    fn bare_search_suffix_is_invalid() {
        let err = parse_field_path("_search").unwrap_err();
        assert!(matches!(err, ListError::InvalidFieldPath { key } if key == "_search"));
    }

    #[test]
    fn trailing_separator_is_invalid() {
        assert!(parse_field_path("tenant__").is_err());
        assert!(parse_field_path("tenant___search").is_err());
    }

    #[test]
    fn empty_key_is_invalid() {
        assert!(parse_field_path("").is_err());
    }

    #[test]
    fn leading_separator_keeps_empty_segment() {
        // rejected downstream as an unknown association named ""
        let parsed = parse_field_path("__name").unwrap();
        assert_eq!(parsed.path, vec![String::new()]);
        assert_eq!(parsed.field, "name");
    }

    #[test]
    fn consecutive_separators_keep_empty_segment() {
        let parsed = parse_field_path("tenant____name").unwrap();
        assert_eq!(parsed.path, vec!["tenant".to_string(), String::new()]);
        assert_eq!(parsed.field, "name");
    }

    #[test]
    fn only_one_search_suffix_is_stripped() {
        let parsed = parse_field_path("name_search_search").unwrap();
        assert_eq!(parsed.field, "name_search");
        assert!(parsed.is_search);
    }
}
