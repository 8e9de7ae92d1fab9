use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat query parameters for one list request.
///
/// # Filter keys
/// Both `filters` and `search` use the same key mini-language:
/// - `field` targets a column on the base entity.
/// - `assoc__field` targets `field` on the entity reached through the
///   declared `assoc` relationship; chains (`a__b__field`) are allowed.
/// - A `_search` suffix switches the clause to case-insensitive substring
///   matching; blank search values are discarded.
///
/// Entries in `search` always match as substrings regardless of suffix.
/// All clauses are combined with AND.
///
/// # Sorting
/// `sort` is an ordered list of `(key, direction)` pairs using the same key
/// syntax. `"ASC"` (any case) or `"1"` sorts ascending; any other token
/// sorts descending. Without sort directives, results are ordered by the
/// base entity's creation timestamp, descending, with the id column as
/// tie-break.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    /// Exact-match filters, keyed by field path. Value type selects the
    /// comparison: string, number, bool, `null` (IS NULL) or array (IN).
    #[serde(default)]
    pub filters: Map<String, Value>,
    /// Case-insensitive substring filters, keyed by field path.
    #[serde(default)]
    pub search: Map<String, Value>,
    /// Ordered sort directives as `(key, direction)` pairs.
    #[serde(default)]
    pub sort: Vec<(String, String)>,
    /// Page window request.
    #[serde(default)]
    pub pagination: PageRequest,
}

/// Requested page window.
///
/// When `enabled` is false, `page` and `page_size` are unused and all
/// matching rows come back as a single page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    /// Whether to page the result set at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// 1-based page number; values below 1 are clamped up.
    #[serde(default)]
    pub page: Option<u64>,
    /// Rows per page; clamped into `[1, max_page_size]`.
    #[serde(default)]
    pub page_size: Option<u64>,
}

const fn default_enabled() -> bool {
    true
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            enabled: true,
            page: None,
            page_size: None,
        }
    }
}

impl PageRequest {
    /// A window for `page` (1-based) with `page_size` rows per page.
    #[must_use]
    pub fn page(page: u64, page_size: u64) -> Self {
        Self {
            enabled: true,
            page: Some(page),
            page_size: Some(page_size),
        }
    }

    /// No paging: every matching row in one page.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            page: None,
            page_size: None,
        }
    }
}

/// Page bookkeeping for a completed list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationInfo {
    /// Distinct base entities matching the predicates.
    pub total: u64,
    /// The page actually served, clamped to `[1, total_pages]`.
    pub current_page: u64,
    /// `max(1, ceil(total / page_size))`.
    pub total_pages: u64,
    /// The effective page size after clamping.
    pub page_size: u64,
}

/// Result of one list request.
#[derive(Debug, Clone, Serialize)]
pub struct ListResult {
    /// One plain JSON object per row, keyed by column name. Projected
    /// columns from to-one joins appear as `alias__column` keys.
    pub items: Vec<Value>,
    pub pagination: PaginationInfo,
    /// One message per dropped clause or sort term. Empty on a fully
    /// clean request; the warning count is `warnings.len()`.
    pub warnings: Vec<String>,
}
