// Key Decomposition - Composite identifiers and foreign id cleanup
//
// The CRM composite product key carries a category prefix in its first two
// `-` separated segments; the remainder is the clean product key shared with
// the sales detail feed. ERP ids carry a known prefix ("NAS") or stray
// separators that the CRM key does not.

use crate::normalize::NOT_AVAILABLE;

/// Separator used inside composite CRM keys and ERP ids.
pub const KEY_SEPARATOR: char = '-';

/// The two halves of a decomposed composite product key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductKeyParts {
    /// Category id: the first two segments joined by `_`
    /// (e.g. "BK-R93R-62" → "BK_R93R")
    pub category_id: String,

    /// Clean product key: everything after the category prefix
    /// (e.g. "BK-R93R-62" → "62")
    pub product_key: String,
}

/// Split a composite product key into category id and clean key.
///
/// Keys without a category prefix (fewer than two separators) keep the whole
/// trimmed value as the product key and fall back to the "n/a" category.
pub fn split_product_key(raw: &str) -> ProductKeyParts {
    let trimmed = raw.trim();
    let mut pieces = trimmed.splitn(3, KEY_SEPARATOR);

    match (pieces.next(), pieces.next(), pieces.next()) {
        (Some(first), Some(second), Some(rest)) => ProductKeyParts {
            category_id: format!("{}_{}", first, second),
            product_key: rest.to_string(),
        },
        _ => ProductKeyParts {
            category_id: NOT_AVAILABLE.to_string(),
            product_key: trimmed.to_string(),
        },
    }
}

/// Strip a literal prefix from a foreign id when present (e.g. ERP "NAS").
pub fn strip_known_prefix<'a>(raw: &'a str, prefix: &str) -> &'a str {
    let trimmed = raw.trim();
    trimmed.strip_prefix(prefix).unwrap_or(trimmed)
}

/// Remove every separator from a foreign id (full removal, not just a prefix).
pub fn strip_separators(raw: &str) -> String {
    raw.trim().replace(KEY_SEPARATOR, "")
}

// ============================================================================
// TESTS
// ============================================================================
