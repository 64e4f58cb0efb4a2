// Field Normalizers - Whitespace, casing, and code-to-label mappings
//
// Lookup tables are plain immutable values handed into the transforms, so
// every transform stays a pure function of its inputs.

use serde::{Deserialize, Serialize};

/// Sentinel label for missing or unmapped values. Policy, not a defect:
/// malformed codes never error, they fall through to this.
pub const NOT_AVAILABLE: &str = "n/a";

// ============================================================================
// CODE MAP
// ============================================================================

/// What to do with a trimmed, non-empty token that matches no entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Fallback {
    /// Unmapped codes collapse to "n/a" (marital status, gender, line codes)
    Sentinel,

    /// Unmapped tokens pass through trimmed (country names)
    Passthrough,
}

/// Immutable code-to-label table. Matching is case-insensitive after trim;
/// null and empty inputs always resolve to "n/a".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeMap {
    entries: Vec<(String, String)>,
    fallback: Fallback,
}

impl CodeMap {
    pub fn new(entries: &[(&str, &str)], fallback: Fallback) -> Self {
        CodeMap {
            entries: entries
                .iter()
                .map(|(code, label)| (code.to_uppercase(), label.to_string()))
                .collect(),
            fallback,
        }
    }

    /// Resolve a raw token to its conformed label.
    pub fn resolve(&self, raw: Option<&str>) -> String {
        let token = raw.map(str::trim).unwrap_or("");
        if token.is_empty() {
            return NOT_AVAILABLE.to_string();
        }

        let upper = token.to_uppercase();
        for (code, label) in &self.entries {
            if *code == upper {
                return label.clone();
            }
        }

        match self.fallback {
            Fallback::Sentinel => NOT_AVAILABLE.to_string(),
            Fallback::Passthrough => token.to_string(),
        }
    }
}

// ============================================================================
// STANDARD TABLES
// ============================================================================

/// The full set of lookup tables the silver transforms need, built once per
/// run and passed by reference.
#[derive(Debug, Clone)]
pub struct NormalizerMaps {
    pub marital_status: CodeMap,
    pub gender: CodeMap,
    pub erp_gender: CodeMap,
    pub product_line: CodeMap,
    pub country: CodeMap,
}

impl NormalizerMaps {
    pub fn new() -> Self {
        NormalizerMaps {
            marital_status: CodeMap::new(
                &[("M", "Married"), ("S", "Single")],
                Fallback::Sentinel,
            ),
            gender: CodeMap::new(&[("F", "Female"), ("M", "Male")], Fallback::Sentinel),
            erp_gender: CodeMap::new(
                &[
                    ("F", "Female"),
                    ("FEMALE", "Female"),
                    ("M", "Male"),
                    ("MALE", "Male"),
                ],
                Fallback::Sentinel,
            ),
            product_line: CodeMap::new(
                &[
                    ("M", "Mountain"),
                    ("R", "Road"),
                    ("S", "other Sales"),
                    ("T", "Touring"),
                ],
                Fallback::Sentinel,
            ),
            country: CodeMap::new(
                &[("DE", "Germany"), ("US", "United States"), ("USA", "United States")],
                Fallback::Passthrough,
            ),
        }
    }
}

impl Default for NormalizerMaps {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TEXT HELPERS
// ============================================================================

/// Trim a raw optional text field; null becomes the empty string.
pub fn clean_text(raw: Option<&str>) -> String {
    raw.map(str::trim).unwrap_or("").to_string()
}

/// Trim a raw optional text field; null and whitespace-only become None.
pub fn non_empty(raw: Option<&str>) -> Option<String> {
    let trimmed = raw.map(str::trim).unwrap_or("");
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marital_status_codes() {
        let maps = NormalizerMaps::new();

        assert_eq!(maps.marital_status.resolve(Some("M")), "Married");
        assert_eq!(maps.marital_status.resolve(Some("s")), "Single");
        assert_eq!(maps.marital_status.resolve(Some("  m  ")), "Married");
        assert_eq!(maps.marital_status.resolve(Some("X")), "n/a");
        assert_eq!(maps.marital_status.resolve(None), "n/a");
        assert_eq!(maps.marital_status.resolve(Some("")), "n/a");
    }

    #[test]
    fn test_gender_codes() {
        let maps = NormalizerMaps::new();

        assert_eq!(maps.gender.resolve(Some("F")), "Female");
        assert_eq!(maps.gender.resolve(Some("m")), "Male");
        assert_eq!(maps.gender.resolve(Some("unknown")), "n/a");
    }

    #[test]
    fn test_erp_gender_accepts_words_and_letters() {
        let maps = NormalizerMaps::new();

        assert_eq!(maps.erp_gender.resolve(Some("FEMALE")), "Female");
        assert_eq!(maps.erp_gender.resolve(Some("female ")), "Female");
        assert_eq!(maps.erp_gender.resolve(Some("M")), "Male");
        assert_eq!(maps.erp_gender.resolve(Some("male")), "Male");
        assert_eq!(maps.erp_gender.resolve(Some("?")), "n/a");
    }

    #[test]
    fn test_product_line_codes() {
        let maps = NormalizerMaps::new();

        assert_eq!(maps.product_line.resolve(Some("M")), "Mountain");
        assert_eq!(maps.product_line.resolve(Some("r")), "Road");
        assert_eq!(maps.product_line.resolve(Some("S")), "other Sales");
        assert_eq!(maps.product_line.resolve(Some("T")), "Touring");
        assert_eq!(maps.product_line.resolve(Some("Z")), "n/a");
    }

    #[test]
    fn test_country_normalization() {
        let maps = NormalizerMaps::new();

        // Any casing / whitespace of US codes maps to the full label
        assert_eq!(maps.country.resolve(Some("usa")), "United States");
        assert_eq!(maps.country.resolve(Some("  US ")), "United States");
        assert_eq!(maps.country.resolve(Some("DE")), "Germany");
        assert_eq!(maps.country.resolve(Some("de")), "Germany");

        // Empty and null become the sentinel
        assert_eq!(maps.country.resolve(Some("")), "n/a");
        assert_eq!(maps.country.resolve(Some("   ")), "n/a");
        assert_eq!(maps.country.resolve(None), "n/a");

        // Unknown countries pass through trimmed, not collapsed
        assert_eq!(maps.country.resolve(Some("  Australia ")), "Australia");
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text(Some("  Jon  ")), "Jon");
        assert_eq!(clean_text(None), "");
        assert_eq!(non_empty(Some("  ")), None);
        assert_eq!(non_empty(Some(" x ")), Some("x".to_string()));
    }
}
