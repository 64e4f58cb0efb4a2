// Temporal Repair - Packed date decoding and validity-range derivation
//
// Malformed dates are data-shape problems, not errors: they are absorbed to
// null. A packed value that is 8 digits but names an impossible calendar day
// (e.g. 20231332) nulls out too, consistent with the zero/wrong-length rule.

use chrono::{Duration, NaiveDate};

/// Decode a packed 8-digit integer date (YYYYMMDD).
///
/// Zero, wrong digit count, and calendar-invalid values all reject to None.
pub fn parse_packed_date(raw: Option<i64>) -> Option<NaiveDate> {
    let value = raw?;
    if !(10_000_000..=99_999_999).contains(&value) {
        return None;
    }

    let year = (value / 10_000) as i32;
    let month = ((value / 100) % 100) as u32;
    let day = (value % 100) as u32;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse ISO date text (`YYYY-MM-DD`), leniently: anything unparseable is None.
pub fn parse_iso_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw?.trim(), "%Y-%m-%d").ok()
}

/// Null out dates strictly in the future relative to the processing date.
pub fn null_if_future(date: Option<NaiveDate>, today: NaiveDate) -> Option<NaiveDate> {
    date.filter(|d| *d <= today)
}

/// Derive validity end dates from start dates already sorted ascending.
///
/// Each row's end date is its successor's start date minus one day; the last
/// row stays open-ended (None), signaling "currently active". A successor
/// without a start date yields no end date either.
pub fn close_date_ranges(starts: &[Option<NaiveDate>]) -> Vec<Option<NaiveDate>> {
    (0..starts.len())
        .map(|i| match starts.get(i + 1) {
            Some(next) => next.map(|d| d - Duration::days(1)),
            None => None,
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
