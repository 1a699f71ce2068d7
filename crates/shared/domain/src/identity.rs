//! Identity derivation - opaque ids and ages.
//!
//! Pure functions: no I/O, no shared state. The only impurity is
//! [`today`], which reads the system clock.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Generate a new opaque, URL-safe identifier.
///
/// Backed by a random (v4) UUID rendered without hyphens, which gives
/// 122 bits of entropy.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Current UTC calendar date.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parse a date of birth.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (only the date part is kept).
pub fn parse_date(text: &str) -> DomainResult<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::invalid_date("date is empty"));
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.date_naive())
        .map_err(|_| DomainError::invalid_date(format!("'{}' is not a valid date", text)))
}

/// Whole years elapsed between `date_of_birth` and `as_of`.
///
/// # Errors
/// Returns `InvalidDate` if `date_of_birth` is after `as_of`.
pub fn age_between(date_of_birth: NaiveDate, as_of: NaiveDate) -> DomainResult<u32> {
    if date_of_birth > as_of {
        return Err(DomainError::invalid_date(format!(
            "date of birth {} is in the future",
            date_of_birth
        )));
    }

    let mut years = as_of.year() - date_of_birth.year();
    if (as_of.month(), as_of.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }

    // dob <= as_of, so years is never negative
    Ok(years as u32)
}

/// Parse `date_of_birth` and compute the age on `as_of`.
pub fn compute_age(date_of_birth: &str, as_of: NaiveDate) -> DomainResult<u32> {
    age_between(parse_date(date_of_birth)?, as_of)
}

/// Age as of today.
pub fn age_today(date_of_birth: NaiveDate) -> DomainResult<u32> {
    age_between(date_of_birth, today())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_day_before_birthday() {
        assert_eq!(compute_age("2000-06-15", date(2024, 6, 14)).unwrap(), 23);
    }

    #[test]
    fn test_age_on_birthday() {
        assert_eq!(compute_age("2000-06-15", date(2024, 6, 15)).unwrap(), 24);
    }

    #[test]
    fn test_age_earlier_month() {
        assert_eq!(compute_age("2000-06-15", date(2024, 5, 30)).unwrap(), 23);
        assert_eq!(compute_age("2000-06-15", date(2024, 7, 1)).unwrap(), 24);
    }

    #[test]
    fn test_age_born_today_is_zero() {
        assert_eq!(age_between(date(2024, 3, 1), date(2024, 3, 1)).unwrap(), 0);
    }

    #[test]
    fn test_leap_day_birthday() {
        // Feb 28 in a non-leap year still precedes Feb 29
        assert_eq!(compute_age("2004-02-29", date(2023, 2, 28)).unwrap(), 18);
        assert_eq!(compute_age("2004-02-29", date(2023, 3, 1)).unwrap(), 19);
    }

    #[test]
    fn test_future_date_rejected() {
        let result = compute_age("2030-01-01", date(2024, 1, 1));
        assert!(matches!(result, Err(DomainError::InvalidDate(_))));
    }

    #[test]
    fn test_unparsable_date_rejected() {
        for bad in ["", "   ", "not-a-date", "2024-13-01", "15/06/2000"] {
            let result = compute_age(bad, date(2024, 1, 1));
            assert!(matches!(result, Err(DomainError::InvalidDate(_))), "{bad:?}");
        }
    }

    #[test]
    fn test_parse_rfc3339_timestamp() {
        let parsed = parse_date("2000-06-15T10:30:00Z").unwrap();
        assert_eq!(parsed, date(2000, 6, 15));
    }

    #[test]
    fn test_generated_ids_are_unique_and_url_safe() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 1000);

        for id in &ids {
            assert_eq!(id.len(), 32);
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }
}
