//! Field-level rules shared by the intake schemas.
//!
//! Each rule records at most one message per field: once a field has an
//! error, later rules for the same field are skipped.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;

use super::FieldErrors;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

pub(crate) const MIN_PHONE_DIGITS: usize = 10;

pub(crate) fn char_len(value: &str) -> usize {
    value.chars().count()
}

pub(crate) fn min_chars(errors: &mut FieldErrors, field: &'static str, value: &str, min: usize, message: &str) {
    if char_len(value) < min {
        errors.insert(field, message);
    }
}

pub(crate) fn max_chars(errors: &mut FieldErrors, field: &'static str, value: &str, max: usize, message: &str) {
    if char_len(value) > max {
        errors.insert(field, message);
    }
}

pub(crate) fn required(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field, message);
    }
}

pub(crate) fn is_email(value: &str) -> bool {
    !value.starts_with('.') && !value.contains("..") && EMAIL.is_match(value)
}

pub(crate) fn email(errors: &mut FieldErrors, field: &'static str, value: &str) {
    if !is_email(value.trim()) {
        errors.insert(field, "Please enter a valid email address.");
    }
}

pub(crate) fn phone(errors: &mut FieldErrors, field: &'static str, value: &str) {
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < MIN_PHONE_DIGITS {
        errors.insert(field, "Please enter a valid phone number.");
    }
}

/// Parses `value` as one of the members of `E`.
pub(crate) fn one_of<E: FromStr>(errors: &mut FieldErrors, field: &'static str, value: &str) -> Option<E> {
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            errors.insert(field, "Please select a valid option.");
            None
        }
    }
}

/// Reads a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|at| at.date_naive()))
}

/// A readable date that is not before `today`.
pub(crate) fn date_from(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    today: NaiveDate,
) -> Option<NaiveDate> {
    match parse_date(value) {
        None => {
            errors.insert(field, "Please select a date.");
            None
        }
        Some(date) if date < today => {
            errors.insert(field, "Please select today or a later date.");
            None
        }
        Some(date) => Some(date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_email("asha@anandwan.org"));
        assert!(is_email("first.last+tag@mail.example.in"));
        assert!(!is_email("not-an-email"));
        assert!(!is_email("missing@tld"));
        assert!(!is_email(".dot@example.com"));
        assert!(!is_email("two..dots@example.com"));
        assert!(!is_email("@example.com"));
    }

    #[test]
    fn phone_counts_digits_only() {
        let mut errors = FieldErrors::default();
        phone(&mut errors, "phone", "+91 98765 43210");
        assert!(errors.is_empty());

        phone(&mut errors, "phone", "98-76-54");
        assert_eq!(errors.get("phone"), Some("Please enter a valid phone number."));
    }

    #[test]
    fn first_error_per_field_wins() {
        let mut errors = FieldErrors::default();
        min_chars(&mut errors, "title", "", 2, "too short");
        required(&mut errors, "title", "", "required");
        assert_eq!(errors.get("title"), Some("too short"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let mut errors = FieldErrors::default();
        min_chars(&mut errors, "name", "जो", 2, "too short");
        assert!(errors.is_empty());
    }

    #[test]
    fn dates_before_today_are_rejected() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let mut errors = FieldErrors::default();

        assert_eq!(date_from(&mut errors, "d", "2026-03-10", today), Some(today));
        assert!(date_from(&mut errors, "d", "2026-03-09", today).is_none());
        assert_eq!(errors.get("d"), Some("Please select today or a later date."));
    }

    #[test]
    fn blank_and_malformed_dates_ask_for_a_date() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        for raw in ["", "   ", "10/03/2026", "2026-13-01"] {
            let mut errors = FieldErrors::default();
            assert!(date_from(&mut errors, "d", raw, today).is_none(), "{raw:?}");
            assert_eq!(errors.get("d"), Some("Please select a date."));
        }
    }

    #[test]
    fn timestamps_are_read_as_their_calendar_date() {
        assert_eq!(
            parse_date("2026-03-12T00:00:00.000Z"),
            NaiveDate::from_ymd_opt(2026, 3, 12)
        );
        assert_eq!(parse_date(" 2026-03-12 "), NaiveDate::from_ymd_opt(2026, 3, 12));
    }
}
