//! Input validation and normalization for booking submissions.
//!
//! Pure functions over strings and dates; nothing here touches I/O.

use chrono::{Datelike, NaiveDate, Weekday};
use regex::Regex;
use std::sync::LazyLock;

/// Portuguese country prefix used for phone normalization.
pub const PT_COUNTRY_PREFIX: &str = "+351";

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

static PT_PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+351)?[0-9]{9}$").expect("phone regex is valid"));

/// Removes the separators people commonly type inside phone numbers.
fn strip_phone_separators(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Validate a full name.
///
/// True iff the trimmed input has at least two whitespace-separated words,
/// each at least two characters long.
pub fn validate_name(name: &str) -> bool {
    let words: Vec<&str> = name.split_whitespace().collect();
    words.len() >= 2 && words.iter().all(|word| word.chars().count() >= 2)
}

/// Validate an email address.
///
/// Permissive `local@domain.tld` shape check, not RFC 5322.
pub fn validate_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

/// Validate a Portuguese phone number.
///
/// Accepts `912345678`, `+351912345678`, `+351 912 345 678`, `912-345-678`.
pub fn validate_portuguese_phone(phone: &str) -> bool {
    PT_PHONE_REGEX.is_match(&strip_phone_separators(phone))
}

/// Format a phone number to the canonical `+351XXXXXXXXX` form.
///
/// Numbers that are neither `+351`-prefixed nor 9 characters long are
/// returned stripped but otherwise unchanged. No re-validation happens here.
pub fn format_phone_number(phone: &str) -> String {
    let clean = strip_phone_separators(phone);
    if clean.starts_with(PT_COUNTRY_PREFIX) {
        return clean;
    }
    if clean.chars().count() == 9 {
        return format!("{}{}", PT_COUNTRY_PREFIX, clean);
    }
    clean
}

fn half_hour_slots(first_hour: u32, end_hour: u32) -> Vec<String> {
    (first_hour..end_hour)
        .flat_map(|hour| [format!("{:02}:00", hour), format!("{:02}:30", hour)])
        .collect()
}

/// Bookable start times for a date.
///
/// Sundays are closed, Saturdays run 09:00-13:00, weekdays 09:00-19:00,
/// all in 30 minute slots.
pub fn available_slots(date: NaiveDate) -> Vec<String> {
    match date.weekday() {
        Weekday::Sun => Vec::new(),
        Weekday::Sat => half_hour_slots(9, 13),
        _ => half_hour_slots(9, 19),
    }
}

/// Whether a date can be requested for an appointment: not in the past, not a Sunday.
pub fn is_valid_booking_date(date: NaiveDate, today: NaiveDate) -> bool {
    date >= today && date.weekday() != Weekday::Sun
}
