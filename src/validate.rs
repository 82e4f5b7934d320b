//! Field validation for the CLI forms
//!
//! The persistence layer stores whatever it is given; input is checked
//! here, before it reaches the store, matching where the original app
//! validated its forms.

use std::sync::LazyLock;

use regex::Regex;

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]{3,8}$").expect("Invalid username regex"));

static PIN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}$").expect("Invalid pin regex"));

/// Earliest accepted start year for a work experience entry
pub const MIN_START_YEAR: i32 = 1950;

/// Usernames are 3 to 8 alphanumeric characters
pub fn valid_username(user: &str) -> bool {
    USERNAME_REGEX.is_match(user)
}

/// PINs are exactly four digits
pub fn valid_pin(pin: &str) -> bool {
    PIN_REGEX.is_match(pin)
}

/// Start years must not predate [`MIN_START_YEAR`]
pub fn valid_start_year(year: i32) -> bool {
    year >= MIN_START_YEAR
}

/// Dates are calendar-valid `YYYY-MM-DD` strings
pub fn valid_date(date: &str) -> bool {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_bounds() {
        assert!(valid_username("ana"));
        assert!(valid_username("user1234"));
        assert!(!valid_username("ab"));
        assert!(!valid_username("toolongname"));
        assert!(!valid_username("with space"));
        assert!(!valid_username("acute-ñ"));
    }

    #[test]
    fn test_pin_is_exactly_four_digits() {
        assert!(valid_pin("0042"));
        assert!(valid_pin("9999"));
        assert!(!valid_pin("42"));
        assert!(!valid_pin("12345"));
        assert!(!valid_pin("abcd"));
    }

    #[test]
    fn test_start_year_floor() {
        assert!(valid_start_year(1950));
        assert!(valid_start_year(2024));
        assert!(!valid_start_year(1949));
    }

    #[test]
    fn test_date_must_be_calendar_valid() {
        assert!(valid_date("1990-05-17"));
        assert!(!valid_date("1990-02-30"));
        assert!(!valid_date("17/05/1990"));
        assert!(!valid_date("not a date"));
    }
}
