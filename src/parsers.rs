//! Validation of raw identifier and loan-duration strings.

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    error::{LibraryError, LibraryResult},
    ids::ItemId,
};

/// Days in one week-form unit
const DAYS_PER_WEEK: u64 = 7;

/// Compile one of the fixed patterns below
#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("fixed pattern is valid")
}

lazy_static! {
    /// Digits only, surrounding whitespace tolerated
    static ref ID_PATTERN: Regex = compile(r"^\s*([0-9]+)\s*$");

    /// `<integer><optional whitespace><optional alphabetic unit>`
    static ref DURATION_PATTERN: Regex = compile(r"^\s*([0-9]+)\s*([A-Za-z]*)\s*$");
}

/// Parse a catalog identifier such as `"101"` or `" 42 "`.
///
/// # Errors
///
/// Returns `LibraryError::InvalidIdFormat` when the input is empty, contains
/// anything other than digits and surrounding whitespace, or does not fit in
/// a `u32`.
pub fn parse_id(raw: &str) -> LibraryResult<ItemId> {
    let invalid = |reason| LibraryError::InvalidIdFormat { input: raw.to_string(), reason };

    let digits = ID_PATTERN
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| invalid("Expect digits only."))?;

    digits.as_str().parse::<u32>().map(ItemId).map_err(|_| invalid("ID out of range."))
}

/// Parse a loan duration into a day count.
///
/// Accepts `14`, `14d`, `14 days`, `2 weeks`, `2W` and so on. Day-forms and a
/// missing unit return the number unchanged; week-forms multiply it by seven.
///
/// # Errors
///
/// - `LibraryError::InvalidDurationFormat` if the input is not a number
///   optionally followed by a unit word, or the day count overflows
/// - `LibraryError::UnsupportedDurationUnit` if the unit word is unknown,
///   e.g. `"3fortnights"`
pub fn parse_duration_days(raw: &str) -> LibraryResult<u64> {
    let invalid = |reason| LibraryError::InvalidDurationFormat { input: raw.to_string(), reason };

    let caps = DURATION_PATTERN
        .captures(raw)
        .ok_or_else(|| invalid("Expect a number optionally followed by a unit."))?;

    let value = caps
        .get(1)
        .ok_or_else(|| invalid("Missing amount."))?
        .as_str()
        .parse::<u64>()
        .map_err(|_| invalid("Amount out of range."))?;

    let unit = caps.get(2).map_or("", |m| m.as_str()).to_ascii_lowercase();

    match unit.as_str() {
        "" | "d" | "day" | "days" => Ok(value),
        "w" | "week" | "weeks" => {
            value.checked_mul(DAYS_PER_WEEK).ok_or_else(|| invalid("Amount out of range."))
        }
        _ => Err(LibraryError::UnsupportedDurationUnit { input: raw.to_string(), unit }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_accepts_digits() {
        assert_eq!(parse_id("101"), Ok(ItemId(101)));
        assert_eq!(parse_id("  42\t"), Ok(ItemId(42)));
        assert_eq!(parse_id("0"), Ok(ItemId(0)));
    }

    #[test]
    fn test_parse_id_rejects_garbage() {
        for raw in ["12a", "", "   ", "-5", "+5", "1 2", "4.0"] {
            assert!(
                matches!(parse_id(raw), Err(LibraryError::InvalidIdFormat { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_id_rejects_out_of_range() {
        let result = parse_id("99999999999");
        assert!(matches!(
            result,
            Err(LibraryError::InvalidIdFormat { reason: "ID out of range.", .. })
        ));
    }

    #[test]
    fn test_parse_duration_day_forms() {
        assert_eq!(parse_duration_days("14 days"), Ok(14));
        assert_eq!(parse_duration_days("1 day"), Ok(1));
        assert_eq!(parse_duration_days("3d"), Ok(3));
        assert_eq!(parse_duration_days("7"), Ok(7));
        assert_eq!(parse_duration_days(" 10 DAYS "), Ok(10));
    }

    #[test]
    fn test_parse_duration_week_forms() {
        assert_eq!(parse_duration_days("2 weeks"), Ok(14));
        assert_eq!(parse_duration_days("1week"), Ok(7));
        assert_eq!(parse_duration_days("3W"), Ok(21));
    }

    #[test]
    fn test_parse_duration_unknown_unit() {
        let result = parse_duration_days("3fortnights");
        assert_eq!(
            result,
            Err(LibraryError::UnsupportedDurationUnit {
                input: "3fortnights".to_string(),
                unit: "fortnights".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_duration_malformed() {
        for raw in ["", "days", "two weeks", "-3 days", "3 days ago", "1.5w"] {
            assert!(
                matches!(parse_duration_days(raw), Err(LibraryError::InvalidDurationFormat { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_duration_week_overflow() {
        let raw = format!("{} weeks", u64::MAX);
        assert!(matches!(
            parse_duration_days(&raw),
            Err(LibraryError::InvalidDurationFormat { reason: "Amount out of range.", .. })
        ));
    }
}
