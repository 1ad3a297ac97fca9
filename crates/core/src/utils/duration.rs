//! Parsing of human-friendly duration strings such as `60m` or `2w`.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::errors::{Error, Result};

/// `<digits><unit>` with unit one of `w`, `d`, `h`, `m`, `s`, `ms`, `us`.
/// `m` is minutes, never months.
static DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)(w|d|h|ms|us|m|s)$").expect("Invalid regex pattern")
});

/// Parse a duration string. Surrounding whitespace is ignored.
///
/// ```
/// use std::time::Duration;
/// use stockdice_core::utils::parse_duration;
///
/// assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
/// assert!(parse_duration("1y").is_err());
/// ```
pub fn parse_duration(input: &str) -> Result<Duration> {
    let invalid = || Error::InvalidConfigValue(format!("invalid duration '{}'", input));

    let captures = DURATION_REGEX.captures(input.trim()).ok_or_else(invalid)?;
    let amount: u64 = captures[1].parse().map_err(|_| invalid())?;

    let seconds_per_unit: u64 = match &captures[2] {
        "w" => 7 * 24 * 3600,
        "d" => 24 * 3600,
        "h" => 3600,
        "m" => 60,
        "s" => 1,
        "ms" => return Ok(Duration::from_millis(amount)),
        "us" => return Ok(Duration::from_micros(amount)),
        _ => return Err(invalid()),
    };

    amount
        .checked_mul(seconds_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_unit() {
        assert_eq!(parse_duration("2w").unwrap(), Duration::from_secs(14 * 86400));
        assert_eq!(parse_duration("1d").unwrap(), Duration::from_secs(86400));
        assert_eq!(parse_duration("3h").unwrap(), Duration::from_secs(10800));
        assert_eq!(parse_duration("60m").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("10us").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration(" 0s ").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_reject_malformed() {
        for input in ["", "m", "10", "1.5h", "-1s", "1 h", "1y", "1H", "1mo"] {
            let err = parse_duration(input).unwrap_err();
            assert!(err.is_configuration(), "{} should be rejected", input);
        }
    }

    #[test]
    fn test_reject_overflow() {
        assert!(parse_duration("99999999999999999999w").is_err());
        assert!(parse_duration("9999999999999999999w").is_err());
    }
}
