//! New York Stock Exchange regular trading hours.
//!
//! Mon-Fri 09:30-16:00 America/New_York, both ends inclusive. Holidays are
//! not modelled.

use std::time::Duration;

use chrono::{DateTime, Datelike, Days, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::America::New_York;
use chrono_tz::Tz;

const OPEN_HOUR: u32 = 9;
const OPEN_MINUTE: u32 = 30;
const CLOSE_HOUR: u32 = 16;

fn open_time() -> NaiveTime {
    NaiveTime::from_hms_opt(OPEN_HOUR, OPEN_MINUTE, 0).unwrap_or(NaiveTime::MIN)
}

fn is_weekday(local: &DateTime<Tz>) -> bool {
    local.weekday().num_days_from_monday() < 5
}

fn minute_of_day(local: &DateTime<Tz>) -> u32 {
    local.hour() * 60 + local.minute()
}

/// Whether `now` falls within regular trading hours.
pub fn is_new_york_regular_trading_hours(now: DateTime<Utc>) -> bool {
    let local = now.with_timezone(&New_York);
    if !is_weekday(&local) {
        return false;
    }
    let minute = minute_of_day(&local);
    let after_close = minute > CLOSE_HOUR * 60
        || (minute == CLOSE_HOUR * 60 && (local.second() > 0 || local.nanosecond() > 0));
    minute >= OPEN_HOUR * 60 + OPEN_MINUTE && !after_close
}

/// Time left until the next regular session opens; zero during trading hours.
///
/// Before the open on a weekday this is that day's 09:30. Otherwise it is
/// the next weekday's 09:30, so Friday evening and the weekend wait until
/// Monday.
pub fn duration_until_next_trading_hours(now: DateTime<Utc>) -> Duration {
    if is_new_york_regular_trading_hours(now) {
        return Duration::ZERO;
    }

    let local = now.with_timezone(&New_York);
    let weekday = local.weekday().num_days_from_monday();
    let before_open = is_weekday(&local) && minute_of_day(&local) < OPEN_HOUR * 60 + OPEN_MINUTE;

    let days_ahead = if before_open {
        0
    } else if weekday < 4 {
        1
    } else {
        7 - u64::from(weekday)
    };

    let Some(date) = local.date_naive().checked_add_days(Days::new(days_ahead)) else {
        return Duration::ZERO;
    };
    let Some(open) = New_York
        .from_local_datetime(&date.and_time(open_time()))
        .earliest()
    else {
        return Duration::ZERO;
    };

    (open.with_timezone(&Utc) - now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-11 is a Monday; New York is on EDT (UTC-4) that week.
    fn utc(day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, minute, second)
            .single()
            .unwrap()
    }

    #[test]
    fn test_session_bounds_are_inclusive() {
        // 09:30 and 16:00 New York
        assert!(is_new_york_regular_trading_hours(utc(11, 13, 30, 0)));
        assert!(is_new_york_regular_trading_hours(utc(11, 20, 0, 0)));
        assert!(!is_new_york_regular_trading_hours(utc(11, 13, 29, 59)));
        assert!(!is_new_york_regular_trading_hours(utc(11, 20, 0, 1)));
    }

    #[test]
    fn test_weekend_is_closed() {
        // Saturday noon New York
        assert!(!is_new_york_regular_trading_hours(utc(16, 16, 0, 0)));
    }

    #[test]
    fn test_duration_inside_session_is_zero() {
        assert_eq!(duration_until_next_trading_hours(utc(12, 15, 0, 0)), Duration::ZERO);
    }

    #[test]
    fn test_duration_before_open_waits_for_same_day() {
        // Tuesday 08:00 New York
        assert_eq!(
            duration_until_next_trading_hours(utc(12, 12, 0, 0)),
            Duration::from_secs(90 * 60)
        );
    }

    #[test]
    fn test_duration_after_close_waits_for_next_day() {
        // Wednesday 17:00 New York -> Thursday 09:30
        assert_eq!(
            duration_until_next_trading_hours(utc(13, 21, 0, 0)),
            Duration::from_secs((16 * 60 + 30) * 60)
        );
    }

    #[test]
    fn test_duration_friday_evening_waits_for_monday() {
        // Friday 17:00 New York -> Monday 09:30
        assert_eq!(
            duration_until_next_trading_hours(utc(15, 21, 0, 0)),
            Duration::from_secs((2 * 24 * 60 + 16 * 60 + 30) * 60)
        );
    }

    #[test]
    fn test_duration_sunday_waits_for_monday() {
        // Sunday 09:30 New York -> Monday 09:30
        assert_eq!(
            duration_until_next_trading_hours(utc(17, 13, 30, 0)),
            Duration::from_secs(24 * 3600)
        );
    }
}
