use crate::error::CoreError;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// Parses an IANA timezone name.
pub fn parse_timezone(timezone: &str) -> Result<Tz, CoreError> {
    Tz::from_str(timezone)
        .map_err(|_| CoreError::InvalidTimezone(format!("Invalid timezone: {}", timezone)))
}

pub fn validate_timezone(timezone: &str) -> Result<(), CoreError> {
    parse_timezone(timezone).map(|_| ())
}

/// The calendar date in `timezone` at the instant `now`.
pub fn today_in(timezone: &str, now: DateTime<Utc>) -> Result<NaiveDate, CoreError> {
    let tz = parse_timezone(timezone)?;
    Ok(now.with_timezone(&tz).date_naive())
}

/// Converts local midnight of `day` to UTC. When midnight is skipped by a DST
/// change the first valid instant after the gap is used.
fn local_midnight(tz: Tz, day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_time(chrono::NaiveTime::MIN);
    (0..=3)
        .find_map(|hours| {
            tz.from_local_datetime(&(midnight + Duration::hours(hours)))
                .earliest()
        })
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// The half-open UTC interval `[start, end)` covering `day` in `timezone`.
///
/// The interval is not always 24 hours long: DST transitions shorten or
/// lengthen it.
pub fn day_bounds(
    day: NaiveDate,
    timezone: &str,
) -> Result<(DateTime<Utc>, DateTime<Utc>), CoreError> {
    let tz = parse_timezone(timezone)?;
    let next = day
        .succ_opt()
        .ok_or_else(|| CoreError::InvalidInput(format!("No day follows {}", day)))?;
    Ok((local_midnight(tz, day), local_midnight(tz, next)))
}

/// Interprets a wall-clock time in `timezone` as an instant.
pub fn local_to_utc(
    local: chrono::NaiveDateTime,
    timezone: &str,
) -> Result<DateTime<Utc>, CoreError> {
    let tz = parse_timezone(timezone)?;
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            CoreError::InvalidInput(format!("{} does not exist in {}", local, timezone))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case("UTC", true)]
    #[case("America/New_York", true)]
    #[case("Europe/Istanbul", true)]
    #[case("Mars/Olympus_Mons", false)]
    #[case("", false)]
    fn test_validate_timezone(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(validate_timezone(name).is_ok(), valid);
    }

    #[test]
    fn test_today_depends_on_zone() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 2, 0, 0).unwrap();
        assert_eq!(today_in("UTC", now).unwrap(), date(2024, 3, 10));
        assert_eq!(today_in("America/Los_Angeles", now).unwrap(), date(2024, 3, 9));
    }

    #[test]
    fn test_day_bounds_across_spring_forward() {
        let (start, end) = day_bounds(date(2024, 3, 10), "America/New_York").unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 10, 5, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 3, 11, 4, 0, 0).unwrap());
        assert_eq!(end - start, Duration::hours(23));
    }

    #[test]
    fn test_day_bounds_utc() {
        let (start, end) = day_bounds(date(2024, 2, 29), "UTC").unwrap();
        assert_eq!(end - start, Duration::hours(24));
        assert_eq!(start.date_naive(), date(2024, 2, 29));
    }

    #[test]
    fn test_local_to_utc_rejects_skipped_time() {
        let skipped = date(2024, 3, 10).and_hms_opt(2, 30, 0).unwrap();
        assert!(local_to_utc(skipped, "America/New_York").is_err());
        let fine = date(2024, 3, 10).and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(
            local_to_utc(fine, "America/New_York").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 10, 13, 0, 0).unwrap()
        );
    }
}
