use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_english::{parse_date_string, Dialect};
use spark_core::date_query::resolve_suggestion;

/// Parses a date typed on the command line.
///
/// Accepts ISO dates, the picker's suggestion text ("tom", "fri") and free
/// English ("next week", "in 3 days") relative to `today`.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Some((_, date)) = resolve_suggestion(input, today) {
        return Ok(date);
    }

    let base = Utc.from_utc_datetime(&today.and_time(NaiveTime::MIN));
    parse_date_string(input, base, Dialect::Us)
        .map(|dt| dt.date_naive())
        .map_err(|e| anyhow!("Failed to parse date '{}': {}", input, e))
}

/// Parses a wall-clock time such as `09:30` or `9:30`.
pub fn parse_time(input: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .map_err(|_| anyhow!("Failed to parse time '{}', expected HH:MM", input))
}

/// Parses `YYYY-MM` into a year and a 0-based month.
pub fn parse_month(input: &str) -> Result<(i32, u32)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", input.trim()), "%Y-%m-%d")
        .map_err(|_| anyhow!("Failed to parse month '{}', expected YYYY-MM", input))?;
    Ok((chrono::Datelike::year(&first), chrono::Datelike::month0(&first)))
}
