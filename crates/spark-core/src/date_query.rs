//! Fuzzy matching of typed date text against a month grid.
//!
//! While a date field is empty the user can type free text ("fri", "15",
//! "tom"). Matching dates stay highlighted in the grid, the rest are dimmed,
//! and a single suggestion label ("Friday", "Tomorrow") is offered.
//!
//! Every function takes `today` explicitly; nothing here reads the clock.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::calendar::CalendarCell;

/// Weekday names indexed by days-from-Sunday.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// Relative tokens in priority order, paired with their offset from today.
const RELATIVE_TOKENS: [(&str, i64); 3] = [("today", 0), ("tomorrow", 1), ("yesterday", -1)];

fn offset_from(today: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        today.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        today.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAY_NAMES[weekday.num_days_from_sunday() as usize]
}

/// Whether `date` matches `query`. The query is compared case-insensitively.
pub fn date_matches_query(date: NaiveDate, query: &str, today: NaiveDate) -> bool {
    let query = query.to_lowercase();

    if weekday_name(date.weekday()).starts_with(&query) {
        return true;
    }
    if date.day().to_string().contains(&query) {
        return true;
    }
    RELATIVE_TOKENS.iter().any(|(token, offset)| {
        token.starts_with(&query) && offset_from(today, *offset) == Some(date)
    })
}

/// Dims every date cell that does not match `query`.
///
/// Blank cells are kept as blanks and no cell is removed, so the result lines
/// up with the input grid column for column. An empty query returns the grid
/// unchanged.
pub fn filter_grid_by_query(
    grid: &[CalendarCell],
    query: &str,
    today: NaiveDate,
) -> Vec<CalendarCell> {
    if query.is_empty() {
        return grid.to_vec();
    }

    grid.iter()
        .map(|cell| match *cell {
            CalendarCell::Blank => CalendarCell::Blank,
            CalendarCell::Date(date) | CalendarCell::Dimmed(date) => {
                if date_matches_query(date, query, today) {
                    CalendarCell::Date(date)
                } else {
                    CalendarCell::Dimmed(date)
                }
            }
        })
        .collect()
}

/// Label for the first token that starts with `query`: relative tokens first,
/// then weekday names from Sunday. Returns an empty string when nothing
/// matches or the query is empty.
pub fn suggest_label(query: &str) -> String {
    suggested_token(query)
        .map(|(token, _)| capitalize(token))
        .unwrap_or_default()
}

/// The suggestion for `query` together with the date it stands for.
///
/// Relative tokens resolve by offset from `today`; weekday names resolve to
/// the next date on or after `today` falling on that weekday.
pub fn resolve_suggestion(query: &str, today: NaiveDate) -> Option<(String, NaiveDate)> {
    let (token, target) = suggested_token(query)?;
    let date = match target {
        SuggestionTarget::Offset(days) => offset_from(today, days)?,
        SuggestionTarget::Weekday(index) => {
            let current = today.weekday().num_days_from_sunday();
            let ahead = (index + 7 - current) % 7;
            today.checked_add_days(Days::new(u64::from(ahead)))?
        }
    };
    Some((capitalize(token), date))
}

enum SuggestionTarget {
    Offset(i64),
    Weekday(u32),
}

fn suggested_token(query: &str) -> Option<(&'static str, SuggestionTarget)> {
    if query.is_empty() {
        return None;
    }
    let query = query.to_lowercase();

    let relative = RELATIVE_TOKENS
        .iter()
        .find(|(token, _)| token.starts_with(&query))
        .map(|(token, offset)| (*token, SuggestionTarget::Offset(*offset)));

    relative.or_else(|| {
        WEEKDAY_NAMES
            .iter()
            .zip(0u32..)
            .find(|(name, _)| name.starts_with(&query))
            .map(|(name, index)| (*name, SuggestionTarget::Weekday(index)))
    })
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::generate_month_grid;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn matching_days(cells: &[CalendarCell]) -> Vec<u32> {
        cells
            .iter()
            .filter_map(|c| match c {
                CalendarCell::Date(d) => Some(d.day()),
                _ => None,
            })
            .collect()
    }

    #[rstest]
    #[case("tom", "Tomorrow")]
    #[case("to", "Today")]
    #[case("t", "Today")]
    #[case("y", "Yesterday")]
    #[case("fr", "Friday")]
    #[case("FR", "Friday")]
    #[case("s", "Sunday")]
    #[case("sa", "Saturday")]
    #[case("th", "Thursday")]
    #[case("xyz", "")]
    #[case("", "")]
    fn test_suggest_label(#[case] query: &str, #[case] expected: &str) {
        assert_eq!(suggest_label(query), expected);
    }

    #[test]
    fn test_empty_query_returns_grid_unchanged() {
        let grid = generate_month_grid(2024, 2);
        assert_eq!(filter_grid_by_query(&grid, "", date(2024, 3, 10)), grid);
    }

    #[test]
    fn test_day_number_is_substring_match() {
        let grid = generate_month_grid(2024, 2);
        let filtered = filter_grid_by_query(&grid, "15", date(2024, 1, 1));
        assert_eq!(matching_days(&filtered), vec![15]);

        let filtered = filter_grid_by_query(&grid, "3", date(2024, 1, 1));
        assert_eq!(matching_days(&filtered), vec![3, 13, 23, 30, 31]);
    }

    #[test]
    fn test_filter_preserves_positions() {
        let grid = generate_month_grid(2024, 2);
        let filtered = filter_grid_by_query(&grid, "15", date(2024, 1, 1));
        assert_eq!(filtered.len(), grid.len());
        for (before, after) in grid.iter().zip(&filtered) {
            assert_eq!(before.date(), after.date());
            assert_eq!(before.is_blank(), after.is_blank());
        }
        assert!(filtered[5].is_dimmed());
    }

    #[test]
    fn test_weekday_prefix_matches_every_such_day() {
        // Fridays in March 2024: 1, 8, 15, 22, 29.
        let grid = generate_month_grid(2024, 2);
        let filtered = filter_grid_by_query(&grid, "fri", date(2024, 1, 1));
        assert_eq!(matching_days(&filtered), vec![1, 8, 15, 22, 29]);
    }

    #[test]
    fn test_relative_tokens_match_by_calendar_day() {
        let today = date(2024, 3, 10);
        assert!(date_matches_query(date(2024, 3, 11), "tomorrow", today));
        assert!(!date_matches_query(date(2024, 3, 12), "tomorrow", today));
        assert!(date_matches_query(date(2024, 3, 9), "yest", today));
        assert!(date_matches_query(date(2024, 3, 10), "Today", today));

        // "to" is a prefix of both "today" and "tomorrow", and of no weekday.
        let grid = generate_month_grid(2024, 2);
        let filtered = filter_grid_by_query(&grid, "to", today);
        assert_eq!(matching_days(&filtered), vec![10, 11]);
    }

    #[test]
    fn test_relative_tokens_cross_month_boundary() {
        let today = date(2024, 2, 29);
        assert!(date_matches_query(date(2024, 3, 1), "tom", today));
    }

    #[test]
    fn test_resolve_suggestion() {
        // 10 March 2024 was a Sunday.
        let today = date(2024, 3, 10);
        assert_eq!(
            resolve_suggestion("tom", today),
            Some(("Tomorrow".to_string(), date(2024, 3, 11)))
        );
        assert_eq!(
            resolve_suggestion("fr", today),
            Some(("Friday".to_string(), date(2024, 3, 15)))
        );
        assert_eq!(
            resolve_suggestion("sun", today),
            Some(("Sunday".to_string(), today))
        );
        assert_eq!(resolve_suggestion("xyz", today), None);
    }
}
