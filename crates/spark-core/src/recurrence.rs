use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rrule::RRuleSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::date_query::WEEKDAY_NAMES;
use crate::error::CoreError;

const WEEKDAY_ABBREVIATIONS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const RRULE_DAY_CODES: [&str; 7] = ["SU", "MO", "TU", "WE", "TH", "FR", "SA"];

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrencePattern::Daily => write!(f, "daily"),
            RecurrencePattern::Weekly => write!(f, "weekly"),
            RecurrencePattern::Monthly => write!(f, "monthly"),
            RecurrencePattern::Custom => write!(f, "custom"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid recurrence pattern: {0}")]
pub struct ParseRecurrencePatternError(String);

impl FromStr for RecurrencePattern {
    type Err = ParseRecurrencePatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(RecurrencePattern::Daily),
            "weekly" => Ok(RecurrencePattern::Weekly),
            "monthly" => Ok(RecurrencePattern::Monthly),
            "custom" => Ok(RecurrencePattern::Custom),
            _ => Err(ParseRecurrencePatternError(s.to_string())),
        }
    }
}

/// When a recurring task stops repeating. Exactly one condition is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RecurrenceEnd {
    #[default]
    Never,
    OnDate(NaiveDate),
    AfterOccurrences(u32),
}

impl RecurrenceEnd {
    /// Rebuilds the end condition from its two nullable storage columns.
    pub fn from_columns(
        end_date: Option<NaiveDate>,
        occurrence_count: Option<i64>,
    ) -> Result<Self, CoreError> {
        match (end_date, occurrence_count) {
            (None, None) => Ok(RecurrenceEnd::Never),
            (Some(date), None) => Ok(RecurrenceEnd::OnDate(date)),
            (None, Some(count)) => u32::try_from(count)
                .ok()
                .filter(|count| *count > 0)
                .map(RecurrenceEnd::AfterOccurrences)
                .ok_or_else(|| {
                    CoreError::InvalidInput(format!("Invalid occurrence count: {}", count))
                }),
            (Some(_), Some(_)) => Err(CoreError::InvalidInput(
                "A recurrence rule cannot end both on a date and after a number of occurrences"
                    .to_string(),
            )),
        }
    }
}

/// A repeat rule attached to a task.
///
/// Fields are private so that the edit operations keep the rule consistent:
/// the interval is at least 1, weekdays are unique and ascending, and only one
/// end condition can be set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pattern: RecurrencePattern,
    interval: u32,
    days_of_week: Vec<u8>,
    end: RecurrenceEnd,
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self {
            pattern: RecurrencePattern::Daily,
            interval: 1,
            days_of_week: Vec::new(),
            end: RecurrenceEnd::Never,
        }
    }
}

impl RecurrenceRule {
    pub fn new(pattern: RecurrencePattern) -> Self {
        Self {
            pattern,
            ..Default::default()
        }
    }

    /// Builds a rule from raw parts, validating each one.
    pub fn from_parts(
        pattern: RecurrencePattern,
        interval: u32,
        days_of_week: impl IntoIterator<Item = u8>,
        end: RecurrenceEnd,
    ) -> Result<Self, CoreError> {
        let mut rule = Self::new(pattern);
        rule.set_interval(interval)?;
        for day in days_of_week {
            validate_weekday(day)?;
            if let Err(pos) = rule.days_of_week.binary_search(&day) {
                rule.days_of_week.insert(pos, day);
            }
        }
        match end {
            RecurrenceEnd::Never => rule.set_end_never(),
            RecurrenceEnd::OnDate(date) => rule.set_end_date(date),
            RecurrenceEnd::AfterOccurrences(n) => rule.set_end_occurrences(n)?,
        }
        Ok(rule)
    }

    pub fn pattern(&self) -> RecurrencePattern {
        self.pattern
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Selected weekday indices (0 = Sunday), ascending.
    pub fn days_of_week(&self) -> &[u8] {
        &self.days_of_week
    }

    /// The weekday selection if it applies to this rule's pattern. Weekdays
    /// are only meaningful for weekly rules; other patterns keep the selection
    /// around so switching back to weekly restores it.
    pub fn effective_days_of_week(&self) -> Option<&[u8]> {
        match self.pattern {
            RecurrencePattern::Weekly => Some(&self.days_of_week),
            _ => None,
        }
    }

    pub fn end(&self) -> RecurrenceEnd {
        self.end
    }

    pub fn ends_never(&self) -> bool {
        self.end == RecurrenceEnd::Never
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        match self.end {
            RecurrenceEnd::OnDate(date) => Some(date),
            _ => None,
        }
    }

    pub fn occurrence_count(&self) -> Option<u32> {
        match self.end {
            RecurrenceEnd::AfterOccurrences(n) => Some(n),
            _ => None,
        }
    }

    pub fn set_pattern(&mut self, pattern: RecurrencePattern) {
        self.pattern = pattern;
    }

    pub fn set_interval(&mut self, interval: u32) -> Result<(), CoreError> {
        if interval == 0 {
            return Err(CoreError::InvalidInput(
                "Recurrence interval must be at least 1".to_string(),
            ));
        }
        self.interval = interval;
        Ok(())
    }

    /// Removes `day` from the selection if present, otherwise inserts it in
    /// ascending position.
    pub fn toggle_weekday(&mut self, day: u8) -> Result<(), CoreError> {
        validate_weekday(day)?;
        match self.days_of_week.binary_search(&day) {
            Ok(pos) => {
                self.days_of_week.remove(pos);
            }
            Err(pos) => self.days_of_week.insert(pos, day),
        }
        Ok(())
    }

    pub fn set_end_never(&mut self) {
        self.end = RecurrenceEnd::Never;
    }

    pub fn set_end_date(&mut self, date: NaiveDate) {
        self.end = RecurrenceEnd::OnDate(date);
    }

    pub fn set_end_occurrences(&mut self, count: u32) -> Result<(), CoreError> {
        if count == 0 {
            return Err(CoreError::InvalidInput(
                "Occurrence count must be at least 1".to_string(),
            ));
        }
        self.end = RecurrenceEnd::AfterOccurrences(count);
        Ok(())
    }

    /// Human-readable summary, e.g. "Every 2 weeks on Mon, Wed, until 2024-12-31".
    pub fn describe(&self) -> String {
        let unit = match self.pattern {
            RecurrencePattern::Daily | RecurrencePattern::Custom => "day",
            RecurrencePattern::Weekly => "week",
            RecurrencePattern::Monthly => "month",
        };
        let mut text = if self.interval == 1 {
            format!("Every {}", unit)
        } else {
            format!("Every {} {}s", self.interval, unit)
        };
        if self.pattern == RecurrencePattern::Custom {
            text = format!("Custom ({})", text.to_lowercase());
        }

        if let Some(days) = self.effective_days_of_week().filter(|d| !d.is_empty()) {
            let names: Vec<&str> = days
                .iter()
                .map(|d| WEEKDAY_ABBREVIATIONS[usize::from(*d)])
                .collect();
            text.push_str(" on ");
            text.push_str(&names.join(", "));
        }

        match self.end {
            RecurrenceEnd::Never => {}
            RecurrenceEnd::OnDate(date) => {
                text.push_str(&format!(", until {}", date.format("%Y-%m-%d")))
            }
            RecurrenceEnd::AfterOccurrences(1) => text.push_str(", once"),
            RecurrenceEnd::AfterOccurrences(n) => text.push_str(&format!(", {} times", n)),
        }
        text
    }

    /// The RFC 5545 RRULE equivalent of this rule. Custom rules have none.
    pub fn to_rrule(&self) -> Option<String> {
        let freq = match self.pattern {
            RecurrencePattern::Daily => "DAILY",
            RecurrencePattern::Weekly => "WEEKLY",
            RecurrencePattern::Monthly => "MONTHLY",
            RecurrencePattern::Custom => return None,
        };

        let mut rrule = format!("FREQ={};INTERVAL={}", freq, self.interval);
        if let Some(days) = self.effective_days_of_week().filter(|d| !d.is_empty()) {
            let codes: Vec<&str> = days
                .iter()
                .map(|d| RRULE_DAY_CODES[usize::from(*d)])
                .collect();
            rrule.push_str(";BYDAY=");
            rrule.push_str(&codes.join(","));
        }
        match self.end {
            RecurrenceEnd::Never => {}
            RecurrenceEnd::OnDate(date) => {
                rrule.push_str(&format!(";UNTIL={}T235959Z", date.format("%Y%m%d")))
            }
            RecurrenceEnd::AfterOccurrences(n) => rrule.push_str(&format!(";COUNT={}", n)),
        }
        Some(rrule)
    }
}

/// Checks that `rrule` parses as a recurrence starting at `dtstart`.
pub fn validate_rrule(rrule: &str, dtstart: NaiveDate) -> Result<(), CoreError> {
    let rrule_string = format!("DTSTART:{}T000000Z\nRRULE:{}", dtstart.format("%Y%m%d"), rrule);
    rrule_string
        .parse::<RRuleSet>()
        .map(|_| ())
        .map_err(|e| CoreError::InvalidRRule(format!("Failed to parse RRULE '{}': {}", rrule, e)))
}

/// Resolves a weekday name or prefix of at least two letters ("mo", "thu",
/// "saturday") to its index, 0 = Sunday.
pub fn parse_weekday(name: &str) -> Option<u8> {
    let name = name.trim().to_lowercase();
    if name.len() < 2 {
        return None;
    }
    WEEKDAY_NAMES
        .iter()
        .position(|day| day.starts_with(&name))
        .and_then(|index| u8::try_from(index).ok())
}

fn validate_weekday(day: u8) -> Result<(), CoreError> {
    if day > 6 {
        return Err(CoreError::InvalidInput(format!(
            "Weekday index {} is out of range (expected 0-6)",
            day
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_rule() {
        let rule = RecurrenceRule::default();
        assert_eq!(rule.pattern(), RecurrencePattern::Daily);
        assert_eq!(rule.interval(), 1);
        assert!(rule.days_of_week().is_empty());
        assert!(rule.ends_never());
    }

    #[test]
    fn test_toggle_weekday_twice_is_identity() {
        let mut rule = RecurrenceRule::new(RecurrencePattern::Weekly);
        rule.toggle_weekday(3).unwrap();
        assert_eq!(rule.days_of_week(), &[3]);
        rule.toggle_weekday(3).unwrap();
        assert!(rule.days_of_week().is_empty());
    }

    #[test]
    fn test_toggle_weekday_keeps_ascending_order() {
        let mut rule = RecurrenceRule::new(RecurrencePattern::Weekly);
        for day in [5, 1, 3, 0] {
            rule.toggle_weekday(day).unwrap();
        }
        assert_eq!(rule.days_of_week(), &[0, 1, 3, 5]);
        rule.toggle_weekday(1).unwrap();
        assert_eq!(rule.days_of_week(), &[0, 3, 5]);
    }

    #[test]
    fn test_toggle_weekday_rejects_out_of_range() {
        let mut rule = RecurrenceRule::default();
        assert!(matches!(rule.toggle_weekday(7), Err(CoreError::InvalidInput(_))));
        assert!(rule.days_of_week().is_empty());
    }

    #[test]
    fn test_end_conditions_are_exclusive() {
        let mut rule = RecurrenceRule::default();
        rule.set_end_date(date(2024, 12, 31));
        assert_eq!(rule.end_date(), Some(date(2024, 12, 31)));
        assert_eq!(rule.occurrence_count(), None);

        rule.set_end_occurrences(5).unwrap();
        assert_eq!(rule.end_date(), None);
        assert_eq!(rule.occurrence_count(), Some(5));

        rule.set_end_never();
        assert!(rule.ends_never());
        assert_eq!(rule.end_date(), None);
        assert_eq!(rule.occurrence_count(), None);
    }

    #[test]
    fn test_invalid_edits_leave_rule_untouched() {
        let mut rule = RecurrenceRule::default();
        rule.set_end_date(date(2024, 6, 1));
        assert!(rule.set_interval(0).is_err());
        assert!(rule.set_end_occurrences(0).is_err());
        assert_eq!(rule.interval(), 1);
        assert_eq!(rule.end_date(), Some(date(2024, 6, 1)));
    }

    #[test]
    fn test_weekdays_only_apply_to_weekly() {
        let mut rule = RecurrenceRule::new(RecurrencePattern::Weekly);
        rule.toggle_weekday(1).unwrap();
        assert_eq!(rule.effective_days_of_week(), Some(&[1u8][..]));

        rule.set_pattern(RecurrencePattern::Monthly);
        assert_eq!(rule.effective_days_of_week(), None);
        assert_eq!(rule.days_of_week(), &[1]);
    }

    #[test]
    fn test_from_parts_normalises_days() {
        let rule = RecurrenceRule::from_parts(
            RecurrencePattern::Weekly,
            2,
            [5, 1, 5, 3],
            RecurrenceEnd::AfterOccurrences(4),
        )
        .unwrap();
        assert_eq!(rule.days_of_week(), &[1, 3, 5]);
        assert_eq!(rule.interval(), 2);
        assert_eq!(rule.occurrence_count(), Some(4));

        assert!(RecurrenceRule::from_parts(RecurrencePattern::Weekly, 1, [9], RecurrenceEnd::Never)
            .is_err());
    }

    #[test]
    fn test_end_from_columns() {
        assert_eq!(RecurrenceEnd::from_columns(None, None).unwrap(), RecurrenceEnd::Never);
        assert_eq!(
            RecurrenceEnd::from_columns(None, Some(3)).unwrap(),
            RecurrenceEnd::AfterOccurrences(3)
        );
        assert!(RecurrenceEnd::from_columns(Some(date(2024, 1, 1)), Some(3)).is_err());
        assert!(RecurrenceEnd::from_columns(None, Some(0)).is_err());
    }

    #[rstest]
    #[case(RecurrenceRule::default(), "Every day")]
    #[case(
        RecurrenceRule::from_parts(RecurrencePattern::Weekly, 2, [1, 3], RecurrenceEnd::OnDate(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())).unwrap(),
        "Every 2 weeks on Mon, Wed, until 2024-12-31"
    )]
    #[case(
        RecurrenceRule::from_parts(RecurrencePattern::Monthly, 1, [], RecurrenceEnd::AfterOccurrences(6)).unwrap(),
        "Every month, 6 times"
    )]
    #[case(
        RecurrenceRule::from_parts(RecurrencePattern::Custom, 3, [], RecurrenceEnd::Never).unwrap(),
        "Custom (every 3 days)"
    )]
    fn test_describe(#[case] rule: RecurrenceRule, #[case] expected: &str) {
        assert_eq!(rule.describe(), expected);
    }

    #[test]
    fn test_to_rrule_round_trips_through_parser() {
        let rule = RecurrenceRule::from_parts(
            RecurrencePattern::Weekly,
            1,
            [1, 5],
            RecurrenceEnd::OnDate(date(2024, 12, 31)),
        )
        .unwrap();
        let rrule = rule.to_rrule().unwrap();
        assert_eq!(rrule, "FREQ=WEEKLY;INTERVAL=1;BYDAY=MO,FR;UNTIL=20241231T235959Z");
        assert!(validate_rrule(&rrule, date(2024, 1, 1)).is_ok());

        let counted = RecurrenceRule::from_parts(
            RecurrencePattern::Daily,
            2,
            [],
            RecurrenceEnd::AfterOccurrences(10),
        )
        .unwrap();
        assert_eq!(counted.to_rrule().unwrap(), "FREQ=DAILY;INTERVAL=2;COUNT=10");

        assert_eq!(RecurrenceRule::new(RecurrencePattern::Custom).to_rrule(), None);
    }

    #[test]
    fn test_validate_rrule_rejects_garbage() {
        assert!(validate_rrule("FREQ=SOMETIMES", date(2024, 1, 1)).is_err());
    }

    #[rstest]
    #[case("mo", Some(1))]
    #[case("Thu", Some(4))]
    #[case("saturday", Some(6))]
    #[case("su", Some(0))]
    #[case("s", None)]
    #[case("funday", None)]
    fn test_parse_weekday(#[case] input: &str, #[case] expected: Option<u8>) {
        assert_eq!(parse_weekday(input), expected);
    }

    #[test]
    fn test_pattern_from_str() {
        assert_eq!("Weekly".parse::<RecurrencePattern>(), Ok(RecurrencePattern::Weekly));
        assert!("yearly".parse::<RecurrencePattern>().is_err());
    }
}
