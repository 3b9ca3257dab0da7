//! Month grids for date pickers.
//!
//! A grid is a Sunday-first, seven-column layout of one month: a run of
//! [`CalendarCell::Blank`] padding cells (one per weekday before the 1st)
//! followed by one [`CalendarCell::Date`] per day. There is no trailing padding;
//! renderers simply draw a shorter last row.

use chrono::{Datelike, Months, NaiveDate};

use crate::error::CoreError;

/// Number of columns in a rendered month grid.
pub const DAYS_PER_WEEK: usize = 7;

/// A single position in a month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarCell {
    /// Padding before the first day of the month.
    Blank,
    /// A day of the displayed month.
    Date(NaiveDate),
    /// A day that did not match the active date query. It keeps its grid
    /// position so columns stay aligned.
    Dimmed(NaiveDate),
}

impl CalendarCell {
    #[inline]
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            CalendarCell::Blank => None,
            CalendarCell::Date(date) | CalendarCell::Dimmed(date) => Some(*date),
        }
    }

    #[inline]
    pub fn is_blank(&self) -> bool {
        matches!(self, CalendarCell::Blank)
    }

    #[inline]
    pub fn is_dimmed(&self) -> bool {
        matches!(self, CalendarCell::Dimmed(_))
    }
}

/// The month currently displayed by a date picker.
///
/// The cursor stores the first day of its month, so it can never denote an
/// invalid `(year, month)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarCursor {
    first: NaiveDate,
}

impl CalendarCursor {
    /// Creates a cursor for a 0-based `month` (0 = January).
    ///
    /// # Panics
    /// Panics if `month` is outside `0..=11` or `year` is outside the range
    /// chrono can represent. Use [`CalendarCursor::try_new`] for untrusted input.
    pub fn new(year: i32, month: u32) -> Self {
        match Self::try_new(year, month) {
            Ok(cursor) => cursor,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_new(year: i32, month: u32) -> Result<Self, CoreError> {
        if month > 11 {
            return Err(CoreError::InvalidInput(format!(
                "Month index {} is out of range (expected 0-11)",
                month
            )));
        }
        NaiveDate::from_ymd_opt(year, month + 1, 1)
            .map(|first| Self { first })
            .ok_or_else(|| CoreError::InvalidInput(format!("Year {} is out of range", year)))
    }

    /// The cursor for the month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date - chrono::Days::new(u64::from(date.day0())),
        }
    }

    #[inline]
    pub fn year(&self) -> i32 {
        self.first.year()
    }

    /// 0-based month index.
    #[inline]
    pub fn month(&self) -> u32 {
        self.first.month0()
    }

    #[inline]
    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// The previous month, rolling back into December of the prior year.
    /// Stays put at the earliest representable month.
    pub fn previous(self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| Self { first })
            .unwrap_or(self)
    }

    /// The next month, rolling over into January of the following year.
    /// Stays put at the latest representable month.
    pub fn next(self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
            .unwrap_or(self)
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    /// Weekday index of the 1st (0 = Sunday), which is also the number of
    /// blank cells that lead the grid.
    pub fn leading_blanks(&self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month0() == self.month()
    }

    /// Header text such as "March 2024".
    pub fn label(&self) -> String {
        self.first.format("%B %Y").to_string()
    }

    /// Builds the month grid for this cursor.
    pub fn grid(&self) -> Vec<CalendarCell> {
        let blanks = self.leading_blanks() as usize;
        let days = self.days_in_month() as usize;

        let mut cells = Vec::with_capacity(blanks + days);
        cells.extend(std::iter::repeat(CalendarCell::Blank).take(blanks));
        cells.extend(self.first.iter_days().take(days).map(CalendarCell::Date));
        cells
    }
}

/// Builds the month grid for a 0-based `month` of `year`.
///
/// # Panics
/// Panics if `month` is outside `0..=11`; month arithmetic belongs to
/// [`CalendarCursor::previous`] and [`CalendarCursor::next`].
pub fn generate_month_grid(year: i32, month: u32) -> Vec<CalendarCell> {
    CalendarCursor::new(year, month).grid()
}

/// Splits a grid into rows of seven cells. The final row may be shorter.
pub fn weeks(cells: &[CalendarCell]) -> std::slice::Chunks<'_, CalendarCell> {
    cells.chunks(DAYS_PER_WEEK)
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Days in a 0-based `month` of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        0 | 2 | 4 | 6 | 7 | 9 | 11 => 31,
        3 | 5 | 8 | 10 => 30,
        1 if is_leap_year(year) => 29,
        1 => 28,
        _ => panic!("Month index {month} is out of range (expected 0-11)"),
    }
}
