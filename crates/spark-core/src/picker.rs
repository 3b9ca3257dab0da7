use chrono::NaiveDate;

use crate::calendar::{CalendarCell, CalendarCursor};
use crate::date_query::{filter_grid_by_query, resolve_suggestion, suggest_label};

/// State of one date field: the displayed month, the typed query and the
/// chosen date. Every field (due date, scheduled date, project due date,
/// quick entry) owns its own picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePicker {
    cursor: CalendarCursor,
    query: String,
    selected: Option<NaiveDate>,
}

impl DatePicker {
    /// Opens a picker on the selected date's month, or on today's month when
    /// the field is empty.
    pub fn open(today: NaiveDate, selected: Option<NaiveDate>) -> Self {
        Self {
            cursor: CalendarCursor::containing(selected.unwrap_or(today)),
            query: String::new(),
            selected,
        }
    }

    pub fn cursor(&self) -> CalendarCursor {
        self.cursor
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    pub fn previous_month(&mut self) {
        self.cursor = self.cursor.previous();
    }

    pub fn next_month(&mut self) {
        self.cursor = self.cursor.next();
    }

    /// Updates the typed query. Typing only applies while no date is chosen.
    pub fn set_query(&mut self, query: impl Into<String>) {
        if self.selected.is_none() {
            self.query = query.into();
        }
    }

    /// The current month's cells with non-matching dates dimmed.
    pub fn cells(&self, today: NaiveDate) -> Vec<CalendarCell> {
        filter_grid_by_query(&self.cursor.grid(), &self.query, today)
    }

    pub fn suggestion(&self) -> String {
        suggest_label(&self.query)
    }

    pub fn pick(&mut self, date: NaiveDate) {
        self.selected = Some(date);
        self.query.clear();
    }

    /// Picks the date behind the current suggestion, if there is one.
    pub fn accept_suggestion(&mut self, today: NaiveDate) -> Option<NaiveDate> {
        let (_, date) = resolve_suggestion(&self.query, today)?;
        self.pick(date);
        self.cursor = CalendarCursor::containing(date);
        Some(date)
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.query.clear();
    }
}
