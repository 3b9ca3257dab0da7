use std::io::IsTerminal;

use anyhow::Result;
use chrono::NaiveDate;
use spark_core::calendar::CalendarCursor;
use spark_core::date_query::{filter_grid_by_query, resolve_suggestion};

use crate::cli::CalendarCommand;
use crate::parser::parse_month;
use crate::views::calendar::render_month;

pub fn show_calendar(command: CalendarCommand, today: NaiveDate) -> Result<()> {
    let cursor = match command.month {
        Some(month) => {
            let (year, month0) = parse_month(&month)?;
            CalendarCursor::try_new(year, month0)?
        }
        None => CalendarCursor::containing(today),
    };
    let query = command.query.unwrap_or_default();
    let cells = filter_grid_by_query(&cursor.grid(), &query, today);

    let styled = std::io::stdout().is_terminal();
    print!("{}", render_month(&cursor.label(), &cells, today, styled));

    if let Some((label, date)) = resolve_suggestion(&query, today) {
        println!("\nSuggestion: {} ({})", label, date);
    }
    Ok(())
}
