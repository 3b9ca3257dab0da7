use anyhow::Result;
use chrono::NaiveDate;
use spark_core::picker::DatePicker;

use crate::cli::SuggestCommand;

pub fn suggest_date(command: SuggestCommand, today: NaiveDate) -> Result<()> {
    let mut picker = DatePicker::open(today, None);
    picker.set_query(command.query.trim());

    let label = picker.suggestion();
    match picker.accept_suggestion(today) {
        Some(date) => println!("{} → {}", label, date.format("%A, %Y-%m-%d")),
        None => println!("No suggestion for '{}'", command.query.trim()),
    }
    Ok(())
}
