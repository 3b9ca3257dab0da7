use chrono::{Datelike, NaiveDate};
use owo_colors::OwoColorize;
use spark_core::calendar::{weeks, CalendarCell, DAYS_PER_WEEK};

const HEADER: &str = "Su Mo Tu We Th Fr Sa";
const CELL_WIDTH: usize = 2;

/// Renders a month grid as text, one week per line.
///
/// With `styled` set, today is highlighted and dimmed cells are drawn faint.
/// Without it dimmed cells are replaced by dots so the output stays readable
/// when piped.
pub fn render_month(label: &str, cells: &[CalendarCell], today: NaiveDate, styled: bool) -> String {
    let width = DAYS_PER_WEEK * (CELL_WIDTH + 1) - 1;
    let mut out = format!("{:^width$}\n{}\n", label, HEADER, width = width);

    for week in weeks(cells) {
        let line: Vec<String> = week
            .iter()
            .map(|cell| render_cell(cell, today, styled))
            .collect();
        out.push_str(line.join(" ").trim_end());
        out.push('\n');
    }
    out
}

fn render_cell(cell: &CalendarCell, today: NaiveDate, styled: bool) -> String {
    match *cell {
        CalendarCell::Blank => " ".repeat(CELL_WIDTH),
        CalendarCell::Date(date) => {
            let text = format!("{:>2}", date.day());
            if styled && date == today {
                text.reversed().to_string()
            } else if styled {
                text.bold().to_string()
            } else {
                text
            }
        }
        CalendarCell::Dimmed(date) => {
            if styled {
                format!("{:>2}", date.day()).dimmed().to_string()
            } else {
                format!("{:>2}", "·")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_core::calendar::generate_month_grid;
    use spark_core::date_query::filter_grid_by_query;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn test_plain_month_layout() {
        let grid = generate_month_grid(2024, 2);
        let text = render_month("March 2024", &grid, today(), false);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0].trim(), "March 2024");
        assert_eq!(lines[1], HEADER);
        // March 1st 2024 is a Friday.
        assert_eq!(lines[2], "                1  2");
        assert_eq!(lines.last().copied(), Some("31"));
        assert_eq!(lines.len(), 2 + 6);
    }

    #[test]
    fn test_plain_dims_unmatched_dates() {
        let grid = filter_grid_by_query(&generate_month_grid(2024, 2), "fri", today());
        let text = render_month("March 2024", &grid, today(), false);
        let fridays: Vec<String> = text
            .lines()
            .skip(2)
            .filter_map(|line| line.split_whitespace().find(|t| *t != "·").map(String::from))
            .collect();
        assert_eq!(fridays, vec!["1", "8", "15", "22", "29"]);
    }
}
