use chrono::NaiveDate;
use chrono_humanize::HumanTime;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use spark_core::models::{Area, Project, Subtask, Task, TaskPriority, TaskStatus, TimeBlock};
use spark_core::projection::{group_by_agenda_date, Projection};

use crate::util::short_id;

/// "today", "tomorrow", "in 3 days", "2 days ago" style distance.
pub fn relative_day(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        _ => HumanTime::from(date - today).to_string(),
    }
}

fn date_cell(date: Option<NaiveDate>, today: NaiveDate, pending: bool) -> Cell {
    let Some(date) = date else {
        return Cell::new("");
    };
    let cell = Cell::new(format!("{} ({})", date, relative_day(date, today)));
    if !pending {
        cell
    } else if date < today {
        cell.fg(Color::Red)
    } else if date == today {
        cell.fg(Color::Yellow)
    } else {
        cell
    }
}

fn title_cell(task: &Task) -> Cell {
    let mut title = String::new();
    if task.is_recurring {
        title.push('↻');
        title.push(' ');
    }
    title.push_str(&task.title);

    let cell = Cell::new(title);
    match task.status {
        TaskStatus::Completed => cell.add_attribute(Attribute::CrossedOut).fg(Color::DarkGrey),
        TaskStatus::Pending => match task.priority {
            TaskPriority::High => cell.fg(Color::Red).add_attribute(Attribute::Bold),
            TaskPriority::Medium => cell.fg(Color::Yellow),
            TaskPriority::Low => cell.fg(Color::Green),
            TaskPriority::None => cell,
        },
    }
}

fn task_table(tasks: &[&Task], projection: &Projection) -> Table {
    let today = projection.today();
    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Priority", "When", "Due", "Project"]);

    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(task.id)));
        row.add_cell(title_cell(task));
        row.add_cell(Cell::new(match task.priority {
            TaskPriority::None => String::new(),
            priority => priority.to_string(),
        }));
        row.add_cell(date_cell(task.scheduled_date, today, task.is_pending()));
        row.add_cell(date_cell(task.due_date, today, task.is_pending()));

        let home = task
            .project_id
            .and_then(|id| projection.project_name(id))
            .or_else(|| task.area_id.and_then(|id| projection.area_name(id)));
        row.add_cell(Cell::new(home.unwrap_or("")));
        table.add_row(row);
    }
    table
}

pub fn display_tasks(tasks: &[&Task], projection: &Projection) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    println!("{}", task_table(tasks, projection));
}

/// Upcoming tasks, one table per agenda date.
pub fn display_tasks_by_date(tasks: &[&Task], projection: &Projection) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    for (date, group) in group_by_agenda_date(tasks) {
        println!(
            "{} ({})",
            date.format("%A, %B %-d"),
            relative_day(date, projection.today())
        );
        println!("{}", task_table(&group, projection));
    }
}

pub fn display_projects(projects: &[Project], areas: &[Area], today: NaiveDate) {
    if projects.is_empty() {
        println!("No projects found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Name", "Area", "Due", "Notes"]);
    for project in projects {
        let area = project
            .area_id
            .and_then(|id| areas.iter().find(|a| a.id == id))
            .map(|a| a.name.as_str())
            .unwrap_or("");
        table.add_row(vec![
            Cell::new(&project.name),
            Cell::new(area),
            date_cell(project.due_date, today, true),
            Cell::new(project.notes.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
}

pub fn display_areas(areas: &[Area]) {
    if areas.is_empty() {
        println!("No areas found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Name"]);
    for area in areas {
        table.add_row(vec![Cell::new(area.sort_order), Cell::new(&area.name)]);
    }
    println!("{table}");
}

pub fn display_subtasks(subtasks: &[Subtask]) {
    if subtasks.is_empty() {
        println!("No subtasks.");
        return;
    }
    for (index, subtask) in subtasks.iter().enumerate() {
        let mark = if subtask.is_completed { "x" } else { " " };
        println!("  {}. [{}] {}", index + 1, mark, subtask.title);
    }
}

pub fn display_time_blocks(blocks: &[TimeBlock], timezone: chrono_tz::Tz) {
    if blocks.is_empty() {
        println!("No time blocks.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "From", "To", "Title", "Length"]);
    for block in blocks {
        let minutes = block.duration().num_minutes();
        table.add_row(vec![
            Cell::new(short_id(block.id)),
            Cell::new(block.start_at.with_timezone(&timezone).format("%H:%M")),
            Cell::new(block.end_at.with_timezone(&timezone).format("%H:%M")),
            Cell::new(&block.title),
            Cell::new(format!("{}h{:02}m", minutes / 60, minutes % 60)),
        ]);
    }
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "today")]
    #[case(1, "tomorrow")]
    #[case(-1, "yesterday")]
    fn test_relative_day_names(#[case] offset: i64, #[case] expected: &str) {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let date = today + chrono::Duration::days(offset);
        assert_eq!(relative_day(date, today), expected);
    }

    #[test]
    fn test_relative_day_falls_back_to_humanized() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        assert!(relative_day(later, today).contains("3 days"));
    }
}
