use anyhow::Result;
use chrono::NaiveDate;
use spark_core::models::UpdateTaskData;
use spark_core::repository::Repository;

use crate::cli::EditCommand;
use crate::parser::parse_date;
use crate::util::{resolve_area, resolve_project, resolve_task_id};

/// `Some(None)` when the clear flag is set, `Some(Some(v))` for a new value.
fn patch<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

pub async fn edit_task(repo: &impl Repository, command: EditCommand, today: NaiveDate) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;

    let due = command.due.as_deref().map(|d| parse_date(d, today)).transpose()?;
    let when = command.when.as_deref().map(|d| parse_date(d, today)).transpose()?;
    let project_id = match command.project.as_deref() {
        Some(name) => Some(resolve_project(repo, name).await?.id),
        None => None,
    };
    let area_id = match command.area.as_deref() {
        Some(name) => Some(resolve_area(repo, name).await?.id),
        None => None,
    };
    let is_someday = match (command.someday, command.not_someday) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };

    let update_data = UpdateTaskData {
        title: command.title,
        notes: patch(command.notes, command.notes_clear),
        priority: command.priority,
        due_date: patch(due, command.due_clear),
        scheduled_date: patch(when, command.when_clear),
        is_someday,
        project_id: patch(project_id, command.project_clear),
        area_id: patch(area_id, command.area_clear),
    };

    let task = repo.update_task(task_id, update_data).await?;
    println!("Updated task: '{}'", task.title);
    Ok(())
}
