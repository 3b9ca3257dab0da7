use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use spark_core::error::CoreError;
use spark_core::repository::Repository;

use crate::cli::TaskIdCommand;
use crate::util::resolve_task_id;
use crate::views::table::{display_subtasks, relative_day};

pub async fn show_task(repo: &impl Repository, command: TaskIdCommand, today: NaiveDate) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let task = repo
        .find_task_by_id(task_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Task {} not found", task_id)))?;

    println!("{}", task.title.bold());
    println!("  ID:       {}", task.id);
    println!("  Status:   {}", task.status);
    println!("  Priority: {}", task.priority);
    if let Some(when) = task.scheduled_date {
        println!("  When:     {} ({})", when, relative_day(when, today));
    } else if task.is_someday {
        println!("  When:     someday");
    }
    if let Some(due) = task.due_date {
        let overdue = if task.is_overdue(today) { " overdue" } else { "" };
        println!("  Due:      {} ({}){}", due, relative_day(due, today), overdue.red());
    }
    if let Some(project) = task.project_id {
        if let Some(project) = repo.find_project_by_id(project).await? {
            println!("  Project:  {}", project.name);
        }
    }
    if let Some(area) = task.area_id {
        if let Some(area) = repo.find_area_by_id(area).await? {
            println!("  Area:     {}", area.name);
        }
    }
    if let Some(recurrence) = repo.find_recurrence_for_task(task.id).await? {
        println!("  Repeats:  {}", recurrence.rule.describe());
    }
    if let Some(notes) = task.notes.as_deref() {
        println!("\n{}", notes);
    }

    let subtasks = repo.list_subtasks(task.id).await?;
    if !subtasks.is_empty() {
        println!();
        display_subtasks(&subtasks);
    }
    Ok(())
}
