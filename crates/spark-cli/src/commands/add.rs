use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::{OwoColorize, Style};
use spark_core::models::NewTaskData;
use spark_core::repository::Repository;

use crate::cli::AddCommand;
use crate::parser::parse_date;
use crate::util::{resolve_area, resolve_project, short_id};

pub async fn add_task(repo: &impl Repository, command: AddCommand, today: NaiveDate) -> Result<()> {
    let due_date = command.due.as_deref().map(|d| parse_date(d, today)).transpose()?;
    let scheduled_date = command.when.as_deref().map(|d| parse_date(d, today)).transpose()?;

    let project_id = match command.project.as_deref() {
        Some(name) => Some(resolve_project(repo, name).await?.id),
        None => None,
    };
    let area_id = match command.area.as_deref() {
        Some(name) => Some(resolve_area(repo, name).await?.id),
        None => None,
    };

    let task = repo
        .add_task(NewTaskData {
            title: command.title,
            notes: command.notes,
            priority: command.priority,
            due_date,
            scheduled_date,
            is_someday: command.someday,
            project_id,
            area_id,
        })
        .await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();
    println!(
        "{} Created task: {}",
        "✓".style(success_style),
        task.title.bright_white().bold()
    );
    println!("  {} Task ID: {}", "→".style(info_style), short_id(task.id).yellow());
    if let Some(when) = task.scheduled_date {
        println!("  {} When: {}", "→".style(info_style), when.to_string().cyan());
    }
    if let Some(due) = task.due_date {
        println!("  {} Due: {}", "→".style(info_style), due.to_string().cyan());
    }
    Ok(())
}
