use anyhow::Result;
use chrono::NaiveDate;
use spark_core::projection::{Projection, View};
use spark_core::repository::Repository;

use crate::cli::ListCommand;
use crate::config::Config;
use crate::query_parser;
use crate::util::{resolve_area, resolve_project};
use crate::views::table::{display_tasks, display_tasks_by_date};

pub async fn list_tasks(
    repo: &impl Repository,
    command: ListCommand,
    config: &Config,
    today: NaiveDate,
) -> Result<()> {
    let query_str = if command.query.trim().is_empty() && !config.default_filters.is_empty() {
        config.default_filters.join(" and ")
    } else {
        command.query
    };
    let query = query_parser::parse_query(&query_str)?;

    let tasks = repo.list_tasks().await?;
    let projection = Projection::new(today, repo.list_projects().await?, repo.list_areas().await?);

    if let Some(name) = command.project.as_deref() {
        let project = resolve_project(repo, name).await?;
        let selected = projection.filter(projection.in_project(&tasks, project.id), query.as_ref());
        println!("Project: {}", project.name);
        display_tasks(&selected, &projection);
        return Ok(());
    }
    if let Some(name) = command.area.as_deref() {
        let area = resolve_area(repo, name).await?;
        let selected = projection.filter(projection.in_area(&tasks, area.id), query.as_ref());
        println!("Area: {}", area.name);
        display_tasks(&selected, &projection);
        return Ok(());
    }

    let view = command.view.unwrap_or(config.default_view);
    let selected = projection.filter(projection.view(&tasks, view), query.as_ref());
    tracing::debug!(%view, count = selected.len(), "listing view");
    match view {
        View::Upcoming => display_tasks_by_date(&selected, &projection),
        _ => display_tasks(&selected, &projection),
    }
    Ok(())
}
