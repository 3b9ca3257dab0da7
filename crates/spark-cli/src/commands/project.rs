use anyhow::Result;
use chrono::NaiveDate;
use spark_core::models::{NewProjectData, UpdateProjectData};
use spark_core::repository::Repository;

use crate::cli::{AddProjectCommand, EditProjectCommand, ProjectSubcommand};
use crate::parser::parse_date;
use crate::util::{resolve_area, resolve_project};
use crate::views::table::display_projects;

pub async fn handle_project(
    repo: &impl Repository,
    command: ProjectSubcommand,
    today: NaiveDate,
) -> Result<()> {
    match command {
        ProjectSubcommand::Add(command) => add_project(repo, command, today).await,
        ProjectSubcommand::List => {
            let projects = repo.list_projects().await?;
            let areas = repo.list_areas().await?;
            display_projects(&projects, &areas, today);
            Ok(())
        }
        ProjectSubcommand::Edit(command) => edit_project(repo, command, today).await,
        ProjectSubcommand::Archive { name } => {
            let project = resolve_project(repo, &name).await?;
            repo.archive_project(project.id).await?;
            println!("Archived project: '{}'", project.name);
            Ok(())
        }
    }
}

async fn add_project(repo: &impl Repository, command: AddProjectCommand, today: NaiveDate) -> Result<()> {
    let due_date = command.due.as_deref().map(|d| parse_date(d, today)).transpose()?;
    let area_id = match command.area.as_deref() {
        Some(name) => Some(resolve_area(repo, name).await?.id),
        None => None,
    };

    let project = repo
        .add_project(NewProjectData {
            name: command.name,
            notes: command.notes,
            area_id,
            due_date,
        })
        .await?;
    println!("Created project: '{}'", project.name);
    Ok(())
}

async fn edit_project(repo: &impl Repository, command: EditProjectCommand, today: NaiveDate) -> Result<()> {
    let project = resolve_project(repo, &command.name).await?;

    let due_date = if command.due_clear {
        Some(None)
    } else {
        command
            .due
            .as_deref()
            .map(|d| parse_date(d, today))
            .transpose()?
            .map(Some)
    };
    let area_id = if command.area_clear {
        Some(None)
    } else {
        match command.area.as_deref() {
            Some(name) => Some(Some(resolve_area(repo, name).await?.id)),
            None => None,
        }
    };
    let notes = if command.notes_clear {
        Some(None)
    } else {
        command.notes.map(Some)
    };

    let project = repo
        .update_project(
            project.id,
            UpdateProjectData {
                name: command.rename,
                notes,
                area_id,
                due_date,
            },
        )
        .await?;
    println!("Updated project: '{}'", project.name);
    Ok(())
}
