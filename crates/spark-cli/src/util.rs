use anyhow::{anyhow, Result};
use spark_core::error::CoreError;
use spark_core::models::{Area, Project};
use spark_core::repository::Repository;
use uuid::Uuid;

/// Number of ID characters shown in tables.
pub const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: Uuid) -> String {
    id.to_string()[..SHORT_ID_LEN].to_string()
}

pub async fn resolve_task_id(repo: &impl Repository, short_id: &str) -> Result<Uuid> {
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    let tasks = repo.find_tasks_by_short_id_prefix(short_id).await?;
    match tasks.as_slice() {
        [task] => Ok(task.id),
        [] => Err(anyhow!(CoreError::NotFound(format!(
            "No task found with ID prefix '{}'",
            short_id
        )))),
        _ => {
            let task_info: Vec<(String, String)> = tasks
                .into_iter()
                .map(|t| (t.id.to_string(), t.title))
                .collect();
            Err(anyhow!(CoreError::AmbiguousId(task_info)))
        }
    }
}

pub async fn resolve_project(repo: &impl Repository, name: &str) -> Result<Project> {
    repo.find_project_by_name(name).await?.ok_or_else(|| {
        anyhow!(CoreError::NotFound(format!(
            "No project named '{}'",
            name
        )))
    })
}

pub async fn resolve_area(repo: &impl Repository, name: &str) -> Result<Area> {
    repo.find_area_by_name(name)
        .await?
        .ok_or_else(|| anyhow!(CoreError::NotFound(format!("No area named '{}'", name))))
}
