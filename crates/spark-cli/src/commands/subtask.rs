use anyhow::Result;
use spark_core::error::CoreError;
use spark_core::models::Subtask;
use spark_core::repository::Repository;
use uuid::Uuid;

use crate::cli::SubtaskSubcommand;
use crate::util::resolve_task_id;
use crate::views::table::display_subtasks;

/// Looks up the checklist item at 1-based `position`.
async fn subtask_at(repo: &impl Repository, task_id: Uuid, position: usize) -> Result<Subtask> {
    let subtasks = repo.list_subtasks(task_id).await?;
    let count = subtasks.len();
    position
        .checked_sub(1)
        .and_then(|index| subtasks.into_iter().nth(index))
        .ok_or_else(|| {
            CoreError::NotFound(format!(
                "No subtask at position {} (the task has {})",
                position, count
            ))
            .into()
        })
}

pub async fn handle_subtask(repo: &impl Repository, command: SubtaskSubcommand) -> Result<()> {
    match command {
        SubtaskSubcommand::Add { task, title } => {
            let task_id = resolve_task_id(repo, &task).await?;
            let subtask = repo.add_subtask(task_id, title).await?;
            println!("Added subtask: '{}'", subtask.title);
        }
        SubtaskSubcommand::List { task } => {
            let task_id = resolve_task_id(repo, &task).await?;
            display_subtasks(&repo.list_subtasks(task_id).await?);
        }
        SubtaskSubcommand::Done { task, position } => {
            let task_id = resolve_task_id(repo, &task).await?;
            let subtask = subtask_at(repo, task_id, position).await?;
            let subtask = repo.set_subtask_completed(subtask.id, true).await?;
            println!("Checked off: '{}'", subtask.title);
        }
        SubtaskSubcommand::Undo { task, position } => {
            let task_id = resolve_task_id(repo, &task).await?;
            let subtask = subtask_at(repo, task_id, position).await?;
            let subtask = repo.set_subtask_completed(subtask.id, false).await?;
            println!("Unchecked: '{}'", subtask.title);
        }
        SubtaskSubcommand::Rename {
            task,
            position,
            title,
        } => {
            let task_id = resolve_task_id(repo, &task).await?;
            let subtask = subtask_at(repo, task_id, position).await?;
            let renamed = repo.rename_subtask(subtask.id, title).await?;
            println!("Renamed subtask '{}' to '{}'", subtask.title, renamed.title);
        }
        SubtaskSubcommand::Delete { task, position } => {
            let task_id = resolve_task_id(repo, &task).await?;
            let subtask = subtask_at(repo, task_id, position).await?;
            repo.delete_subtask(subtask.id).await?;
            println!("Removed subtask: '{}'", subtask.title);
        }
    }
    Ok(())
}
