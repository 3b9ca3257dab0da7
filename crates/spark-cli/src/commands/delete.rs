use anyhow::Result;
use dialoguer::Confirm;
use spark_core::error::CoreError;
use spark_core::repository::Repository;

use crate::cli::DeleteCommand;
use crate::util::resolve_task_id;

pub async fn delete_task(repo: &impl Repository, command: DeleteCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let task = repo
        .find_task_by_id(task_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Task with ID '{}' not found.", task_id)))?;

    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt(format!(
                "Are you sure you want to delete task '{}'?",
                task.title
            ))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    repo.delete_task(task_id).await?;
    println!("Deleted task: '{}'", task.title);
    Ok(())
}
