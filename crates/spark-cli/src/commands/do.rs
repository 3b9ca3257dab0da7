use anyhow::Result;
use spark_core::repository::Repository;

use crate::cli::TaskIdCommand;
use crate::util::resolve_task_id;

pub async fn do_task(repo: &impl Repository, command: TaskIdCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let task = repo.complete_task(task_id).await?;
    println!("Completed task: '{}'", task.title);
    // Completing a repeating task does not schedule its next occurrence.
    if task.is_recurring {
        println!("This task repeats; its next occurrence is not created automatically.");
    }
    Ok(())
}

pub async fn undo_task(repo: &impl Repository, command: TaskIdCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let task = repo.reopen_task(task_id).await?;
    println!("Reopened task: '{}'", task.title);
    Ok(())
}
