use anyhow::Result;
use chrono::NaiveDate;
use spark_core::error::CoreError;
use spark_core::models::NewTimeBlockData;
use spark_core::repository::Repository;
use spark_core::timezone::{local_to_utc, parse_timezone};

use crate::cli::{AddBlockCommand, BlockSubcommand};
use crate::parser::{parse_date, parse_time};
use crate::util::{resolve_task_id, short_id};
use crate::views::table::display_time_blocks;

fn day_of(date: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    Ok(date.map(|d| parse_date(d, today)).transpose()?.unwrap_or(today))
}

pub async fn handle_block(
    repo: &impl Repository,
    command: BlockSubcommand,
    timezone: &str,
    today: NaiveDate,
) -> Result<()> {
    match command {
        BlockSubcommand::Add(command) => add_block(repo, command, timezone, today).await,
        BlockSubcommand::List { date } => {
            let day = day_of(date.as_deref(), today)?;
            let blocks = repo.list_time_blocks_for_day(day, timezone).await?;
            println!("{}", day.format("%A, %B %-d %Y"));
            display_time_blocks(&blocks, parse_timezone(timezone)?);
            Ok(())
        }
        BlockSubcommand::Delete { id, date } => {
            let day = day_of(date.as_deref(), today)?;
            let blocks = repo.list_time_blocks_for_day(day, timezone).await?;
            let prefix = id.to_lowercase();
            let matches: Vec<_> = blocks
                .iter()
                .filter(|b| b.id.to_string().starts_with(&prefix))
                .collect();
            match matches.as_slice() {
                [block] => {
                    repo.delete_time_block(block.id).await?;
                    println!("Removed time block: '{}'", block.title);
                    Ok(())
                }
                [] => Err(CoreError::NotFound(format!(
                    "No time block with ID prefix '{}' on {}",
                    id, day
                ))
                .into()),
                _ => Err(CoreError::AmbiguousId(
                    matches
                        .iter()
                        .map(|b| (b.id.to_string(), b.title.clone()))
                        .collect(),
                )
                .into()),
            }
        }
    }
}

async fn add_block(
    repo: &impl Repository,
    command: AddBlockCommand,
    timezone: &str,
    today: NaiveDate,
) -> Result<()> {
    let day = day_of(command.date.as_deref(), today)?;
    let start_at = local_to_utc(day.and_time(parse_time(&command.from)?), timezone)?;
    let end_at = local_to_utc(day.and_time(parse_time(&command.to)?), timezone)?;
    let task_id = match command.task.as_deref() {
        Some(task) => Some(resolve_task_id(repo, task).await?),
        None => None,
    };

    let block = repo
        .add_time_block(NewTimeBlockData {
            task_id,
            title: command.title,
            start_at,
            end_at,
        })
        .await?;
    println!(
        "Blocked {}-{} on {}: '{}' ({})",
        command.from,
        command.to,
        day,
        block.title,
        short_id(block.id)
    );
    Ok(())
}
