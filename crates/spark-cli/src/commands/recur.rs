use anyhow::Result;
use chrono::NaiveDate;
use spark_core::error::CoreError;
use spark_core::recurrence::{parse_weekday, validate_rrule, RecurrenceEnd, RecurrenceRule};
use spark_core::repository::Repository;

use crate::cli::{RecurSetCommand, RecurSubcommand};
use crate::parser::parse_date;
use crate::util::resolve_task_id;

fn print_rule(rule: &RecurrenceRule) {
    println!("Repeats: {}", rule.describe());
    if let Some(rrule) = rule.to_rrule() {
        println!("RRULE:   {}", rrule);
    }
}

/// Builds a rule from the command line flags.
fn build_rule(command: &RecurSetCommand, today: NaiveDate) -> Result<RecurrenceRule> {
    let days = command
        .on
        .iter()
        .filter(|name| !name.trim().is_empty())
        .map(|name| {
            parse_weekday(name)
                .ok_or_else(|| CoreError::InvalidInput(format!("Unknown weekday: {}", name)))
        })
        .collect::<Result<Vec<u8>, CoreError>>()?;

    let end = match (command.until.as_deref(), command.count) {
        (Some(until), _) => RecurrenceEnd::OnDate(parse_date(until, today)?),
        (None, Some(count)) => RecurrenceEnd::AfterOccurrences(count),
        (None, None) => RecurrenceEnd::Never,
    };

    Ok(RecurrenceRule::from_parts(
        command.every.into(),
        command.interval,
        days,
        end,
    )?)
}

pub async fn handle_recur(repo: &impl Repository, command: RecurSubcommand, today: NaiveDate) -> Result<()> {
    match command {
        RecurSubcommand::Set(command) => {
            let task_id = resolve_task_id(repo, &command.task).await?;
            let task = repo
                .find_task_by_id(task_id)
                .await?
                .ok_or_else(|| CoreError::NotFound(format!("Task {} not found", task_id)))?;

            let rule = build_rule(&command, today)?;
            if let Some(rrule) = rule.to_rrule() {
                let dtstart = task.agenda_date().unwrap_or(today);
                validate_rrule(&rrule, dtstart)?;
            }

            let stored = repo.set_task_recurrence(task.id, &rule).await?;
            println!("'{}' now repeats.", task.title);
            print_rule(&stored.rule);
        }
        RecurSubcommand::Show { task } => {
            let task_id = resolve_task_id(repo, &task).await?;
            match repo.find_recurrence_for_task(task_id).await? {
                Some(recurrence) => print_rule(&recurrence.rule),
                None => println!("This task does not repeat."),
            }
        }
        RecurSubcommand::Clear { task } => {
            let task_id = resolve_task_id(repo, &task).await?;
            repo.clear_task_recurrence(task_id).await?;
            println!("The task no longer repeats.");
        }
    }
    Ok(())
}
