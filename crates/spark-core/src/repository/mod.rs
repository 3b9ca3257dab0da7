use crate::auth;
use crate::db::{fetch_first, DbPool};
use crate::error::CoreError;
use crate::models::{
    Area, NewAreaData, NewProjectData, NewTaskData, NewTimeBlockData, Project, RecurringRule,
    Subtask, Task, TimeBlock, UpdateAreaData, UpdateProjectData, UpdateTaskData,
    UpdateTimeBlockData,
};
use crate::notify::{ChangeKind, ChangeNotifier, Table};
use crate::recurrence::RecurrenceRule;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Executor, Sqlite};
use uuid::Uuid;

pub mod areas;
pub mod projects;
pub mod recurrence;
pub mod subtasks;
pub mod tasks;
pub mod time_blocks;

// Every query is scoped to the repository's owner. Rows that belong to someone
// else are reported as `Unauthorized`, rows that are missing or soft deleted as
// `NotFound`.

#[async_trait]
pub trait AreaRepository {
    async fn add_area(&self, data: NewAreaData) -> Result<Area, CoreError>;
    async fn find_area_by_id(&self, id: Uuid) -> Result<Option<Area>, CoreError>;
    async fn find_area_by_name(&self, name: &str) -> Result<Option<Area>, CoreError>;
    /// Unarchived areas in display order.
    async fn list_areas(&self) -> Result<Vec<Area>, CoreError>;
    async fn update_area(&self, id: Uuid, data: UpdateAreaData) -> Result<Area, CoreError>;
    async fn archive_area(&self, id: Uuid) -> Result<(), CoreError>;
}

#[async_trait]
pub trait ProjectRepository {
    async fn add_project(&self, data: NewProjectData) -> Result<Project, CoreError>;
    async fn find_project_by_id(&self, id: Uuid) -> Result<Option<Project>, CoreError>;
    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>, CoreError>;
    async fn list_projects(&self) -> Result<Vec<Project>, CoreError>;
    async fn update_project(&self, id: Uuid, data: UpdateProjectData)
        -> Result<Project, CoreError>;
    async fn archive_project(&self, id: Uuid) -> Result<(), CoreError>;
}

#[async_trait]
pub trait TaskRepository {
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError>;
    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError>;
    async fn find_tasks_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Task>, CoreError>;
    /// Every task that is not soft deleted, completed ones included.
    async fn list_tasks(&self) -> Result<Vec<Task>, CoreError>;
    async fn update_task(&self, id: Uuid, data: UpdateTaskData) -> Result<Task, CoreError>;
    async fn complete_task(&self, id: Uuid) -> Result<Task, CoreError>;
    async fn reopen_task(&self, id: Uuid) -> Result<Task, CoreError>;
    async fn delete_task(&self, id: Uuid) -> Result<(), CoreError>;
}

#[async_trait]
pub trait SubtaskRepository {
    async fn add_subtask(&self, task_id: Uuid, title: String) -> Result<Subtask, CoreError>;
    /// Subtasks of a task in position order.
    async fn list_subtasks(&self, task_id: Uuid) -> Result<Vec<Subtask>, CoreError>;
    async fn set_subtask_completed(&self, id: Uuid, completed: bool)
        -> Result<Subtask, CoreError>;
    async fn rename_subtask(&self, id: Uuid, title: String) -> Result<Subtask, CoreError>;
    async fn delete_subtask(&self, id: Uuid) -> Result<(), CoreError>;
}

#[async_trait]
pub trait RecurrenceRepository {
    /// Attaches `rule` to a task, replacing any rule it already has.
    async fn set_task_recurrence(
        &self,
        task_id: Uuid,
        rule: &RecurrenceRule,
    ) -> Result<RecurringRule, CoreError>;
    async fn find_recurrence_for_task(
        &self,
        task_id: Uuid,
    ) -> Result<Option<RecurringRule>, CoreError>;
    async fn clear_task_recurrence(&self, task_id: Uuid) -> Result<(), CoreError>;
}

#[async_trait]
pub trait TimeBlockRepository {
    async fn add_time_block(&self, data: NewTimeBlockData) -> Result<TimeBlock, CoreError>;
    async fn find_time_block_by_id(&self, id: Uuid) -> Result<Option<TimeBlock>, CoreError>;
    async fn update_time_block(
        &self,
        id: Uuid,
        data: UpdateTimeBlockData,
    ) -> Result<TimeBlock, CoreError>;
    async fn delete_time_block(&self, id: Uuid) -> Result<(), CoreError>;
    /// Blocks overlapping `[start, end)`, ordered by start time.
    async fn list_time_blocks_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeBlock>, CoreError>;
    /// Blocks overlapping the local calendar day `day` in `timezone`.
    async fn list_time_blocks_for_day(
        &self,
        day: NaiveDate,
        timezone: &str,
    ) -> Result<Vec<TimeBlock>, CoreError>;
}

/// Main repository trait that composes all domain traits
pub trait Repository:
    AreaRepository
    + ProjectRepository
    + TaskRepository
    + SubtaskRepository
    + RecurrenceRepository
    + TimeBlockRepository
{
}

/// SQLite implementation of the repository pattern, scoped to one user.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: DbPool,
    owner: Uuid,
    notifier: ChangeNotifier,
}

impl SqliteRepository {
    pub fn new(pool: DbPool, owner: Uuid, notifier: ChangeNotifier) -> Self {
        Self {
            pool,
            owner,
            notifier,
        }
    }

    /// Builds a repository for whoever is signed in.
    pub async fn for_current_user(
        pool: DbPool,
        notifier: ChangeNotifier,
    ) -> Result<Self, CoreError> {
        let user = auth::current_user(&pool)
            .await?
            .ok_or(CoreError::NotSignedIn)?;
        Ok(Self::new(pool, user.id, notifier))
    }

    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub(crate) fn changed(&self, table: Table, kind: ChangeKind) {
        tracing::debug!(%table, ?kind, "row changed");
        self.notifier.publish(table, kind);
    }

    /// Fails unless the live row `id` in `table` belongs to the owner. Soft
    /// deleted rows and archived areas or projects count as missing.
    pub(crate) async fn ensure_owned<'c, E>(
        &self,
        executor: E,
        table: Table,
        id: Uuid,
    ) -> Result<(), CoreError>
    where
        E: Executor<'c, Database = Sqlite>,
    {
        let sql = match table {
            Table::Tasks | Table::Subtasks | Table::TimeBlocks => format!(
                "SELECT user_id FROM {} WHERE id = $1 AND is_deleted = 0",
                table
            ),
            Table::Areas | Table::Projects => format!(
                "SELECT user_id FROM {} WHERE id = $1 AND is_archived = 0",
                table
            ),
            _ => format!("SELECT user_id FROM {} WHERE id = $1", table),
        };
        let row: Option<(Uuid,)> = fetch_first(executor, sqlx::query_as(&sql).bind(id)).await?;
        self.check_owner(table, id, row.map(|(owner,)| owner))
    }

    pub(crate) fn check_owner(
        &self,
        table: Table,
        id: Uuid,
        row_owner: Option<Uuid>,
    ) -> Result<(), CoreError> {
        match row_owner {
            None => Err(CoreError::NotFound(format!("No {} row with id {}", table, id))),
            Some(owner) if owner == self.owner => Ok(()),
            Some(_) => {
                tracing::warn!(%table, %id, "access to another user's row refused");
                Err(CoreError::Unauthorized(format!(
                    "{} row {} belongs to another user",
                    table, id
                )))
            }
        }
    }
}

pub(crate) fn require_text(field: &str, value: String) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidInput(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}

impl Repository for SqliteRepository {}
