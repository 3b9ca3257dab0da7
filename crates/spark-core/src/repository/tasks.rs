use crate::db::{fetch_first, fetch_single};
use crate::error::CoreError;
use crate::models::{NewTaskData, Task, TaskStatus, UpdateTaskData};
use crate::notify::{ChangeKind, Table};
use crate::repository::{require_text, SqliteRepository, TaskRepository};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

impl SqliteRepository {
    async fn ensure_parents_owned(
        &self,
        project_id: Option<Uuid>,
        area_id: Option<Uuid>,
    ) -> Result<(), CoreError> {
        if let Some(project_id) = project_id {
            self.ensure_owned(self.pool(), Table::Projects, project_id)
                .await?;
        }
        if let Some(area_id) = area_id {
            self.ensure_owned(self.pool(), Table::Areas, area_id).await?;
        }
        Ok(())
    }

    async fn load_owned_task(&self, id: Uuid) -> Result<Task, CoreError> {
        self.ensure_owned(self.pool(), Table::Tasks, id).await?;
        self.find_task_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Task {} not found", id)))
    }

    async fn set_status(&self, id: Uuid, status: TaskStatus) -> Result<Task, CoreError> {
        let task = self.load_owned_task(id).await?;
        if task.status == status {
            return Ok(task);
        }
        let completed_at = match status {
            TaskStatus::Completed => Some(Utc::now()),
            TaskStatus::Pending => None,
        };

        let mut tx = self.pool().begin().await?;
        let task = fetch_single(
            &mut *tx,
            sqlx::query_as(
                "UPDATE tasks SET status = $1, completed_at = $2, updated_at = $3 WHERE id = $4 RETURNING *",
            )
            .bind(status)
            .bind(completed_at)
            .bind(Utc::now())
            .bind(id),
        )
        .await?;
        tx.commit().await?;

        self.changed(Table::Tasks, ChangeKind::Update);
        Ok(task)
    }
}

#[async_trait]
impl TaskRepository for SqliteRepository {
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError> {
        let title = require_text("Task title", data.title)?;
        self.ensure_parents_owned(data.project_id, data.area_id)
            .await?;

        let now = Utc::now();
        let mut tx = self.pool().begin().await?;
        let insert = sqlx::query_as(
            r#"INSERT INTO tasks (
                id, user_id, title, notes, status, priority, due_date, scheduled_date,
                is_someday, project_id, area_id, is_recurring, recurring_rule_id,
                completed_at, is_deleted, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0, NULL, NULL, 0, $12, $13)
            RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(self.owner())
        .bind(title)
        .bind(data.notes)
        .bind(TaskStatus::Pending)
        .bind(data.priority.unwrap_or_default())
        .bind(data.due_date)
        .bind(data.scheduled_date)
        .bind(data.is_someday)
        .bind(data.project_id)
        .bind(data.area_id)
        .bind(now)
        .bind(now);
        let task = fetch_single(&mut *tx, insert).await?;
        tx.commit().await?;

        self.changed(Table::Tasks, ChangeKind::Insert);
        Ok(task)
    }

    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError> {
        fetch_first(
            self.pool(),
            sqlx::query_as(
                "SELECT * FROM tasks WHERE id = $1 AND user_id = $2 AND is_deleted = 0",
            )
            .bind(id)
            .bind(self.owner()),
        )
        .await
    }

    async fn find_tasks_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Task>, CoreError> {
        // Ids are stored as blobs, so the prefix is matched on the hyphenated form.
        let prefix = short_id.trim().to_lowercase();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }
        let tasks = self
            .list_tasks()
            .await?
            .into_iter()
            .filter(|task| task.id.to_string().starts_with(&prefix))
            .collect();
        Ok(tasks)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, CoreError> {
        let tasks = sqlx::query_as(
            "SELECT * FROM tasks WHERE user_id = $1 AND is_deleted = 0 ORDER BY created_at",
        )
        .bind(self.owner())
        .fetch_all(self.pool())
        .await?;
        Ok(tasks)
    }

    async fn update_task(&self, id: Uuid, data: UpdateTaskData) -> Result<Task, CoreError> {
        let mut task = self.load_owned_task(id).await?;

        if let Some(title) = data.title {
            task.title = require_text("Task title", title)?;
        }
        if let Some(notes) = data.notes {
            task.notes = notes;
        }
        if let Some(priority) = data.priority {
            task.priority = priority;
        }
        if let Some(due_date) = data.due_date {
            task.due_date = due_date;
        }
        if let Some(scheduled_date) = data.scheduled_date {
            task.scheduled_date = scheduled_date;
        }
        if let Some(is_someday) = data.is_someday {
            task.is_someday = is_someday;
        }
        if let Some(project_id) = data.project_id {
            task.project_id = project_id;
        }
        if let Some(area_id) = data.area_id {
            task.area_id = area_id;
        }
        self.ensure_parents_owned(
            data.project_id.flatten(),
            data.area_id.flatten(),
        )
        .await?;

        let mut tx = self.pool().begin().await?;
        let update = sqlx::query_as(
            r#"UPDATE tasks SET
                title = $1, notes = $2, priority = $3, due_date = $4, scheduled_date = $5,
                is_someday = $6, project_id = $7, area_id = $8, updated_at = $9
            WHERE id = $10
            RETURNING *"#,
        )
        .bind(task.title)
        .bind(task.notes)
        .bind(task.priority)
        .bind(task.due_date)
        .bind(task.scheduled_date)
        .bind(task.is_someday)
        .bind(task.project_id)
        .bind(task.area_id)
        .bind(Utc::now())
        .bind(id);
        let task = fetch_single(&mut *tx, update).await?;
        tx.commit().await?;

        self.changed(Table::Tasks, ChangeKind::Update);
        Ok(task)
    }

    async fn complete_task(&self, id: Uuid) -> Result<Task, CoreError> {
        self.set_status(id, TaskStatus::Completed).await
    }

    async fn reopen_task(&self, id: Uuid) -> Result<Task, CoreError> {
        self.set_status(id, TaskStatus::Pending).await
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), CoreError> {
        let mut tx = self.pool().begin().await?;
        self.ensure_owned(&mut *tx, Table::Tasks, id).await?;

        let now = Utc::now();
        sqlx::query("UPDATE tasks SET is_deleted = 1, updated_at = $1 WHERE id = $2")
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE subtasks SET is_deleted = 1 WHERE task_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        self.changed(Table::Tasks, ChangeKind::Delete);
        self.changed(Table::Subtasks, ChangeKind::Delete);
        Ok(())
    }
}
