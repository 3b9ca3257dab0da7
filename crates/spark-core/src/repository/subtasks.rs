use crate::db::fetch_single;
use crate::error::CoreError;
use crate::models::Subtask;
use crate::notify::{ChangeKind, Table};
use crate::repository::{require_text, SqliteRepository, SubtaskRepository};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

#[async_trait]
impl SubtaskRepository for SqliteRepository {
    async fn add_subtask(&self, task_id: Uuid, title: String) -> Result<Subtask, CoreError> {
        let title = require_text("Subtask title", title)?;
        let mut tx = self.pool().begin().await?;
        self.ensure_owned(&mut *tx, Table::Tasks, task_id).await?;

        let (max,): (Option<i64>,) = fetch_single(
            &mut *tx,
            sqlx::query_as(
                "SELECT MAX(position) FROM subtasks WHERE task_id = $1 AND is_deleted = 0",
            )
            .bind(task_id),
        )
        .await?;

        let insert = sqlx::query_as(
            r#"INSERT INTO subtasks (id, user_id, task_id, title, is_completed, position, is_deleted, created_at)
            VALUES ($1, $2, $3, $4, 0, $5, 0, $6)
            RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(self.owner())
        .bind(task_id)
        .bind(title)
        .bind(max.map_or(0, |max| max + 1))
        .bind(Utc::now());
        let subtask = fetch_single(&mut *tx, insert).await?;
        tx.commit().await?;

        self.changed(Table::Subtasks, ChangeKind::Insert);
        Ok(subtask)
    }

    async fn list_subtasks(&self, task_id: Uuid) -> Result<Vec<Subtask>, CoreError> {
        self.ensure_owned(self.pool(), Table::Tasks, task_id).await?;
        let subtasks = sqlx::query_as(
            "SELECT * FROM subtasks WHERE task_id = $1 AND is_deleted = 0 ORDER BY position",
        )
        .bind(task_id)
        .fetch_all(self.pool())
        .await?;
        Ok(subtasks)
    }

    async fn set_subtask_completed(
        &self,
        id: Uuid,
        completed: bool,
    ) -> Result<Subtask, CoreError> {
        self.ensure_owned(self.pool(), Table::Subtasks, id).await?;
        let mut tx = self.pool().begin().await?;
        let subtask = fetch_single(
            &mut *tx,
            sqlx::query_as("UPDATE subtasks SET is_completed = $1 WHERE id = $2 RETURNING *")
                .bind(completed)
                .bind(id),
        )
        .await?;
        tx.commit().await?;
        self.changed(Table::Subtasks, ChangeKind::Update);
        Ok(subtask)
    }

    async fn rename_subtask(&self, id: Uuid, title: String) -> Result<Subtask, CoreError> {
        let title = require_text("Subtask title", title)?;
        self.ensure_owned(self.pool(), Table::Subtasks, id).await?;
        let mut tx = self.pool().begin().await?;
        let subtask = fetch_single(
            &mut *tx,
            sqlx::query_as("UPDATE subtasks SET title = $1 WHERE id = $2 RETURNING *")
                .bind(title)
                .bind(id),
        )
        .await?;
        tx.commit().await?;
        self.changed(Table::Subtasks, ChangeKind::Update);
        Ok(subtask)
    }

    async fn delete_subtask(&self, id: Uuid) -> Result<(), CoreError> {
        self.ensure_owned(self.pool(), Table::Subtasks, id).await?;
        sqlx::query("UPDATE subtasks SET is_deleted = 1 WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        self.changed(Table::Subtasks, ChangeKind::Delete);
        Ok(())
    }
}
