use crate::db::{fetch_first, fetch_single};
use crate::error::CoreError;
use crate::models::{NewTimeBlockData, TimeBlock, UpdateTimeBlockData};
use crate::notify::{ChangeKind, Table};
use crate::repository::{require_text, SqliteRepository, TimeBlockRepository};
use crate::timezone;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

fn check_interval(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), CoreError> {
    if end <= start {
        return Err(CoreError::InvalidInput(
            "A time block must end after it starts".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl TimeBlockRepository for SqliteRepository {
    async fn add_time_block(&self, data: NewTimeBlockData) -> Result<TimeBlock, CoreError> {
        let title = require_text("Time block title", data.title)?;
        check_interval(data.start_at, data.end_at)?;
        if let Some(task_id) = data.task_id {
            self.ensure_owned(self.pool(), Table::Tasks, task_id).await?;
        }

        let mut tx = self.pool().begin().await?;
        let insert = sqlx::query_as(
            r#"INSERT INTO time_blocks (id, user_id, task_id, title, start_at, end_at, is_deleted, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, 0, $7)
            RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(self.owner())
        .bind(data.task_id)
        .bind(title)
        .bind(data.start_at)
        .bind(data.end_at)
        .bind(Utc::now());
        let block = fetch_single(&mut *tx, insert).await?;
        tx.commit().await?;

        self.changed(Table::TimeBlocks, ChangeKind::Insert);
        Ok(block)
    }

    async fn find_time_block_by_id(&self, id: Uuid) -> Result<Option<TimeBlock>, CoreError> {
        fetch_first(
            self.pool(),
            sqlx::query_as(
                "SELECT * FROM time_blocks WHERE id = $1 AND user_id = $2 AND is_deleted = 0",
            )
            .bind(id)
            .bind(self.owner()),
        )
        .await
    }

    async fn update_time_block(
        &self,
        id: Uuid,
        data: UpdateTimeBlockData,
    ) -> Result<TimeBlock, CoreError> {
        self.ensure_owned(self.pool(), Table::TimeBlocks, id).await?;
        let mut block = self
            .find_time_block_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Time block {} not found", id)))?;

        if let Some(title) = data.title {
            block.title = require_text("Time block title", title)?;
        }
        if let Some(task_id) = data.task_id {
            if let Some(task_id) = task_id {
                self.ensure_owned(self.pool(), Table::Tasks, task_id).await?;
            }
            block.task_id = task_id;
        }
        block.start_at = data.start_at.unwrap_or(block.start_at);
        block.end_at = data.end_at.unwrap_or(block.end_at);
        check_interval(block.start_at, block.end_at)?;

        let mut tx = self.pool().begin().await?;
        let update = sqlx::query_as(
            r#"UPDATE time_blocks SET task_id = $1, title = $2, start_at = $3, end_at = $4
            WHERE id = $5
            RETURNING *"#,
        )
        .bind(block.task_id)
        .bind(block.title)
        .bind(block.start_at)
        .bind(block.end_at)
        .bind(id);
        let block = fetch_single(&mut *tx, update).await?;
        tx.commit().await?;

        self.changed(Table::TimeBlocks, ChangeKind::Update);
        Ok(block)
    }

    async fn delete_time_block(&self, id: Uuid) -> Result<(), CoreError> {
        self.ensure_owned(self.pool(), Table::TimeBlocks, id).await?;
        sqlx::query("UPDATE time_blocks SET is_deleted = 1 WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        self.changed(Table::TimeBlocks, ChangeKind::Delete);
        Ok(())
    }

    async fn list_time_blocks_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeBlock>, CoreError> {
        // Timestamps are compared after decoding, not as stored text.
        let blocks: Vec<TimeBlock> = sqlx::query_as(
            "SELECT * FROM time_blocks WHERE user_id = $1 AND is_deleted = 0",
        )
        .bind(self.owner())
        .fetch_all(self.pool())
        .await?;

        let mut blocks: Vec<TimeBlock> = blocks
            .into_iter()
            .filter(|block| block.start_at < end && block.end_at > start)
            .collect();
        blocks.sort_by_key(|block| block.start_at);
        Ok(blocks)
    }

    async fn list_time_blocks_for_day(
        &self,
        day: NaiveDate,
        timezone: &str,
    ) -> Result<Vec<TimeBlock>, CoreError> {
        let (start, end) = timezone::day_bounds(day, timezone)?;
        self.list_time_blocks_between(start, end).await
    }
}
