use crate::db::{fetch_first, fetch_single};
use crate::error::CoreError;
use crate::models::{Area, NewAreaData, UpdateAreaData};
use crate::notify::{ChangeKind, Table};
use crate::repository::{require_text, SqliteRepository};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

#[async_trait]
impl super::AreaRepository for SqliteRepository {
    async fn add_area(&self, data: NewAreaData) -> Result<Area, CoreError> {
        let name = require_text("Area name", data.name)?;
        let sort_order = match data.sort_order {
            Some(order) => order,
            None => {
                let (max,): (Option<i64>,) = fetch_single(
                    self.pool(),
                    sqlx::query_as("SELECT MAX(sort_order) FROM areas WHERE user_id = $1")
                        .bind(self.owner()),
                )
                .await?;
                max.map_or(0, |max| max + 1)
            }
        };

        let mut tx = self.pool().begin().await?;
        let insert = sqlx::query_as(
            r#"INSERT INTO areas (id, user_id, name, sort_order, is_archived, created_at)
            VALUES ($1, $2, $3, $4, 0, $5)
            RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(self.owner())
        .bind(name)
        .bind(sort_order)
        .bind(Utc::now());
        let area = fetch_single(&mut *tx, insert).await?;
        tx.commit().await?;

        self.changed(Table::Areas, ChangeKind::Insert);
        Ok(area)
    }

    async fn find_area_by_id(&self, id: Uuid) -> Result<Option<Area>, CoreError> {
        fetch_first(
            self.pool(),
            sqlx::query_as("SELECT * FROM areas WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(self.owner()),
        )
        .await
    }

    async fn find_area_by_name(&self, name: &str) -> Result<Option<Area>, CoreError> {
        fetch_first(
            self.pool(),
            sqlx::query_as(
                "SELECT * FROM areas WHERE user_id = $1 AND name = $2 COLLATE NOCASE AND is_archived = 0",
            )
            .bind(self.owner())
            .bind(name.trim()),
        )
        .await
    }

    async fn list_areas(&self) -> Result<Vec<Area>, CoreError> {
        let areas = sqlx::query_as(
            "SELECT * FROM areas WHERE user_id = $1 AND is_archived = 0 ORDER BY sort_order, name",
        )
        .bind(self.owner())
        .fetch_all(self.pool())
        .await?;
        Ok(areas)
    }

    async fn update_area(&self, id: Uuid, data: UpdateAreaData) -> Result<Area, CoreError> {
        self.ensure_owned(self.pool(), Table::Areas, id).await?;
        let name = data.name.map(|n| require_text("Area name", n)).transpose()?;

        let mut tx = self.pool().begin().await?;
        let update = sqlx::query_as(
            r#"UPDATE areas SET
                name = COALESCE($1, name),
                sort_order = COALESCE($2, sort_order)
            WHERE id = $3
            RETURNING *"#,
        )
        .bind(name)
        .bind(data.sort_order)
        .bind(id);
        let area = fetch_single(&mut *tx, update).await?;
        tx.commit().await?;

        self.changed(Table::Areas, ChangeKind::Update);
        Ok(area)
    }

    async fn archive_area(&self, id: Uuid) -> Result<(), CoreError> {
        self.ensure_owned(self.pool(), Table::Areas, id).await?;
        sqlx::query("UPDATE areas SET is_archived = 1 WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        self.changed(Table::Areas, ChangeKind::Update);
        Ok(())
    }
}
