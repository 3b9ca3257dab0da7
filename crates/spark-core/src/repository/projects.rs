use crate::db::{fetch_first, fetch_single};
use crate::error::CoreError;
use crate::models::{NewProjectData, Project, UpdateProjectData};
use crate::notify::{ChangeKind, Table};
use crate::repository::{require_text, ProjectRepository, SqliteRepository};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

#[async_trait]
impl ProjectRepository for SqliteRepository {
    async fn add_project(&self, data: NewProjectData) -> Result<Project, CoreError> {
        let name = require_text("Project name", data.name)?;
        if let Some(area_id) = data.area_id {
            self.ensure_owned(self.pool(), Table::Areas, area_id).await?;
        }

        let now = Utc::now();
        let mut tx = self.pool().begin().await?;
        let insert = sqlx::query_as(
            r#"INSERT INTO projects (id, user_id, area_id, name, notes, due_date, is_archived, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $8)
            RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(self.owner())
        .bind(data.area_id)
        .bind(name)
        .bind(data.notes)
        .bind(data.due_date)
        .bind(now)
        .bind(now);
        let project = fetch_single(&mut *tx, insert).await?;
        tx.commit().await?;

        self.changed(Table::Projects, ChangeKind::Insert);
        Ok(project)
    }

    async fn find_project_by_id(&self, id: Uuid) -> Result<Option<Project>, CoreError> {
        fetch_first(
            self.pool(),
            sqlx::query_as("SELECT * FROM projects WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(self.owner()),
        )
        .await
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>, CoreError> {
        fetch_first(
            self.pool(),
            sqlx::query_as(
                "SELECT * FROM projects WHERE user_id = $1 AND name = $2 COLLATE NOCASE AND is_archived = 0",
            )
            .bind(self.owner())
            .bind(name.trim()),
        )
        .await
    }

    async fn list_projects(&self) -> Result<Vec<Project>, CoreError> {
        let projects = sqlx::query_as(
            "SELECT * FROM projects WHERE user_id = $1 AND is_archived = 0 ORDER BY name",
        )
        .bind(self.owner())
        .fetch_all(self.pool())
        .await?;
        Ok(projects)
    }

    async fn update_project(
        &self,
        id: Uuid,
        data: UpdateProjectData,
    ) -> Result<Project, CoreError> {
        self.ensure_owned(self.pool(), Table::Projects, id).await?;
        let mut project: Project = self
            .find_project_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Project {} not found", id)))?;

        if let Some(name) = data.name {
            project.name = require_text("Project name", name)?;
        }
        if let Some(notes) = data.notes {
            project.notes = notes;
        }
        if let Some(area_id) = data.area_id {
            if let Some(area_id) = area_id {
                self.ensure_owned(self.pool(), Table::Areas, area_id).await?;
            }
            project.area_id = area_id;
        }
        if let Some(due_date) = data.due_date {
            project.due_date = due_date;
        }

        let mut tx = self.pool().begin().await?;
        let update = sqlx::query_as(
            r#"UPDATE projects SET name = $1, notes = $2, area_id = $3, due_date = $4, updated_at = $5
            WHERE id = $6
            RETURNING *"#,
        )
        .bind(project.name)
        .bind(project.notes)
        .bind(project.area_id)
        .bind(project.due_date)
        .bind(Utc::now())
        .bind(id);
        let project = fetch_single(&mut *tx, update).await?;
        tx.commit().await?;

        self.changed(Table::Projects, ChangeKind::Update);
        Ok(project)
    }

    async fn archive_project(&self, id: Uuid) -> Result<(), CoreError> {
        self.ensure_owned(self.pool(), Table::Projects, id).await?;
        sqlx::query("UPDATE projects SET is_archived = 1, updated_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool())
            .await?;
        self.changed(Table::Projects, ChangeKind::Update);
        Ok(())
    }
}
