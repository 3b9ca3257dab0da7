use crate::db::{fetch_first, fetch_single};
use crate::error::CoreError;
use crate::models::RecurringRule;
use crate::notify::{ChangeKind, Table};
use crate::recurrence::{RecurrenceEnd, RecurrencePattern, RecurrenceRule};
use crate::repository::{RecurrenceRepository, SqliteRepository};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Storage shape of a recurrence rule. Weekdays are kept as a JSON array.
#[derive(Debug, FromRow)]
struct RecurringRuleRow {
    id: Uuid,
    user_id: Uuid,
    pattern: RecurrencePattern,
    repeat_interval: i64,
    days_of_week: Option<String>,
    end_date: Option<NaiveDate>,
    occurrence_count: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RecurringRuleRow> for RecurringRule {
    type Error = CoreError;

    fn try_from(row: RecurringRuleRow) -> Result<Self, Self::Error> {
        let days: Vec<u8> = match row.days_of_week.as_deref() {
            Some(json) if !json.is_empty() => serde_json::from_str(json)?,
            _ => Vec::new(),
        };
        let interval = u32::try_from(row.repeat_interval).map_err(|_| {
            CoreError::InvalidInput(format!("Invalid repeat interval: {}", row.repeat_interval))
        })?;
        let end = RecurrenceEnd::from_columns(row.end_date, row.occurrence_count)?;

        Ok(RecurringRule {
            id: row.id,
            user_id: row.user_id,
            rule: RecurrenceRule::from_parts(row.pattern, interval, days, end)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Weekdays are stored for weekly rules only.
fn days_column(rule: &RecurrenceRule) -> Result<Option<String>, CoreError> {
    match rule.effective_days_of_week().filter(|days| !days.is_empty()) {
        Some(days) => Ok(Some(serde_json::to_string(days)?)),
        None => Ok(None),
    }
}

#[async_trait]
impl RecurrenceRepository for SqliteRepository {
    async fn set_task_recurrence(
        &self,
        task_id: Uuid,
        rule: &RecurrenceRule,
    ) -> Result<RecurringRule, CoreError> {
        let days = days_column(rule)?;
        let occurrence_count = rule.occurrence_count().map(i64::from);
        let now = Utc::now();

        let mut tx = self.pool().begin().await?;
        self.ensure_owned(&mut *tx, Table::Tasks, task_id).await?;

        let (existing,): (Option<Uuid>,) = fetch_single(
            &mut *tx,
            sqlx::query_as("SELECT recurring_rule_id FROM tasks WHERE id = $1").bind(task_id),
        )
        .await?;

        let (row, kind): (RecurringRuleRow, ChangeKind) = match existing {
            Some(rule_id) => {
                let update = sqlx::query_as(
                    r#"UPDATE recurring_rules SET
                        pattern = $1, repeat_interval = $2, days_of_week = $3,
                        end_date = $4, occurrence_count = $5, updated_at = $6
                    WHERE id = $7
                    RETURNING *"#,
                )
                .bind(rule.pattern())
                .bind(i64::from(rule.interval()))
                .bind(days)
                .bind(rule.end_date())
                .bind(occurrence_count)
                .bind(now)
                .bind(rule_id);
                (fetch_single(&mut *tx, update).await?, ChangeKind::Update)
            }
            None => {
                let insert = sqlx::query_as(
                    r#"INSERT INTO recurring_rules (
                        id, user_id, pattern, repeat_interval, days_of_week,
                        end_date, occurrence_count, created_at, updated_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    RETURNING *"#,
                )
                .bind(Uuid::new_v4())
                .bind(self.owner())
                .bind(rule.pattern())
                .bind(i64::from(rule.interval()))
                .bind(days)
                .bind(rule.end_date())
                .bind(occurrence_count)
                .bind(now)
                .bind(now);
                let row: RecurringRuleRow = fetch_single(&mut *tx, insert).await?;

                sqlx::query(
                    "UPDATE tasks SET is_recurring = 1, recurring_rule_id = $1, updated_at = $2 WHERE id = $3",
                )
                .bind(row.id)
                .bind(now)
                .bind(task_id)
                .execute(&mut *tx)
                .await?;
                (row, ChangeKind::Insert)
            }
        };
        tx.commit().await?;

        self.changed(Table::RecurringRules, kind);
        if kind == ChangeKind::Insert {
            self.changed(Table::Tasks, ChangeKind::Update);
        }
        RecurringRule::try_from(row)
    }

    async fn find_recurrence_for_task(
        &self,
        task_id: Uuid,
    ) -> Result<Option<RecurringRule>, CoreError> {
        self.ensure_owned(self.pool(), Table::Tasks, task_id).await?;
        let row: Option<RecurringRuleRow> = fetch_first(
            self.pool(),
            sqlx::query_as(
                r#"SELECT r.* FROM recurring_rules r
                JOIN tasks t ON t.recurring_rule_id = r.id
                WHERE t.id = $1"#,
            )
            .bind(task_id),
        )
        .await?;
        row.map(RecurringRule::try_from).transpose()
    }

    async fn clear_task_recurrence(&self, task_id: Uuid) -> Result<(), CoreError> {
        let mut tx = self.pool().begin().await?;
        self.ensure_owned(&mut *tx, Table::Tasks, task_id).await?;

        let (existing,): (Option<Uuid>,) = fetch_single(
            &mut *tx,
            sqlx::query_as("SELECT recurring_rule_id FROM tasks WHERE id = $1").bind(task_id),
        )
        .await?;
        let Some(rule_id) = existing else {
            return Ok(());
        };

        sqlx::query(
            "UPDATE tasks SET is_recurring = 0, recurring_rule_id = NULL, updated_at = $1 WHERE id = $2",
        )
        .bind(Utc::now())
        .bind(task_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM recurring_rules WHERE id = $1")
            .bind(rule_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        self.changed(Table::RecurringRules, ChangeKind::Delete);
        self.changed(Table::Tasks, ChangeKind::Update);
        Ok(())
    }
}
