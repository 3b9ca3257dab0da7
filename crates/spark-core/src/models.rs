use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::recurrence::RecurrenceRule;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

/// A top-level folder that holds projects and standalone tasks.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Area {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub sort_order: i64,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    pub area_id: Option<Uuid>,
    pub name: String,
    pub notes: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task status: {0}")]
pub struct ParseTaskStatusError(String);

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" | "open" => Ok(TaskStatus::Pending),
            "completed" | "done" => Ok(TaskStatus::Completed),
            _ => Err(ParseTaskStatusError(s.to_string())),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Declared low to high so that `Ord` sorts by urgency.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
    sqlx::Type,
)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task priority: {0}")]
pub struct ParseTaskPriorityError(String);

impl FromStr for TaskPriority {
    type Err = ParseTaskPriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(TaskPriority::None),
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(ParseTaskPriorityError(s.to_string())),
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPriority::None => write!(f, "none"),
            TaskPriority::Low => write!(f, "low"),
            TaskPriority::Medium => write!(f, "medium"),
            TaskPriority::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub notes: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
    pub is_someday: bool,
    pub project_id: Option<Uuid>,
    pub area_id: Option<Uuid>,
    /// Always true exactly when `recurring_rule_id` is set.
    pub is_recurring: bool,
    pub recurring_rule_id: Option<Uuid>,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            title: String::new(),
            notes: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::None,
            due_date: None,
            scheduled_date: None,
            is_someday: false,
            project_id: None,
            area_id: None,
            is_recurring: false,
            recurring_rule_id: None,
            completed_at: None,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

impl Task {
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    /// The date the task shows up on in agenda views: its scheduled date, or
    /// its due date when it has not been scheduled.
    pub fn agenda_date(&self) -> Option<NaiveDate> {
        self.scheduled_date.or(self.due_date)
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_pending() && self.due_date.is_some_and(|due| due < today)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subtask {
    pub id: Uuid,
    pub user_id: Uuid,
    pub task_id: Uuid,
    pub title: String,
    pub is_completed: bool,
    pub position: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// A scheduled interval on the day planner, optionally tied to a task.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TimeBlock {
    pub id: Uuid,
    pub user_id: Uuid,
    pub task_id: Option<Uuid>,
    pub title: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl TimeBlock {
    pub fn duration(&self) -> chrono::Duration {
        self.end_at - self.start_at
    }
}

/// A stored recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurringRule {
    pub id: Uuid,
    pub user_id: Uuid,
    pub rule: RecurrenceRule,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Data Transfer Objects
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct NewAreaData {
    pub name: String,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateAreaData {
    pub name: Option<String>,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct NewProjectData {
    pub name: String,
    pub notes: Option<String>,
    pub area_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProjectData {
    pub name: Option<String>,
    pub notes: Option<Option<String>>,
    pub area_id: Option<Option<Uuid>>,
    pub due_date: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTaskData {
    pub title: String,
    pub notes: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
    pub is_someday: bool,
    pub project_id: Option<Uuid>,
    pub area_id: Option<Uuid>,
}

/// Partial patch: `None` leaves a field as is, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskData {
    pub title: Option<String>,
    pub notes: Option<Option<String>>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub scheduled_date: Option<Option<NaiveDate>>,
    pub is_someday: Option<bool>,
    pub project_id: Option<Option<Uuid>>,
    pub area_id: Option<Option<Uuid>>,
}

#[derive(Debug, Clone)]
pub struct NewTimeBlockData {
    pub task_id: Option<Uuid>,
    pub title: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTimeBlockData {
    pub task_id: Option<Option<Uuid>>,
    pub title: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
}
