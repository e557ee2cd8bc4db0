use chrono::{DateTime, SubsecRound, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::patch::Patch;

/// Store-assigned task identifier
pub type TaskId = i32;

pub const DESCRIPTION_MAX_LEN: u64 = 1000;
pub const ASSIGNEE_MAX_LEN: u64 = 100;

/// Task status
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl TaskStatus {
    /// Statuses a task can no longer be overdue in.
    pub const TERMINAL: [TaskStatus; 2] = [TaskStatus::Completed, TaskStatus::Cancelled];

    pub fn is_terminal(self) -> bool {
        Self::TERMINAL.contains(&self)
    }
}

/// Task priority levels
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskPriority {
    #[sea_orm(string_value = "low")]
    Low,
    #[default]
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "urgent")]
    Urgent,
}

/// A stored task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Unset until the first change
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Due, not finished, and past `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_terminal() && self.due_date.is_some_and(|due| due < now)
    }
}

/// DTO for creating a new task
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTask {
    #[validate(length(
        min = 1,
        max = 200,
        message = "title must be 1 to 200 characters and not blank"
    ))]
    pub title: String,
    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    #[validate(length(max = 100, message = "assigned_to must be at most 100 characters"))]
    pub assigned_to: Option<String>,
}

impl CreateTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Trims the title and drops sub-microsecond precision from the due date.
    pub fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        self.due_date = self.due_date.map(|due| due.trunc_subsecs(6));
    }
}

/// DTO for a partial update.
///
/// `title`, `status` and `priority` cannot be cleared; `null` or a missing
/// key leaves them unchanged. The other fields follow [`Patch`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTask {
    #[validate(length(
        min = 1,
        max = 200,
        message = "title must be 1 to 200 characters and not blank"
    ))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_description"))]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_date: Patch<DateTime<Utc>>,
    #[serde(default)]
    #[validate(custom(function = "validate_assignee"))]
    #[schema(value_type = Option<String>)]
    pub assigned_to: Patch<String>,
}

impl UpdateTask {
    /// True when the patch would not change any field.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_absent()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_absent()
            && self.assigned_to.is_absent()
    }

    pub fn normalize(&mut self) {
        if let Some(title) = self.title.as_mut() {
            *title = title.trim().to_string();
        }
        self.due_date = std::mem::take(&mut self.due_date).map(|due| due.trunc_subsecs(6));
    }
}

fn validate_description(value: &Patch<String>) -> Result<(), ValidationError> {
    max_chars(value, DESCRIPTION_MAX_LEN, "description must be at most 1000 characters")
}

fn validate_assignee(value: &Patch<String>) -> Result<(), ValidationError> {
    max_chars(value, ASSIGNEE_MAX_LEN, "assigned_to must be at most 100 characters")
}

fn max_chars(value: &Patch<String>, max: u64, message: &'static str) -> Result<(), ValidationError> {
    match value.as_set() {
        Some(text) if text.chars().count() as u64 > max => {
            Err(ValidationError::new("length").with_message(message.into()))
        }
        _ => Ok(()),
    }
}

/// Outcome of a bulk update. Ids are ascending and de-duplicated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct BulkUpdateResult {
    pub updated: Vec<TaskId>,
    pub missing: Vec<TaskId>,
    /// The updated tasks as stored after the change
    pub tasks: Vec<Task>,
}

/// Outcome of a bulk delete. Ids are ascending and de-duplicated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct BulkDeleteResult {
    pub deleted: Vec<TaskId>,
    pub missing: Vec<TaskId>,
}
