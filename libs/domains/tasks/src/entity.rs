use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask};

/// Sea-ORM Entity for the tasks table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTimeWithTimeZone>,
    pub assigned_to: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Timestamps are always bound with a `+00:00` offset so that text-backed
/// stores compare them in chronological order.
pub(crate) fn to_db_time(value: DateTime<Utc>) -> DateTimeWithTimeZone {
    value.fixed_offset()
}

impl From<Model> for Task {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            status: model.status,
            priority: model.priority,
            due_date: model.due_date.map(|due| due.with_timezone(&Utc)),
            assigned_to: model.assigned_to,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.map(|at| at.with_timezone(&Utc)),
        }
    }
}

impl ActiveModel {
    /// Insert model for a new task; `id` is left to the store.
    pub fn for_insert(input: CreateTask, now: DateTime<Utc>) -> Self {
        Self {
            id: NotSet,
            title: Set(input.title),
            description: Set(input.description),
            status: Set(input.status),
            priority: Set(input.priority),
            due_date: Set(input.due_date.map(to_db_time)),
            assigned_to: Set(input.assigned_to),
            created_at: Set(to_db_time(now)),
            updated_at: Set(None),
        }
    }

    /// Sparse model holding only the patched columns plus `updated_at`.
    ///
    /// Used both for single-row saves and as the `SET` clause of bulk updates.
    pub fn from_patch(patch: UpdateTask, now: DateTime<Utc>) -> Self {
        let mut model = Self {
            updated_at: Set(Some(to_db_time(now))),
            ..Default::default()
        };

        if let Some(title) = patch.title {
            model.title = Set(title);
        }
        if let Some(description) = patch.description.into_change() {
            model.description = Set(description);
        }
        if let Some(status) = patch.status {
            model.status = Set(status);
        }
        if let Some(priority) = patch.priority {
            model.priority = Set(priority);
        }
        if let Some(due_date) = patch.due_date.into_change() {
            model.due_date = Set(due_date.map(to_db_time));
        }
        if let Some(assigned_to) = patch.assigned_to.into_change() {
            model.assigned_to = Set(assigned_to);
        }

        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::Patch;
    use sea_orm::ActiveValue;

    #[test]
    fn test_for_insert_leaves_id_to_store() {
        let now = Utc::now();
        let model = ActiveModel::for_insert(CreateTask::new("t"), now);

        assert_eq!(model.id, NotSet);
        assert_eq!(model.created_at, Set(now.fixed_offset()));
        assert_eq!(model.updated_at, Set(None));
        assert_eq!(model.status, Set(TaskStatus::Pending));
    }

    #[test]
    fn test_from_patch_only_sets_present_fields() {
        let now = Utc::now();
        let patch = UpdateTask {
            status: Some(TaskStatus::Completed),
            description: Patch::Clear,
            ..Default::default()
        };

        let model = ActiveModel::from_patch(patch, now);

        assert_eq!(model.status, Set(TaskStatus::Completed));
        assert_eq!(model.description, Set(None));
        assert_eq!(model.updated_at, Set(Some(now.fixed_offset())));
        assert!(matches!(model.title, ActiveValue::NotSet));
        assert!(matches!(model.priority, ActiveValue::NotSet));
        assert!(matches!(model.due_date, ActiveValue::NotSet));
        assert!(matches!(model.assigned_to, ActiveValue::NotSet));
        assert!(matches!(model.id, ActiveValue::NotSet));
    }

    #[test]
    fn test_model_into_task_converts_to_utc() {
        let created = Utc::now();
        let model = Model {
            id: 3,
            title: "t".into(),
            description: None,
            status: TaskStatus::InProgress,
            priority: TaskPriority::High,
            due_date: None,
            assigned_to: Some("ana".into()),
            created_at: created.fixed_offset(),
            updated_at: None,
        };

        let task: Task = model.into();
        assert_eq!(task.id, 3);
        assert_eq!(task.created_at, created);
        assert_eq!(task.assigned_to.as_deref(), Some("ana"));
    }
}
